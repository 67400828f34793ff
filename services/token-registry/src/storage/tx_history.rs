//! Append-only transaction log.

use dip721_interface::{Nat, TokenMetadata, TxEvent};

use super::CallContext;

/// Kind of a logged transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOperation {
    /// Token created
    Mint,
    /// Ownership moved
    Transfer,
    /// Token destroyed
    Burn,
    /// Operator granted or revoked
    Approve,
}

impl TxOperation {
    /// Name stored in [`TxEvent::operation`].
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mint => "mint",
            Self::Transfer => "transfer",
            Self::Burn => "burn",
            Self::Approve => "approve",
        }
    }
}

/// Transaction log. The id of an event is its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TxHistory {
    events: Vec<TxEvent>,
}

impl TxHistory {
    /// Rebuild a log from stored events.
    #[must_use]
    pub fn from_events(events: Vec<TxEvent>) -> Self {
        Self { events }
    }

    /// Event `tx_id`, if logged.
    #[must_use]
    pub fn get(&self, tx_id: &Nat) -> Option<&TxEvent> {
        tx_id.to_usize().and_then(|index| self.events.get(index))
    }

    /// Number of logged events.
    #[must_use]
    pub fn count(&self) -> usize {
        self.events.len()
    }

    /// Log `operation` on `token` and return the new event id.
    pub fn register(
        &mut self,
        ctx: &CallContext,
        operation: TxOperation,
        token: &TokenMetadata,
    ) -> Nat {
        let id = Nat::from(self.events.len());
        self.events.push(TxEvent {
            time: ctx.time,
            caller: ctx.caller,
            operation: operation.as_str().to_string(),
            details: token.properties.clone(),
        });
        id
    }

    /// Events in id order.
    pub fn iter(&self) -> impl Iterator<Item = &TxEvent> {
        self.events.iter()
    }
}
