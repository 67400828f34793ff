//! Registry state and its persistence.

pub mod configuration;
pub mod snapshot;
pub mod tokens;
pub mod tx_history;

pub use configuration::Configuration;
pub use snapshot::Snapshot;
pub use tokens::TokensStorage;
pub use tx_history::{TxHistory, TxOperation};

use dip721_interface::{CanisterInitData, Principal};

/// Who is calling and when. Stamped onto tokens and log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Calling principal
    pub caller: Principal,
    /// Call time (ns)
    pub time: u64,
}

impl CallContext {
    /// Create a context.
    #[must_use]
    pub const fn new(caller: Principal, time: u64) -> Self {
        Self { caller, time }
    }
}

/// Complete registry state.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryState {
    /// Registry settings
    pub configuration: Configuration,
    /// Token table
    pub tokens: TokensStorage,
    /// Transaction log
    pub tx_history: TxHistory,
}

impl RegistryState {
    /// State of a freshly initialized registry.
    #[must_use]
    pub fn new(init_data: CanisterInitData, now: u64) -> Self {
        Self {
            configuration: Configuration::new(init_data, now),
            tokens: TokensStorage::default(),
            tx_history: TxHistory::default(),
        }
    }

    /// Rebuild state from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            configuration: snapshot.configuration,
            tokens: TokensStorage::from_tokens(snapshot.tokens),
            tx_history: TxHistory::from_events(snapshot.transactions),
        }
    }

    /// Capture the state.
    #[must_use]
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot::new(
            self.configuration.clone(),
            self.tokens.iter().cloned().collect(),
            self.tx_history.iter().cloned().collect(),
        )
    }
}
