//! Authorization checks on registry state.
//!
//! `inspect_message` is the pre-dispatch guard: it decides whether a call
//! is accepted at all, before any argument reaches the operation. The
//! other checks are shared with the operations themselves.

use dip721_interface::{
    InterfaceFlavor, NftError, Operation, Principal, TokenIdentifier, TokenMetadata,
};

use crate::storage::RegistryState;

/// Authorization checks.
pub struct Inspect;

impl Inspect {
    /// Whether `caller` is a custodian.
    #[must_use]
    pub fn is_custodian(state: &RegistryState, caller: Principal) -> bool {
        state.configuration.is_custodian(caller)
    }

    /// Whether `caller` owns token `id`. False for unknown tokens.
    #[must_use]
    pub fn is_owner(state: &RegistryState, caller: Principal, id: &TokenIdentifier) -> bool {
        state
            .tokens
            .get(id)
            .map_or(false, |token| token.owner == Some(caller))
    }

    /// Token `id`, if `caller` is its owner or operator.
    ///
    /// # Errors
    ///
    /// [`NftError::TokenNotFound`] for an unknown token,
    /// [`NftError::UnauthorizedOwner`] if the token has no owner and
    /// [`NftError::UnauthorizedOperator`] if `caller` is neither.
    pub fn is_owner_or_operator<'a>(
        state: &'a RegistryState,
        caller: Principal,
        id: &TokenIdentifier,
    ) -> Result<&'a TokenMetadata, NftError> {
        let token = state.tokens.get(id)?;
        let owner = token.owner.ok_or(NftError::UnauthorizedOwner)?;

        if caller != owner && Some(caller) != token.operator {
            return Err(NftError::UnauthorizedOperator);
        }

        Ok(token)
    }

    /// Token `id`, if `caller` may move it.
    ///
    /// # Errors
    ///
    /// As [`Inspect::is_owner_or_operator`], plus [`NftError::ExistedNFT`]
    /// for a burned token.
    pub fn transfer_from<'a>(
        state: &'a RegistryState,
        caller: Principal,
        id: &TokenIdentifier,
    ) -> Result<&'a TokenMetadata, NftError> {
        let token = Self::is_owner_or_operator(state, caller, id)?;
        if token.is_burned {
            return Err(NftError::ExistedNFT);
        }

        Ok(token)
    }

    /// Whether a call to `operation` by `caller` is accepted.
    ///
    /// `token_identifier` is the token the call targets, if any. The
    /// owner pre-check on `approve` is part of the namespaced flavor only.
    #[must_use]
    pub fn inspect_message(
        state: &RegistryState,
        flavor: InterfaceFlavor,
        operation: Operation,
        caller: Principal,
        token_identifier: Option<&TokenIdentifier>,
    ) -> bool {
        let owns = |id: &TokenIdentifier| Self::is_owner(state, caller, id);
        let manages = |id: &TokenIdentifier| Self::is_owner_or_operator(state, caller, id).is_ok();

        match operation {
            Operation::Mint
            | Operation::SetLogo
            | Operation::SetName
            | Operation::SetSymbol
            | Operation::SetCustodians
            | Operation::SetTokenProperty => Self::is_custodian(state, caller),
            Operation::Burn | Operation::TransferFrom => token_identifier.map_or(false, manages),
            Operation::Approve if flavor == InterfaceFlavor::Namespaced => {
                token_identifier.map_or(false, owns)
            }
            _ => true,
        }
    }
}
