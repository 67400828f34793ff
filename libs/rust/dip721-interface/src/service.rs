//! The registry's call surface as a Rust trait.

use async_trait::async_trait;
use thiserror::Error;

use crate::nat::Nat;
use crate::principal::Principal;
use crate::types::{
    GenericValue, Metadata, NftError, PropertyBag, Stats, SupportedInterface, TokenIdentifier,
    TokenMetadata, TxEvent,
};

/// A call refused before it produced a reply.
///
/// Distinct from [`NftError`], which is a reply. Custodian-only operations
/// reject unauthorized callers instead of replying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("call rejected: {reason}")]
pub struct Rejection {
    /// Human-readable reason
    pub reason: String,
}

impl Rejection {
    /// Rejection for a caller lacking rights.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self {
            reason: "Unauthorized".to_string(),
        }
    }
}

/// Outcome of an operation that may be rejected.
pub type CallResult<T> = Result<T, Rejection>;

/// Operations of a DIP721 token registry.
///
/// `caller` is the authenticated principal issuing the call.
#[async_trait]
pub trait Dip721: Send + Sync {
    /// Registry metadata.
    async fn metadata(&self) -> Metadata;

    /// Registry aggregates.
    async fn stats(&self) -> Stats;

    /// Display image.
    async fn logo(&self) -> Option<String>;

    /// Replace the display image. Custodians only.
    async fn set_logo(&self, caller: Principal, logo: String) -> CallResult<()>;

    /// Collection name.
    async fn name(&self) -> Option<String>;

    /// Replace the collection name. Custodians only.
    async fn set_name(&self, caller: Principal, name: String) -> CallResult<()>;

    /// Collection symbol.
    async fn symbol(&self) -> Option<String>;

    /// Replace the collection symbol. Custodians only.
    async fn set_symbol(&self, caller: Principal, symbol: String) -> CallResult<()>;

    /// Current custodians.
    async fn custodians(&self) -> Vec<Principal>;

    /// Replace the custodians. Custodians only.
    async fn set_custodians(&self, caller: Principal, custodians: Vec<Principal>) -> CallResult<()>;

    /// Resource balance.
    async fn cycles(&self) -> Nat;

    /// Number of distinct current owners.
    async fn total_unique_holders(&self) -> Nat;

    /// Metadata of one token.
    async fn token_metadata(
        &self,
        token_identifier: TokenIdentifier,
    ) -> Result<TokenMetadata, NftError>;

    /// Number of live tokens owned by `owner`.
    async fn balance_of(&self, owner: Principal) -> Result<Nat, NftError>;

    /// Owner of a token.
    async fn owner_of(
        &self,
        token_identifier: TokenIdentifier,
    ) -> Result<Option<Principal>, NftError>;

    /// Identifiers of the live tokens owned by `owner`.
    async fn owner_token_identifiers(
        &self,
        owner: Principal,
    ) -> Result<Vec<TokenIdentifier>, NftError>;

    /// Metadata of the live tokens owned by `owner`.
    async fn owner_token_metadata(&self, owner: Principal) -> Result<Vec<TokenMetadata>, NftError>;

    /// Operator of a token.
    async fn operator_of(
        &self,
        token_identifier: TokenIdentifier,
    ) -> Result<Option<Principal>, NftError>;

    /// Identifiers of the tokens `operator` may manage.
    async fn operator_token_identifiers(
        &self,
        operator: Principal,
    ) -> Result<Vec<TokenIdentifier>, NftError>;

    /// Metadata of the tokens `operator` may manage.
    async fn operator_token_metadata(
        &self,
        operator: Principal,
    ) -> Result<Vec<TokenMetadata>, NftError>;

    /// Enabled capabilities.
    async fn supported_interfaces(&self) -> Vec<SupportedInterface>;

    /// Number of tokens ever minted.
    async fn total_supply(&self) -> Nat;

    /// Let `operator` manage one of the caller's tokens.
    async fn approve(
        &self,
        caller: Principal,
        operator: Principal,
        token_identifier: TokenIdentifier,
    ) -> Result<Nat, NftError>;

    /// Grant or revoke `operator` on every token of the caller.
    async fn set_approval_for_all(
        &self,
        caller: Principal,
        operator: Principal,
        approved: bool,
    ) -> Result<Nat, NftError>;

    /// Whether `operator` manages every token of `owner`.
    async fn is_approved_for_all(
        &self,
        owner: Principal,
        operator: Principal,
    ) -> Result<bool, NftError>;

    /// Move one of the caller's tokens to `to`.
    async fn transfer(
        &self,
        caller: Principal,
        to: Principal,
        token_identifier: TokenIdentifier,
    ) -> Result<Nat, NftError>;

    /// Move a token from `from` to `to` on behalf of its owner.
    async fn transfer_from(
        &self,
        caller: Principal,
        from: Principal,
        to: Principal,
        token_identifier: TokenIdentifier,
    ) -> Result<Nat, NftError>;

    /// Create a token owned by `to`. Custodians only.
    async fn mint(
        &self,
        caller: Principal,
        to: Principal,
        token_identifier: TokenIdentifier,
        properties: PropertyBag,
    ) -> CallResult<Result<Nat, NftError>>;

    /// Destroy a token. Burned tokens still count towards total supply.
    async fn burn(
        &self,
        caller: Principal,
        token_identifier: TokenIdentifier,
    ) -> Result<Nat, NftError>;

    /// Transaction log entry `tx_id`.
    async fn transaction(&self, tx_id: Nat) -> Result<TxEvent, NftError>;

    /// Length of the transaction log.
    async fn total_transactions(&self) -> Nat;

    /// Set or replace one property of a token. Custodians only.
    async fn set_token_property(
        &self,
        caller: Principal,
        token_identifier: TokenIdentifier,
        key: String,
        value: GenericValue,
    ) -> CallResult<Result<(), NftError>>;
}
