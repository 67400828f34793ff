//! Token table.

use std::collections::{BTreeMap, HashSet};

use dip721_interface::{
    GenericValue, Nat, NftError, Principal, PropertyBag, TokenIdentifier, TokenMetadata,
};

use super::tx_history::{TxHistory, TxOperation};
use super::CallContext;

/// Tokens by identifier. Burned tokens stay in the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokensStorage {
    tokens: BTreeMap<TokenIdentifier, TokenMetadata>,
}

impl TokensStorage {
    /// Rebuild the table from stored tokens.
    #[must_use]
    pub fn from_tokens(tokens: impl IntoIterator<Item = TokenMetadata>) -> Self {
        Self {
            tokens: tokens
                .into_iter()
                .map(|token| (token.token_identifier, token))
                .collect(),
        }
    }

    /// Token `id`.
    ///
    /// # Errors
    ///
    /// Returns [`NftError::TokenNotFound`] if no such token was minted.
    pub fn get(&self, id: &TokenIdentifier) -> Result<&TokenMetadata, NftError> {
        self.tokens.get(id).ok_or(NftError::TokenNotFound)
    }

    fn get_mut(&mut self, id: &TokenIdentifier) -> Result<&mut TokenMetadata, NftError> {
        self.tokens.get_mut(id).ok_or(NftError::TokenNotFound)
    }

    /// Insert or replace a token as-is.
    pub fn insert(&mut self, token: TokenMetadata) {
        self.tokens.insert(token.token_identifier, token);
    }

    /// Tokens in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &TokenMetadata> {
        self.tokens.values()
    }

    /// Number of tokens ever minted.
    #[must_use]
    pub fn total_supply(&self) -> usize {
        self.tokens.len()
    }

    /// Number of distinct current owners.
    #[must_use]
    pub fn total_unique_holders(&self) -> usize {
        self.tokens
            .values()
            .filter_map(|token| token.owner)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Live tokens owned by `owner`.
    #[must_use]
    pub fn tokens_by_owner(&self, owner: Principal) -> Vec<TokenIdentifier> {
        self.tokens
            .values()
            .filter(|token| token.owner == Some(owner) && !token.is_burned)
            .map(|token| token.token_identifier)
            .collect()
    }

    /// Tokens `operator` may manage.
    #[must_use]
    pub fn tokens_by_operator(&self, operator: Principal) -> Vec<TokenIdentifier> {
        self.tokens
            .values()
            .filter(|token| token.operator == Some(operator))
            .map(|token| token.token_identifier)
            .collect()
    }

    /// Set property `key` of token `id`, replacing it in place if present.
    ///
    /// # Errors
    ///
    /// Returns [`NftError::TokenNotFound`] for an unknown token.
    pub fn set_token_property(
        &mut self,
        id: &TokenIdentifier,
        key: String,
        value: GenericValue,
    ) -> Result<(), NftError> {
        let token = self.get_mut(id)?;
        match token.properties.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => token.properties.push((key, value)),
        }
        Ok(())
    }

    /// Create token `id` owned by `to`.
    ///
    /// # Errors
    ///
    /// Returns [`NftError::ExistedNFT`] if the identifier was ever minted.
    pub fn mint(
        &mut self,
        history: &mut TxHistory,
        ctx: &CallContext,
        to: Principal,
        id: TokenIdentifier,
        properties: PropertyBag,
    ) -> Result<Nat, NftError> {
        if self.tokens.contains_key(&id) {
            return Err(NftError::ExistedNFT);
        }

        let token = TokenMetadata {
            token_identifier: id,
            owner: Some(to),
            operator: None,
            is_burned: false,
            properties,
            minted_at: ctx.time,
            minted_by: ctx.caller,
            transferred_at: None,
            transferred_by: None,
            approved_at: None,
            approved_by: None,
            burned_at: None,
            burned_by: None,
        };
        let tx_id = history.register(ctx, TxOperation::Mint, &token);
        self.tokens.insert(id, token);

        Ok(tx_id)
    }

    /// Move token `id` to `to`, clearing its operator.
    ///
    /// # Errors
    ///
    /// Returns [`NftError::TokenNotFound`] or, for a burned token,
    /// [`NftError::ExistedNFT`].
    pub fn transfer(
        &mut self,
        history: &mut TxHistory,
        ctx: &CallContext,
        id: &TokenIdentifier,
        to: Principal,
    ) -> Result<Nat, NftError> {
        let token = self.get_mut(id)?;
        if token.is_burned {
            return Err(NftError::ExistedNFT);
        }
        token.owner = Some(to);
        token.operator = None;
        token.transferred_at = Some(ctx.time);
        token.transferred_by = Some(ctx.caller);

        Ok(history.register(ctx, TxOperation::Transfer, token))
    }

    /// Burn token `id`.
    ///
    /// # Errors
    ///
    /// Returns [`NftError::TokenNotFound`] or, if already burned,
    /// [`NftError::ExistedNFT`].
    pub fn burn(
        &mut self,
        history: &mut TxHistory,
        ctx: &CallContext,
        id: &TokenIdentifier,
    ) -> Result<Nat, NftError> {
        let token = self.get_mut(id)?;
        if token.is_burned {
            return Err(NftError::ExistedNFT);
        }
        token.is_burned = true;
        token.owner = None;
        token.operator = None;
        token.burned_at = Some(ctx.time);
        token.burned_by = Some(ctx.caller);

        Ok(history.register(ctx, TxOperation::Burn, token))
    }

    /// Make `operator` the operator of token `id`.
    ///
    /// # Errors
    ///
    /// Returns [`NftError::TokenNotFound`] for an unknown token.
    pub fn approve(
        &mut self,
        history: &mut TxHistory,
        ctx: &CallContext,
        operator: Principal,
        id: &TokenIdentifier,
    ) -> Result<Nat, NftError> {
        let token = self.get_mut(id)?;
        token.operator = Some(operator);
        token.approved_at = Some(ctx.time);
        token.approved_by = Some(ctx.caller);

        Ok(history.register(ctx, TxOperation::Approve, token))
    }

    /// Remove `operator` from token `id` if it is the current operator.
    ///
    /// The revocation is logged either way.
    ///
    /// # Errors
    ///
    /// Returns [`NftError::TokenNotFound`] for an unknown token.
    pub fn revoke_approval(
        &mut self,
        history: &mut TxHistory,
        ctx: &CallContext,
        operator: Principal,
        id: &TokenIdentifier,
    ) -> Result<Nat, NftError> {
        let token = self.get_mut(id)?;
        if token.operator == Some(operator) {
            token.operator = None;
            token.approved_at = None;
            token.approved_by = None;
        }

        Ok(history.register(ctx, TxOperation::Approve, token))
    }
}
