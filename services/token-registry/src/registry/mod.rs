//! Registry application: the `Dip721` operations over shared state.

pub mod clock;
pub mod inspect;

pub use clock::{Clock, ManualClock, SystemClock};
pub use inspect::Inspect;

use std::sync::Arc;

use async_trait::async_trait;
use dip721_interface::{
    CallResult, CanisterInitData, Dip721, GenericValue, InterfaceFlavor, Metadata, Nat, NftError,
    Operation, Principal, PropertyBag, Rejection, Stats, SupportedInterface, TokenIdentifier,
    TokenMetadata, TxEvent,
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_CYCLES;
use crate::metrics;
use crate::storage::{CallContext, RegistryState, Snapshot};

/// DIP721 token registry.
///
/// Cloning is cheap and every clone shares the same state. Each operation
/// takes the state lock once, so a mutation and its log entry are atomic
/// with respect to other calls.
#[derive(Clone)]
pub struct App {
    state: Arc<RwLock<RegistryState>>,
    clock: Arc<dyn Clock>,
    cycles: Nat,
}

impl App {
    /// Initialize a new registry from `init_data`.
    #[must_use]
    pub fn init(init_data: CanisterInitData, clock: Arc<dyn Clock>) -> Self {
        let state = RegistryState::new(init_data, clock.now());
        info!(
            custodians = state.configuration.custodians.len(),
            interfaces = ?state.configuration.supported_interfaces,
            "Registry initialized"
        );
        Self::with_state(state, clock)
    }

    /// Restore a registry from `snapshot` and run the upgrade hook.
    #[must_use]
    pub fn restore(snapshot: Snapshot, clock: Arc<dyn Clock>) -> Self {
        let mut state = RegistryState::from_snapshot(snapshot);
        state.configuration.set_upgraded_at(clock.now());
        info!(
            tokens = state.tokens.total_supply(),
            transactions = state.tx_history.count(),
            "Registry restored"
        );
        Self::with_state(state, clock)
    }

    fn with_state(state: RegistryState, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
            clock,
            cycles: Nat(DEFAULT_CYCLES),
        }
    }

    /// Set the resource balance reported by `cycles`.
    #[must_use]
    pub fn with_cycles(mut self, cycles: impl Into<Nat>) -> Self {
        self.cycles = cycles.into();
        self
    }

    /// Upgrade hook: record the upgrade time.
    pub async fn post_upgrade(&self) {
        let now = self.clock.now();
        self.state.write().await.configuration.set_upgraded_at(now);
        info!(upgraded_at = now, "Registry upgraded");
    }

    /// Capture the current state.
    pub async fn snapshot(&self) -> Snapshot {
        self.state.read().await.to_snapshot()
    }

    /// Shared state handle.
    #[must_use]
    pub fn state(&self) -> &Arc<RwLock<RegistryState>> {
        &self.state
    }

    /// Pre-dispatch guard. See [`Inspect::inspect_message`].
    pub async fn inspect_message(
        &self,
        flavor: InterfaceFlavor,
        operation: Operation,
        caller: Principal,
        token_identifier: Option<&TokenIdentifier>,
    ) -> bool {
        let state = self.state.read().await;
        Inspect::inspect_message(&state, flavor, operation, caller, token_identifier)
    }

    fn context(&self, caller: Principal) -> CallContext {
        CallContext::new(caller, self.clock.now())
    }

    async fn update_configuration<F>(&self, caller: Principal, what: &str, f: F) -> CallResult<()>
    where
        F: FnOnce(&mut RegistryState),
    {
        let mut state = self.state.write().await;
        if !Inspect::is_custodian(&state, caller) {
            warn!(caller = %caller, what, "Unauthorized configuration change");
            return Err(Rejection::unauthorized());
        }
        f(&mut *state);
        info!(caller = %caller, what, "Configuration updated");
        Ok(())
    }
}

fn record<T>(operation: &str, result: &Result<T, NftError>) {
    let status = if result.is_ok() { "ok" } else { "error" };
    metrics::record_nft_operation(operation, status);
}

fn owned_or<T>(items: Vec<T>, err: NftError) -> Result<Vec<T>, NftError> {
    if items.is_empty() {
        Err(err)
    } else {
        Ok(items)
    }
}

fn require(state: &RegistryState, interface: SupportedInterface) -> Result<(), NftError> {
    if state.configuration.has_interface(interface) {
        Ok(())
    } else {
        Err(NftError::not_implemented())
    }
}

fn approve_token(
    state: &mut RegistryState,
    ctx: &CallContext,
    operator: Principal,
    id: &TokenIdentifier,
) -> Result<Nat, NftError> {
    if !Inspect::is_owner(state, ctx.caller, id) {
        // unknown tokens report as such rather than as an ownership failure
        state.tokens.get(id)?;
        return Err(NftError::UnauthorizedOwner);
    }
    require(state, SupportedInterface::Approval)?;
    let RegistryState {
        tokens, tx_history, ..
    } = state;
    tokens.approve(tx_history, ctx, operator, id)
}

fn approve_all(
    state: &mut RegistryState,
    ctx: &CallContext,
    operator: Principal,
    approved: bool,
) -> Result<Nat, NftError> {
    require(state, SupportedInterface::Approval)?;
    let ids = owned_or(
        state.tokens.tokens_by_owner(ctx.caller),
        NftError::OwnerNotFound,
    )?;
    let RegistryState {
        tokens, tx_history, ..
    } = state;

    let mut last_tx_id = None;
    for id in &ids {
        let tx_id = if approved {
            tokens.approve(tx_history, ctx, operator, id)?
        } else {
            tokens.revoke_approval(tx_history, ctx, operator, id)?
        };
        last_tx_id = Some(tx_id);
    }
    last_tx_id.ok_or(NftError::TokenNotFound)
}

fn transfer_token(
    state: &mut RegistryState,
    ctx: &CallContext,
    from: Principal,
    to: Principal,
    id: &TokenIdentifier,
) -> Result<Nat, NftError> {
    let owner = Inspect::transfer_from(state, ctx.caller, id)?.owner;
    if owner != Some(from) {
        return Err(NftError::OwnerNotFound);
    }
    if owner == Some(to) {
        return Err(NftError::SelfTransfer);
    }
    let RegistryState {
        tokens, tx_history, ..
    } = state;
    tokens.transfer(tx_history, ctx, id, to)
}

fn burn_token(
    state: &mut RegistryState,
    ctx: &CallContext,
    id: &TokenIdentifier,
) -> Result<Nat, NftError> {
    Inspect::is_owner_or_operator(state, ctx.caller, id)?;
    require(state, SupportedInterface::Burn)?;
    let RegistryState {
        tokens, tx_history, ..
    } = state;
    tokens.burn(tx_history, ctx, id)
}

#[async_trait]
impl Dip721 for App {
    async fn metadata(&self) -> Metadata {
        self.state.read().await.configuration.metadata()
    }

    async fn stats(&self) -> Stats {
        let state = self.state.read().await;
        Stats {
            cycles: self.cycles,
            total_supply: state.tokens.total_supply().into(),
            total_transactions: state.tx_history.count().into(),
            total_unique_holders: state.tokens.total_unique_holders().into(),
        }
    }

    async fn logo(&self) -> Option<String> {
        self.state.read().await.configuration.logo.clone()
    }

    async fn set_logo(&self, caller: Principal, logo: String) -> CallResult<()> {
        self.update_configuration(caller, "logo", |state| {
            state.configuration.logo = Some(logo);
        })
        .await
    }

    async fn name(&self) -> Option<String> {
        self.state.read().await.configuration.name.clone()
    }

    async fn set_name(&self, caller: Principal, name: String) -> CallResult<()> {
        self.update_configuration(caller, "name", |state| {
            state.configuration.name = Some(name);
        })
        .await
    }

    async fn symbol(&self) -> Option<String> {
        self.state.read().await.configuration.symbol.clone()
    }

    async fn set_symbol(&self, caller: Principal, symbol: String) -> CallResult<()> {
        self.update_configuration(caller, "symbol", |state| {
            state.configuration.symbol = Some(symbol);
        })
        .await
    }

    async fn custodians(&self) -> Vec<Principal> {
        self.state.read().await.configuration.custodians.clone()
    }

    async fn set_custodians(
        &self,
        caller: Principal,
        custodians: Vec<Principal>,
    ) -> CallResult<()> {
        self.update_configuration(caller, "custodians", |state| {
            state.configuration.set_custodians(custodians);
        })
        .await
    }

    async fn cycles(&self) -> Nat {
        self.cycles
    }

    async fn total_unique_holders(&self) -> Nat {
        self.state.read().await.tokens.total_unique_holders().into()
    }

    async fn token_metadata(
        &self,
        token_identifier: TokenIdentifier,
    ) -> Result<TokenMetadata, NftError> {
        let state = self.state.read().await;
        state.tokens.get(&token_identifier).cloned()
    }

    async fn balance_of(&self, owner: Principal) -> Result<Nat, NftError> {
        let state = self.state.read().await;
        owned_or(state.tokens.tokens_by_owner(owner), NftError::OwnerNotFound)
            .map(|tokens| tokens.len().into())
    }

    async fn owner_of(
        &self,
        token_identifier: TokenIdentifier,
    ) -> Result<Option<Principal>, NftError> {
        let state = self.state.read().await;
        let token = state.tokens.get(&token_identifier)?;
        Ok(token.owner)
    }

    async fn owner_token_identifiers(
        &self,
        owner: Principal,
    ) -> Result<Vec<TokenIdentifier>, NftError> {
        let state = self.state.read().await;
        owned_or(state.tokens.tokens_by_owner(owner), NftError::OwnerNotFound)
    }

    async fn owner_token_metadata(&self, owner: Principal) -> Result<Vec<TokenMetadata>, NftError> {
        let state = self.state.read().await;
        let ids = owned_or(state.tokens.tokens_by_owner(owner), NftError::OwnerNotFound)?;
        ids.iter().map(|id| state.tokens.get(id).cloned()).collect()
    }

    async fn operator_of(
        &self,
        token_identifier: TokenIdentifier,
    ) -> Result<Option<Principal>, NftError> {
        let state = self.state.read().await;
        let token = state.tokens.get(&token_identifier)?;
        Ok(token.operator)
    }

    async fn operator_token_identifiers(
        &self,
        operator: Principal,
    ) -> Result<Vec<TokenIdentifier>, NftError> {
        let state = self.state.read().await;
        owned_or(
            state.tokens.tokens_by_operator(operator),
            NftError::OperatorNotFound,
        )
    }

    async fn operator_token_metadata(
        &self,
        operator: Principal,
    ) -> Result<Vec<TokenMetadata>, NftError> {
        let state = self.state.read().await;
        let ids = owned_or(
            state.tokens.tokens_by_operator(operator),
            NftError::OperatorNotFound,
        )?;
        ids.iter().map(|id| state.tokens.get(id).cloned()).collect()
    }

    async fn supported_interfaces(&self) -> Vec<SupportedInterface> {
        self.state
            .read()
            .await
            .configuration
            .supported_interfaces
            .clone()
    }

    async fn total_supply(&self) -> Nat {
        self.state.read().await.tokens.total_supply().into()
    }

    async fn approve(
        &self,
        caller: Principal,
        operator: Principal,
        token_identifier: TokenIdentifier,
    ) -> Result<Nat, NftError> {
        let ctx = self.context(caller);
        let mut state = self.state.write().await;

        let result = approve_token(&mut state, &ctx, operator, &token_identifier);

        record("approve", &result);
        if let Ok(tx_id) = &result {
            info!(
                caller = %caller,
                operator = %operator,
                token_id = %token_identifier,
                tx_id = %tx_id,
                "Token approved"
            );
        }
        result
    }

    async fn set_approval_for_all(
        &self,
        caller: Principal,
        operator: Principal,
        approved: bool,
    ) -> Result<Nat, NftError> {
        let ctx = self.context(caller);
        let mut state = self.state.write().await;

        let result = approve_all(&mut state, &ctx, operator, approved);

        record("set_approval_for_all", &result);
        if let Ok(tx_id) = &result {
            info!(
                caller = %caller,
                operator = %operator,
                approved,
                tx_id = %tx_id,
                "Approval for all updated"
            );
        }
        result
    }

    async fn is_approved_for_all(
        &self,
        owner: Principal,
        operator: Principal,
    ) -> Result<bool, NftError> {
        let state = self.state.read().await;
        require(&state, SupportedInterface::Approval)?;
        let ids = owned_or(state.tokens.tokens_by_owner(owner), NftError::OwnerNotFound)?;
        for id in &ids {
            if state.tokens.get(id)?.operator != Some(operator) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn transfer(
        &self,
        caller: Principal,
        to: Principal,
        token_identifier: TokenIdentifier,
    ) -> Result<Nat, NftError> {
        self.transfer_from(caller, caller, to, token_identifier)
            .await
    }

    async fn transfer_from(
        &self,
        caller: Principal,
        from: Principal,
        to: Principal,
        token_identifier: TokenIdentifier,
    ) -> Result<Nat, NftError> {
        let ctx = self.context(caller);
        let mut state = self.state.write().await;

        let result = transfer_token(&mut state, &ctx, from, to, &token_identifier);

        record("transfer", &result);
        match &result {
            Ok(tx_id) => {
                info!(
                    caller = %caller,
                    from = %from,
                    to = %to,
                    token_id = %token_identifier,
                    tx_id = %tx_id,
                    "Token transferred"
                );
            }
            Err(e) => {
                debug!(
                    caller = %caller,
                    token_id = %token_identifier,
                    error = %e,
                    "Transfer refused"
                );
            }
        }
        result
    }

    async fn mint(
        &self,
        caller: Principal,
        to: Principal,
        token_identifier: TokenIdentifier,
        properties: PropertyBag,
    ) -> CallResult<Result<Nat, NftError>> {
        let ctx = self.context(caller);
        let mut state = self.state.write().await;

        if !Inspect::is_custodian(&state, caller) {
            warn!(caller = %caller, token_id = %token_identifier, "Unauthorized mint");
            return Err(Rejection::unauthorized());
        }

        let result = if state.configuration.has_interface(SupportedInterface::Mint) {
            let RegistryState {
                tokens, tx_history, ..
            } = &mut *state;
            tokens.mint(tx_history, &ctx, to, token_identifier, properties)
        } else {
            Err(NftError::not_implemented())
        };

        record("mint", &result);
        if let Ok(tx_id) = &result {
            info!(
                caller = %caller,
                to = %to,
                token_id = %token_identifier,
                tx_id = %tx_id,
                "Token minted"
            );
        }
        Ok(result)
    }

    async fn burn(
        &self,
        caller: Principal,
        token_identifier: TokenIdentifier,
    ) -> Result<Nat, NftError> {
        let ctx = self.context(caller);
        let mut state = self.state.write().await;

        let result = burn_token(&mut state, &ctx, &token_identifier);

        record("burn", &result);
        if let Ok(tx_id) = &result {
            info!(caller = %caller, token_id = %token_identifier, tx_id = %tx_id, "Token burned");
        }
        result
    }

    async fn transaction(&self, tx_id: Nat) -> Result<TxEvent, NftError> {
        let state = self.state.read().await;
        require(&state, SupportedInterface::TransactionHistory)?;
        let event = state.tx_history.get(&tx_id).ok_or(NftError::TxNotFound)?;
        Ok(event.clone())
    }

    async fn total_transactions(&self) -> Nat {
        self.state.read().await.tx_history.count().into()
    }

    async fn set_token_property(
        &self,
        caller: Principal,
        token_identifier: TokenIdentifier,
        key: String,
        value: GenericValue,
    ) -> CallResult<Result<(), NftError>> {
        let mut state = self.state.write().await;

        if !Inspect::is_custodian(&state, caller) {
            warn!(caller = %caller, token_id = %token_identifier, "Unauthorized property change");
            return Err(Rejection::unauthorized());
        }

        debug!(
            caller = %caller,
            token_id = %token_identifier,
            key = %key,
            "Setting token property"
        );
        Ok(state
            .tokens
            .set_token_property(&token_identifier, key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::fixtures::{
        alice, bob, custodian, init_data, mallory, mock_token, mock_token_with, sample_properties,
    };

    fn app() -> (App, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000));
        (App::init(init_data(), clock.clone()), clock)
    }

    fn app_with_interfaces(interfaces: Vec<SupportedInterface>) -> App {
        let mut data = init_data();
        data.supported_interfaces = interfaces;
        App::init(data, Arc::new(ManualClock::new(0)))
    }

    async fn store(app: &App, token: TokenMetadata) {
        app.state().write().await.tokens.insert(token);
    }

    fn id(n: u64) -> Nat {
        Nat::from(n)
    }

    #[tokio::test]
    async fn test_should_init_registry() {
        let (app, _) = app();

        assert_eq!(app.custodians().await, vec![custodian()]);
        assert_eq!(app.logo().await.as_deref(), Some("logo"));
        assert_eq!(app.name().await.as_deref(), Some("nft"));
        assert_eq!(app.symbol().await.as_deref(), Some("NFT"));
        assert_eq!(
            app.supported_interfaces().await,
            SupportedInterface::ALL.to_vec()
        );
    }

    #[tokio::test]
    async fn test_should_set_upgrade_time_on_post_upgrade() {
        let (app, clock) = app();
        let metadata = app.metadata().await;
        assert_eq!(metadata.upgraded_at, metadata.created_at);

        clock.advance(100);
        app.post_upgrade().await;

        let metadata = app.metadata().await;
        assert_eq!(metadata.upgraded_at, metadata.created_at + 100);
    }

    #[tokio::test]
    async fn test_should_restore_from_snapshot() {
        let (app, clock) = app();
        app.mint(custodian(), alice(), id(1), vec![])
            .await
            .unwrap()
            .unwrap();
        let snapshot = app.snapshot().await;

        clock.advance(50);
        let restored = App::restore(snapshot, clock.clone());

        assert_eq!(restored.owner_of(id(1)).await, Ok(Some(alice())));
        assert_eq!(restored.total_transactions().await, 1_u64);
        assert_eq!(restored.metadata().await.upgraded_at, 1_050);
        assert_eq!(restored.metadata().await.created_at, 1_000);
    }

    #[tokio::test]
    async fn test_should_get_stats() {
        let (app, _) = app();
        let app = app.with_cycles(42_u64);
        let stats = app.stats().await;

        assert_eq!(stats.cycles, 42_u64);
        assert_eq!(stats.total_supply, 0_u64);
        assert_eq!(stats.total_transactions, 0_u64);
        assert_eq!(stats.total_unique_holders, 0_u64);
        assert_eq!(app.cycles().await, 42_u64);
    }

    #[tokio::test]
    async fn test_should_set_configuration_as_custodian_only() {
        let (app, _) = app();

        app.set_logo(custodian(), "new logo".to_string())
            .await
            .unwrap();
        app.set_name(custodian(), "name".to_string()).await.unwrap();
        app.set_symbol(custodian(), "SYM".to_string())
            .await
            .unwrap();
        assert_eq!(app.logo().await.as_deref(), Some("new logo"));
        assert_eq!(app.name().await.as_deref(), Some("name"));
        assert_eq!(app.symbol().await.as_deref(), Some("SYM"));

        assert_eq!(
            app.set_name(alice(), "stolen".to_string()).await,
            Err(Rejection::unauthorized())
        );
        assert_eq!(app.name().await.as_deref(), Some("name"));

        app.set_custodians(custodian(), vec![custodian(), alice()])
            .await
            .unwrap();
        assert_eq!(app.custodians().await.len(), 2);
        app.set_symbol(alice(), "ALC".to_string()).await.unwrap();
    }

    #[tokio::test]
    async fn test_should_query_owner_views() {
        let (app, _) = app();
        store(&app, mock_token(1, alice())).await;
        store(&app, mock_token(2, alice())).await;

        assert_eq!(app.balance_of(alice()).await, Ok(Nat::from(2_u64)));
        assert_eq!(app.balance_of(bob()).await, Err(NftError::OwnerNotFound));
        assert_eq!(app.owner_of(id(1)).await, Ok(Some(alice())));
        assert_eq!(app.owner_of(id(5)).await, Err(NftError::TokenNotFound));
        assert_eq!(
            app.owner_token_identifiers(alice()).await,
            Ok(vec![id(1), id(2)])
        );

        let metadata = app.owner_token_metadata(alice()).await.unwrap();
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata[1].token_identifier, id(2));
        assert_eq!(
            app.owner_token_metadata(bob()).await,
            Err(NftError::OwnerNotFound)
        );
        assert_eq!(app.total_unique_holders().await, 1_u64);
        assert!(app.token_metadata(id(5)).await.is_err());
    }

    #[tokio::test]
    async fn test_should_query_operator_views() {
        let (app, _) = app();
        store(&app, mock_token(1, alice())).await;
        let operated = mock_token_with(2, alice(), |t| t.operator = Some(bob()));
        store(&app, operated).await;

        assert_eq!(app.operator_of(id(1)).await, Ok(None));
        assert_eq!(app.operator_of(id(2)).await, Ok(Some(bob())));
        assert_eq!(app.operator_of(id(5)).await, Err(NftError::TokenNotFound));
        assert_eq!(app.operator_token_identifiers(bob()).await, Ok(vec![id(2)]));
        assert_eq!(
            app.operator_token_identifiers(alice()).await,
            Err(NftError::OperatorNotFound)
        );

        let metadata = app.operator_token_metadata(bob()).await.unwrap();
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata[0].owner, Some(alice()));
        assert_eq!(
            app.operator_token_metadata(mallory()).await,
            Err(NftError::OperatorNotFound)
        );
    }

    #[tokio::test]
    async fn test_should_mint() {
        let (app, _) = app();

        let tx_id = app
            .mint(custodian(), alice(), id(1), sample_properties())
            .await
            .unwrap();
        assert_eq!(tx_id, Ok(Nat::from(0_u64)));
        assert_eq!(app.total_supply().await, 1_u64);

        let event = app.transaction(Nat::from(0_u64)).await.unwrap();
        assert_eq!(event.operation, "mint");
        assert_eq!(event.caller, custodian());
        assert_eq!(event.time, 1_000);
        assert_eq!(event.details, sample_properties());

        assert_eq!(
            app.mint(custodian(), bob(), id(1), vec![]).await,
            Ok(Err(NftError::ExistedNFT))
        );
        assert_eq!(
            app.mint(alice(), alice(), id(2), vec![]).await,
            Err(Rejection::unauthorized())
        );
    }

    #[tokio::test]
    async fn test_should_approve() {
        let (app, _) = app();
        store(&app, mock_token(1, alice())).await;

        assert_eq!(
            app.approve(alice(), bob(), id(1)).await,
            Ok(Nat::from(0_u64))
        );
        assert_eq!(app.operator_of(id(1)).await, Ok(Some(bob())));

        assert_eq!(
            app.approve(bob(), mallory(), id(1)).await,
            Err(NftError::UnauthorizedOwner)
        );
        // owners may name themselves as operator
        assert_eq!(
            app.approve(alice(), alice(), id(1)).await,
            Ok(Nat::from(1_u64))
        );
        assert_eq!(app.operator_of(id(1)).await, Ok(Some(alice())));
        assert_eq!(
            app.approve(alice(), bob(), id(9)).await,
            Err(NftError::TokenNotFound)
        );
    }

    #[tokio::test]
    async fn test_should_set_approval_for_all() {
        let (app, _) = app();
        store(&app, mock_token(1, alice())).await;
        store(&app, mock_token(2, alice())).await;

        assert_eq!(
            app.set_approval_for_all(alice(), bob(), true).await,
            Ok(Nat::from(1_u64))
        );
        assert_eq!(app.is_approved_for_all(alice(), bob()).await, Ok(true));
        assert_eq!(app.is_approved_for_all(alice(), mallory()).await, Ok(false));

        assert_eq!(
            app.set_approval_for_all(alice(), bob(), false).await,
            Ok(Nat::from(3_u64))
        );
        assert_eq!(app.is_approved_for_all(alice(), bob()).await, Ok(false));
        assert_eq!(app.operator_of(id(1)).await, Ok(None));

        assert_eq!(
            app.set_approval_for_all(bob(), alice(), true).await,
            Err(NftError::OwnerNotFound)
        );
        assert_eq!(
            app.is_approved_for_all(bob(), alice()).await,
            Err(NftError::OwnerNotFound)
        );
    }

    #[tokio::test]
    async fn test_should_transfer() {
        let (app, clock) = app();
        store(&app, mock_token(1, alice())).await;
        clock.advance(5);

        assert_eq!(
            app.transfer(alice(), bob(), id(1)).await,
            Ok(Nat::from(0_u64))
        );
        let token = app.token_metadata(id(1)).await.unwrap();
        assert_eq!(token.owner, Some(bob()));
        assert_eq!(token.transferred_at, Some(1_005));
        assert_eq!(token.transferred_by, Some(alice()));

        assert_eq!(
            app.transfer(alice(), bob(), id(1)).await,
            Err(NftError::UnauthorizedOperator)
        );
        assert_eq!(
            app.transfer(bob(), bob(), id(1)).await,
            Err(NftError::SelfTransfer)
        );
        assert_eq!(
            app.transfer(bob(), alice(), id(9)).await,
            Err(NftError::TokenNotFound)
        );
    }

    #[tokio::test]
    async fn test_should_transfer_from_as_operator() {
        let (app, _) = app();
        store(&app, mock_token(1, alice())).await;
        app.approve(alice(), bob(), id(1)).await.unwrap();

        assert_eq!(
            app.transfer_from(bob(), mallory(), bob(), id(1)).await,
            Err(NftError::OwnerNotFound)
        );
        assert_eq!(
            app.transfer_from(bob(), alice(), bob(), id(1)).await,
            Ok(Nat::from(1_u64))
        );
        // operator is cleared by the transfer
        assert_eq!(app.operator_of(id(1)).await, Ok(None));
        assert_eq!(app.balance_of(bob()).await, Ok(Nat::from(1_u64)));
    }

    #[tokio::test]
    async fn test_should_burn() {
        let (app, _) = app();
        store(&app, mock_token(1, alice())).await;
        store(&app, mock_token(2, alice())).await;

        assert_eq!(
            app.burn(bob(), id(1)).await,
            Err(NftError::UnauthorizedOperator)
        );
        assert_eq!(app.burn(alice(), id(1)).await, Ok(Nat::from(0_u64)));

        let token = app.token_metadata(id(1)).await.unwrap();
        assert!(token.is_burned);
        assert_eq!(token.owner, None);
        assert_eq!(token.burned_by, Some(alice()));

        assert_eq!(
            app.burn(alice(), id(1)).await,
            Err(NftError::UnauthorizedOwner)
        );
        assert_eq!(app.total_supply().await, 2_u64);
        assert_eq!(app.balance_of(alice()).await, Ok(Nat::from(1_u64)));
    }

    #[tokio::test]
    async fn test_should_get_transactions() {
        let (app, _) = app();
        assert_eq!(
            app.transaction(Nat::from(0_u64)).await,
            Err(NftError::TxNotFound)
        );

        app.mint(custodian(), alice(), id(1), vec![])
            .await
            .unwrap()
            .unwrap();
        app.transfer(alice(), bob(), id(1)).await.unwrap();
        app.burn(bob(), id(1)).await.unwrap();

        assert_eq!(app.total_transactions().await, 3_u64);
        let mut operations = Vec::new();
        for n in 0_u64..3 {
            operations.push(app.transaction(Nat::from(n)).await.unwrap().operation);
        }
        assert_eq!(operations, vec!["mint", "transfer", "burn"]);
    }

    #[tokio::test]
    async fn test_should_gate_disabled_interfaces() {
        let app = app_with_interfaces(vec![]);
        store(&app, mock_token(1, alice())).await;

        assert_eq!(
            app.approve(alice(), bob(), id(1)).await,
            Err(NftError::not_implemented())
        );
        assert_eq!(
            app.set_approval_for_all(alice(), bob(), true).await,
            Err(NftError::not_implemented())
        );
        assert_eq!(
            app.is_approved_for_all(alice(), bob()).await,
            Err(NftError::not_implemented())
        );
        assert_eq!(
            app.mint(custodian(), alice(), id(2), vec![]).await,
            Ok(Err(NftError::not_implemented()))
        );
        assert_eq!(
            app.burn(alice(), id(1)).await,
            Err(NftError::not_implemented())
        );
        assert_eq!(
            app.transaction(Nat::from(0_u64)).await,
            Err(NftError::not_implemented())
        );
    }

    #[tokio::test]
    async fn test_should_set_token_property() {
        let (app, _) = app();
        store(&app, mock_token(1, alice())).await;

        let value = GenericValue::Int8Content(-1);

        assert_eq!(
            app.set_token_property(custodian(), id(1), "k".to_string(), value.clone())
                .await,
            Ok(Ok(()))
        );
        assert_eq!(
            app.token_metadata(id(1)).await.unwrap().properties,
            vec![("k".to_string(), value.clone())]
        );
        assert_eq!(
            app.set_token_property(custodian(), id(9), "k".to_string(), value.clone())
                .await,
            Ok(Err(NftError::TokenNotFound))
        );
        assert_eq!(
            app.set_token_property(alice(), id(1), "k".to_string(), value)
                .await,
            Err(Rejection::unauthorized())
        );
    }
}
