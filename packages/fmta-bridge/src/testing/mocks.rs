//! Mock Collaborators
//!
//! `MockBridge` and `MockToken` keep contract state in memory, record every
//! call in order, and can be told to fail a given method.

use alloy::primitives::{Address, TxHash, B256, U256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::CallError;
use crate::reconcile::{AccessControl, BridgeContract, CallResult, TokenContract};
use crate::roles::Role;
use crate::types::{TokenQuery, TokenRegistration};

/// A recorded collaborator call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    HasRole {
        role: Role,
        account: Address,
    },
    GrantRole {
        role: Role,
        account: Address,
    },
    QueryToken {
        id: u32,
    },
    AddToken {
        id: u32,
        is_wrapped: bool,
        decimals: u8,
        token: Address,
    },
    SetTokenCanWithdraw {
        id: u32,
        value: bool,
    },
    SetTokenCanDeposit {
        id: u32,
        value: bool,
    },
    SetPaused {
        paused: bool,
    },
}

impl MockCall {
    /// Contract method name, as used by [`MockBridge::fail_on`]
    pub fn method(&self) -> &'static str {
        match self {
            MockCall::HasRole { .. } => "hasRole",
            MockCall::GrantRole { .. } => "grantRole",
            MockCall::QueryToken { .. } => "queryToken",
            MockCall::AddToken { .. } => "addToken",
            MockCall::SetTokenCanWithdraw { .. } => "setTokenCanWithdraw",
            MockCall::SetTokenCanDeposit { .. } => "setTokenCanDeposit",
            MockCall::SetPaused { .. } => "setPaused",
        }
    }

    fn is_mutation(&self) -> bool {
        !matches!(self, MockCall::HasRole { .. } | MockCall::QueryToken { .. })
    }
}

#[derive(Debug, Default)]
struct ContractState {
    roles: HashSet<(Role, Address)>,
    tokens: HashMap<u32, TokenRegistration>,
    paused: bool,
    calls: Vec<MockCall>,
    failure: Option<(&'static str, CallError)>,
    tx_count: u64,
}

impl ContractState {
    /// Record `call`, then fail it if requested or if `paused_gates` and paused
    fn record(&mut self, call: MockCall, paused_gates: bool) -> CallResult<()> {
        let method = call.method();
        let mutation = call.is_mutation();
        self.calls.push(call);

        if let Some((failing, err)) = &self.failure {
            if *failing == method {
                return Err(err.clone());
            }
        }
        if paused_gates && mutation && self.paused {
            return Err(CallError::Paused("execution reverted: Pausable: paused".into()));
        }
        Ok(())
    }

    fn next_tx(&mut self) -> TxHash {
        self.tx_count += 1;
        B256::from(U256::from(self.tx_count))
    }
}

#[derive(Debug, Clone)]
struct MockContract {
    address: Address,
    state: Arc<Mutex<ContractState>>,
    /// Whether the paused flag rejects mutations (other than unpausing)
    paused_gates: bool,
}

impl MockContract {
    fn new(address: Address, paused_gates: bool) -> Self {
        Self {
            address,
            state: Arc::new(Mutex::new(ContractState::default())),
            paused_gates,
        }
    }

    fn state(&self) -> MutexGuard<'_, ContractState> {
        // A panicking test poisons the lock; the state is still usable
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn has_role(&self, role: Role, account: Address) -> CallResult<bool> {
        let mut state = self.state();
        state.record(MockCall::HasRole { role, account }, false)?;
        Ok(state.roles.contains(&(role, account)))
    }

    fn grant_role(&self, role: Role, account: Address) -> CallResult<TxHash> {
        let mut state = self.state();
        state.record(MockCall::GrantRole { role, account }, self.paused_gates)?;
        state.roles.insert((role, account));
        Ok(state.next_tx())
    }
}

// ============================================================================
// Bridge
// ============================================================================

/// In-memory bridge contract. Pausing it rejects every mutation with
/// [`CallError::Paused`].
#[derive(Debug, Clone)]
pub struct MockBridge {
    inner: MockContract,
}

impl Default for MockBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBridge {
    pub fn new() -> Self {
        Self::with_address(Address::repeat_byte(0xB1))
    }

    pub fn with_address(address: Address) -> Self {
        Self {
            inner: MockContract::new(address, true),
        }
    }

    /// Calls made so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.inner.state().calls.clone()
    }

    pub fn holds(&self, role: Role, account: Address) -> bool {
        self.inner.state().roles.contains(&(role, account))
    }

    /// Seed a role without recording a call
    pub fn grant(&self, role: Role, account: Address) {
        self.inner.state().roles.insert((role, account));
    }

    /// Seed a registration without recording a call
    pub fn register(&self, registration: TokenRegistration) {
        self.inner
            .state()
            .tokens
            .insert(registration.id, registration);
    }

    pub fn registration(&self, id: u32) -> Option<TokenRegistration> {
        self.inner.state().tokens.get(&id).cloned()
    }

    pub fn set_paused_state(&self, paused: bool) {
        self.inner.state().paused = paused;
    }

    /// Fail every subsequent call to `method` (e.g. `"addToken"`) with `err`
    pub fn fail_on(&self, method: &'static str, err: CallError) {
        self.inner.state().failure = Some((method, err));
    }

    pub fn clear_failure(&self) {
        self.inner.state().failure = None;
    }
}

#[async_trait]
impl AccessControl for MockBridge {
    fn address(&self) -> Address {
        self.inner.address
    }

    async fn has_role(&self, role: Role, account: Address) -> CallResult<bool> {
        // Suspend like an RPC round trip so concurrent passes interleave
        tokio::task::yield_now().await;
        self.inner.has_role(role, account)
    }

    async fn grant_role(&self, role: Role, account: Address) -> CallResult<TxHash> {
        self.inner.grant_role(role, account)
    }
}

#[async_trait]
impl BridgeContract for MockBridge {
    async fn query_token(&self, id: u32) -> CallResult<TokenQuery> {
        let mut state = self.inner.state();
        state.record(MockCall::QueryToken { id }, false)?;
        Ok(state
            .tokens
            .get(&id)
            .map(TokenRegistration::query)
            .unwrap_or_default())
    }

    async fn add_token(
        &self,
        id: u32,
        is_wrapped: bool,
        decimals: u8,
        token: Address,
    ) -> CallResult<TxHash> {
        let mut state = self.inner.state();
        state.record(
            MockCall::AddToken {
                id,
                is_wrapped,
                decimals,
                token,
            },
            true,
        )?;
        if state.tokens.get(&id).is_some_and(|r| !r.token.is_zero()) {
            return Err(CallError::Failed(format!(
                "execution reverted: token {} already registered",
                id
            )));
        }
        let mut registration = TokenRegistration::fresh(id, token, is_wrapped);
        registration.decimals = decimals;
        state.tokens.insert(id, registration);
        Ok(state.next_tx())
    }

    async fn set_token_can_withdraw(&self, id: u32, can_withdraw: bool) -> CallResult<TxHash> {
        let mut state = self.inner.state();
        state.record(
            MockCall::SetTokenCanWithdraw {
                id,
                value: can_withdraw,
            },
            true,
        )?;
        let registration = state
            .tokens
            .get_mut(&id)
            .ok_or_else(|| CallError::Failed(format!("execution reverted: unknown token {}", id)))?;
        registration.can_withdraw = can_withdraw;
        Ok(state.next_tx())
    }

    async fn set_token_can_deposit(&self, id: u32, can_deposit: bool) -> CallResult<TxHash> {
        let mut state = self.inner.state();
        state.record(
            MockCall::SetTokenCanDeposit {
                id,
                value: can_deposit,
            },
            true,
        )?;
        let registration = state
            .tokens
            .get_mut(&id)
            .ok_or_else(|| CallError::Failed(format!("execution reverted: unknown token {}", id)))?;
        registration.can_deposit = can_deposit;
        Ok(state.next_tx())
    }
}

// ============================================================================
// Token
// ============================================================================

/// In-memory token contract. Its paused flag does not gate role
/// administration, matching deployed tokens.
#[derive(Debug, Clone)]
pub struct MockToken {
    inner: MockContract,
}

impl MockToken {
    pub fn new(address: Address) -> Self {
        Self {
            inner: MockContract::new(address, false),
        }
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.inner.state().calls.clone()
    }

    pub fn holds(&self, role: Role, account: Address) -> bool {
        self.inner.state().roles.contains(&(role, account))
    }

    pub fn grant(&self, role: Role, account: Address) {
        self.inner.state().roles.insert((role, account));
    }

    pub fn is_paused(&self) -> bool {
        self.inner.state().paused
    }

    pub fn set_paused_state(&self, paused: bool) {
        self.inner.state().paused = paused;
    }

    pub fn fail_on(&self, method: &'static str, err: CallError) {
        self.inner.state().failure = Some((method, err));
    }

    pub fn clear_failure(&self) {
        self.inner.state().failure = None;
    }
}

#[async_trait]
impl AccessControl for MockToken {
    fn address(&self) -> Address {
        self.inner.address
    }

    async fn has_role(&self, role: Role, account: Address) -> CallResult<bool> {
        // Suspend like an RPC round trip so concurrent passes interleave
        tokio::task::yield_now().await;
        self.inner.has_role(role, account)
    }

    async fn grant_role(&self, role: Role, account: Address) -> CallResult<TxHash> {
        self.inner.grant_role(role, account)
    }
}

#[async_trait]
impl TokenContract for MockToken {
    async fn set_paused(&self, paused: bool) -> CallResult<TxHash> {
        let mut state = self.inner.state();
        state.record(MockCall::SetPaused { paused }, false)?;
        state.paused = paused;
        Ok(state.next_tx())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_bridge_registration() {
        let bridge = MockBridge::new();
        let token = Address::repeat_byte(0x33);

        assert!(!bridge.query_token(1).await.unwrap().is_registered());
        bridge.add_token(1, false, 2, token).await.unwrap();
        assert_eq!(bridge.query_token(1).await.unwrap().token, token);

        let err = bridge.add_token(1, false, 2, token).await.unwrap_err();
        assert!(matches!(err, CallError::Failed(_)));
    }

    #[tokio::test]
    async fn test_mock_bridge_paused_rejects_mutations() {
        let bridge = MockBridge::new();
        bridge.set_paused_state(true);

        assert!(bridge.query_token(1).await.is_ok());
        assert!(matches!(
            bridge.grant_role(Role::Deposit, Address::ZERO).await,
            Err(CallError::Paused(_))
        ));
        assert_eq!(bridge.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_tx_hashes_are_distinct() {
        let token = MockToken::new(Address::repeat_byte(0x44));
        let a = token.set_paused(true).await.unwrap();
        let b = token.grant_role(Role::Mint, Address::ZERO).await.unwrap();
        assert_ne!(a, b);
        assert!(token.is_paused());
    }

    #[tokio::test]
    async fn test_mock_failure_injection() {
        let token = MockToken::new(Address::repeat_byte(0x44));
        token.fail_on("hasRole", CallError::Failed("boom".into()));
        assert!(token.has_role(Role::Admin, Address::ZERO).await.is_err());
        token.clear_failure();
        assert!(!token.has_role(Role::Admin, Address::ZERO).await.unwrap());
    }
}
