//! Chain collaborator interfaces
//!
//! The reconciler only sees contracts through these traits. Live
//! implementations backed by alloy are in [`crate::evm`]; in-memory
//! implementations for tests are in `crate::testing`.
//!
//! Mutations return the transaction hash. The reconciler records it in its
//! report but never inspects it.

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;

use crate::error::CallError;
use crate::roles::Role;
use crate::types::TokenQuery;

pub type CallResult<T> = std::result::Result<T, CallError>;

/// Role-based access control shared by the bridge and token contracts
#[async_trait]
pub trait AccessControl: Send + Sync {
    /// Address of the contract
    fn address(&self) -> Address;

    async fn has_role(&self, role: Role, account: Address) -> CallResult<bool>;

    async fn grant_role(&self, role: Role, account: Address) -> CallResult<TxHash>;
}

#[async_trait]
pub trait BridgeContract: AccessControl {
    /// Registration at `id`; an unregistered id reports the zero address
    async fn query_token(&self, id: u32) -> CallResult<TokenQuery>;

    async fn add_token(
        &self,
        id: u32,
        is_wrapped: bool,
        decimals: u8,
        token: Address,
    ) -> CallResult<TxHash>;

    async fn set_token_can_withdraw(&self, id: u32, can_withdraw: bool) -> CallResult<TxHash>;

    async fn set_token_can_deposit(&self, id: u32, can_deposit: bool) -> CallResult<TxHash>;
}

#[async_trait]
pub trait TokenContract: AccessControl {
    async fn set_paused(&self, paused: bool) -> CallResult<TxHash>;
}
