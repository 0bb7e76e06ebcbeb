//! Live bridge and token collaborators
//!
//! Each call builds a contract instance over the shared provider. Mutations
//! wait for the receipt; a reverted receipt is a failed call. Errors are
//! classified with [`CallError::from_message`], so a revert whose reason
//! mentions `paused` surfaces as [`CallError::Paused`].

use alloy::{
    network::Ethereum,
    primitives::{Address, TxHash},
    providers::{PendingTransactionBuilder, Provider},
    transports::http::{Client, Http},
};
use async_trait::async_trait;
use tracing::debug;

use super::contracts::{FmtaBridge, FmtaToken};
use crate::error::CallError;
use crate::reconcile::{AccessControl, BridgeContract, CallResult, TokenContract};
use crate::roles::Role;
use crate::types::TokenQuery;

fn call_error(e: impl std::fmt::Display) -> CallError {
    CallError::from_message(e.to_string())
}

/// Wait for a sent transaction and require a successful receipt
async fn confirm(
    pending: Result<PendingTransactionBuilder<Http<Client>, Ethereum>, alloy::contract::Error>,
) -> CallResult<TxHash> {
    let pending = pending.map_err(call_error)?;
    let tx_hash = *pending.tx_hash();
    debug!(tx_hash = %tx_hash, "Transaction sent, waiting for confirmation");

    let receipt = pending.get_receipt().await.map_err(call_error)?;
    if !receipt.status() {
        return Err(CallError::Failed(format!("transaction {} reverted", tx_hash)));
    }
    Ok(tx_hash)
}

// ============================================================================
// Bridge
// ============================================================================

/// Bridge contract reached through an alloy provider.
///
/// Mutations need a provider with a wallet and the recommended fillers.
#[derive(Debug, Clone)]
pub struct EvmBridge<P> {
    address: Address,
    provider: P,
}

impl<P> EvmBridge<P> {
    pub fn new(address: Address, provider: P) -> Self {
        Self { address, provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P> AccessControl for EvmBridge<P>
where
    P: Provider<Http<Client>> + Send + Sync,
{
    fn address(&self) -> Address {
        self.address
    }

    async fn has_role(&self, role: Role, account: Address) -> CallResult<bool> {
        let bridge = FmtaBridge::new(self.address, &self.provider);
        let result = bridge
            .hasRole(role.id(), account)
            .call()
            .await
            .map_err(call_error)?;
        Ok(result._0)
    }

    async fn grant_role(&self, role: Role, account: Address) -> CallResult<TxHash> {
        let bridge = FmtaBridge::new(self.address, &self.provider);
        confirm(bridge.grantRole(role.id(), account).send().await).await
    }
}

#[async_trait]
impl<P> BridgeContract for EvmBridge<P>
where
    P: Provider<Http<Client>> + Send + Sync,
{
    async fn query_token(&self, id: u32) -> CallResult<TokenQuery> {
        let bridge = FmtaBridge::new(self.address, &self.provider);
        let result = bridge.queryToken(id).call().await.map_err(call_error)?;
        let registration = result._0;

        Ok(TokenQuery {
            token: registration.token,
            can_withdraw: registration.canWithdraw,
            can_deposit: registration.canDeposit,
        })
    }

    async fn add_token(
        &self,
        id: u32,
        is_wrapped: bool,
        decimals: u8,
        token: Address,
    ) -> CallResult<TxHash> {
        let bridge = FmtaBridge::new(self.address, &self.provider);
        confirm(bridge.addToken(id, is_wrapped, decimals, token).send().await).await
    }

    async fn set_token_can_withdraw(&self, id: u32, can_withdraw: bool) -> CallResult<TxHash> {
        let bridge = FmtaBridge::new(self.address, &self.provider);
        confirm(bridge.setTokenCanWithdraw(id, can_withdraw).send().await).await
    }

    async fn set_token_can_deposit(&self, id: u32, can_deposit: bool) -> CallResult<TxHash> {
        let bridge = FmtaBridge::new(self.address, &self.provider);
        confirm(bridge.setTokenCanDeposit(id, can_deposit).send().await).await
    }
}

// ============================================================================
// Token
// ============================================================================

/// Token contract reached through an alloy provider
#[derive(Debug, Clone)]
pub struct EvmToken<P> {
    address: Address,
    provider: P,
}

impl<P> EvmToken<P>
where
    P: Provider<Http<Client>> + Send + Sync,
{
    pub fn new(address: Address, provider: P) -> Self {
        Self { address, provider }
    }

    pub async fn is_paused(&self) -> CallResult<bool> {
        let token = FmtaToken::new(self.address, &self.provider);
        let result = token.paused().call().await.map_err(call_error)?;
        Ok(result._0)
    }
}

#[async_trait]
impl<P> AccessControl for EvmToken<P>
where
    P: Provider<Http<Client>> + Send + Sync,
{
    fn address(&self) -> Address {
        self.address
    }

    async fn has_role(&self, role: Role, account: Address) -> CallResult<bool> {
        let token = FmtaToken::new(self.address, &self.provider);
        let result = token
            .hasRole(role.id(), account)
            .call()
            .await
            .map_err(call_error)?;
        Ok(result._0)
    }

    async fn grant_role(&self, role: Role, account: Address) -> CallResult<TxHash> {
        let token = FmtaToken::new(self.address, &self.provider);
        confirm(token.grantRole(role.id(), account).send().await).await
    }
}

#[async_trait]
impl<P> TokenContract for EvmToken<P>
where
    P: Provider<Http<Client>> + Send + Sync,
{
    async fn set_paused(&self, paused: bool) -> CallResult<TxHash> {
        let token = FmtaToken::new(self.address, &self.provider);
        confirm(token.setPaused(paused).send().await).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::providers::ProviderBuilder;

    #[test]
    fn test_call_error_from_revert_message() {
        assert!(matches!(
            call_error("server returned an error response: execution reverted: Pausable: paused"),
            CallError::Paused(_)
        ));
        assert!(matches!(call_error("nonce too low"), CallError::Failed(_)));
    }

    #[tokio::test]
    async fn test_unreachable_rpc_is_failed_call() {
        // Port 9 (discard) is not an RPC endpoint
        let provider = ProviderBuilder::new().on_http("http://127.0.0.1:9".parse().unwrap());
        let bridge = EvmBridge::new(Address::repeat_byte(0xB1), provider);

        let err = bridge.query_token(1).await.unwrap_err();
        assert!(matches!(err, CallError::Failed(_)));
        assert_eq!(bridge.address(), Address::repeat_byte(0xB1));
    }
}
