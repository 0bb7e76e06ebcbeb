//! Live Reconciliation Integration Test
//!
//! Reconciles a token against a running EVM node with deployed bridge and
//! token contracts, then checks that a second pass changes nothing.
//!
//! ## Setup
//!
//! The account behind `EVM_PRIVATE_KEY` must hold the admin role on both
//! contracts. Set these environment variables:
//!
//! - `EVM_RPC_URL` - EVM RPC (e.g., http://localhost:8545)
//! - `EVM_PRIVATE_KEY` - Admin key
//! - `BRIDGE_ADDRESS` - Bridge contract address
//! - `TOKEN_ADDRESS` - Token contract address
//! - `TOKEN_ID` - Bridge token id to reconcile (e.g., 0)
//!
//! ## Running
//!
//! ```bash
//! cd packages/fmta-bridge
//! cargo test --test live_reconcile -- --ignored --nocapture
//! ```

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::ProviderBuilder;
use alloy::signers::local::PrivateKeySigner;
use eyre::WrapErr;
use fmta_bridge::evm::{EvmBridge, EvmToken};
use fmta_bridge::{Mutation, Reconciler};
use std::str::FromStr;

struct LiveTarget {
    rpc_url: String,
    private_key: String,
    bridge: Address,
    token: Address,
    token_id: u32,
}

impl LiveTarget {
    fn from_env() -> Result<Self, String> {
        let var = |name: &str| std::env::var(name).map_err(|_| format!("{} not set", name));
        let address = |name: &str| -> Result<Address, String> {
            Address::from_str(&var(name)?).map_err(|e| format!("Invalid {}: {}", name, e))
        };

        Ok(Self {
            rpc_url: var("EVM_RPC_URL")?,
            private_key: var("EVM_PRIVATE_KEY")?,
            bridge: address("BRIDGE_ADDRESS")?,
            token: address("TOKEN_ADDRESS")?,
            token_id: var("TOKEN_ID")?
                .parse()
                .map_err(|_| "TOKEN_ID must be a valid u32".to_string())?,
        })
    }
}

#[tokio::test]
#[ignore = "requires a live chain: EVM_RPC_URL, EVM_PRIVATE_KEY, BRIDGE_ADDRESS, TOKEN_ADDRESS, TOKEN_ID"]
async fn test_live_token_reconcile_is_idempotent() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .ok();

    let target = match LiveTarget::from_env() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Skipping: {}", e);
            return Ok(());
        }
    };

    let signer: PrivateKeySigner = target.private_key.parse()?;
    let provider = ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(EthereumWallet::from(signer))
        .on_http(target.rpc_url.parse()?);

    let reconciler = Reconciler::new(EvmBridge::new(target.bridge, provider.clone()));
    let token = EvmToken::new(target.token, provider);

    let first = reconciler
        .token(target.token_id, false, &token)
        .await
        .wrap_err("first pass")?;
    tracing::info!(applied = first.applied.len(), "First pass done");

    assert!(!token.is_paused().await?);

    let second = reconciler
        .token(target.token_id, false, &token)
        .await
        .wrap_err("second pass")?;
    assert_eq!(
        second.mutations().cloned().collect::<Vec<_>>(),
        vec![Mutation::Unpause]
    );
    Ok(())
}
