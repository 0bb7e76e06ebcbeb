//! FMTA Bridge Configurator
//!
//! Brings a deployed bridge and its tokens into the required configuration:
//!
//! 1. Every configured validator holds the deposit role on the bridge
//! 2. For every configured token: optionally, an operator account holds
//!    admin, mintTo and burnFrom on it; the bridge token id is registered,
//!    the bridge holds its roles on the token, withdrawals and deposits are
//!    enabled, and finally the token is unpaused
//!
//! Every change is preceded by a state check, so running the configurator
//! again after a failure resumes where the previous run stopped. The final
//! report is printed to stdout as JSON.

mod config;

use alloy::network::EthereumWallet;
use alloy::providers::ProviderBuilder;
use alloy::signers::local::PrivateKeySigner;
use config::Config;
use eyre::{eyre, WrapErr};
use fmta_bridge::evm::{EvmBridge, EvmToken};
use fmta_bridge::{BridgeError, ReconcileReport, Reconciler};
use tracing::{info, warn};

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> eyre::Result<()> {
    init_logging();

    info!("Starting FMTA bridge configurator");

    let config = Config::load()?;
    info!(
        evm_rpc = %config.evm_rpc_url,
        bridge = %config.bridge_address,
        validators = config.validators.len(),
        tokens = config.tokens.len(),
        "Configuration loaded"
    );

    let signer: PrivateKeySigner = config
        .evm_private_key
        .expose()
        .trim()
        .parse()
        .map_err(|_| eyre!("Invalid EVM_PRIVATE_KEY"))?;
    info!(account = %signer.address(), "Signer loaded");

    let provider = ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(EthereumWallet::from(signer))
        .on_http(config.evm_rpc_url.parse().wrap_err("Invalid EVM_RPC_URL")?);

    let reconciler = Reconciler::new(EvmBridge::new(config.bridge_address, provider.clone()));
    let mut report = ReconcileReport::default();

    let validators = reconciler
        .validators(&config.validators)
        .await
        .map_err(|e| failed(e, "Validator reconciliation"))?;
    report.merge(validators);

    for entry in &config.tokens {
        let token = EvmToken::new(entry.address, provider.clone());

        // Operator grants run inside the token pass so the unpause stays last
        let configured = reconciler
            .token_with_operator(entry.id, entry.is_wrapped, &token, config.operator)
            .await
            .map_err(|e| failed(e, &format!("Token {} reconciliation", entry.id)))?;
        report.merge(configured);
    }

    info!(
        applied = report.applied.len(),
        already_satisfied = report.satisfied,
        "Configuration complete"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn failed(err: BridgeError, what: &str) -> eyre::Report {
    if err.is_rerunnable() {
        warn!(error = %err, "{} stopped; rerun to resume from current chain state", what);
    }
    eyre::Report::new(err).wrap_err(format!("{} failed", what))
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fmta_bridge=debug"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // Logs go to stderr so stdout carries only the report
    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
}
