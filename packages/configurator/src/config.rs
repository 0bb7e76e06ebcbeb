//! Configurator configuration

use alloy::primitives::Address;
use eyre::{eyre, Result, WrapErr};
use fmta_bridge::PrivateKey;
use std::collections::HashSet;
use std::env;
use std::fmt;
use std::str::FromStr;

/// A bridge token id and the token contract it should be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenConfig {
    pub id: u32,
    pub address: Address,
    pub is_wrapped: bool,
}

impl FromStr for TokenConfig {
    type Err = eyre::Report;

    /// Parses `id:address` or `id:address:wrapped`
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').map(str::trim).collect();

        let (id, address, is_wrapped) = match parts.as_slice() {
            [id, address] => (id, address, false),
            [id, address, flag] => {
                let is_wrapped = match flag.to_ascii_lowercase().as_str() {
                    "wrapped" | "true" => true,
                    "native" | "false" => false,
                    other => return Err(eyre!("Invalid token flag {:?} in {:?}", other, s)),
                };
                (id, address, is_wrapped)
            }
            _ => return Err(eyre!("Invalid token entry {:?}, expected id:address[:wrapped]", s)),
        };

        Ok(Self {
            id: id
                .parse::<u32>()
                .map_err(|_| eyre!("Invalid token id {:?}, must fit in 32 bits", id))?,
            address: address
                .parse::<Address>()
                .map_err(|e| eyre!("Invalid token address {:?}: {}", address, e))?,
            is_wrapped,
        })
    }
}

/// Configurator configuration
#[derive(Clone)]
pub struct Config {
    /// EVM RPC URL
    pub evm_rpc_url: String,
    /// Key used to send setup transactions
    pub evm_private_key: PrivateKey,
    /// Bridge contract address
    pub bridge_address: Address,
    /// Accounts that must hold the deposit role on the bridge
    pub validators: Vec<Address>,
    /// Bridge token ids to register and configure
    pub tokens: Vec<TokenConfig>,
    /// Account bootstrapped as operator on every configured token
    pub operator: Option<Address>,
}

/// Custom Debug that redacts evm_private_key to prevent accidental log leakage.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("evm_rpc_url", &self.evm_rpc_url)
            .field("evm_private_key", &"<redacted>")
            .field("bridge_address", &self.bridge_address)
            .field("validators", &self.validators)
            .field("tokens", &self.tokens)
            .field("operator", &self.operator)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment
    pub fn load() -> Result<Self> {
        // Try to load .env file
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded .env from {:?}", path);
        }

        Self::from_env()
    }

    /// Build configuration from the current process environment
    pub fn from_env() -> Result<Self> {
        let evm_private_key = env::var("EVM_PRIVATE_KEY")
            .map(PrivateKey::new)
            .map_err(|_| eyre!("EVM_PRIVATE_KEY required"))?;
        if evm_private_key.is_empty() {
            return Err(eyre!("EVM_PRIVATE_KEY is empty"));
        }

        let bridge_address = env::var("BRIDGE_ADDRESS")
            .map_err(|_| eyre!("BRIDGE_ADDRESS required"))?
            .trim()
            .parse::<Address>()
            .map_err(|e| eyre!("Invalid BRIDGE_ADDRESS: {}", e))?;

        let validators = list("VALIDATORS")
            .into_iter()
            .map(|v| {
                v.parse::<Address>()
                    .map_err(|e| eyre!("Invalid validator address {:?}: {}", v, e))
            })
            .collect::<Result<Vec<_>>>()?;

        let tokens = list("BRIDGE_TOKENS")
            .into_iter()
            .map(|t| t.parse::<TokenConfig>())
            .collect::<Result<Vec<_>>>()
            .wrap_err("Invalid BRIDGE_TOKENS")?;

        let mut ids = HashSet::new();
        for token in &tokens {
            if !ids.insert(token.id) {
                return Err(eyre!("Duplicate token id {} in BRIDGE_TOKENS", token.id));
            }
        }

        let operator = match env::var("OPERATOR_ADDRESS") {
            Ok(v) if !v.trim().is_empty() => Some(
                v.trim()
                    .parse::<Address>()
                    .map_err(|e| eyre!("Invalid OPERATOR_ADDRESS: {}", e))?,
            ),
            _ => None,
        };

        Ok(Self {
            evm_rpc_url: env::var("EVM_RPC_URL").map_err(|_| eyre!("EVM_RPC_URL required"))?,
            evm_private_key,
            bridge_address,
            validators,
            tokens,
            operator,
        })
    }
}

/// Comma-separated list variable; missing or blank means empty
fn list(name: &str) -> Vec<String> {
    env::var(name)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const VARS: [&str; 7] = [
        "EVM_RPC_URL",
        "EVM_PRIVATE_KEY",
        "BRIDGE_ADDRESS",
        "VALIDATORS",
        "BRIDGE_TOKENS",
        "OPERATOR_ADDRESS",
        "LOG_FORMAT",
    ];

    fn set_base_env() {
        for var in VARS {
            env::remove_var(var);
        }
        env::set_var("EVM_RPC_URL", "http://localhost:8545");
        env::set_var("EVM_PRIVATE_KEY", KEY);
        env::set_var("BRIDGE_ADDRESS", "0x5FbDB2315678afecb367f032d93F642f64180aa3");
    }

    #[test]
    fn test_token_entry_parsing() {
        let t: TokenConfig = "3:0x0000000000000000000000000000000000000007".parse().unwrap();
        assert_eq!(t.id, 3);
        assert!(!t.is_wrapped);

        let t: TokenConfig = " 4 : 0x0000000000000000000000000000000000000007 : wrapped "
            .parse()
            .unwrap();
        assert!(t.is_wrapped);

        assert!("4".parse::<TokenConfig>().is_err());
        assert!("4:0x07:wrapped".parse::<TokenConfig>().is_err());
        assert!("4294967296:0x0000000000000000000000000000000000000007"
            .parse::<TokenConfig>()
            .is_err());
        assert!("4:0x0000000000000000000000000000000000000007:maybe"
            .parse::<TokenConfig>()
            .is_err());
    }

    #[test]
    #[serial]
    fn test_minimal_config() {
        set_base_env();
        let config = Config::from_env().unwrap();
        assert!(config.validators.is_empty());
        assert!(config.tokens.is_empty());
        assert!(config.operator.is_none());
        assert_eq!(config.evm_private_key.expose(), KEY);
    }

    #[test]
    #[serial]
    fn test_full_config() {
        set_base_env();
        env::set_var(
            "VALIDATORS",
            "0x70997970C51812dc3A010C7d01b50e0d17dc79C8, 0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC",
        );
        env::set_var(
            "BRIDGE_TOKENS",
            "0:0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512,1:0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0:wrapped",
        );
        env::set_var("OPERATOR_ADDRESS", "0x90F79bf6EB2c4f870365E785982E1f101E93b906");

        let config = Config::from_env().unwrap();
        assert_eq!(config.validators.len(), 2);
        assert_eq!(config.tokens.len(), 2);
        assert!(config.tokens[1].is_wrapped);
        assert!(config.operator.is_some());
    }

    #[test]
    #[serial]
    fn test_duplicate_token_ids_rejected() {
        set_base_env();
        env::set_var(
            "BRIDGE_TOKENS",
            "1:0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512,1:0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0",
        );
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("Duplicate token id 1"));
    }

    #[test]
    #[serial]
    fn test_missing_required_vars() {
        set_base_env();
        env::remove_var("BRIDGE_ADDRESS");
        assert!(Config::from_env().is_err());

        set_base_env();
        env::set_var("VALIDATORS", "not-an-address");
        assert!(Config::from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_debug_redacts_private_key() {
        set_base_env();
        let config = Config::from_env().unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(&KEY[2..]));
    }
}
