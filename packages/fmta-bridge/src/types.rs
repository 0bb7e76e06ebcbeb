//! Common types for bridge transfers and token registrations

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BridgeError, Result};

// ============================================================================
// Network ID (4 bytes)
// ============================================================================

/// A 4-byte network identifier as it appears on the wire.
///
/// Networks are identified by their EVM chain id truncated to 32 bits
/// (e.g. 1 for Ethereum, 56 for BSC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NetworkId(pub u32);

impl NetworkId {
    /// Narrow a requested id to 32 bits, naming `field` on overflow
    pub fn checked(field: &'static str, value: u64) -> Result<Self> {
        u32::try_from(value)
            .map(NetworkId)
            .map_err(|_| BridgeError::FieldOverflow {
                field,
                value: value.to_string(),
                bits: 32,
            })
    }

    /// Big-endian wire bytes
    pub fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        NetworkId(u32::from_be_bytes(bytes))
    }

    /// Convert to hex string with 0x prefix
    pub fn to_hex(self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NetworkId {
    fn from(id: u32) -> Self {
        NetworkId(id)
    }
}

// ============================================================================
// Transfer Intent
// ============================================================================

/// A caller's request to move `amount` of bridge token `token` from
/// `source_network` to `destination_network`.
///
/// Ids are kept at the width the caller supplied them; the codec narrows
/// them to 32 bits and rejects anything wider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferIntent {
    pub sender: Address,
    pub source_network: u64,
    pub destination_network: u64,
    pub token: u64,
    /// Human-readable decimal amount, e.g. `"100.5"`
    pub amount: String,
}

impl TransferIntent {
    pub fn new(
        sender: Address,
        source_network: u64,
        destination_network: u64,
        token: u64,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            sender,
            source_network,
            destination_network,
            token,
            amount: amount.into(),
        }
    }
}

// ============================================================================
// Token Registration Types
// ============================================================================

/// Decimals value the bridge is told at registration time.
///
/// This is a fixed protocol parameter carried over from existing deployments;
/// it is not derived from the token's own `decimals()`.
pub const REGISTRATION_DECIMALS: u8 = 2;

/// Registration state of a bridge token id as reported by `queryToken`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenQuery {
    /// Bound token contract; [`Address::ZERO`] means unregistered
    pub token: Address,
    pub can_withdraw: bool,
    pub can_deposit: bool,
}

impl TokenQuery {
    pub fn is_registered(&self) -> bool {
        !self.token.is_zero()
    }
}

/// Full registration record for a bridge token id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRegistration {
    pub id: u32,
    pub token: Address,
    /// Wrapped tokens represent a claim on a token locked on another network
    pub is_wrapped: bool,
    pub decimals: u8,
    pub can_withdraw: bool,
    pub can_deposit: bool,
}

impl TokenRegistration {
    /// The record the bridge holds right after a fresh `addToken` call
    pub fn fresh(id: u32, token: Address, is_wrapped: bool) -> Self {
        Self {
            id,
            token,
            is_wrapped,
            decimals: REGISTRATION_DECIMALS,
            can_withdraw: false,
            can_deposit: false,
        }
    }

    pub fn query(&self) -> TokenQuery {
        TokenQuery {
            token: self.token,
            can_withdraw: self.can_withdraw,
            can_deposit: self.can_deposit,
        }
    }
}
