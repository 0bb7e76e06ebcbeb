//! Transfer nonce generation
//!
//! A nonce is 32 bytes:
//!
//! ```text
//! [ timestamp ms (4, low 32 bits) | sender address (20) | random suffix (8) ]
//! ```
//!
//! The timestamp is truncated to 32 bits and therefore wraps roughly every
//! 49.7 days. Destination contracts are expected to detect duplicate nonces;
//! the generator keeps no registry of issued values.

use alloy::primitives::{Address, U256};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

pub const NONCE_LEN: usize = 32;

const TIMESTAMP_LEN: usize = 4;
const ADDRESS_LEN: usize = 20;
const SUFFIX_LEN: usize = 8;

/// 32-byte transfer nonce
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nonce(pub [u8; NONCE_LEN]);

impl Nonce {
    /// Assemble a nonce from its parts, truncating `millis` to 32 bits.
    pub fn from_parts(millis: u64, sender: Address, suffix: [u8; SUFFIX_LEN]) -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        bytes[..TIMESTAMP_LEN].copy_from_slice(&(millis as u32).to_be_bytes());
        bytes[TIMESTAMP_LEN..TIMESTAMP_LEN + ADDRESS_LEN].copy_from_slice(sender.as_slice());
        bytes[TIMESTAMP_LEN + ADDRESS_LEN..].copy_from_slice(&suffix);
        Nonce(bytes)
    }

    pub fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Nonce(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }

    /// Truncated millisecond timestamp
    pub fn timestamp(&self) -> u32 {
        let mut ts = [0u8; TIMESTAMP_LEN];
        ts.copy_from_slice(&self.0[..TIMESTAMP_LEN]);
        u32::from_be_bytes(ts)
    }

    /// Sender address embedded in the nonce
    pub fn sender(&self) -> Address {
        Address::from_slice(&self.0[TIMESTAMP_LEN..TIMESTAMP_LEN + ADDRESS_LEN])
    }

    pub fn suffix(&self) -> [u8; SUFFIX_LEN] {
        let mut suffix = [0u8; SUFFIX_LEN];
        suffix.copy_from_slice(&self.0[TIMESTAMP_LEN + ADDRESS_LEN..]);
        suffix
    }

    /// Hex without prefix (64 chars)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The nonce read as a big-endian integer, in decimal
    pub fn to_decimal_string(&self) -> String {
        U256::from_be_bytes(self.0).to_string()
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce(0x{})", self.to_hex())
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

/// Generate a fresh nonce for `sender` from the wall clock and the
/// thread-local CSPRNG.
pub fn generate(sender: Address) -> Nonce {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();

    let mut suffix = [0u8; SUFFIX_LEN];
    rand::thread_rng().fill_bytes(&mut suffix);

    Nonce::from_parts(millis, sender, suffix)
}
