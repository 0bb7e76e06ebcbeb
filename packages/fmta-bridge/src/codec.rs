//! Transfer payload encoding and decoding
//!
//! The payload is a fixed 108-byte layout consumed verbatim by the bridge
//! contract on the destination network:
//!
//! ```text
//! offset  len  field
//!      0   32  amount (uint256, big-endian atomic units)
//!     32    4  source network (uint32)
//!     36    4  destination network (uint32)
//!     40    4  token id (uint32)
//!     44   32  sender (20-byte address, left-padded with zeros)
//!     76   32  nonce (timestamp | sender | random)
//! ```
//!
//! Field widths are exact and shared by both sides of a bridge pair. The
//! length never depends on the magnitude of the amount.

use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use tiny_keccak::{Hasher, Keccak};
use tracing::debug;

use crate::error::{BridgeError, Result};
use crate::nonce::{self, Nonce, NONCE_LEN};
use crate::types::{NetworkId, TransferIntent};
use crate::units::{self, DEFAULT_DECIMALS};

pub const PAYLOAD_LEN: usize = 108;

const AMOUNT: std::ops::Range<usize> = 0..32;
const SOURCE_NETWORK: std::ops::Range<usize> = 32..36;
const DESTINATION_NETWORK: std::ops::Range<usize> = 36..40;
const TOKEN: std::ops::Range<usize> = 40..44;
const SENDER: std::ops::Range<usize> = 44..76;
const NONCE: std::ops::Range<usize> = 76..PAYLOAD_LEN;

/// Compute keccak256 hash of data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Convert an EVM address to bytes32 (left-padded with zeros)
pub fn address_to_bytes32(addr: &Address) -> [u8; 32] {
    let mut result = [0u8; 32];
    result[12..32].copy_from_slice(addr.as_slice());
    result
}

/// Extract the 20-byte address from a bytes32 word, rejecting dirty padding
pub fn bytes32_to_address(bytes: &[u8; 32]) -> Result<Address> {
    if bytes[..12].iter().any(|&b| b != 0) {
        return Err(BridgeError::InvalidPayload(
            "sender word has non-zero padding: expected 12 leading zero bytes".to_string(),
        ));
    }
    Ok(Address::from_slice(&bytes[12..32]))
}

// ============================================================================
// Payload
// ============================================================================

/// Canonical transfer payload. Always exactly [`PAYLOAD_LEN`] bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Bytes", into = "Bytes")]
pub struct TransferPayload(Bytes);

impl TransferPayload {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PAYLOAD_LEN {
            return Err(BridgeError::InvalidPayload(format!(
                "expected {} bytes, got {}",
                PAYLOAD_LEN,
                bytes.len()
            )));
        }
        Ok(TransferPayload(Bytes::copy_from_slice(bytes)))
    }

    /// Parse the `0x`-prefixed (or bare) hex form
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let bytes = hex::decode(hex)
            .map_err(|e| BridgeError::InvalidPayload(format!("malformed hex: {}", e)))?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// `0x` followed by 216 hex characters
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }

    /// keccak256 of the raw payload bytes
    pub fn hash(&self) -> [u8; 32] {
        keccak256(&self.0)
    }

    /// The 64-hex-character amount field
    pub fn amount_hex(&self) -> String {
        hex::encode(&self.0[AMOUNT])
    }

    /// The nonce field
    pub fn nonce(&self) -> Nonce {
        let mut bytes = [0u8; NONCE_LEN];
        bytes.copy_from_slice(&self.0[NONCE]);
        Nonce::from_bytes(bytes)
    }
}

impl TryFrom<Bytes> for TransferPayload {
    type Error = BridgeError;

    fn try_from(bytes: Bytes) -> Result<Self> {
        Self::from_slice(&bytes)
    }
}

impl From<TransferPayload> for Bytes {
    fn from(payload: TransferPayload) -> Self {
        payload.0
    }
}

impl std::fmt::Display for TransferPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Typed view of a decoded payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedTransfer {
    /// Canonical decimal amount
    pub amount: String,
    pub amount_atomic: U256,
    pub source_network: NetworkId,
    pub destination_network: NetworkId,
    pub token: u32,
    pub sender: Address,
    pub nonce: Nonce,
}

/// Caller-facing view of an encoded transfer: the decoded fields next to
/// the hex forms submitted on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    pub amount: String,
    /// 64-hex-character amount field
    pub amount_hex: String,
    pub source_network: u32,
    pub destination_network: u32,
    pub token: u32,
    /// Sender word as 64 hex characters (left-padded)
    pub sender: String,
    /// Nonce read as a big-endian integer, decimal
    pub nonce: String,
    pub nonce_hex: String,
    pub data: TransferPayload,
}

impl TransferRecord {
    pub fn new(payload: &TransferPayload, decoded: &DecodedTransfer) -> Self {
        Self {
            amount: decoded.amount.clone(),
            amount_hex: payload.amount_hex(),
            source_network: decoded.source_network.0,
            destination_network: decoded.destination_network.0,
            token: decoded.token,
            sender: hex::encode(address_to_bytes32(&decoded.sender)),
            nonce: decoded.nonce.to_decimal_string(),
            nonce_hex: decoded.nonce.to_hex(),
            data: payload.clone(),
        }
    }
}

// ============================================================================
// Codec
// ============================================================================

/// Encoder/decoder bound to a token precision.
///
/// Both ends of a bridge pair must use the same `decimals`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferCodec {
    decimals: u8,
}

impl Default for TransferCodec {
    fn default() -> Self {
        Self {
            decimals: DEFAULT_DECIMALS,
        }
    }
}

impl TransferCodec {
    pub fn new(decimals: u8) -> Self {
        Self { decimals }
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Build the payload for `intent` with a freshly generated nonce
    pub fn encode(&self, intent: &TransferIntent) -> Result<TransferPayload> {
        let fields = self.validate(intent)?;
        let nonce = nonce::generate(intent.sender);
        Ok(assemble(&fields, &nonce))
    }

    /// Build the payload for `intent` with a caller-supplied nonce
    pub fn encode_with_nonce(&self, intent: &TransferIntent, nonce: Nonce) -> Result<TransferPayload> {
        let fields = self.validate(intent)?;
        Ok(assemble(&fields, &nonce))
    }

    pub fn decode(&self, payload: &TransferPayload) -> Result<DecodedTransfer> {
        let data = payload.as_bytes();

        let amount_atomic = U256::from_be_slice(&data[AMOUNT]);

        let mut sender_word = [0u8; 32];
        sender_word.copy_from_slice(&data[SENDER]);
        let sender = bytes32_to_address(&sender_word)?;

        let decoded = DecodedTransfer {
            amount: units::from_atomic(amount_atomic, self.decimals),
            amount_atomic,
            source_network: NetworkId(read_u32(&data[SOURCE_NETWORK])),
            destination_network: NetworkId(read_u32(&data[DESTINATION_NETWORK])),
            token: read_u32(&data[TOKEN]),
            sender,
            nonce: payload.nonce(),
        };

        debug!(
            src = %decoded.source_network,
            dest = %decoded.destination_network,
            token = decoded.token,
            amount = %decoded.amount,
            "Decoded transfer payload"
        );

        Ok(decoded)
    }

    /// Decode from the `0x` hex wire form
    pub fn decode_hex(&self, hex: &str) -> Result<DecodedTransfer> {
        self.decode(&TransferPayload::from_hex(hex)?)
    }

    fn validate(&self, intent: &TransferIntent) -> Result<Fields> {
        let source_network = NetworkId::checked("source_network", intent.source_network)?;
        let destination_network =
            NetworkId::checked("destination_network", intent.destination_network)?;
        let token = NetworkId::checked("token", intent.token)?.0;

        let amount = units::to_atomic(&intent.amount, self.decimals)?;

        Ok(Fields {
            amount,
            source_network,
            destination_network,
            token,
            sender: address_to_bytes32(&intent.sender),
        })
    }
}

/// Encode with the default 18-decimal codec
pub fn encode(intent: &TransferIntent) -> Result<TransferPayload> {
    TransferCodec::default().encode(intent)
}

/// Decode with the default 18-decimal codec
pub fn decode(payload: &TransferPayload) -> Result<DecodedTransfer> {
    TransferCodec::default().decode(payload)
}

struct Fields {
    amount: U256,
    source_network: NetworkId,
    destination_network: NetworkId,
    token: u32,
    sender: [u8; 32],
}

fn assemble(fields: &Fields, nonce: &Nonce) -> TransferPayload {
    let mut data = [0u8; PAYLOAD_LEN];

    // amount (uint256 as 32 bytes, big-endian)
    data[AMOUNT].copy_from_slice(&fields.amount.to_be_bytes::<32>());

    // source / destination network (4 bytes each)
    data[SOURCE_NETWORK].copy_from_slice(&fields.source_network.to_bytes());
    data[DESTINATION_NETWORK].copy_from_slice(&fields.destination_network.to_bytes());

    // token id (4 bytes)
    data[TOKEN].copy_from_slice(&fields.token.to_be_bytes());

    // sender (32 bytes, left-padded)
    data[SENDER].copy_from_slice(&fields.sender);

    // nonce (32 bytes)
    data[NONCE].copy_from_slice(nonce.as_bytes());

    TransferPayload(Bytes::copy_from_slice(&data))
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_be_bytes(buf)
}
