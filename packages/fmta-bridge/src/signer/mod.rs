//! Transfer signing
//!
//! Signing is an injected capability: anything implementing
//! [`SigningPrimitive`] can turn a payload hex string and a private key into
//! a [`SignatureOutput`]. Two primitives ship with the crate:
//!
//! - [`ProcessSigner`]: runs an external signing program and reads JSON from
//!   its stdout
//! - [`LocalSigner`]: signs the keccak-256 payload hash in process with a
//!   secp256k1 key

mod local;
mod process;

pub use local::LocalSigner;
pub use process::ProcessSigner;

use alloy::primitives::Bytes;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::codec::{TransferCodec, TransferPayload, TransferRecord};
use crate::error::{BridgeError, Result};
use crate::secret::PrivateKey;

/// Produces a signature over a transfer payload.
#[async_trait]
pub trait SigningPrimitive: Send + Sync {
    /// Sign `payload_hex` (`0x`-prefixed) with `key`.
    async fn sign(&self, payload_hex: &str, key: &PrivateKey) -> Result<SignatureOutput>;
}

/// Signature plus whatever auxiliary fields the primitive reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureOutput {
    pub signature: Bytes,
    #[serde(flatten)]
    pub aux: Map<String, Value>,
}

impl SignatureOutput {
    /// Parse the JSON object printed by a signing program.
    ///
    /// `signature` must be a hex string; every other key is kept in `aux`.
    pub fn from_json(output: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(output.trim()).map_err(|e| {
            BridgeError::SigningProtocolError(format!("stdout is not JSON: {}", e))
        })?;

        let Value::Object(mut aux) = value else {
            return Err(BridgeError::SigningProtocolError(
                "stdout is not a JSON object".to_string(),
            ));
        };

        let signature = match aux.remove("signature") {
            Some(Value::String(s)) => s,
            Some(_) => {
                return Err(BridgeError::SigningProtocolError(
                    "signature is not a string".to_string(),
                ))
            }
            None => {
                return Err(BridgeError::SigningProtocolError(
                    "missing signature field".to_string(),
                ))
            }
        };

        let raw = signature.strip_prefix("0x").unwrap_or(&signature);
        let bytes = hex::decode(raw).map_err(|e| {
            BridgeError::SigningProtocolError(format!("signature is not hex: {}", e))
        })?;
        if bytes.is_empty() {
            return Err(BridgeError::SigningProtocolError(
                "signature is empty".to_string(),
            ));
        }

        Ok(Self {
            signature: Bytes::from(bytes),
            aux,
        })
    }
}

/// An encoded transfer together with its signature.
///
/// Fields reported by the signing primitive are nested under `aux` so they
/// can never shadow the transfer fields.
#[derive(Debug, Clone, Serialize)]
pub struct SignedTransfer {
    #[serde(flatten)]
    pub transfer: TransferRecord,
    pub signature: Bytes,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub aux: Map<String, Value>,
}

/// Sign an encoded payload.
///
/// The payload is borrowed and never modified; on failure the caller still
/// holds it unchanged and can retry with a different primitive or key.
pub async fn sign_transfer(
    codec: &TransferCodec,
    payload: &TransferPayload,
    key: &PrivateKey,
    primitive: &dyn SigningPrimitive,
) -> Result<SignedTransfer> {
    let decoded = codec.decode(payload)?;
    let payload_hex = payload.to_hex();

    debug!(payload = %payload_hex, "Signing transfer payload");
    let output = primitive.sign(&payload_hex, key).await?;

    info!(
        src = %decoded.source_network,
        dest = %decoded.destination_network,
        token = decoded.token,
        nonce = %decoded.nonce,
        "Transfer signed"
    );

    Ok(SignedTransfer {
        transfer: TransferRecord::new(payload, &decoded),
        signature: output.signature,
        aux: output.aux,
    })
}
