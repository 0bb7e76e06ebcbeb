//! In-process secp256k1 signing

use alloy::primitives::{Bytes, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use super::{SignatureOutput, SigningPrimitive};
use crate::codec::{keccak256, TransferPayload};
use crate::error::{BridgeError, Result};
use crate::secret::PrivateKey;

/// Signs `keccak256(payload)` with the given key.
///
/// Aux fields: `hash` (the signed digest) and `signer` (the key's address).
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSigner;

impl LocalSigner {
    pub fn new() -> Self {
        LocalSigner
    }
}

#[async_trait]
impl SigningPrimitive for LocalSigner {
    async fn sign(&self, payload_hex: &str, key: &PrivateKey) -> Result<SignatureOutput> {
        let payload = TransferPayload::from_hex(payload_hex)?;

        let signer: PrivateKeySigner = key
            .expose()
            .trim()
            .parse()
            .map_err(|_| BridgeError::SigningUnavailable("invalid private key".to_string()))?;

        let hash = B256::from(keccak256(payload.as_bytes()));
        let signature = signer
            .sign_hash_sync(&hash)
            .map_err(|e| BridgeError::SigningUnavailable(format!("signing failed: {}", e)))?;

        debug!(signer = %signer.address(), hash = %hash, "Signed payload hash");

        let mut aux = Map::new();
        aux.insert("hash".to_string(), Value::String(hash.to_string()));
        aux.insert(
            "signer".to_string(),
            Value::String(signer.address().to_checksum(None)),
        );

        Ok(SignatureOutput {
            signature: Bytes::from(signature.as_bytes().to_vec()),
            aux,
        })
    }
}
