//! Scripted Signing Primitive

use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::{BridgeError, Result};
use crate::secret::PrivateKey;
use crate::signer::{SignatureOutput, SigningPrimitive};

/// Returns the same canned response on every call and records the payloads
/// it was asked to sign. The key is never recorded.
#[derive(Debug)]
pub struct ScriptedSigner {
    response: std::result::Result<String, BridgeError>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSigner {
    /// Respond with `stdout`, parsed as a signing program's output
    pub fn succeed(stdout: impl Into<String>) -> Self {
        Self {
            response: Ok(stdout.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn fail(err: BridgeError) -> Self {
        Self {
            response: Err(err),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Payload hex strings passed to `sign`, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl SigningPrimitive for ScriptedSigner {
    async fn sign(&self, payload_hex: &str, _key: &PrivateKey) -> Result<SignatureOutput> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(payload_hex.to_string());

        match &self.response {
            Ok(stdout) => SignatureOutput::from_json(stdout),
            Err(err) => Err(err.clone()),
        }
    }
}
