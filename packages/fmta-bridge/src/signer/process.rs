//! External signing program

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{SignatureOutput, SigningPrimitive};
use crate::error::{BridgeError, Result};
use crate::secret::PrivateKey;

/// Default location of the signing tool, relative to the working directory
pub const DEFAULT_SIGNER_PROGRAM: &str = "./tools/SignerTool";

/// Runs `program [args..] <payload_hex> <private_key>` and parses the JSON
/// object it prints on stdout.
#[derive(Debug, Clone)]
pub struct ProcessSigner {
    program: PathBuf,
    args: Vec<String>,
}

impl Default for ProcessSigner {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNER_PROGRAM)
    }
}

impl ProcessSigner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Fixed arguments placed before the payload and key
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }
}

#[async_trait]
impl SigningPrimitive for ProcessSigner {
    async fn sign(&self, payload_hex: &str, key: &PrivateKey) -> Result<SignatureOutput> {
        debug!(
            program = %self.program.display(),
            payload = payload_hex,
            "Invoking signing program"
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(payload_hex)
            .arg(key.expose())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                BridgeError::SigningUnavailable(format!(
                    "failed to start {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(BridgeError::SigningUnavailable(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        if !stderr.trim().is_empty() {
            warn!(
                program = %self.program.display(),
                stderr = %stderr.trim(),
                "Signing program wrote to stderr"
            );
        }

        let stdout = String::from_utf8(output.stdout).map_err(|e| {
            BridgeError::SigningProtocolError(format!("stdout is not UTF-8: {}", e))
        })?;

        SignatureOutput::from_json(&stdout)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn sh(script: &str) -> ProcessSigner {
        // `sh -c script name payload key`: payload is $1, key is $2
        ProcessSigner::new("sh").with_args(["-c", script, "signer"])
    }

    #[tokio::test]
    async fn test_receives_payload_and_key() {
        let signer = sh(r#"printf '{"signature":"0xaa","payload":"%s","keylen":%d}' "$1" "${#2}""#);
        let out = signer.sign("0x1234", &PrivateKey::new(KEY)).await.unwrap();

        assert_eq!(&out.signature[..], &[0xaa]);
        assert_eq!(out.aux["payload"], "0x1234");
        assert_eq!(out.aux["keylen"], KEY.len());
    }

    #[tokio::test]
    async fn test_missing_program_is_unavailable() {
        let signer = ProcessSigner::new("/nonexistent/signer-tool");
        let err = signer.sign("0x00", &PrivateKey::new(KEY)).await.unwrap_err();
        assert!(matches!(err, BridgeError::SigningUnavailable(_)));
        assert!(!err.to_string().contains(KEY));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_unavailable() {
        let signer = sh("echo 'bad key' >&2; exit 3");
        let err = signer.sign("0x00", &PrivateKey::new(KEY)).await.unwrap_err();
        match err {
            BridgeError::SigningUnavailable(msg) => assert!(msg.contains("bad key"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stderr_on_success_is_ignored() {
        let signer = sh(r#"echo 'deprecated flag' >&2; echo '{"signature":"0x01"}'"#);
        let out = signer.sign("0x00", &PrivateKey::new(KEY)).await.unwrap();
        assert_eq!(&out.signature[..], &[0x01]);
    }

    #[tokio::test]
    async fn test_garbage_stdout_is_protocol_error() {
        let signer = sh("echo 'signature: 0x01'");
        let err = signer.sign("0x00", &PrivateKey::new(KEY)).await.unwrap_err();
        assert!(matches!(err, BridgeError::SigningProtocolError(_)));
    }
}
