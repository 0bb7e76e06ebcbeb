//! Private key handling
//!
//! [`PrivateKey`] is never exposed through `Debug`, `Display` or `Serialize`;
//! all three output `"<redacted>"`. The raw value is reachable only through
//! [`PrivateKey::expose`], which the signing primitives call when handing
//! the key to the signer.

use std::fmt;

#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(String);

impl PrivateKey {
    /// Wrap a hex private key. A `0x` prefix is kept as given.
    pub fn new(key: impl Into<String>) -> Self {
        PrivateKey(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for PrivateKey {
    fn from(key: String) -> Self {
        PrivateKey(key)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl serde::Serialize for PrivateKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        "<redacted>".serialize(serializer)
    }
}
