//! FMTA Bridge: transfer payloads, signing and contract configuration
//!
//! This crate provides the client-side pieces of the Fundamenta token bridge:
//!
//! - **Units** - Exact decimal <-> atomic unit conversion
//! - **Nonce** - 32-byte transfer nonces (timestamp | sender | random)
//! - **Codec** - The fixed 108-byte transfer payload and its hex wire form
//! - **Signer** - Signing payloads through an external program or in process
//! - **Reconcile** - Idempotent role, registration and pause configuration
//!   of deployed bridge and token contracts
//! - **EVM Module** - alloy-backed bridge and token collaborators
//! - **Testing Module** - In-memory collaborators and a scripted signer
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! fmta-bridge = { path = "../fmta-bridge" }
//! ```
//!
//! ## Feature Flags
//!
//! - `evm` - Enable the alloy-backed collaborators (default)
//! - `testing` - Enable testing utilities for downstream tests
//! - `full` - Enable all features

// Core modules (always available)
pub mod codec;
pub mod error;
pub mod nonce;
pub mod reconcile;
pub mod roles;
pub mod secret;
pub mod signer;
pub mod types;
pub mod units;

// Chain-specific modules (feature-gated)
#[cfg(feature = "evm")]
pub mod evm;

// Testing utilities (feature-gated)
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used items at the crate root
pub use codec::{
    address_to_bytes32, bytes32_to_address, decode, encode, keccak256, DecodedTransfer,
    TransferCodec, TransferPayload, TransferRecord, PAYLOAD_LEN,
};
pub use error::{BridgeError, CallError, Result};
pub use nonce::Nonce;
pub use reconcile::{
    reconcile_operator, reconcile_token, reconcile_token_with_operator, reconcile_validators,
    AccessControl, BridgeContract, ContractKind, Mutation, ReconcileReport, ReconcileStep,
    Reconciler, TokenContract,
};
pub use roles::Role;
pub use secret::PrivateKey;
pub use signer::{
    sign_transfer, LocalSigner, ProcessSigner, SignatureOutput, SignedTransfer, SigningPrimitive,
};
pub use types::{NetworkId, TokenQuery, TokenRegistration, TransferIntent, REGISTRATION_DECIMALS};
pub use units::{from_atomic, to_atomic, to_atomic_hex, DEFAULT_DECIMALS};
