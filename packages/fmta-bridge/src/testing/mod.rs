//! Testing Utilities Module
//!
//! In-memory stand-ins for the chain collaborators and the signing
//! primitive, for unit tests and for downstream crates' tests.
//!
//! ## Submodules
//!
//! - `mocks` - `MockBridge` and `MockToken` with call recording and failure injection
//! - `signer` - `ScriptedSigner` returning canned output

pub mod mocks;
pub mod signer;

pub use mocks::*;
pub use signer::*;
