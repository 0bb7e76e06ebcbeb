//! EVM Chain Support Module
//!
//! Live implementations of the reconciler's collaborator traits for bridge
//! and token contracts on EVM-compatible chains.
//!
//! ## Submodules
//!
//! - `contracts` - Bridge and token bindings using alloy sol! macro
//! - `collaborators` - `EvmBridge` / `EvmToken` over an alloy provider

pub mod collaborators;
pub mod contracts;

// Re-export commonly used items
pub use collaborators::{EvmBridge, EvmToken};
pub use contracts::{FmtaBridge, FmtaToken};
