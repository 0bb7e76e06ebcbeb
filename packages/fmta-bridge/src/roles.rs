//! Access-control role identifiers
//!
//! The identifiers are fixed 32-byte constants shared verbatim by every
//! bridge and token deployment. They are never derived or negotiated.

use alloy::primitives::{b256, B256};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Admin,
    Mint,
    MintTo,
    Burn,
    BurnFrom,
    /// Held by validators on the bridge
    Deposit,
    Staking,
    /// Held by the bridge on wrapped tokens
    BridgeTx,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Admin,
        Role::Mint,
        Role::MintTo,
        Role::Burn,
        Role::BurnFrom,
        Role::Deposit,
        Role::Staking,
        Role::BridgeTx,
    ];

    pub const fn id(&self) -> B256 {
        match self {
            Role::Admin => b256!("ae6c2fc584631af4c9385b8a55683f1a75c813747e27efef5afece31c6b230d3"),
            Role::Mint => b256!("8c66330d9d4f6aba064f25ef2a307366ea6d917616f44c075aa60fa15e5cb1cb"),
            Role::MintTo => b256!("7d800f56a05adcb6245df540492a560d0e668aac15ee6c7dd40668064913da33"),
            Role::Burn => b256!("9edfad36e7d4d9da54b4f78f22bf97cb5b58bb7998294a4288da41c15c647c45"),
            Role::BurnFrom => b256!("c8a3befa5973ff6e159afc769978d92f26bae29c51a73d11c9112a05b68d25e6"),
            Role::Deposit => b256!("587067af7acf278357651084bc3b5223d9fae81a768c4f25238b853ff2756ada"),
            Role::Staking => b256!("7308377bbcfee4c643b62e55a600f0c1ee294f1d8949667b05bfef816828e284"),
            Role::BridgeTx => b256!("8c07325f686988417936836fa712928a5e8319c01e2032f132d3f5bc3de91a47"),
        }
    }

    /// Name used in deployment configuration files
    pub fn name(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Mint => "mint",
            Role::MintTo => "mintTo",
            Role::Burn => "burn",
            Role::BurnFrom => "burnFrom",
            Role::Deposit => "deposit",
            Role::Staking => "staking",
            Role::BridgeTx => "bridgeTx",
        }
    }

    pub fn from_name(name: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|r| r.name() == name)
    }

    pub fn from_id(id: &B256) -> Option<Role> {
        Role::ALL.into_iter().find(|r| r.id() == *id)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
