//! Bridge and token contract ABI definitions
//!
//! Uses alloy's sol! macro to generate type-safe bindings for the subset of
//! each contract the reconciler drives.

use alloy::sol;

sol! {
    /// Bridge contract interface
    #[derive(Debug)]
    #[sol(rpc)]
    contract FmtaBridge {
        /// Registration of a bridge token id
        struct BridgeToken {
            address token;
            bool isWrapped;
            uint8 decimals;
            bool canWithdraw;
            bool canDeposit;
        }

        // ========================================================================
        // Access Control
        // ========================================================================

        function hasRole(bytes32 role, address account) external view returns (bool);
        function grantRole(bytes32 role, address account) external;

        // ========================================================================
        // Token Registry
        // ========================================================================

        /// Registration at `id`; the zero address when unregistered
        function queryToken(uint32 id) external view returns (BridgeToken memory);

        function addToken(uint32 id, bool isWrapped, uint8 decimals, address token) external;
        function setTokenCanWithdraw(uint32 id, bool canWithdraw) external;
        function setTokenCanDeposit(uint32 id, bool canDeposit) external;
    }

    /// Bridgeable token interface
    #[derive(Debug)]
    #[sol(rpc)]
    contract FmtaToken {
        function hasRole(bytes32 role, address account) external view returns (bool);
        function grantRole(bytes32 role, address account) external;
        function paused() external view returns (bool);
        function setPaused(bool paused) external;
    }
}
