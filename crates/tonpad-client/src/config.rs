//! Client configuration for the tonpad providers.
//!
//! [`ClientConfig`] defaults to the public testnet endpoints. Fields are
//! plain and public so callers can override any of them with struct update
//! syntax.

use std::time::Duration;

use tonpad_core::address::Network;

/// Public toncenter JSON-RPC endpoint on mainnet.
pub const TONCENTER_MAINNET: &str = "https://toncenter.com/api/v2/jsonRPC";
/// Public toncenter JSON-RPC endpoint on testnet.
pub const TONCENTER_TESTNET: &str = "https://testnet.toncenter.com/api/v2/jsonRPC";
/// Orbs ton-access gateway.
pub const TON_ACCESS_BASE: &str = "https://ton.access.orbs.network";
/// tonapi on mainnet. Exchange rates are only served here.
pub const TONAPI_MAINNET: &str = "https://tonapi.io";
/// tonapi on testnet.
pub const TONAPI_TESTNET: &str = "https://testnet.tonapi.io";

/// How the transfer path finds its RPC endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EndpointMode {
    /// Always use the configured toncenter endpoint.
    Static,
    /// Ask the ton-access gateway for a healthy node.
    #[default]
    AccessNodes,
}

/// Configuration for every HTTP provider.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Network the wallet lives on.
    pub network: Network,
    /// Toncenter endpoint override. `None` picks the public one for `network`.
    pub toncenter_endpoint: Option<String>,
    /// Sent as `X-API-Key` to toncenter when set.
    pub toncenter_api_key: Option<String>,
    /// Endpoint discovery for transfers.
    pub endpoint_mode: EndpointMode,
    /// Base URL of the ton-access gateway.
    pub access_base_url: String,
    /// Base URL for `/v2/rates`.
    pub rates_base_url: String,
    /// Base URL for `/v2/accounts/..` asset queries. `None` picks tonapi
    /// for `network`.
    pub assets_base_url: Option<String>,
    /// When false, NFT and jetton counts are reported as zero.
    pub asset_index_enabled: bool,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            network: Network::Testnet,
            toncenter_endpoint: None,
            toncenter_api_key: None,
            endpoint_mode: EndpointMode::default(),
            access_base_url: TON_ACCESS_BASE.to_string(),
            rates_base_url: TONAPI_MAINNET.to_string(),
            assets_base_url: None,
            asset_index_enabled: true,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Toncenter endpoint in effect for the configured network.
    pub fn toncenter_url(&self) -> String {
        self.toncenter_endpoint
            .clone()
            .unwrap_or_else(|| toncenter_for(self.network).to_string())
    }

    /// Asset index base URL in effect for the configured network.
    pub fn assets_url(&self) -> String {
        self.assets_base_url.clone().unwrap_or_else(|| {
            match self.network {
                Network::Mainnet => TONAPI_MAINNET,
                Network::Testnet => TONAPI_TESTNET,
            }
            .to_string()
        })
    }
}

/// Public toncenter endpoint for a network.
pub fn toncenter_for(network: Network) -> &'static str {
    match network {
        Network::Mainnet => TONCENTER_MAINNET,
        Network::Testnet => TONCENTER_TESTNET,
    }
}
