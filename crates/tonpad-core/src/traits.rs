//! Provider seams between the wallet logic and the network.
//!
//! The wallet crate depends only on these traits; `tonpad-client` supplies
//! HTTP implementations. With the `testing` feature, mockall generates a
//! `Mock*` type for each trait.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::address::{Address, Network};
use crate::error::ProviderError;

/// Number of NFTs and jetton balances held by an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCounts {
    pub nfts: u64,
    pub jettons: u64,
}

/// Reads the TON balance of an account.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait BalanceProvider: Send + Sync {
    /// Balance in nanotons.
    async fn get_balance(&self, address: &Address) -> Result<u64, ProviderError>;
}

/// Counts the NFTs and jettons an account holds.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait AssetIndex: Send + Sync {
    async fn asset_counts(&self, address: &Address) -> Result<AssetCounts, ProviderError>;
}

/// Picks an RPC endpoint URL for a network.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait EndpointResolver: Send + Sync {
    async fn resolve(&self, network: Network) -> Result<String, ProviderError>;
}

/// Account state queries and message submission against one endpoint.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Whether the account has an active contract.
    async fn is_contract_deployed(&self, address: &Address) -> Result<bool, ProviderError>;

    /// Current `seqno` of a wallet contract.
    async fn get_seqno(&self, address: &Address) -> Result<u32, ProviderError>;

    /// Submit a serialized external message. Returns once the endpoint
    /// accepts it.
    async fn send_boc(&self, boc: &[u8]) -> Result<(), ProviderError>;
}

/// Builds a [`ChainClient`] bound to an endpoint URL.
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait ChainConnector: Send + Sync {
    fn connect(&self, endpoint: &str) -> Arc<dyn ChainClient>;
}

/// Quotes the current TON price.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Price of one TON in US dollars.
    async fn usd_price(&self) -> Result<f64, ProviderError>;
}
