//! The provider bundle handed to the wallet session.

use std::sync::Arc;

use tonpad_core::address::Network;
use tonpad_core::traits::{
    AssetIndex, BalanceProvider, ChainConnector, EndpointResolver, PriceSource,
};

use crate::access::{AccessNodeResolver, StaticEndpoint};
use crate::config::{ClientConfig, EndpointMode};
use crate::http::build_client;
use crate::toncenter::{ToncenterClient, ToncenterConnector};
use crate::tonapi::{NoAssetIndex, TonapiClient};

/// Every external capability the wallet needs, built once at start-up.
#[derive(Clone)]
pub struct Providers {
    pub network: Network,
    pub balance: Arc<dyn BalanceProvider>,
    pub assets: Arc<dyn AssetIndex>,
    pub endpoints: Arc<dyn EndpointResolver>,
    pub connector: Arc<dyn ChainConnector>,
    pub prices: Arc<dyn PriceSource>,
}

impl Providers {
    /// Wire up the HTTP implementations described by `config`. All clients
    /// share one connection pool.
    pub fn from_config(config: &ClientConfig) -> Self {
        let http = build_client(config.request_timeout);
        let api_key = config.toncenter_api_key.clone();
        let toncenter = ToncenterClient::new(http.clone(), &config.toncenter_url(), api_key.clone());
        let tonapi = TonapiClient::new(http.clone(), &config.rates_base_url, &config.assets_url());

        let endpoints: Arc<dyn EndpointResolver> = match config.endpoint_mode {
            EndpointMode::Static => Arc::new(StaticEndpoint::new(config.toncenter_endpoint.clone())),
            EndpointMode::AccessNodes => {
                Arc::new(AccessNodeResolver::new(http.clone(), &config.access_base_url))
            }
        };
        let assets: Arc<dyn AssetIndex> = if config.asset_index_enabled {
            Arc::new(tonapi.clone())
        } else {
            Arc::new(NoAssetIndex)
        };

        Self {
            network: config.network,
            balance: Arc::new(toncenter),
            assets,
            endpoints,
            connector: Arc::new(ToncenterConnector::new(http, api_key)),
            prices: Arc::new(tonapi),
        }
    }
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Providers")
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}
