//! RPC endpoint resolvers.
//!
//! [`StaticEndpoint`] always returns a configured toncenter URL.
//! [`AccessNodeResolver`] asks the Orbs ton-access gateway for its node list
//! and picks a random healthy node per call.

use std::collections::HashMap;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use tonpad_core::address::Network;
use tonpad_core::error::ProviderError;
use tonpad_core::traits::EndpointResolver;

use crate::config::toncenter_for;
use crate::http::get_json;

/// Returns a fixed endpoint, or the public toncenter URL for the network.
#[derive(Debug, Clone, Default)]
pub struct StaticEndpoint {
    endpoint: Option<String>,
}

impl StaticEndpoint {
    pub fn new(endpoint: Option<String>) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl EndpointResolver for StaticEndpoint {
    async fn resolve(&self, network: Network) -> Result<String, ProviderError> {
        Ok(self
            .endpoint
            .clone()
            .unwrap_or_else(|| toncenter_for(network).to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct AccessNode {
    #[serde(rename = "NodeId")]
    node_id: String,
    #[serde(rename = "Healthy", default)]
    healthy: String,
    #[serde(rename = "Mngr", default)]
    mngr: Option<NodeManager>,
}

#[derive(Debug, Default, Deserialize)]
struct NodeManager {
    #[serde(default)]
    health: HashMap<String, bool>,
}

impl AccessNode {
    /// A node is usable when it reports itself healthy and, if it publishes
    /// per-protocol health, the toncenter v2 service for `network` is up.
    fn serves(&self, network: Network) -> bool {
        if self.healthy != "1" {
            return false;
        }
        let key = format!("v2-{}", network.name());
        self.mngr
            .as_ref()
            .and_then(|m| m.health.get(&key).copied())
            .unwrap_or(true)
    }
}

/// Resolves a toncenter v2 endpoint through the ton-access gateway.
#[derive(Debug, Clone)]
pub struct AccessNodeResolver {
    http: Client,
    base_url: String,
}

impl AccessNodeResolver {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl EndpointResolver for AccessNodeResolver {
    async fn resolve(&self, network: Network) -> Result<String, ProviderError> {
        let nodes: Vec<AccessNode> =
            get_json(&self.http, &format!("{}/mngr/nodes", self.base_url)).await?;
        let healthy: Vec<&AccessNode> = nodes.iter().filter(|n| n.serves(network)).collect();
        let node = healthy
            .choose(&mut rand::thread_rng())
            .ok_or_else(|| ProviderError::NoEndpoint(network.name().to_string()))?;
        let url = format!(
            "{}/{}/1/{}/toncenter-api-v2/jsonRPC",
            self.base_url,
            node.node_id,
            network.name()
        );
        debug!(%url, candidates = healthy.len(), "resolved ton-access endpoint");
        Ok(url)
    }
}
