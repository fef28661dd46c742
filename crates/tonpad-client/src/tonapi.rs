//! tonapi REST client: TON/USD rate and account asset counts.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use tonpad_core::address::Address;
use tonpad_core::error::ProviderError;
use tonpad_core::traits::{AssetCounts, AssetIndex, PriceSource};

use crate::http::get_json;

/// Largest `limit` tonapi accepts on `/nfts`.
const NFT_PAGE_SIZE: usize = 1000;

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, TokenRates>,
}

#[derive(Debug, Deserialize)]
struct TokenRates {
    prices: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct NftItems {
    nft_items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct JettonBalances {
    balances: Vec<Value>,
}

/// Client for the tonapi v2 REST API.
#[derive(Debug, Clone)]
pub struct TonapiClient {
    http: Client,
    rates_base: String,
    assets_base: String,
}

impl TonapiClient {
    /// `rates_base` serves `/v2/rates`; `assets_base` serves
    /// `/v2/accounts/..`. They differ when the wallet is on testnet.
    pub fn new(http: Client, rates_base: &str, assets_base: &str) -> Self {
        Self {
            http,
            rates_base: rates_base.trim_end_matches('/').to_owned(),
            assets_base: assets_base.trim_end_matches('/').to_owned(),
        }
    }

    /// Pages through `/nfts` until a short page.
    async fn nft_count(&self, address: &Address) -> Result<u64, ProviderError> {
        let mut total = 0u64;
        let mut offset = 0usize;
        loop {
            let url = format!(
                "{}/v2/accounts/{}/nfts?limit={NFT_PAGE_SIZE}&offset={offset}",
                self.assets_base,
                address.to_raw()
            );
            let page: NftItems = get_json(&self.http, &url).await?;
            let len = page.nft_items.len();
            total += len as u64;
            if len < NFT_PAGE_SIZE {
                return Ok(total);
            }
            offset += len;
        }
    }

    async fn jetton_count(&self, address: &Address) -> Result<u64, ProviderError> {
        let url = format!(
            "{}/v2/accounts/{}/jettons",
            self.assets_base,
            address.to_raw()
        );
        let balances: JettonBalances = get_json(&self.http, &url).await?;
        Ok(balances.balances.len() as u64)
    }
}

#[async_trait]
impl PriceSource for TonapiClient {
    async fn usd_price(&self) -> Result<f64, ProviderError> {
        let url = format!("{}/v2/rates?tokens=ton&currencies=usd", self.rates_base);
        let resp: RatesResponse = get_json(&self.http, &url).await?;
        resp.rates
            .get("TON")
            .and_then(|r| r.prices.get("USD"))
            .copied()
            .ok_or_else(|| ProviderError::Decode("rates: missing TON/USD".into()))
    }
}

#[async_trait]
impl AssetIndex for TonapiClient {
    async fn asset_counts(&self, address: &Address) -> Result<AssetCounts, ProviderError> {
        let (nfts, jettons) = tokio::join!(self.nft_count(address), self.jetton_count(address));
        Ok(AssetCounts {
            nfts: nfts?,
            jettons: jettons?,
        })
    }
}

/// Reports zero NFTs and jettons without any network access.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssetIndex;

#[async_trait]
impl AssetIndex for NoAssetIndex {
    async fn asset_counts(&self, _address: &Address) -> Result<AssetCounts, ProviderError> {
        Ok(AssetCounts::default())
    }
}
