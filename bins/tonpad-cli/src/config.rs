//! CLI configuration loaded from `TONPAD_*` environment variables.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use tonpad_client::{ClientConfig, EndpointMode};
use tonpad_wallet::SessionConfig;

#[derive(Clone, Debug)]
pub struct Config {
    /// Provider wiring.
    pub client: ClientConfig,
    /// Transfer comment, send mode and price period.
    pub session: SessionConfig,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut client = ClientConfig::default();
        let mut session = SessionConfig::default();

        if let Some(network) = lookup("TONPAD_NETWORK") {
            client.network = network
                .parse()
                .map_err(anyhow::Error::msg)
                .context("TONPAD_NETWORK")?;
        }
        client.toncenter_endpoint = lookup("TONPAD_TONCENTER_ENDPOINT");
        client.toncenter_api_key = lookup("TONPAD_TONCENTER_API_KEY");

        if let Some(mode) = lookup("TONPAD_ENDPOINT_MODE") {
            client.endpoint_mode = parse_mode(&mode)?;
        }
        if let Some(url) = lookup("TONPAD_ACCESS_BASE_URL") {
            client.access_base_url = url;
        }
        if let Some(url) = lookup("TONPAD_RATES_BASE_URL") {
            client.rates_base_url = url;
        }
        client.assets_base_url = lookup("TONPAD_ASSETS_BASE_URL");

        if let Some(flag) = lookup("TONPAD_ASSET_INDEX") {
            client.asset_index_enabled =
                parse_bool(&flag).context("TONPAD_ASSET_INDEX must be true or false")?;
        }
        if let Some(secs) = lookup("TONPAD_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .context("TONPAD_REQUEST_TIMEOUT_SECS must be a positive integer")?;
            client.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = lookup("TONPAD_PRICE_POLL_SECS") {
            let secs: u64 = secs
                .parse()
                .context("TONPAD_PRICE_POLL_SECS must be a positive integer")?;
            if secs == 0 {
                bail!("TONPAD_PRICE_POLL_SECS must be greater than zero");
            }
            session.price_period = Duration::from_secs(secs);
        }
        if let Some(comment) = lookup("TONPAD_TRANSFER_COMMENT") {
            session.transfer_comment = comment;
        }

        Ok(Config { client, session })
    }
}

fn parse_mode(s: &str) -> Result<EndpointMode> {
    match s.to_lowercase().as_str() {
        "static" | "toncenter" => Ok(EndpointMode::Static),
        "access" | "ton-access" => Ok(EndpointMode::AccessNodes),
        _ => bail!("Invalid TONPAD_ENDPOINT_MODE '{s}' (must be 'static' or 'access')"),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tonpad_core::address::Network;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.client.network, Network::Testnet);
        assert_eq!(cfg.client.endpoint_mode, EndpointMode::AccessNodes);
        assert!(cfg.client.asset_index_enabled);
        assert_eq!(cfg.session.price_period, Duration::from_secs(60));
        assert_eq!(cfg.session.transfer_comment, "Test Transfer");
    }

    #[test]
    fn overrides_applied() {
        let cfg = load(&[
            ("TONPAD_NETWORK", "mainnet"),
            ("TONPAD_TONCENTER_ENDPOINT", "http://localhost:8081/jsonRPC"),
            ("TONPAD_TONCENTER_API_KEY", "k"),
            ("TONPAD_ENDPOINT_MODE", "static"),
            ("TONPAD_ASSET_INDEX", "off"),
            ("TONPAD_PRICE_POLL_SECS", "15"),
            ("TONPAD_REQUEST_TIMEOUT_SECS", "3"),
            ("TONPAD_TRANSFER_COMMENT", "hello"),
        ])
        .unwrap();
        assert_eq!(cfg.client.network, Network::Mainnet);
        assert_eq!(cfg.client.toncenter_url(), "http://localhost:8081/jsonRPC");
        assert_eq!(cfg.client.toncenter_api_key.as_deref(), Some("k"));
        assert_eq!(cfg.client.endpoint_mode, EndpointMode::Static);
        assert!(!cfg.client.asset_index_enabled);
        assert_eq!(cfg.client.request_timeout, Duration::from_secs(3));
        assert_eq!(cfg.session.price_period, Duration::from_secs(15));
        assert_eq!(cfg.session.transfer_comment, "hello");
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(load(&[("TONPAD_NETWORK", "devnet")]).is_err());
        assert!(load(&[("TONPAD_ENDPOINT_MODE", "magic")]).is_err());
        assert!(load(&[("TONPAD_ASSET_INDEX", "maybe")]).is_err());
        assert!(load(&[("TONPAD_PRICE_POLL_SECS", "0")]).is_err());
        assert!(load(&[("TONPAD_PRICE_POLL_SECS", "soon")]).is_err());
    }
}
