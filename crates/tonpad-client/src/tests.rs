//! Tests for the HTTP providers against a mock server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tonpad_core::address::{Address, Network};
use tonpad_core::error::ProviderError;
use tonpad_core::traits::{
    AssetCounts, AssetIndex, BalanceProvider, ChainClient, ChainConnector, EndpointResolver,
    PriceSource,
};

use crate::access::{AccessNodeResolver, StaticEndpoint};
use crate::config::{ClientConfig, EndpointMode, TONCENTER_MAINNET};
use crate::http::build_client;
use crate::providers::Providers;
use crate::toncenter::{ToncenterClient, ToncenterConnector};
use crate::tonapi::TonapiClient;

fn wallet() -> Address {
    Address::parse("0:5ddda4b5f56d3359eaea5341a958fbac6000e6d382834c8ae02819d8a80a0ce8").unwrap()
}

fn toncenter(server: &MockServer, api_key: Option<&str>) -> ToncenterClient {
    ToncenterClient::new(
        build_client(Duration::from_secs(5)),
        &format!("{}/jsonRPC", server.uri()),
        api_key.map(str::to_owned),
    )
}

async fn mount_rpc(server: &MockServer, rpc_method: &str, status: u16, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/jsonRPC"))
        .and(body_partial_json(json!({ "jsonrpc": "2.0", "method": rpc_method })))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

// ── toncenter ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_balance_from_string_result() {
    let server = MockServer::start().await;
    mount_rpc(
        &server,
        "getAddressBalance",
        200,
        json!({ "ok": true, "result": "50000000", "jsonrpc": "2.0", "id": 1 }),
    )
    .await;

    let balance = toncenter(&server, None).get_balance(&wallet()).await.unwrap();
    assert_eq!(balance, 50_000_000);
}

#[tokio::test]
async fn test_balance_request_carries_raw_address() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "getAddressBalance",
            "params": { "address": wallet().to_raw() }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": "1" })))
        .expect(1)
        .mount(&server)
        .await;

    toncenter(&server, None).get_balance(&wallet()).await.unwrap();
}

#[tokio::test]
async fn test_api_key_header_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("X-API-Key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": "7" })))
        .expect(1)
        .mount(&server)
        .await;

    let balance = toncenter(&server, Some("secret")).get_balance(&wallet()).await.unwrap();
    assert_eq!(balance, 7);
}

#[tokio::test]
async fn test_deployed_only_when_active() {
    let server = MockServer::start().await;
    mount_rpc(&server, "getAddressState", 200, json!({ "ok": true, "result": "active" })).await;
    assert!(toncenter(&server, None).is_contract_deployed(&wallet()).await.unwrap());

    let server = MockServer::start().await;
    mount_rpc(
        &server,
        "getAddressState",
        200,
        json!({ "ok": true, "result": "uninitialized" }),
    )
    .await;
    assert!(!toncenter(&server, None).is_contract_deployed(&wallet()).await.unwrap());
}

#[tokio::test]
async fn test_seqno_from_stack() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "runGetMethod",
            "params": { "method": "seqno", "stack": [] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {
                "@type": "smc.runResult",
                "gas_used": 479,
                "stack": [["num", "0x1a"]],
                "exit_code": 0
            }
        })))
        .mount(&server)
        .await;

    let seqno = toncenter(&server, None).get_seqno(&wallet()).await.unwrap();
    assert_eq!(seqno, 26);
}

#[tokio::test]
async fn test_seqno_exit_code_checked() {
    let server = MockServer::start().await;
    mount_rpc(
        &server,
        "runGetMethod",
        200,
        json!({ "ok": true, "result": { "stack": [], "exit_code": -13 } }),
    )
    .await;

    let err = toncenter(&server, None).get_seqno(&wallet()).await.unwrap_err();
    assert_eq!(
        err,
        ProviderError::GetMethod {
            method: "seqno".into(),
            exit_code: -13
        }
    );
}

#[tokio::test]
async fn test_send_boc_encodes_base64() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "sendBoc",
            "params": { "boc": "te6ccgEBAQEAAgAAAA==" }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": { "@type": "ok" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let boc = hex_bytes("b5ee9c72010101010002000000");
    toncenter(&server, None).send_boc(&boc).await.unwrap();
}

#[tokio::test]
async fn test_rpc_error_message_surfaces() {
    let server = MockServer::start().await;
    mount_rpc(
        &server,
        "sendBoc",
        500,
        json!({
            "ok": false,
            "error": "LITE_SERVER_UNKNOWN: cannot apply external message to current state",
            "code": 500
        }),
    )
    .await;

    let err = toncenter(&server, None).send_boc(&[0u8]).await.unwrap_err();
    assert!(matches!(err, ProviderError::Rpc { code: Some(500), .. }));
    assert!(err.to_string().contains("cannot apply external message"));
}

#[tokio::test]
async fn test_non_json_error_is_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = toncenter(&server, None).get_balance(&wallet()).await.unwrap_err();
    assert_eq!(
        err,
        ProviderError::Status {
            status: 502,
            body: "bad gateway".into()
        }
    );
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let client = ToncenterClient::new(
        build_client(Duration::from_secs(1)),
        "http://127.0.0.1:1/jsonRPC",
        None,
    );
    let err = client.get_balance(&wallet()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)));
}

#[tokio::test]
async fn test_connector_binds_endpoint() {
    let server = MockServer::start().await;
    mount_rpc(&server, "getAddressState", 200, json!({ "ok": true, "result": "active" })).await;

    let connector = ToncenterConnector::new(build_client(Duration::from_secs(5)), None);
    let client = connector.connect(&format!("{}/jsonRPC", server.uri()));
    assert!(client.is_contract_deployed(&wallet()).await.unwrap());
}

// ── endpoint resolvers ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_static_endpoint() {
    let fixed = StaticEndpoint::new(Some("http://node/jsonRPC".into()));
    assert_eq!(fixed.resolve(Network::Testnet).await.unwrap(), "http://node/jsonRPC");

    let public = StaticEndpoint::default();
    assert_eq!(public.resolve(Network::Mainnet).await.unwrap(), TONCENTER_MAINNET);
}

#[tokio::test]
async fn test_access_picks_healthy_node() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mngr/nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "NodeId": "down", "Healthy": "0" },
            { "NodeId": "v2-off", "Healthy": "1", "Mngr": { "health": { "v2-testnet": false } } },
            { "NodeId": "up", "Healthy": "1", "Mngr": { "health": { "v2-testnet": true } } }
        ])))
        .mount(&server)
        .await;

    let resolver = AccessNodeResolver::new(build_client(Duration::from_secs(5)), &server.uri());
    let url = resolver.resolve(Network::Testnet).await.unwrap();
    assert_eq!(
        url,
        format!("{}/up/1/testnet/toncenter-api-v2/jsonRPC", server.uri())
    );
}

#[tokio::test]
async fn test_access_without_healthy_nodes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mngr/nodes"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "NodeId": "a", "Healthy": "0" }])),
        )
        .mount(&server)
        .await;

    let resolver = AccessNodeResolver::new(build_client(Duration::from_secs(5)), &server.uri());
    let err = resolver.resolve(Network::Testnet).await.unwrap_err();
    assert_eq!(err, ProviderError::NoEndpoint("testnet".into()));
}

// ── tonapi ───────────────────────────────────────────────────────────────────

fn tonapi(server: &MockServer) -> TonapiClient {
    TonapiClient::new(build_client(Duration::from_secs(5)), &server.uri(), &server.uri())
}

#[tokio::test]
async fn test_usd_price() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/rates"))
        .and(query_param("tokens", "ton"))
        .and(query_param("currencies", "usd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rates": { "TON": { "prices": { "USD": 5.23 } } }
        })))
        .mount(&server)
        .await;

    assert_eq!(tonapi(&server).usd_price().await.unwrap(), 5.23);
}

#[tokio::test]
async fn test_usd_price_missing_pair() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/rates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "rates": {} })))
        .mount(&server)
        .await;

    let err = tonapi(&server).usd_price().await.unwrap_err();
    assert!(matches!(err, ProviderError::Decode(_)));
}

#[tokio::test]
async fn test_usd_price_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let err = tonapi(&server).usd_price().await.unwrap_err();
    assert_eq!(
        err,
        ProviderError::Status {
            status: 429,
            body: "rate limited".into()
        }
    );
}

#[tokio::test]
async fn test_asset_counts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v2/accounts/[^/]+/nfts$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nft_items": [{ "address": "0:01" }, { "address": "0:02" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v2/accounts/[^/]+/jettons$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "balances": [{ "balance": "1000" }]
        })))
        .mount(&server)
        .await;

    let counts = tonapi(&server).asset_counts(&wallet()).await.unwrap();
    assert_eq!(counts, AssetCounts { nfts: 2, jettons: 1 });
}

#[tokio::test]
async fn test_nft_count_spans_pages() {
    let server = MockServer::start().await;
    let full_page: Vec<_> = (0..1000).map(|i| json!({ "index": i })).collect();
    Mock::given(method("GET"))
        .and(path_regex(r"/nfts$"))
        .and(query_param("limit", "1000"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "nft_items": full_page })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"/nfts$"))
        .and(query_param("offset", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nft_items": [{ "index": 1000 }, { "index": 1001 }, { "index": 1002 }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"/jettons$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "balances": [] })))
        .mount(&server)
        .await;

    let counts = tonapi(&server).asset_counts(&wallet()).await.unwrap();
    assert_eq!(counts, AssetCounts { nfts: 1003, jettons: 0 });
}

#[tokio::test]
async fn test_asset_counts_fail_together() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"/nfts$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "nft_items": [] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"/jettons$"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(tonapi(&server).asset_counts(&wallet()).await.is_err());
}

// ── provider bundle ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_providers_from_config() {
    let server = MockServer::start().await;
    mount_rpc(&server, "getAddressBalance", 200, json!({ "ok": true, "result": "42" })).await;

    let endpoint = format!("{}/jsonRPC", server.uri());
    let config = ClientConfig {
        toncenter_endpoint: Some(endpoint.clone()),
        endpoint_mode: EndpointMode::Static,
        asset_index_enabled: false,
        ..ClientConfig::default()
    };
    let providers = Providers::from_config(&config);

    assert_eq!(providers.network, Network::Testnet);
    assert_eq!(providers.balance.get_balance(&wallet()).await.unwrap(), 42);
    assert_eq!(
        providers.assets.asset_counts(&wallet()).await.unwrap(),
        AssetCounts::default()
    );
    assert_eq!(
        providers.endpoints.resolve(Network::Testnet).await.unwrap(),
        endpoint
    );
}

fn hex_bytes(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}
