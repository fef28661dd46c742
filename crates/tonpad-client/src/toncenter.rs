//! Toncenter v2 JSON-RPC client.
//!
//! Every call is a `POST` of `{"id", "jsonrpc", "method", "params"}` with
//! named params. Toncenter answers `{"ok": true, "result": ..}` or
//! `{"ok": false, "error": "..", "code": ..}`, often with a non-2xx status.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use tonpad_core::address::Address;
use tonpad_core::error::ProviderError;
use tonpad_core::traits::{BalanceProvider, ChainClient, ChainConnector};

use crate::http::transport;

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    ok: Option<bool>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    code: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct GetMethodResult {
    #[serde(default)]
    stack: Vec<Vec<Value>>,
    exit_code: i64,
}

/// JSON-RPC client bound to one toncenter endpoint.
#[derive(Debug, Clone)]
pub struct ToncenterClient {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ToncenterClient {
    pub fn new(http: Client, endpoint: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.to_owned(),
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issue one JSON-RPC call and decode its `result`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, ProviderError> {
        let body = json!({
            "id": 1,
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });
        let mut req = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            req = req.header("X-API-Key", key);
        }
        debug!(method, endpoint = %self.endpoint, "toncenter call");

        let resp = req.send().await.map_err(transport)?;
        let status = resp.status();
        let text = resp.text().await.map_err(transport)?;

        let parsed: RpcResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => return Err(ProviderError::Decode(e.to_string())),
            Err(_) => {
                return Err(ProviderError::Status {
                    status: status.as_u16(),
                    body: text,
                });
            }
        };

        if let Some(err) = parsed.error.filter(|e| !e.is_null()) {
            return Err(rpc_error(err, parsed.code));
        }
        if parsed.ok == Some(false) {
            return Err(ProviderError::Rpc {
                code: parsed.code,
                message: "request rejected".to_string(),
            });
        }
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let result = parsed
            .result
            .ok_or_else(|| ProviderError::Decode(format!("{method}: missing result")))?;
        serde_json::from_value(result).map_err(|e| ProviderError::Decode(format!("{method}: {e}")))
    }

    /// Account state as reported by toncenter: `active`, `uninitialized` or
    /// `frozen`.
    pub async fn get_address_state(&self, address: &Address) -> Result<String, ProviderError> {
        self.call("getAddressState", json!({ "address": address.to_raw() }))
            .await
    }

    /// Run a get-method with an empty stack and return its result stack.
    pub async fn run_get_method(
        &self,
        address: &Address,
        method: &str,
    ) -> Result<Vec<Vec<Value>>, ProviderError> {
        let result: GetMethodResult = self
            .call(
                "runGetMethod",
                json!({ "address": address.to_raw(), "method": method, "stack": [] }),
            )
            .await?;
        if result.exit_code != 0 && result.exit_code != 1 {
            return Err(ProviderError::GetMethod {
                method: method.to_string(),
                exit_code: result.exit_code,
            });
        }
        Ok(result.stack)
    }
}

#[async_trait]
impl BalanceProvider for ToncenterClient {
    async fn get_balance(&self, address: &Address) -> Result<u64, ProviderError> {
        let value: Value = self
            .call("getAddressBalance", json!({ "address": address.to_raw() }))
            .await?;
        parse_u64(&value)
            .ok_or_else(|| ProviderError::Decode(format!("getAddressBalance: {value}")))
    }
}

#[async_trait]
impl ChainClient for ToncenterClient {
    async fn is_contract_deployed(&self, address: &Address) -> Result<bool, ProviderError> {
        Ok(self.get_address_state(address).await? == "active")
    }

    async fn get_seqno(&self, address: &Address) -> Result<u32, ProviderError> {
        let stack = self.run_get_method(address, "seqno").await?;
        let entry = stack
            .first()
            .ok_or_else(|| ProviderError::Decode("seqno: empty stack".into()))?;
        match (entry.first().and_then(Value::as_str), entry.get(1)) {
            (Some("num"), Some(Value::String(hex))) => parse_stack_num(hex)
                .ok_or_else(|| ProviderError::Decode(format!("seqno: bad number {hex}"))),
            _ => Err(ProviderError::Decode(format!("seqno: unexpected entry {entry:?}"))),
        }
    }

    async fn send_boc(&self, boc: &[u8]) -> Result<(), ProviderError> {
        let _: Value = self
            .call("sendBoc", json!({ "boc": STANDARD.encode(boc) }))
            .await?;
        Ok(())
    }
}

/// Opens [`ToncenterClient`]s on resolved endpoints, sharing one HTTP pool.
#[derive(Debug, Clone)]
pub struct ToncenterConnector {
    http: Client,
    api_key: Option<String>,
}

impl ToncenterConnector {
    pub fn new(http: Client, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }
}

impl ChainConnector for ToncenterConnector {
    fn connect(&self, endpoint: &str) -> Arc<dyn ChainClient> {
        Arc::new(ToncenterClient::new(
            self.http.clone(),
            endpoint,
            self.api_key.clone(),
        ))
    }
}

fn rpc_error(err: Value, code: Option<i64>) -> ProviderError {
    match err {
        Value::String(message) => ProviderError::Rpc { code, message },
        Value::Object(obj) => ProviderError::Rpc {
            code: obj.get("code").and_then(Value::as_i64).or(code),
            message: obj
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| Value::Object(obj.clone()).to_string()),
        },
        other => ProviderError::Rpc {
            code,
            message: other.to_string(),
        },
    }
}

fn parse_u64(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// Parse a stack number such as `0x1a` or `-0x1`. Negative values are
/// rejected.
fn parse_stack_num(s: &str) -> Option<u32> {
    let hex = s.strip_prefix("0x")?;
    u32::from_str_radix(hex, 16).ok()
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn stack_numbers() {
        assert_eq!(parse_stack_num("0x0"), Some(0));
        assert_eq!(parse_stack_num("0x1a"), Some(26));
        assert_eq!(parse_stack_num("-0x1"), None);
        assert_eq!(parse_stack_num("12"), None);
    }

    #[test]
    fn balance_as_string_or_number() {
        assert_eq!(parse_u64(&json!("50000000")), Some(50_000_000));
        assert_eq!(parse_u64(&json!(7)), Some(7));
        assert_eq!(parse_u64(&json!(null)), None);
    }

    #[test]
    fn rpc_error_shapes() {
        let e = rpc_error(json!("LITE_SERVER_UNKNOWN"), Some(500));
        assert_eq!(e.to_string(), "rpc error 500: LITE_SERVER_UNKNOWN");
        let e = rpc_error(json!({"code": -32601, "message": "no such method"}), None);
        assert_eq!(e.to_string(), "rpc error -32601: no such method");
    }
}
