//! EVM JSON-RPC client
//!
//! Builds request bodies, parses responses and routes each read to one of two
//! sources: the primary endpoint, or the fallback cluster (endpoints tried in
//! order, the first successful answer wins).

use num_bigint::BigUint;
use num_traits::Num;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::cell::Cell;
use crate::infrastructure::errors::{DecodeError, LockerError, Result, RpcError};
use crate::infrastructure::log;
use crate::types::Address;
use super::abi::{from_hex_data, to_hex_data};

/// Which side of the resilient call a read goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Primary,
    Fallback,
}

/// Byte transport under the JSON-RPC client
#[allow(async_fn_in_trait)]
pub trait HttpTransport {
    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>>;
    async fn pause(&self, millis: u64);
}

/// Read-only chain access used by the loaders, the selector and confirmations
#[allow(async_fn_in_trait)]
pub trait ChainReader {
    async fn call(&self, source: Source, to: &Address, data: &[u8]) -> Result<Vec<u8>>;
    async fn balance(&self, source: Source, account: &Address) -> Result<BigUint>;
    /// `None` while the transaction is pending
    async fn receipt(&self, source: Source, tx_hash: &str) -> Result<Option<TxReceipt>>;
    async fn chain_id(&self, source: Source) -> Result<u64>;
    async fn pause(&self, millis: u64);
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub address: Address,
    pub topics: Vec<Vec<u8>>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TxReceipt {
    pub succeeded: bool,
    pub logs: Vec<LogEntry>,
}

// ===== Wire types =====

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct RawReceipt {
    status: Option<String>,
    #[serde(default)]
    logs: Vec<RawLog>,
}

#[derive(Deserialize)]
struct RawLog {
    address: String,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    data: String,
}

pub fn request_body(id: u64, method: &str, params: Value) -> Result<Vec<u8>> {
    serde_json::to_vec(&RpcRequest { jsonrpc: "2.0", id, method, params })
        .map_err(|e| LockerError::Other(format!("Failed to encode {} request: {}", method, e)))
}

pub fn eth_call_params(to: &Address, data: &[u8]) -> Value {
    json!([{ "to": to.to_hex(), "data": to_hex_data(data) }, "latest"])
}

pub fn eth_get_balance_params(account: &Address) -> Value {
    json!([account.to_hex(), "latest"])
}

/// Extract `result`; node errors and a missing result are failures
pub fn parse_result(body: &[u8]) -> Result<Value> {
    let response: RpcResponse = serde_json::from_slice(body).map_err(|e| {
        LockerError::Rpc(RpcError::MalformedResponse { reason: e.to_string() })
    })?;

    if let Some(err) = response.error {
        return Err(RpcError::Node { code: err.code, message: err.message }.into());
    }

    response
        .result
        .ok_or_else(|| RpcError::MalformedResponse { reason: "missing result".to_string() }.into())
}

fn as_str(value: &Value) -> Result<&str> {
    value.as_str().ok_or_else(|| {
        RpcError::MalformedResponse { reason: format!("expected hex string, got {}", value) }.into()
    })
}

/// Hex quantity such as `"0x1b4"`
pub fn decode_quantity(text: &str) -> Result<BigUint> {
    let body = text.strip_prefix("0x").unwrap_or(text);
    if body.is_empty() {
        return Ok(BigUint::default());
    }
    BigUint::from_str_radix(body, 16)
        .map_err(|e| DecodeError::InvalidHex { reason: format!("{} ({})", text, e) }.into())
}

pub fn parse_receipt(result: Value) -> Result<Option<TxReceipt>> {
    if result.is_null() {
        return Ok(None);
    }

    let raw: RawReceipt = serde_json::from_value(result).map_err(|e| {
        LockerError::Rpc(RpcError::MalformedResponse { reason: format!("receipt: {}", e) })
    })?;

    // Pre-byzantium receipts carry no status; treat them as succeeded
    let succeeded = match raw.status.as_deref() {
        Some(status) => decode_quantity(status)? == BigUint::from(1u8),
        None => true,
    };

    let logs = raw
        .logs
        .into_iter()
        .map(|raw| -> Result<LogEntry> {
            Ok(LogEntry {
                address: Address::parse(&raw.address)?,
                topics: raw.topics.iter().map(|t| from_hex_data(t)).collect::<Result<Vec<_>>>()?,
                data: from_hex_data(&raw.data)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(TxReceipt { succeeded, logs }))
}

// ===== Client =====

#[derive(Debug, Clone, PartialEq)]
pub struct RpcEndpoints {
    pub primary: String,
    pub fallback: Vec<String>,
}

pub struct JsonRpcClient<T: HttpTransport> {
    transport: T,
    endpoints: RpcEndpoints,
    next_id: Cell<u64>,
}

impl<T: HttpTransport> JsonRpcClient<T> {
    pub fn new(transport: T, endpoints: RpcEndpoints) -> Self {
        JsonRpcClient { transport, endpoints, next_id: Cell::new(1) }
    }

    pub fn endpoints(&self) -> &RpcEndpoints {
        &self.endpoints
    }

    async fn request_one(&self, url: &str, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));

        let body = request_body(id, method, params)?;
        let response = self.transport.post_json(url, body).await?;
        parse_result(&response)
    }

    /// Route one JSON-RPC request to a source
    pub async fn request(&self, source: Source, method: &str, params: Value) -> Result<Value> {
        match source {
            Source::Primary => self.request_one(&self.endpoints.primary, method, params).await,
            Source::Fallback => {
                let mut last_error = None;
                for url in &self.endpoints.fallback {
                    match self.request_one(url, method, params.clone()).await {
                        Ok(value) => return Ok(value),
                        Err(e) => {
                            log!("⚠️ Fallback endpoint {} failed for {}: {}", url, method, e);
                            last_error = Some(e);
                        }
                    }
                }
                Err(last_error.unwrap_or(LockerError::Rpc(RpcError::NoEndpoints)))
            }
        }
    }
}

impl<T: HttpTransport> ChainReader for JsonRpcClient<T> {
    async fn call(&self, source: Source, to: &Address, data: &[u8]) -> Result<Vec<u8>> {
        let result = self.request(source, "eth_call", eth_call_params(to, data)).await?;
        from_hex_data(as_str(&result)?)
    }

    async fn balance(&self, source: Source, account: &Address) -> Result<BigUint> {
        let result = self.request(source, "eth_getBalance", eth_get_balance_params(account)).await?;
        decode_quantity(as_str(&result)?)
    }

    async fn receipt(&self, source: Source, tx_hash: &str) -> Result<Option<TxReceipt>> {
        let result = self.request(source, "eth_getTransactionReceipt", json!([tx_hash])).await?;
        parse_receipt(result)
    }

    async fn chain_id(&self, source: Source) -> Result<u64> {
        let result = self.request(source, "eth_chainId", json!([])).await?;
        let id = decode_quantity(as_str(&result)?)?;
        crate::infrastructure::math::to_u64_checked(&id, "chainId")
    }

    async fn pause(&self, millis: u64) {
        self.transport.pause(millis).await
    }
}
