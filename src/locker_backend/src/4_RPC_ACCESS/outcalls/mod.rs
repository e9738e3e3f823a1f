//! HTTPS outcall transport
//!
//! Every replica performs the request, so responses go through
//! `transform_rpc_response` (headers stripped) before consensus.

use candid::Nat;
use num_traits::ToPrimitive;
use ic_cdk::api::management_canister::http_request::{
    http_request, CanisterHttpRequestArgument, HttpHeader, HttpMethod, HttpResponse, TransformArgs,
    TransformContext,
};
use std::time::Duration;
use crate::infrastructure::config::LockerConfig;
use crate::infrastructure::errors::{Result, RpcError};
use crate::infrastructure::log;
use super::json_rpc::{HttpTransport, JsonRpcClient, RpcEndpoints};

/// Name of the transform query exported by the canister
pub const TRANSFORM_METHOD: &str = "transform_rpc_response";

pub type LiveReader = JsonRpcClient<OutcallTransport>;

#[derive(Debug, Clone)]
pub struct OutcallTransport {
    max_response_bytes: u64,
    cycles: u128,
}

impl OutcallTransport {
    pub fn new(max_response_bytes: u64, cycles: u128) -> Self {
        OutcallTransport { max_response_bytes, cycles }
    }
}

impl HttpTransport for OutcallTransport {
    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        let request = CanisterHttpRequestArgument {
            url: url.to_string(),
            max_response_bytes: Some(self.max_response_bytes),
            method: HttpMethod::POST,
            headers: vec![HttpHeader {
                name: "Content-Type".to_string(),
                value: "application/json".to_string(),
            }],
            body: Some(body),
            transform: Some(TransformContext::from_name(TRANSFORM_METHOD.to_string(), vec![])),
        };

        let (response,) = http_request(request, self.cycles).await.map_err(|(code, msg)| {
            log!("❌ Outcall to {} failed: {:?} {}", url, code, msg);
            RpcError::Transport { endpoint: url.to_string(), reason: format!("{:?}: {}", code, msg) }
        })?;

        if response.status != Nat::from(200u32) {
            let status = response.status.0.to_u64().unwrap_or(u64::MAX);
            return Err(RpcError::HttpStatus { endpoint: url.to_string(), status }.into());
        }

        Ok(response.body)
    }

    async fn pause(&self, millis: u64) {
        sleep(millis).await
    }
}

/// One-shot timer as an awaitable delay
pub async fn sleep(millis: u64) {
    let (tx, rx) = futures::channel::oneshot::channel::<()>();
    ic_cdk_timers::set_timer(Duration::from_millis(millis), move || {
        let _ = tx.send(());
    });
    let _ = rx.await;
}

/// Response as replicas agree on it: status and body only
pub fn transform_response(args: TransformArgs) -> HttpResponse {
    HttpResponse {
        status: args.response.status,
        headers: vec![],
        body: args.response.body,
    }
}

/// Reader over HTTPS outcalls for the active config
pub fn live_reader(config: &LockerConfig) -> LiveReader {
    JsonRpcClient::new(
        OutcallTransport::new(config.max_response_bytes, config.outcall_cycles),
        RpcEndpoints {
            primary: config.primary_rpc.clone(),
            fallback: config.fallback_rpcs.clone(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_strips_headers() {
        let args = TransformArgs {
            response: HttpResponse {
                status: Nat::from(200u32),
                headers: vec![HttpHeader { name: "date".to_string(), value: "now".to_string() }],
                body: b"{}".to_vec(),
            },
            context: vec![],
        };
        let out = transform_response(args);
        assert!(out.headers.is_empty());
        assert_eq!(out.body, b"{}".to_vec());
        assert_eq!(out.status, Nat::from(200u32));
    }

    #[test]
    fn test_live_reader_uses_config_endpoints() {
        let config = LockerConfig::default();
        let reader = live_reader(&config);
        assert_eq!(reader.endpoints().primary, config.primary_rpc);
        assert_eq!(reader.endpoints().fallback.len(), 3);
    }
}
