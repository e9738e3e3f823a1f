//! Wall clock
//!
//! Replica time inside the canister, system time in native builds.

#[cfg(target_arch = "wasm32")]
pub fn now_nanos() -> u64 {
    ic_cdk::api::time()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_nanos() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Unix seconds, the unit vault contracts use
pub fn now_secs() -> u64 {
    now_nanos() / 1_000_000_000
}
