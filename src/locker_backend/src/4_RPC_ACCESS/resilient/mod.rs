//! Resilient call layer
//!
//! An operation is handed the source it should read from. It runs against the
//! primary up to `attempts - 1` times (at least once), pausing `80ms * n` after
//! the n-th failure except the last, then exactly once against the fallback
//! cluster. Whatever the fallback returns, success or error, is the result.

use std::future::Future;
use crate::infrastructure::constants::{BACKOFF_STEP_MS, DEFAULT_CALL_ATTEMPTS};
use crate::infrastructure::errors::Result;
use crate::infrastructure::log;
use crate::types::Address;
use super::json_rpc::{ChainReader, Source};

pub async fn resilient_call<R, T, F, Fut>(reader: &R, attempts: u32, mut operation: F) -> Result<T>
where
    R: ChainReader,
    F: FnMut(Source) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let primary_attempts = attempts.saturating_sub(1).max(1);

    for attempt in 1..=primary_attempts {
        match operation(Source::Primary).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                log!("⚠️ Primary attempt {}/{} failed: {}", attempt, primary_attempts, e);
                if attempt < primary_attempts {
                    reader.pause(BACKOFF_STEP_MS * attempt as u64).await;
                }
            }
        }
    }

    operation(Source::Fallback).await
}

/// `eth_call` with the default attempt budget
pub async fn read<R: ChainReader>(reader: &R, to: &Address, data: &[u8]) -> Result<Vec<u8>> {
    resilient_call(reader, DEFAULT_CALL_ATTEMPTS, |source| reader.call(source, to, data)).await
}
