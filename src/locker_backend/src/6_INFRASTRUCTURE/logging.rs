//! Logging
//!
//! `log!` prints through the replica debug log inside the canister and through
//! stdout in native test builds. Failures worth surfacing to an operator are also
//! kept in a bounded in-memory event log (`record_event`).

use candid::{CandidType, Deserialize};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::VecDeque;
use super::constants::MAX_EVENT_LOG_ENTRIES;

#[cfg(target_arch = "wasm32")]
macro_rules! log {
    ($($arg:tt)*) => { ic_cdk::println!($($arg)*) };
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log {
    ($($arg:tt)*) => { std::println!($($arg)*) };
}

pub(crate) use log;

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Info,
    Warning,
    Error,
}

/// Event log entry
#[derive(CandidType, Deserialize, Serialize, Debug, Clone)]
pub struct EventRecord {
    pub timestamp: u64,
    pub level: EventLevel,
    pub context: String,
    pub message: String,
}

thread_local! {
    static EVENT_LOG: RefCell<VecDeque<EventRecord>> = RefCell::new(VecDeque::new());
}

/// Print and keep an event
pub fn record_event(level: EventLevel, context: &str, message: String) {
    let prefix = match level {
        EventLevel::Info => "ℹ️",
        EventLevel::Warning => "⚠️",
        EventLevel::Error => "❌",
    };
    log!("{} [{}] {}", prefix, context, message);

    EVENT_LOG.with(|events| {
        let mut events = events.borrow_mut();
        events.push_back(EventRecord {
            timestamp: super::clock::now_nanos(),
            level,
            context: context.to_string(),
            message,
        });

        while events.len() > MAX_EVENT_LOG_ENTRIES {
            events.pop_front();
        }
    });
}

/// Most recent events, oldest first
pub fn recent_events() -> Vec<EventRecord> {
    EVENT_LOG.with(|events| events.borrow().iter().cloned().collect())
}
