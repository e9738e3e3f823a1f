//! Refresh scheduler
//!
//! Two cancellable intervals per session:
//! - fast tick (5s, 8s on narrow viewports): live refresh of every vault, then
//!   the global price. A tick that finds the previous one still running is
//!   skipped.
//! - fine tick (1s): countdowns from cached times, no network.
//!
//! Timers hold a `Weak` handle, so a dropped session stops doing work even
//! before its timers are cleared.

use ic_cdk_timers::TimerId;
use ic_stable_structures::Memory;
use std::rc::Rc;
use std::time::Duration;
use crate::_2_CRITICAL_DATA::session::{RefreshReport, Session};
use crate::_4_RPC_ACCESS::json_rpc::ChainReader;
use crate::infrastructure::clock::now_secs;
use crate::infrastructure::constants::{FAST_TICK_MS, FAST_TICK_NARROW_MS, FINE_TICK_MS};
use crate::infrastructure::log;

pub fn fast_tick_interval(narrow_viewport: bool) -> Duration {
    if narrow_viewport {
        Duration::from_millis(FAST_TICK_NARROW_MS)
    } else {
        Duration::from_millis(FAST_TICK_MS)
    }
}

/// One fast tick; `None` when the previous tick is still in flight
pub async fn run_fast_tick<R: ChainReader, M: Memory>(session: &Session<R, M>) -> Option<RefreshReport> {
    if !session.try_begin_refresh() {
        log!("⚠️ Refresh for {} still running, skipping this tick", session.account());
        return None;
    }

    let report = session.refresh_all().await;
    session.refresh_global().await;
    session.end_refresh();

    Some(report)
}

pub fn run_fine_tick<R: ChainReader, M: Memory>(session: &Session<R, M>, now: u64) {
    session.update_countdowns(now);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerHandles {
    pub fast: TimerId,
    pub fine: TimerId,
}

pub fn start_timers<R, M>(session: &Rc<Session<R, M>>) -> SchedulerHandles
where
    R: ChainReader + 'static,
    M: Memory + 'static,
{
    let interval = fast_tick_interval(session.narrow_viewport());

    let weak = Rc::downgrade(session);
    let fast = ic_cdk_timers::set_timer_interval(interval, move || {
        let Some(session) = weak.upgrade() else {
            return;
        };
        ic_cdk::spawn(async move {
            if let Some(report) = run_fast_tick(&session).await {
                if report.failed > 0 {
                    log!("⚠️ Tick for {}: {} refreshed, {} stale", session.account(), report.refreshed, report.failed);
                }
            }
        });
    });

    let weak = Rc::downgrade(session);
    let fine = ic_cdk_timers::set_timer_interval(Duration::from_millis(FINE_TICK_MS), move || {
        if let Some(session) = weak.upgrade() {
            run_fine_tick(&session, now_secs());
        }
    });

    log!("🕐 Timers started for {} (fast tick {}ms)", session.account(), interval.as_millis());
    SchedulerHandles { fast, fine }
}

pub fn stop_timers(handles: SchedulerHandles) {
    ic_cdk_timers::clear_timer(handles.fast);
    ic_cdk_timers::clear_timer(handles.fine);
}
