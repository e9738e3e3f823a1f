//! Time-to-unlock countdown
//!
//! Computed from cached start/unlock times only, no chain reads.

use candid::{CandidType, Deserialize};
use serde::Serialize;
use super::display::format_seconds;

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Countdown {
    pub remaining_secs: u64,
    pub label: String,
    /// Elapsed share of the lock period, 0.0 to 100.0
    pub progress_pct: f64,
}

pub fn compute_countdown(start_time: u64, unlock_time: u64, now: u64) -> Countdown {
    let remaining = unlock_time.saturating_sub(now);

    if remaining == 0 {
        return Countdown {
            remaining_secs: 0,
            label: "0s".to_string(),
            progress_pct: 100.0,
        };
    }

    let total = unlock_time.saturating_sub(start_time).max(1);
    let elapsed = now.saturating_sub(start_time);
    let pct = (elapsed as f64 / total as f64 * 100.0).clamp(0.0, 100.0);

    Countdown {
        remaining_secs: remaining,
        label: format_seconds(remaining),
        progress_pct: pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_unlock() {
        let c = compute_countdown(100, 200, 200);
        assert_eq!(c.remaining_secs, 0);
        assert_eq!(c.label, "0s");
        assert_eq!(c.progress_pct, 100.0);
    }

    #[test]
    fn test_past_unlock() {
        let c = compute_countdown(100, 200, 10_000);
        assert_eq!(c.label, "0s");
        assert_eq!(c.progress_pct, 100.0);
    }

    #[test]
    fn test_before_start() {
        let c = compute_countdown(1_000, 2_000, 500);
        assert_eq!(c.progress_pct, 0.0);
        assert_eq!(c.remaining_secs, 1_500);
    }

    #[test]
    fn test_midway() {
        let c = compute_countdown(0, 86_400 * 2, 86_400);
        assert_eq!(c.progress_pct, 50.0);
        assert_eq!(c.label, "1d 0h");
    }

    #[test]
    fn test_zero_length_lock_does_not_divide_by_zero() {
        // unlock == start but still in the future
        let c = compute_countdown(500, 500, 499);
        assert_eq!(c.remaining_secs, 1);
        assert_eq!(c.progress_pct, 0.0);
    }
}
