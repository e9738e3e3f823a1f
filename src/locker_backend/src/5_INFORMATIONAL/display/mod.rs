//! Display module - Vault and price formatting for the UI
//!
//! Pure projections of session state into the strings the front-end renders.
//! Number formatting follows the browser client exactly so both show the same
//! text for the same chain state.

use candid::{CandidType, Deserialize, Nat};
use num_traits::Zero;
use serde::Serialize;
use crate::_2_CRITICAL_DATA::vault_state::{PriceDetail, VaultRecord, VaultStatus};
use crate::_3_PRICE_FEEDS::{FeedReading, FeedSource, GlobalPrice};
use crate::infrastructure::constants::PRICE_DECIMALS;
use crate::infrastructure::math::{format_units, units_to_f64};
use crate::types::Address;
use super::countdown::Countdown;

pub const PLACEHOLDER: &str = "…";
pub const PRIMARY_MARK: &str = "𝟏°";
pub const BACKUP_MARK: &str = "𝟐°";
pub const NO_FEEDS_MESSAGE: &str = "No valid price feeds at this moment – only time unlock will work.";

// ===== Number formatting =====

/// Four significant digits; very small or large magnitudes fall back to up to
/// eight fixed decimals with trailing zeros removed
pub fn format_lock_price(value: f64) -> String {
    if !value.is_finite() || value == 0.0 {
        return "0.0000".to_string();
    }

    let scientific = format!("{:.3e}", value);
    let exponent: i32 = scientific
        .split('e')
        .nth(1)
        .and_then(|e| e.parse().ok())
        .unwrap_or(0);

    if exponent < -6 || exponent >= 4 {
        let fixed = format!("{:.8}", value);
        return fixed.trim_end_matches('0').trim_end_matches('.').to_string();
    }

    let decimals = (3 - exponent).max(0) as usize;
    format!("{:.*}", decimals, value)
}

/// Thousands shown with a `k` suffix
pub fn format_reserve_k(value: f64) -> String {
    if !value.is_finite() || value == 0.0 {
        return "0.0000".to_string();
    }
    if value.abs() >= 1000.0 {
        return format!("{}k", format_lock_price(value / 1000.0));
    }
    format_lock_price(value)
}

/// Two most significant units: `2d 3h`, `4h 5m`, `6m 7s`, `8s`
pub fn format_seconds(total: u64) -> String {
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let mins = (total % 3_600) / 60;
    let secs = total % 60;

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

fn usd(value: f64) -> String {
    format!("${}", format_lock_price(value))
}

/// Share of the target price reached (0.0 to 1.0) and its label
pub fn price_progress(current: f64, threshold: f64, met: bool) -> (f64, String) {
    let fraction = if current.is_finite() && threshold.is_finite() && threshold > 0.0 {
        (current / threshold).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let pct = format!("{:.1}%", fraction * 100.0);
    let label = if met {
        format!("Target hit ({})", pct)
    } else {
        format!("Progress {}", pct)
    };
    (fraction, label)
}

/// Compact line from the vault's own feed choice
pub fn feeds_line(detail: &PriceDetail) -> String {
    if !detail.ok {
        return "Feeds: unavailable (time unlock only)".to_string();
    }

    let chosen = units_to_f64(&detail.chosen_price, PRICE_DECIMALS);
    let mark = if detail.chosen_primary { PRIMARY_MARK } else { BACKUP_MARK };
    let mut line = format!("Feeds: {} effective ({})", mark, usd(chosen));
    if detail.used_tie_breaker {
        line.push_str(" (tie)");
    }
    line
}

// ===== Vault view =====

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct VaultView {
    pub address: String,
    pub owner: String,
    pub lock_token: String,
    pub asset_label: String,
    pub is_native: bool,
    pub status: VaultStatus,
    pub view_only: bool,
    pub collapsed: bool,
    pub start_time: u64,
    pub unlock_time: u64,
    pub locked: String,
    pub unlock_price: String,
    pub current_price: String,
    pub feeds: String,
    pub price_progress: f64,
    pub price_label: String,
    pub price_met: bool,
    pub time_met: bool,
    pub can_withdraw: bool,
    pub countdown: Option<Countdown>,
    pub reward_estimate: String,
    pub current_price_1e18: Option<Nat>,
    pub threshold_1e18: Option<Nat>,
    pub refreshed_at: Option<u64>,
}

pub fn vault_view(record: &VaultRecord, account: &Address, collapsed: bool) -> VaultView {
    let mut view = VaultView {
        address: record.address.to_hex(),
        owner: record.owner.to_hex(),
        lock_token: record.lock_token.to_hex(),
        asset_label: record.asset_label().to_string(),
        is_native: record.is_native,
        status: record.status(),
        view_only: record.is_view_only(account),
        collapsed,
        start_time: record.start_time,
        unlock_time: record.unlock_time,
        locked: PLACEHOLDER.to_string(),
        unlock_price: PLACEHOLDER.to_string(),
        current_price: PLACEHOLDER.to_string(),
        feeds: format!("Feeds: {}", PLACEHOLDER),
        price_progress: 0.0,
        price_label: PLACEHOLDER.to_string(),
        price_met: false,
        time_met: false,
        can_withdraw: false,
        countdown: record.countdown.clone(),
        reward_estimate: "Est. reward: unavailable".to_string(),
        current_price_1e18: None,
        threshold_1e18: None,
        refreshed_at: None,
    };

    let Some(live) = &record.live else {
        return view;
    };

    let threshold = units_to_f64(&live.threshold_1e18, PRICE_DECIMALS);
    let current = units_to_f64(&live.current_price_1e18, PRICE_DECIMALS);
    let (progress, label) = price_progress(current, threshold, live.price_met);

    view.locked = live
        .locked_balance
        .as_ref()
        .map(|b| format_units(b, record.token_decimals()))
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    view.unlock_price = usd(threshold);
    view.current_price = if live.current_price_1e18.is_zero() {
        "unavailable".to_string()
    } else {
        usd(current)
    };
    view.feeds = feeds_line(&live.price_detail);
    view.price_progress = progress;
    view.price_label = label;
    view.price_met = live.price_met;
    view.time_met = live.time_met;
    view.can_withdraw = live.can_withdraw;
    view.current_price_1e18 = Some(Nat::from(live.current_price_1e18.clone()));
    view.threshold_1e18 = Some(Nat::from(live.threshold_1e18.clone()));
    view.refreshed_at = Some(live.fetched_at);
    view
}

// ===== Global price view =====

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FeedView {
    pub title: String,
    pub label: String,
    pub pair: String,
    pub ok: bool,
    pub status: String,
    pub price: Option<String>,
    pub reserves: Option<String>,
    pub raw_1e18: Option<String>,
}

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GlobalPriceView {
    pub asset_label: String,
    pub primary: FeedView,
    pub backup: FeedView,
    pub source: FeedSource,
    pub effective_price: Option<f64>,
    pub used_tie_breaker: bool,
    pub summary: String,
    pub raw_line: String,
    pub updated_at: u64,
}

fn feed_view(title: &str, label: &str, pair: &str, reading: &FeedReading, asset_label: &str) -> FeedView {
    match reading.quote() {
        Some(q) => FeedView {
            title: title.to_string(),
            label: label.to_string(),
            pair: pair.to_string(),
            ok: true,
            status: "ok".to_string(),
            price: Some(format!("1 {} ≈ {}", asset_label, usd(q.price_float))),
            reserves: Some(format!("${}", format_reserve_k(q.quote_reserve_float))),
            raw_1e18: Some(q.price_raw.to_string()),
        },
        None => FeedView {
            title: title.to_string(),
            label: label.to_string(),
            pair: pair.to_string(),
            ok: false,
            status: "unavailable".to_string(),
            price: None,
            reserves: None,
            raw_1e18: None,
        },
    }
}

fn raw_part(mark: &str, reading: &FeedReading) -> String {
    match reading.quote() {
        Some(q) => format!("{} raw 1e18: {}", mark, q.price_raw),
        None => format!("{}: unavailable", mark),
    }
}

pub fn global_price_view(global: &GlobalPrice) -> GlobalPriceView {
    let feeds = global.asset.feeds();
    let asset_label = global.asset.label();
    let selection = &global.selection;

    let summary = match (selection.source, selection.effective_price) {
        (FeedSource::Primary, Some(price)) => {
            format!("Effective price (logic): {} via {} feed.", usd(price), PRIMARY_MARK)
        }
        (FeedSource::Backup, Some(price)) => {
            format!("Effective price (logic): {} via {} feed.", usd(price), BACKUP_MARK)
        }
        _ => NO_FEEDS_MESSAGE.to_string(),
    };

    let raw_line = format!(
        "{}\n,  {}",
        raw_part(PRIMARY_MARK, &global.primary),
        raw_part(BACKUP_MARK, &global.backup)
    );

    GlobalPriceView {
        asset_label: asset_label.to_string(),
        primary: feed_view(
            &format!("Primary feed ({})", PRIMARY_MARK),
            "Primary feed",
            feeds.primary.pair,
            &global.primary,
            asset_label,
        ),
        backup: feed_view(
            &format!("Backup feed ({})", BACKUP_MARK),
            "Backup feed",
            feeds.backup.pair,
            &global.backup,
            asset_label,
        ),
        source: selection.source,
        effective_price: selection.effective_price,
        used_tie_breaker: selection.used_tie_breaker,
        summary,
        raw_line,
        updated_at: global.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;
    use crate::_2_CRITICAL_DATA::vault_state::fixtures::{record, snapshot};
    use crate::_3_PRICE_FEEDS::pairs::FeedQuote;
    use crate::_3_PRICE_FEEDS::select_effective;
    use crate::test_support::{OWNER, STRANGER};
    use crate::types::LockAsset;

    #[test]
    fn test_format_lock_price() {
        assert_eq!(format_lock_price(0.0), "0.0000");
        assert_eq!(format_lock_price(f64::NAN), "0.0000");
        assert_eq!(format_lock_price(2.0), "2.000");
        assert_eq!(format_lock_price(0.05), "0.05000");
        assert_eq!(format_lock_price(123.456), "123.5");
        assert_eq!(format_lock_price(0.000123456), "0.0001235");
        // Exponential range falls back to fixed decimals
        assert_eq!(format_lock_price(12345.678), "12345.678");
        assert_eq!(format_lock_price(0.00000012345), "0.00000012");
        assert_eq!(format_lock_price(0.000000001), "0");
    }

    #[test]
    fn test_format_reserve_k() {
        assert_eq!(format_reserve_k(0.0), "0.0000");
        assert_eq!(format_reserve_k(950.0), "950.0");
        assert_eq!(format_reserve_k(12_500.0), "12.50k");
        assert_eq!(format_reserve_k(2_500_000.0), "2500k");
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(2 * 86_400 + 3 * 3_600 + 59), "2d 3h");
        assert_eq!(format_seconds(4 * 3_600 + 5 * 60 + 1), "4h 5m");
        assert_eq!(format_seconds(6 * 60 + 7), "6m 7s");
        assert_eq!(format_seconds(8), "8s");
        assert_eq!(format_seconds(0), "0s");
    }

    #[test]
    fn test_price_progress() {
        assert_eq!(price_progress(1.0, 2.0, false), (0.5, "Progress 50.0%".to_string()));
        assert_eq!(price_progress(3.0, 2.0, true), (1.0, "Target hit (100.0%)".to_string()));
        assert_eq!(price_progress(1.0, 0.0, false).0, 0.0);
    }

    #[test]
    fn test_feeds_line() {
        let mut detail = snapshot(false, false).price_detail;
        assert_eq!(feeds_line(&detail), "Feeds: unavailable (time unlock only)");

        detail.ok = true;
        detail.chosen_primary = true;
        detail.chosen_price = BigUint::from(2_000_000_000_000_000_000u64);
        assert_eq!(feeds_line(&detail), "Feeds: 𝟏° effective ($2.000)");

        detail.chosen_primary = false;
        detail.used_tie_breaker = true;
        assert_eq!(feeds_line(&detail), "Feeds: 𝟐° effective ($2.000) (tie)");
    }

    #[test]
    fn test_vault_view_before_first_refresh() {
        let view = vault_view(&record(1), &OWNER, false);
        assert_eq!(view.locked, "…");
        assert_eq!(view.feeds, "Feeds: …");
        assert_eq!(view.status, VaultStatus::Locked);
        assert!(!view.view_only);
        assert_eq!(view.reward_estimate, "Est. reward: unavailable");
    }

    #[test]
    fn test_vault_view_with_snapshot() {
        let mut r = record(1);
        let mut live = snapshot(false, true);
        live.threshold_1e18 = BigUint::from(2_000_000_000_000_000_000u64);
        live.locked_balance = Some(BigUint::from(1_500_000_000_000_000_000u64));
        r.apply_live(live);

        let view = vault_view(&r, &STRANGER, true);
        assert!(view.view_only);
        assert!(view.collapsed);
        assert_eq!(view.status, VaultStatus::Unlocked);
        assert_eq!(view.current_price, "unavailable");
        assert_eq!(view.unlock_price, "$2.000");
        assert_eq!(view.locked, "1.5");
        assert_eq!(view.price_label, "Progress 0.0%");
    }

    fn feed(price: f64, liquidity: f64) -> FeedReading {
        FeedReading::Available(FeedQuote {
            price_raw: BigUint::from(7u8),
            price_float: price,
            quote_reserve_raw: BigUint::default(),
            quote_reserve_float: liquidity,
        })
    }

    #[test]
    fn test_global_view_no_feeds() {
        let global = GlobalPrice {
            asset: LockAsset::HEX,
            primary: FeedReading::Unavailable,
            backup: FeedReading::Unavailable,
            selection: select_effective(&FeedReading::Unavailable, &FeedReading::Unavailable),
            updated_at: 5,
        };
        let view = global_price_view(&global);
        assert_eq!(view.summary, NO_FEEDS_MESSAGE);
        assert_eq!(view.raw_line, "𝟏°: unavailable\n,  𝟐°: unavailable");
        assert_eq!(view.primary.status, "unavailable");
    }

    #[test]
    fn test_global_view_backup_chosen() {
        let primary = feed(2.0, 500.0);
        let backup = feed(1.5, 1500.0);
        let global = GlobalPrice {
            asset: LockAsset::PLS,
            selection: select_effective(&primary, &backup),
            primary,
            backup,
            updated_at: 0,
        };
        let view = global_price_view(&global);
        assert_eq!(view.summary, "Effective price (logic): $1.500 via 𝟐° feed.");
        assert_eq!(view.backup.price.as_deref(), Some("1 PLS ≈ $1.500"));
        assert_eq!(view.backup.reserves.as_deref(), Some("$1.500k"));
        assert_eq!(view.raw_line, "𝟏° raw 1e18: 7\n,  𝟐° raw 1e18: 7");
    }
}
