//! Effective price selection
//!
//! Pure and deterministic. With both feeds available the one with strictly
//! more counter-side liquidity wins; on equal liquidity the higher price wins,
//! and the primary keeps it when prices are also equal.

use candid::{CandidType, Deserialize};
use serde::Serialize;
use super::pairs::FeedReading;

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSource {
    Primary,
    Backup,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub source: FeedSource,
    pub effective_price: Option<f64>,
    pub used_tie_breaker: bool,
}

pub fn select_effective(primary: &FeedReading, backup: &FeedReading) -> Selection {
    let pick = |source: FeedSource, price: f64, tie: bool| Selection {
        source,
        effective_price: Some(price),
        used_tie_breaker: tie,
    };

    match (primary.quote(), backup.quote()) {
        (Some(p), None) => pick(FeedSource::Primary, p.price_float, false),
        (None, Some(b)) => pick(FeedSource::Backup, b.price_float, false),
        (Some(p), Some(b)) => {
            if p.quote_reserve_float > b.quote_reserve_float {
                pick(FeedSource::Primary, p.price_float, false)
            } else if b.quote_reserve_float > p.quote_reserve_float {
                pick(FeedSource::Backup, b.price_float, false)
            } else if p.price_float >= b.price_float {
                pick(FeedSource::Primary, p.price_float, true)
            } else {
                pick(FeedSource::Backup, b.price_float, true)
            }
        }
        (None, None) => Selection {
            source: FeedSource::None,
            effective_price: None,
            used_tie_breaker: false,
        },
    }
}
