//! Price Feeds - Dual-pair price discovery for the selected lock asset
//! Mirrors what the vault contracts compute on-chain, for display only

pub mod pairs;
pub mod selector;

pub use pairs::FeedReading;
pub use selector::{select_effective, FeedSource, Selection};

use crate::_4_RPC_ACCESS::json_rpc::ChainReader;
use crate::infrastructure::log;
use crate::types::LockAsset;

/// Both readings for an asset and the effective price derived from them
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalPrice {
    pub asset: LockAsset,
    pub primary: FeedReading,
    pub backup: FeedReading,
    pub selection: Selection,
    pub updated_at: u64,
}

/// Read both pairs for `asset` and select
pub async fn refresh_global_price<R: ChainReader>(reader: &R, asset: LockAsset, now: u64) -> GlobalPrice {
    let feeds = asset.feeds();

    let (primary, backup) = futures::join!(
        pairs::read_pair(reader, &feeds.primary, feeds.lock_decimals),
        pairs::read_pair(reader, &feeds.backup, feeds.lock_decimals)
    );

    let selection = select_effective(&primary, &backup);
    match selection.effective_price {
        Some(price) => log!("💱 {} effective price {} via {:?}", asset.label(), price, selection.source),
        None => log!("⚠️ {} has no valid price feed, time unlock only", asset.label()),
    }

    GlobalPrice { asset, primary, backup, selection, updated_at: now }
}
