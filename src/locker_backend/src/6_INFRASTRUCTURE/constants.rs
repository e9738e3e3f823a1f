//! System-wide constants
//!
//! Chain identity, endpoint defaults, refresh cadence and persisted key names.
//! Anything an operator may want to change per deployment lives in
//! `LockerConfig` instead; these are the defaults it starts from.

// ===== CHAIN =====

/// PulseChain mainnet
pub const EXPECTED_CHAIN_ID: u64 = 369;

/// Single vault factory (no legacy factories are tracked)
pub const FACTORY_ADDRESS: &str = "0x3eab22cb1573965c77176e76f6340e521a99a3cc";

/// Primary read endpoint
pub const DEFAULT_PRIMARY_RPC: &str = "https://rpc.pulsechain.com";

/// Fallback cluster, queried in order until one endpoint answers (quorum 1)
pub const DEFAULT_FALLBACK_RPCS: &[&str] = &[
    "https://pulsechain.publicnode.com",
    "https://rpc.pulsechain.com",
    "https://rpc-pulsechain.g4mm4.io",
];

// ===== HTTPS OUTCALLS =====

/// Upper bound on a JSON-RPC response body (receipts are the largest reads)
pub const DEFAULT_MAX_RESPONSE_BYTES: u64 = 64 * 1024;

/// Cycles attached to every outcall
pub const DEFAULT_OUTCALL_CYCLES: u128 = 2_000_000_000;

// ===== RESILIENT CALLS =====

/// Default attempt budget for a resilient read
pub const DEFAULT_CALL_ATTEMPTS: u32 = 3;

/// Linear backoff step between failed primary attempts
pub const BACKOFF_STEP_MS: u64 = 80;

// ===== REFRESH CADENCE =====

/// Fast tick on wide viewports
pub const FAST_TICK_MS: u64 = 5_000;

/// Fast tick on narrow viewports (fewer requests on constrained connections)
pub const FAST_TICK_NARROW_MS: u64 = 8_000;

/// Countdown tick
pub const FINE_TICK_MS: u64 = 1_000;

// ===== TRANSACTIONS =====

/// Receipt polls before giving up on finalization
pub const RECEIPT_POLL_ATTEMPTS: u32 = 30;

/// Delay between receipt polls
pub const RECEIPT_POLL_INTERVAL_MS: u64 = 2_000;

// ===== FIXED POINT =====

/// Price thresholds and contract prices are 1e18 fixed point
pub const PRICE_DECIMALS: u32 = 18;

/// Used when a token's decimals are not in the asset table
pub const DEFAULT_TOKEN_DECIMALS: u32 = 18;

// ===== SESSIONS =====

/// Concurrent connected accounts (each owns two timers)
pub const MAX_SESSIONS: usize = 64;

/// Concurrent sessions one principal may hold
pub const MAX_SESSIONS_PER_CALLER: usize = 4;

/// Entries kept in the in-memory event log
pub const MAX_EVENT_LOG_ENTRIES: usize = 200;

// ===== PERSISTED KEYS (shared with the browser client, DO NOT CHANGE) =====

pub const VAULT_LIST_KEY_PREFIX: &str = "generic-vaults-";
pub const COLLAPSED_KEY_PREFIX: &str = "vaultCollapsed-";
pub const THEME_KEY: &str = "vault-theme";
