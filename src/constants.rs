//! Upstream quota, cache lifetime and warm-up constants.
//!
//! The upstream provider (a CoinGecko-shaped API) enforces a hard quota of
//! 25 calls per rolling 60 second window on the free tier. Every constant
//! here exists to keep this process well inside that quota.

/// Default base URL for the upstream price provider
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Maximum upstream calls dispatched per rolling window
pub const UPSTREAM_CALLS_PER_WINDOW: usize = 25;

/// Length of the rolling rate-limit window in seconds
pub const UPSTREAM_WINDOW_SECS: u64 = 60;

/// Timeout for a single upstream HTTP call
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// TTL for the symbol -> identifier map. The listing changes rarely and a
/// refresh costs a full-listing call, so a few hours is plenty.
pub const ID_MAP_TTL_SECS: u64 = 4 * 60 * 60;

/// TTL for cached current prices
pub const PRICE_TTL_SECS: u64 = 4 * 60 * 60;

/// Settlement currency used for warm-up and the coin-data table
pub const PRIMARY_CURRENCY: &str = "usd";

/// Secondary settlement currency (identifier-denominated) used for warm-up
pub const SECONDARY_CURRENCY: &str = "btc";

/// How far back the cache warmer fetches history, in days
pub const WARMUP_DAYS_AGO: u32 = 180;

/// Pause between warm-up symbols. The fetch queue already enforces the
/// quota; this is an independent throttle so the warmer never crowds out
/// live requests.
pub const WARMUP_DELAY_MS: u64 = 2_000;

/// Preferred upstream id per symbol, for symbols whose first listed id is
/// known to be the wrong pick. Consulted before the identifier map, even
/// when the map has never been fetched.
///
/// TODO: real disambiguation should compare market caps; until then this
/// table is the workaround.
pub const ID_OVERRIDES: &[(&str, &str)] = &[
    ("boo", "spookyswap"),
    ("comp", "compound-governance-token"),
    ("ftt", "ftx-token"),
    ("uni", "uniswap"),
];

/// Symbols the cache warmer pre-populates at startup
pub const WARMUP_SYMBOLS: &[&str] = &[
    "1inch", "aave", "alcx", "alpha", "alusd", "badger", "bal", "bank",
    "bnb", "bnt", "btc", "busd", "comp", "crv", "dai", "dpi", "eth", "ftm",
    "ftt", "fwb", "inv", "link", "lqty", "lrc", "lusd", "mkr", "mln", "mta",
    "nftx", "ohm", "ren", "rgt", "rook", "snx", "sushi", "uma", "uni",
    "woo", "xsushi", "yfi",
];
