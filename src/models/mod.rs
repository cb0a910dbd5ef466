mod coin;

pub use coin::{CoinListing, MarketChart, SimplePrices};

use std::collections::HashMap;

/// Symbol -> upstream identifiers, in the order the provider listed them.
/// One symbol may map to many identifiers.
pub type IdMap = HashMap<String, Vec<String>>;
