use crate::constants::{ID_MAP_TTL_SECS, ID_OVERRIDES};
use crate::error::{PriceError, Result};
use crate::models::IdMap;
use crate::services::{CoinGeckoClient, TtlCache};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const ID_MAP_KEY: &str = "id-map";

/// Resolves ticker symbols to the upstream provider's canonical ids.
///
/// The full symbol -> ids listing is cached under a single key and
/// replaced wholesale whenever it is refreshed; entries are never merged
/// in. A symbol counts as unknown only after a fresh fetch still does not
/// list it.
pub struct IdMapService {
    client: CoinGeckoClient,
    cache: TtlCache<&'static str, Arc<IdMap>>,
}

impl IdMapService {
    pub fn new(client: CoinGeckoClient) -> Self {
        Self {
            client,
            cache: TtlCache::new(Some(Duration::from_secs(ID_MAP_TTL_SECS))),
        }
    }

    /// Resolve a symbol to one canonical id.
    ///
    /// Order: override table, then the cached map, then one forced refresh
    /// and a single retry. Several symbols map to multiple ids; we return
    /// the first id the provider listed unless the override table knows
    /// better.
    pub async fn resolve(&self, symbol: &str) -> Result<String> {
        let symbol = symbol.to_lowercase();

        if let Some(id) = Self::override_for(&symbol) {
            debug!(%symbol, %id, "resolved via override table");
            return Ok(id.to_string());
        }

        if let Some(map) = self.cache.get(&ID_MAP_KEY) {
            if let Some(id) = map.get(&symbol).and_then(|ids| ids.first()) {
                debug!(%symbol, %id, "id map cache hit");
                return Ok(id.clone());
            }
        }

        debug!(%symbol, "id map cache miss, refreshing listing");
        let map = self.refresh().await?;
        match map.get(&symbol).and_then(|ids| ids.first()) {
            Some(id) => Ok(id.clone()),
            None => Err(PriceError::UnknownSymbol(symbol)),
        }
    }

    /// Whether a listing is currently cached (purely informational)
    pub fn is_loaded(&self) -> bool {
        self.cache.get(&ID_MAP_KEY).is_some()
    }

    fn override_for(symbol: &str) -> Option<&'static str> {
        ID_OVERRIDES
            .iter()
            .find(|(sym, _)| *sym == symbol)
            .map(|(_, id)| *id)
    }

    async fn refresh(&self) -> Result<Arc<IdMap>> {
        let listing = self.client.fetch_coin_list().await?;

        let mut map = IdMap::new();
        for coin in listing {
            map.entry(coin.symbol.to_lowercase())
                .or_default()
                .push(coin.id);
        }

        let map = Arc::new(map);
        self.cache.insert(ID_MAP_KEY, map.clone());
        debug!(symbols = map.len(), "replaced cached id map");
        Ok(map)
    }
}
