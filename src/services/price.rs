use crate::constants::PRICE_TTL_SECS;
use crate::error::{PriceError, Result};
use crate::services::price_change::day_timestamp;
use crate::services::{CoinGeckoClient, FetchQueue, TtlCache};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Current price cache key: (identifier, settlement currency)
pub type PriceKey = (String, String);

/// Historic price cache key: (UTC-midnight unix seconds, identifier,
/// settlement currency). Daily closes never change retroactively, so these
/// entries carry no TTL.
pub type DayKey = (i64, String, String);

pub type SharedPriceCache = Arc<TtlCache<PriceKey, f64>>;
pub type SharedHistoricCache = Arc<TtlCache<DayKey, f64>>;

pub fn new_price_cache() -> SharedPriceCache {
    Arc::new(TtlCache::new(Some(Duration::from_secs(PRICE_TTL_SECS))))
}

pub fn new_historic_cache() -> SharedHistoricCache {
    Arc::new(TtlCache::new(None))
}

/// Current-price lookups: cache first, then one batched upstream call for
/// the missing identifiers through the shared fetch queue.
pub struct PriceService {
    client: CoinGeckoClient,
    queue: Arc<FetchQueue>,
    price_cache: SharedPriceCache,
    historic_cache: SharedHistoricCache,
}

impl PriceService {
    pub fn new(
        client: CoinGeckoClient,
        queue: Arc<FetchQueue>,
        price_cache: SharedPriceCache,
        historic_cache: SharedHistoricCache,
    ) -> Self {
        Self {
            client,
            queue,
            price_cache,
            historic_cache,
        }
    }

    pub async fn get_price(&self, id: &str, currency: &str) -> Result<f64> {
        let prices = self.get_prices(&[id.to_string()], currency).await?;
        prices
            .get(id)
            .copied()
            .ok_or_else(|| PriceError::NotFound(id.to_string()))
    }

    /// Get prices for several identifiers in one settlement currency.
    ///
    /// Cache hits and misses are partitioned first; only the missing
    /// subset goes upstream, in a single call, and is merged with the
    /// cached subset afterwards.
    pub async fn get_prices(
        &self,
        ids: &[String],
        currency: &str,
    ) -> Result<HashMap<String, f64>> {
        let mut prices = HashMap::new();
        let mut to_fetch = Vec::new();

        for id in ids {
            match self.price_cache.get(&(id.clone(), currency.to_string())) {
                Some(price) => {
                    debug!(%id, %currency, "price cache hit");
                    prices.insert(id.clone(), price);
                }
                None => {
                    debug!(%id, %currency, "price cache miss");
                    to_fetch.push(id.clone());
                }
            }
        }

        if to_fetch.is_empty() {
            return Ok(prices);
        }

        let fetched = self
            .queue
            .run(self.fetch_prices(&to_fetch, currency))
            .await?;

        for (id, price) in fetched {
            self.price_cache
                .insert((id.clone(), currency.to_string()), price);
            prices.insert(id, price);
        }

        Ok(prices)
    }

    /// One upstream call for the given identifiers. A 429 degrades to
    /// today's entries in the historic cache when every requested
    /// identifier has one; otherwise the 429 propagates.
    async fn fetch_prices(
        &self,
        ids: &[String],
        currency: &str,
    ) -> Result<HashMap<String, f64>> {
        match self.client.fetch_simple_prices(ids, currency).await {
            Ok(raw) => {
                if raw.is_empty() {
                    return Err(PriceError::NotFound(ids.join(",")));
                }

                let mut prices = HashMap::new();
                for id in ids {
                    let price = raw
                        .get(id)
                        .and_then(|per_currency| per_currency.get(currency))
                        .copied()
                        .ok_or_else(|| PriceError::NotFound(id.clone()))?;
                    prices.insert(id.clone(), price);
                }
                Ok(prices)
            }
            Err(PriceError::BadResponse { status: 429, message }) => {
                warn!("hit upstream rate limit, probing historic cache for today");

                let today = day_timestamp(0);
                let mut prices = HashMap::new();
                for id in ids {
                    let key = (today, id.clone(), currency.to_string());
                    if let Some(price) = self.historic_cache.get(&key) {
                        prices.insert(id.clone(), price);
                    }
                }

                if prices.len() == ids.len() {
                    debug!("served all requested prices from historic cache fallback");
                    return Ok(prices);
                }

                Err(PriceError::BadResponse { status: 429, message })
            }
            Err(e) => Err(e),
        }
    }
}
