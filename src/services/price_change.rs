use crate::error::{PriceError, Result};
use crate::services::price::SharedHistoricCache;
use crate::services::{CoinGeckoClient, FetchQueue};
use chrono::{Days, NaiveTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Unix timestamp of UTC midnight `days_ago` calendar days before now.
/// Day keys in the historic cache use this form.
pub fn day_timestamp(days_ago: u32) -> i64 {
    let today = Utc::now().date_naive();
    let target = today
        .checked_sub_days(Days::new(days_ago as u64))
        .unwrap_or(today);
    target.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Historic prices and price changes on top of the day-keyed cache.
///
/// A single series fetch yields every day since the target day, so all of
/// them are cached at once; later lookups for nearer days are free.
pub struct PriceChangeService {
    client: CoinGeckoClient,
    queue: Arc<FetchQueue>,
    historic_cache: SharedHistoricCache,
}

impl PriceChangeService {
    pub fn new(
        client: CoinGeckoClient,
        queue: Arc<FetchQueue>,
        historic_cache: SharedHistoricCache,
    ) -> Self {
        Self {
            client,
            queue,
            historic_cache,
        }
    }

    /// Price of `id` in `currency` at UTC midnight `days_ago` days back.
    ///
    /// On a cache miss the upstream series is fetched through the shared
    /// queue and cached day by day; the oldest returned point is the
    /// requested day's price.
    pub async fn get_historic_price(
        &self,
        id: &str,
        currency: &str,
        days_ago: u32,
    ) -> Result<f64> {
        let target = day_timestamp(days_ago);
        let key = (target, id.to_string(), currency.to_string());

        if let Some(price) = self.historic_cache.get(&key) {
            debug!(%id, %currency, days_ago, "historic cache hit");
            return Ok(price);
        }
        debug!(%id, %currency, days_ago, "historic cache miss");

        // The provider counts 'days' exclusive of today; ask for one more
        // to guarantee the target day is covered.
        let days = days_ago + 1;
        let chart = self
            .queue
            .run(self.client.fetch_market_chart(id, currency, days))
            .await?;

        for &(ms_timestamp, price) in &chart.prices {
            let day = ms_timestamp / 1000;
            self.historic_cache
                .insert((day, id.to_string(), currency.to_string()), price);
        }
        debug!(
            %id, %currency,
            points = chart.prices.len(),
            "cached historic series"
        );

        match chart.prices.first() {
            Some(&(_, price)) => Ok(price),
            None => Err(PriceError::NoHistoricPrice(id.to_string())),
        }
    }

    /// Fractional change between today's price and the price `days_ago`
    /// days back: `today / historic - 1`.
    pub async fn get_price_change(
        &self,
        id: &str,
        currency: &str,
        days_ago: u32,
    ) -> Result<f64> {
        let historic = self.get_historic_price(id, currency, days_ago).await?;

        let today_key = (day_timestamp(0), id.to_string(), currency.to_string());
        let today = match self.historic_cache.get(&today_key) {
            Some(price) => price,
            None => {
                // A one-day series answers the question and warms today's
                // entry for the current-price 429 fallback.
                let fetched = self.get_historic_price(id, currency, 0).await?;
                self.historic_cache.get(&today_key).unwrap_or(fetched)
            }
        };

        Ok(today / historic - 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::coingecko::testing::{fixture_price, spawn_upstream, UpstreamCalls};
    use crate::services::price::new_historic_cache;
    use std::sync::atomic::Ordering;

    async fn make_service() -> (PriceChangeService, SharedHistoricCache, UpstreamCalls) {
        let (base, calls) = spawn_upstream().await;
        let client = CoinGeckoClient::new(&base).unwrap();
        let historic_cache = new_historic_cache();
        let service = PriceChangeService::new(
            client,
            Arc::new(FetchQueue::new()),
            historic_cache.clone(),
        );
        (service, historic_cache, calls)
    }

    #[test]
    fn day_timestamps_are_utc_midnights() {
        assert_eq!(day_timestamp(0) % 86_400, 0);
        assert_eq!(day_timestamp(5), day_timestamp(0) - 5 * 86_400);
    }

    #[tokio::test]
    async fn one_series_fetch_caches_every_returned_day() {
        let (service, historic, calls) = make_service().await;

        service
            .get_historic_price("bitcoin", "usd", 6)
            .await
            .unwrap();

        assert_eq!(calls.chart.load(Ordering::SeqCst), 1);
        // days_ago + 1 distinct day entries
        assert_eq!(historic.len(), 7);

        // Every nearer day is now answered from cache.
        for days_ago in 0..=6 {
            service
                .get_historic_price("bitcoin", "usd", days_ago)
                .await
                .unwrap();
        }
        assert_eq!(calls.chart.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn oldest_point_is_the_requested_day() {
        let (service, _historic, _calls) = make_service().await;

        let price = service
            .get_historic_price("bitcoin", "usd", 4)
            .await
            .unwrap();
        // Mock marks prices up one percent per day of age.
        assert_eq!(price, fixture_price("bitcoin", "usd") * 1.04);
    }

    #[tokio::test]
    async fn computes_fractional_change() {
        let (service, _historic, _calls) = make_service().await;

        let change = service
            .get_price_change("ethereum", "usd", 4)
            .await
            .unwrap();
        let expected = 1.0 / 1.04 - 1.0;
        assert!((change - expected).abs() < 1e-12);
    }

    #[tokio::test]
    async fn zero_days_ago_change_is_zero() {
        let (service, _historic, _calls) = make_service().await;

        let change = service
            .get_price_change("bitcoin", "usd", 0)
            .await
            .unwrap();
        assert_eq!(change, 0.0);
    }

    #[tokio::test]
    async fn repeated_change_queries_are_idempotent() {
        let (service, _historic, calls) = make_service().await;

        let first = service
            .get_price_change("bitcoin", "usd", 6)
            .await
            .unwrap();
        let calls_after_first = calls.chart.load(Ordering::SeqCst);

        let second = service
            .get_price_change("bitcoin", "usd", 6)
            .await
            .unwrap();

        assert_eq!(first.to_bits(), second.to_bits());
        assert_eq!(calls.chart.load(Ordering::SeqCst), calls_after_first);
    }

    #[tokio::test]
    async fn empty_series_is_no_historic_price() {
        let (service, _historic, _calls) = make_service().await;

        let result = service.get_historic_price("ghost-chain", "usd", 3).await;
        assert!(matches!(
            result,
            Err(PriceError::NoHistoricPrice(id)) if id == "ghost-chain"
        ));
    }
}
