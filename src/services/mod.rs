pub mod cache;
pub mod coingecko;
pub mod fetch_queue;
pub mod id_map;
pub mod price;
pub mod price_change;

pub use cache::TtlCache;
pub use coingecko::CoinGeckoClient;
pub use fetch_queue::FetchQueue;
pub use id_map::IdMapService;
pub use price::{PriceService, SharedHistoricCache, SharedPriceCache};
pub use price_change::PriceChangeService;
