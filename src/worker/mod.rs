pub mod cache_warmer;

pub use cache_warmer::run as run_cache_warmer;
