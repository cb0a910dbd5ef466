use crate::constants::{
    PRIMARY_CURRENCY, SECONDARY_CURRENCY, WARMUP_DAYS_AGO, WARMUP_SYMBOLS,
};
use crate::error::Result;
use crate::server::AppState;
use crate::utils::get_warmup_delay;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

/// Pre-populate the id map and historic price caches for the common
/// symbols, one at a time.
///
/// Best effort only: the first failing symbol aborts the pass and the
/// server keeps serving with colder caches. Errors never reach request
/// handlers.
pub async fn run(state: AppState) {
    info!(
        symbols = WARMUP_SYMBOLS.len(),
        "warming id map and historic price caches"
    );
    warm_symbols(&state, WARMUP_SYMBOLS, get_warmup_delay()).await;
}

async fn warm_symbols(state: &AppState, symbols: &[&str], delay: Duration) {
    for symbol in symbols {
        if let Err(e) = warm_symbol(state, symbol).await {
            error!(%symbol, error = %e, "cache warm-up aborted");
            return;
        }
        // Defensive pacing on top of the fetch queue's own quota.
        sleep(delay).await;
    }
    info!("cache warm");
}

async fn warm_symbol(state: &AppState, symbol: &str) -> Result<()> {
    let id = state.id_map.resolve(symbol).await?;
    state
        .changes
        .get_price_change(&id, PRIMARY_CURRENCY, WARMUP_DAYS_AGO)
        .await?;
    state
        .changes
        .get_price_change(&id, SECONDARY_CURRENCY, WARMUP_DAYS_AGO)
        .await?;
    Ok(())
}
