use crate::server::{self, AppState};
use crate::utils::{get_api_base_url, get_port, is_dev_mode};
use crate::worker;

pub async fn run(port: Option<u16>) {
    let port = port.unwrap_or_else(get_port);
    let base_url = get_api_base_url();

    println!("🚀 Starting coinprices server on port {}", port);
    println!("🌐 Upstream: {}", base_url);

    let state = match AppState::new(&base_url) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to initialize: {}", e);
            std::process::exit(1);
        }
    };

    if is_dev_mode() {
        println!("🔧 Dev mode: skipping cache warm-up");
    } else {
        let warm_state = state.clone();
        tokio::spawn(async move {
            worker::run_cache_warmer(warm_state).await;
        });
    }

    if let Err(e) = server::serve(state, port).await {
        eprintln!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}
