use crate::server::AppState;
use crate::utils::get_api_base_url;

pub async fn run(symbol: String, currency: String) {
    let state = match AppState::new(&get_api_base_url()) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let result = async {
        let id = state.id_map.resolve(&symbol).await?;
        state.prices.get_price(&id, &currency).await
    }
    .await;

    match result {
        Ok(price) => println!("{}", price),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
