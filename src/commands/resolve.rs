use crate::server::AppState;
use crate::utils::get_api_base_url;

pub async fn run(symbol: String) {
    let state = match AppState::new(&get_api_base_url()) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    match state.id_map.resolve(&symbol).await {
        Ok(id) => println!("{}", id),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
