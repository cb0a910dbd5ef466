use clap::{Parser, Subcommand};

use crate::commands;

#[derive(Parser)]
#[command(name = "coinprices")]
#[command(about = "Caching crypto price proxy", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on (defaults to PORT env or 8080)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Resolve a ticker symbol to its upstream identifier
    Resolve { symbol: String },
    /// Fetch the current price for a ticker symbol
    Price {
        symbol: String,
        /// Settlement currency
        #[arg(short, long, default_value = "usd")]
        currency: String,
    },
}

pub async fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            commands::serve::run(port).await;
        }
        Commands::Resolve { symbol } => {
            commands::resolve::run(symbol).await;
        }
        Commands::Price { symbol, currency } => {
            commands::price::run(symbol, currency).await;
        }
    }
}
