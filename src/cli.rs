use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "crypto-stats-proxy",
    version,
    about = "Blockchain stats and social sentiment proxy for the dashboard"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Override bind address, e.g. 0.0.0.0:8080
        #[arg(long)]
        addr: Option<String>,
    },
    /// Print normalized stats for a chain
    Stats { chain: String },
    /// Print masked mempool transactions for a chain
    LiveTxs {
        chain: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the sentiment report for an asset
    Sentiment { asset: String },
    /// Verify the Reddit credentials by fetching the authenticated account
    CheckReddit,
}
