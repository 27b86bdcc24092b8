//! Entry point for the procdash TUI. Parses args and runs the App.

mod api;
mod app;
mod error;
mod history;
mod types;
mod ui;
mod ws;

use std::time::Duration;

use app::App;
use clap::Parser;
use url::Url;

#[derive(Debug, Parser)]
#[command(
    name = "procdash",
    version,
    about = "Live system status and process control for a procdash_agent"
)]
struct Args {
    /// Agent base URL (http or https)
    #[arg(env = "PROCDASH_URL", default_value = "http://127.0.0.1:8000")]
    url: Url,

    /// Seconds between process list refreshes
    #[arg(
        short = 'r',
        long,
        env = "PROCDASH_REFRESH_SECS",
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    refresh_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut app = App::new(args.url, Duration::from_secs(args.refresh_secs));
    app.run().await
}
