use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing::debug;

use common::config::AppConfig;
use common::logger;

use crate::app::App;

mod actors;
mod app;
mod commands;
mod render;
mod services;
mod shell;

/// Crypto trading dashboard: signals, market panels, portfolio and AI chat.
#[derive(Parser)]
#[command(name = "dashboard", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Poll signals and global stats until interrupted, printing each update.
    Run,
    /// Score the signal universe once.
    Signals,
    /// Search tokens by name or symbol.
    Search { query: String },
    /// Top trending coins.
    Trending,
    /// Global market statistics.
    Global,
    /// Details, confidence and trading points for one coin.
    Token { id: String },
    /// Price history for one coin.
    Chart {
        id: String,
        #[arg(long, default_value_t = 7)]
        days: u32,
        /// Show OHLC candles instead of the price series.
        #[arg(long)]
        ohlc: bool,
    },
    /// Trending (or newest) Solana liquidity pools.
    Pools {
        #[arg(long)]
        new: bool,
        #[arg(long)]
        page: Option<u32>,
        /// Trending window, e.g. 1h, 6h, 24h.
        #[arg(long)]
        duration: Option<String>,
    },
    /// Candles of one on-chain pool.
    PoolOhlcv {
        network: String,
        address: String,
        #[arg(long, default_value = "day")]
        timeframe: String,
        #[arg(long)]
        aggregate: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Inspect the response cache.
    Cache {
        #[command(subcommand)]
        action: commands::CacheAction,
    },
    /// Work with the vector store.
    Vector {
        #[command(subcommand)]
        action: commands::VectorAction,
    },
    /// Show the portfolio, optionally after a deposit or withdrawal.
    Portfolio {
        #[arg(long)]
        deposit: Option<String>,
        #[arg(long)]
        withdraw: Option<String>,
    },
    /// Card placement for a column count.
    Layout {
        #[arg(long, default_value_t = 3)]
        cols: u32,
        /// Cards to hide, by key (e.g. tokenSearch).
        #[arg(long)]
        hide: Vec<String>,
    },
    /// Render one tab; the dashboard tab when omitted.
    Tab { name: Option<String> },
    /// Chat with the assistant. Without a message, starts an interactive session.
    Chat {
        message: Option<String>,
        #[arg(long)]
        direct: bool,
    },
    /// Ask the assistant for a BUY/SELL call on a coin.
    Analyze { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::setup_logger();
    let cli = Cli::parse();

    let app = App::from_config(AppConfig::from_env()?)?;
    debug!("Dashboard starting, mock data: {}", app.market.is_mock());

    match cli.command {
        Command::Run => commands::run(&app).await,
        Command::Signals => commands::signals(&app).await,
        Command::Search { query } => commands::search(&app, &query).await,
        Command::Trending => commands::trending(&app).await,
        Command::Global => commands::global(&app).await,
        Command::Token { id } => commands::token(&app, &id).await,
        Command::Chart { id, days, ohlc } => commands::chart(&app, &id, days, ohlc).await,
        Command::Pools {
            new,
            page,
            duration,
        } => commands::pools(&app, new, page, duration.as_deref()).await,
        Command::PoolOhlcv {
            network,
            address,
            timeframe,
            aggregate,
            limit,
        } => {
            commands::pool_ohlcv(&app, &network, &address, &timeframe, aggregate, limit).await
        }
        Command::Cache { action } => commands::cache(&app, action).await,
        Command::Vector { action } => commands::vector(&app, action).await,
        Command::Portfolio { deposit, withdraw } => {
            commands::portfolio(deposit.as_deref(), withdraw.as_deref())
        }
        Command::Layout { cols, hide } => commands::layout(cols, &hide),
        Command::Tab { name } => commands::tab(&app, name.as_deref()).await,
        Command::Chat { message, direct } => commands::chat(&app, message, direct).await,
        Command::Analyze { id } => commands::analyze(&app, &id).await,
    }
}
