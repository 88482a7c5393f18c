use std::io::Write as _;

use anyhow::{Context, anyhow, bail};
use clap::Subcommand;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::info;

use assistant::ChatSession;
use assistant::session::SIGNAL_FAILED;
use common::actors::{Actor, ActorType};
use market_data::remote::{DEFAULT_VS_CURRENCY, PoolOhlcvQuery};
use market_data::traits::RemoteResponse;
use portfolio::{Ledger, parse_amount};
use storage::vector::{QueryOptions, VectorRecord};
use storage::{KeyTtl, cache_key};
use strategy::signals::price_change_30m_from_chart;
use strategy::{confidence_score, trading_points};

use crate::actors::supervisor::Supervisor;
use crate::app::App;
use crate::render;
use crate::services::global_poller::{GlobalBoard, GlobalStatsPoller};
use crate::services::signal_poller::{SignalBoard, SignalPoller};
use crate::shell::{CardGrid, CardId, PanelState, TAB_NOT_IMPLEMENTED, Tab};

const CHART_TAB_COIN: &str = "solana";

#[derive(Subcommand)]
pub enum CacheAction {
    /// Print the key a request would be cached under.
    Key {
        endpoint: String,
        /// Query parameters as key=value.
        params: Vec<String>,
    },
    Get { key: String },
    Delete { key: String },
    Exists { key: String },
    Ttl { key: String },
}

#[derive(Subcommand)]
pub enum VectorAction {
    /// List index names.
    List,
    Upsert {
        index: String,
        id: String,
        /// Comma-separated components.
        vector: String,
        /// JSON metadata.
        #[arg(long)]
        metadata: Option<String>,
    },
    Query {
        index: String,
        vector: String,
        #[arg(long, default_value_t = storage::vector::DEFAULT_TOP_K)]
        top_k: usize,
    },
    Delete { index: String, ids: Vec<String> },
    Reset { index: String },
}

pub async fn run(app: &App) -> anyhow::Result<()> {
    let (signals_tx, mut signals_rx) = watch::channel(SignalBoard::default());
    let (global_tx, mut global_rx) = watch::channel(GlobalBoard::default());
    let interval = app.config.poll_interval;

    let mut supervisor = Supervisor::new();

    let signal_service = app.signals();
    supervisor.register_actor(
        ActorType::SignalPoller,
        Box::new(move || -> Box<dyn Actor> {
            Box::new(SignalPoller::new(
                signal_service.clone(),
                interval,
                signals_tx.clone(),
            ))
        }),
    );

    let market = app.market.clone();
    supervisor.register_actor(
        ActorType::GlobalStatsPoller,
        Box::new(move || -> Box<dyn Actor> {
            Box::new(GlobalStatsPoller::new(
                market.clone(),
                interval,
                global_tx.clone(),
            ))
        }),
    );

    let printer = tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = signals_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    println!("{}", render::render_signal_board(&signals_rx.borrow_and_update()));
                }
                changed = global_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    println!("{}", render::render_global_board(&global_rx.borrow_and_update()));
                }
            }
        }
    });

    info!("Dashboard running, press Ctrl-C to stop");
    supervisor
        .start(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    printer.abort();
    Ok(())
}

pub async fn signals(app: &App) -> anyhow::Result<()> {
    let signals = app.signals().refresh().await?;
    let board = SignalBoard {
        signals,
        error: None,
        last_update: Some(chrono::Utc::now()),
    };
    print!("{}", render::render_signal_board(&board));
    Ok(())
}

pub async fn search(app: &App, query: &str) -> anyhow::Result<()> {
    let coins = app.market.search(query).await?;
    print!("{}", render::render_search(&coins));
    Ok(())
}

pub async fn trending(app: &App) -> anyhow::Result<()> {
    let coins = app.market.trending().await?;
    print!("{}", render::render_trending(&coins));
    Ok(())
}

pub async fn global(app: &App) -> anyhow::Result<()> {
    let stats = app.market.global().await?;
    print!("{}", render::render_global(&stats));
    Ok(())
}

pub async fn token(app: &App, id: &str) -> anyhow::Result<()> {
    let details = app.market.coin_details(id).await?;
    let snapshot = details.to_model();
    let points = trading_points(&snapshot);

    println!("== {} ({}) ==", details.name, details.symbol.to_uppercase());
    if let Some(price) = snapshot.current_price {
        println!("Price: ${}", price);
    }
    if let Some(change) = snapshot.price_change_percentage_24h {
        println!("24h: {}", render::format_change(change));
    }
    if let Some(cap) = snapshot.market_cap {
        println!("Market cap: {}", render::format_market_cap(cap));
    }
    let categories: Vec<&str> = details.category_names().collect();
    if !categories.is_empty() {
        println!("Categories: {}", categories.join(", "));
    }
    println!("Confidence: {}%", confidence_score(&snapshot));
    println!(
        "Entry ${:.4}  Target ${:.4}  Stop ${:.4}  R/R {:.2}",
        points.entry_price, points.target_price, points.stop_loss, points.risk_reward
    );
    Ok(())
}

pub async fn chart(app: &App, id: &str, days: u32, ohlc: bool) -> anyhow::Result<()> {
    if ohlc {
        let candles = app.market.ohlc(id, days, DEFAULT_VS_CURRENCY).await?;
        println!("{} candles for {} over {} days", candles.len(), id, days);
        for candle in candles.iter().rev().take(5) {
            println!(
                "{}  O {}  H {}  L {}  C {}  ({})",
                candle.time,
                candle.open,
                candle.high,
                candle.low,
                candle.close,
                render::format_change(candle.change_percentage())
            );
        }
        return Ok(());
    }

    let chart = app.market.market_chart(id, days, DEFAULT_VS_CURRENCY).await?;
    match chart.latest_price() {
        Some(price) => println!("{}: ${} ({} samples)", id, price, chart.prices.len()),
        None => println!("{}: no price data", id),
    }
    println!(
        "30m change: {}",
        render::format_change(price_change_30m_from_chart(&chart.prices))
    );
    Ok(())
}

pub async fn pools(
    app: &App,
    new: bool,
    page: Option<u32>,
    duration: Option<&str>,
) -> anyhow::Result<()> {
    let pools = if new {
        app.market.new_pools(page).await?
    } else {
        app.market.trending_pools(page, duration).await?
    };
    print!("{}", render::render_pools(&pools));
    Ok(())
}

pub async fn pool_ohlcv(
    app: &App,
    network: &str,
    address: &str,
    timeframe: &str,
    aggregate: Option<String>,
    limit: Option<u32>,
) -> anyhow::Result<()> {
    let query = PoolOhlcvQuery {
        aggregate,
        limit,
        ..PoolOhlcvQuery::default()
    };
    let candles = app
        .market
        .pool_ohlcv(network, address, timeframe, &query)
        .await?;
    for candle in &candles {
        let volume = candle.volume.unwrap_or_default();
        println!(
            "{}  O {}  H {}  L {}  C {}  V {}",
            candle.time, candle.open, candle.high, candle.low, candle.close, volume
        );
    }
    Ok(())
}

pub async fn cache(app: &App, action: CacheAction) -> anyhow::Result<()> {
    let cache = app.market.cache();
    match action {
        CacheAction::Key { endpoint, params } => {
            let pairs = params
                .iter()
                .map(|p| parse_param(p))
                .collect::<anyhow::Result<Vec<_>>>()?;
            println!("{}", cache_key(&endpoint, &pairs));
        }
        CacheAction::Get { key } => match cache.get_cached::<Value>(&key).await {
            Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            None => println!("(miss)"),
        },
        CacheAction::Delete { key } => println!("deleted: {}", cache.delete_cached(&key).await),
        CacheAction::Exists { key } => println!("exists: {}", cache.key_exists(&key).await),
        CacheAction::Ttl { key } => match cache.key_ttl(&key).await {
            KeyTtl::Missing => println!("(missing)"),
            KeyTtl::Persistent => println!("(no expiry)"),
            KeyTtl::Expires(left) => println!("{}s", left.as_secs()),
        },
    }
    Ok(())
}

pub async fn vector(app: &App, action: VectorAction) -> anyhow::Result<()> {
    let store = app.vector_store()?;
    match action {
        VectorAction::List => {
            for index in store.list_indexes().await? {
                println!("{}", if index.is_empty() { "(default)" } else { index.as_str() });
            }
        }
        VectorAction::Upsert {
            index,
            id,
            vector,
            metadata,
        } => {
            let metadata = metadata
                .map(|m| serde_json::from_str::<Value>(&m))
                .transpose()
                .context("metadata must be valid JSON")?;
            let record = VectorRecord {
                id,
                vector: parse_vector(&vector)?,
                metadata,
            };
            println!("upserted: {}", store.upsert(&index, &[record]).await?);
        }
        VectorAction::Query {
            index,
            vector,
            top_k,
        } => {
            let options = QueryOptions {
                top_k,
                ..QueryOptions::default()
            };
            for m in store.query(&index, &parse_vector(&vector)?, options).await? {
                let metadata = m.metadata.map(|v| v.to_string()).unwrap_or_default();
                println!("{:.4}  {}  {}", m.score, m.id, metadata);
            }
        }
        VectorAction::Delete { index, ids } => {
            println!("deleted: {}", store.delete(&index, &ids).await?);
        }
        VectorAction::Reset { index } => {
            store.reset(&index).await?;
            println!("reset {}", index);
        }
    }
    Ok(())
}

pub fn portfolio(deposit: Option<&str>, withdraw: Option<&str>) -> anyhow::Result<()> {
    let mut ledger = Ledger::default();
    if let Some(text) = deposit {
        ledger.deposit(parse_amount(text)?)?;
    }
    if let Some(text) = withdraw {
        ledger.withdraw(parse_amount(text)?)?;
    }
    print!(
        "{}",
        render::render_portfolio(ledger.state(), ledger.return_percentage())
    );
    Ok(())
}

pub fn layout(cols: u32, hide: &[String]) -> anyhow::Result<()> {
    let mut grid = CardGrid::default();
    for key in hide {
        let card: CardId = key.parse().map_err(|e: String| anyhow!(e))?;
        grid.toggle(card);
    }
    print!("{}", render::render_layout(&grid.generate_layout(cols), cols));
    Ok(())
}

pub async fn tab(app: &App, name: Option<&str>) -> anyhow::Result<()> {
    let Some(tab) = Tab::resolve(name) else {
        println!("{}", TAB_NOT_IMPLEMENTED);
        return Ok(());
    };

    match tab {
        Tab::Dashboard => layout(3, &[]),
        Tab::Charts => chart(app, CHART_TAB_COIN, 1, false).await,
        Tab::Portfolio => portfolio(None, None),
        Tab::Signals => signals(app).await,
        Tab::Chat => {
            let panels = PanelState::default();
            match &app.config.assistant {
                Some(assistant) => println!(
                    "Chat ready ({} backend, model {})",
                    if assistant.use_direct { "direct" } else { "agent" },
                    assistant.model
                ),
                None => println!("Chat unavailable: ANTHROPIC_API_KEY is not set"),
            }
            println!("Panels: left {}, right {}", panels.left, panels.right);
            Ok(())
        }
        Tab::Profile => {
            print!("{}", render::render_profile(Ledger::default().state()));
            Ok(())
        }
    }
}

pub async fn chat(app: &App, message: Option<String>, direct: bool) -> anyhow::Result<()> {
    let mut session = app.chat_session()?;
    if direct {
        session.set_use_direct(true);
    }

    if let Some(text) = message {
        return send(&mut session, &text).await;
    }

    println!("Type a message. Commands: /direct, /agent, /clear, /panels, /quit");
    let mut panels = PanelState::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "" => continue,
            "/quit" => break,
            "/direct" => session.set_use_direct(true),
            "/agent" => session.set_use_direct(false),
            "/clear" => session.clear_history(),
            "/panels" => {
                panels.toggle_both();
                println!("Panels: left {}, right {}", panels.left, panels.right);
            }
            text => {
                if let Err(e) = send(&mut session, text).await {
                    println!("! {}", e);
                }
            }
        }
    }
    Ok(())
}

async fn send(session: &mut ChatSession, text: &str) -> anyhow::Result<()> {
    match session.add_user_message(text).await {
        Some(reply) => {
            println!("{}", reply.content);
            Ok(())
        }
        None => bail!(session.error().unwrap_or_default().to_string()),
    }
}

pub async fn analyze(app: &App, id: &str) -> anyhow::Result<()> {
    let details = app.market.coin_details(id).await?;
    let snapshot = details.to_model();
    let price = snapshot
        .current_price
        .ok_or_else(|| anyhow!("No current price for {}", id))?;
    let market_data = serde_json::to_value(&snapshot)?;

    let mut session = app.chat_session()?;
    let Some(analysis) = session
        .generate_trade_signal(&details.name, price, &market_data)
        .await
    else {
        bail!(session.error().unwrap_or(SIGNAL_FAILED).to_string());
    };

    println!(
        "{:?} {} at ${}: target ${}, stop ${}, R/R {:.2}, confidence {}%",
        analysis.action,
        details.symbol.to_uppercase(),
        price,
        analysis.target,
        analysis.stop_loss,
        analysis.risk_reward,
        analysis.confidence
    );
    println!("{}", analysis.explanation);
    Ok(())
}

fn parse_param(pair: &str) -> anyhow::Result<(String, String)> {
    pair.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| anyhow!("expected key=value, got {:?}", pair))
}

fn parse_vector(text: &str) -> anyhow::Result<Vec<f32>> {
    text.split(',')
        .map(|c| {
            c.trim()
                .parse::<f32>()
                .with_context(|| format!("invalid vector component {:?}", c))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("vs_currency=usd").unwrap(),
            ("vs_currency".to_string(), "usd".to_string())
        );
        assert_eq!(parse_param("ids=a=b").unwrap().1, "a=b");
        assert!(parse_param("usd").is_err());
    }

    #[test]
    fn test_parse_vector() {
        assert_eq!(parse_vector("0.5, 1,-2").unwrap(), vec![0.5, 1.0, -2.0]);
        assert!(parse_vector("0.5,x").is_err());
    }

    #[test]
    fn test_portfolio_rejects_deposit_over_balance() {
        assert!(portfolio(Some("500"), Some("500")).is_ok());
        assert!(portfolio(Some("30000"), None).is_err());
        assert!(portfolio(Some("abc"), None).is_err());
    }

    #[test]
    fn test_layout_rejects_unknown_card() {
        assert!(layout(2, &["social".to_string()]).is_ok());
        assert!(layout(2, &["news".to_string()]).is_err());
    }
}
