use std::fmt::Write;

use common::models::{TokenSignal, UserState};
use market_data::remote::{GlobalData, Pool, SearchCoin, TrendingCoin};
use strategy::ConfidenceBand;

use crate::services::global_poller::GlobalBoard;
use crate::services::signal_poller::SignalBoard;
use crate::shell::LayoutItem;

pub fn format_market_cap(market_cap: f64) -> String {
    if market_cap >= 1e9 {
        format!("${:.2}B", market_cap / 1e9)
    } else if market_cap >= 1e6 {
        format!("${:.2}M", market_cap / 1e6)
    } else {
        format!("${:.2}K", market_cap / 1e3)
    }
}

pub fn format_change(pct: f64) -> String {
    format!("{:+.2}%", pct)
}

pub fn render_signal(signal: &TokenSignal) -> String {
    let points = &signal.points;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} [{}] {}  ${}  24h: {}  30m: {}",
        signal.symbol,
        signal.signal_type,
        signal.name,
        signal.current_price,
        format_change(signal.price_change_percentage_24h),
        format_change(signal.price_change_percentage_30m),
    );
    let _ = writeln!(
        out,
        "  entry ${:.4}  target ${:.4}  stop ${:.4}  R/R {:.2}",
        points.entry_price, points.target_price, points.stop_loss, points.risk_reward
    );
    let _ = write!(
        out,
        "  mcap {}  {}% confidence ({})",
        format_market_cap(signal.market_cap),
        signal.confidence_score,
        ConfidenceBand::from_score(signal.confidence_score)
    );
    out
}

pub fn render_signal_board(board: &SignalBoard) -> String {
    let mut out = String::from("== Trading Signals ==\n");
    if let Some(error) = &board.error {
        let _ = writeln!(out, "! {}", error);
    }
    if board.signals.is_empty() && board.error.is_none() {
        out.push_str("Loading signals...\n");
    }
    for signal in &board.signals {
        let _ = writeln!(out, "{}", render_signal(signal));
    }
    if let Some(at) = board.last_update {
        let _ = writeln!(out, "Last update: {}", at.format("%H:%M:%S UTC"));
    }
    out
}

pub fn render_global(stats: &GlobalData) -> String {
    let mut out = String::from("== Global Market ==\n");
    if let Some(cap) = stats.total_market_cap_usd() {
        let _ = writeln!(
            out,
            "Market cap: {} ({} 24h)",
            format_market_cap(cap),
            format_change(stats.market_cap_change_percentage_24h_usd)
        );
    }
    if let Some(volume) = stats.total_volume_usd() {
        let _ = writeln!(out, "24h volume: {}", format_market_cap(volume));
    }
    let dominance: Vec<String> = stats
        .dominance()
        .into_iter()
        .take(3)
        .map(|(symbol, pct)| format!("{} {:.1}%", symbol.to_uppercase(), pct))
        .collect();
    if !dominance.is_empty() {
        let _ = writeln!(out, "Dominance: {}", dominance.join(", "));
    }
    let _ = writeln!(out, "Active coins: {}", stats.active_cryptocurrencies);
    out
}

pub fn render_global_board(board: &GlobalBoard) -> String {
    match (&board.stats, &board.error) {
        (_, Some(error)) => format!("== Global Market ==\n! {}\n", error),
        (Some(stats), None) => render_global(stats),
        (None, None) => "== Global Market ==\nLoading...\n".to_string(),
    }
}

pub fn render_layout(layout: &[LayoutItem], columns: u32) -> String {
    if layout.is_empty() {
        return format!("No layout for {} columns\n", columns);
    }
    let mut out = format!("== Dashboard ({} columns) ==\n", columns);
    for item in layout {
        let max_w = item.max_w.unwrap_or(columns);
        let _ = writeln!(
            out,
            "{:<22} x={} y={} w={} h={} (width {}..={})",
            item.card.title(),
            item.x,
            item.y,
            item.w,
            item.h,
            item.min_w,
            max_w
        );
    }
    out
}

pub fn render_portfolio(state: &UserState, return_pct: f64) -> String {
    format!(
        "== Investment Portfolio ==\n\
         Balance:         ${:.2}\n\
         Invested:        ${:.2}\n\
         Portfolio value: ${:.2}\n\
         Return:          {}\n",
        state.balance,
        state.invested_amount,
        state.portfolio_value,
        format_change(return_pct)
    )
}

pub fn render_profile(state: &UserState) -> String {
    format!(
        "== Agent Profile ==\n\
         Member since:      {}\n\
         Next distribution: {}\n\
         Monthly return:    {}\n\
         All-time return:   {}\n",
        state.join_date.format("%b %-d, %Y"),
        state.next_distribution.format("%b %-d, %Y"),
        format_change(state.monthly_return),
        format_change(state.all_time_return)
    )
}

pub fn render_search(coins: &[SearchCoin]) -> String {
    if coins.is_empty() {
        return "No tokens found\n".to_string();
    }
    let mut out = String::new();
    for coin in coins {
        let rank = coin
            .market_cap_rank
            .map(|r| format!("#{}", r))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:>6}  {:<10} {} ({})",
            rank,
            coin.symbol.to_uppercase(),
            coin.name,
            coin.id
        );
    }
    out
}

pub fn render_trending(coins: &[TrendingCoin]) -> String {
    let mut out = String::from("== Trending ==\n");
    for (i, coin) in coins.iter().enumerate() {
        let _ = writeln!(out, "{}. {} ({})", i + 1, coin.name, coin.symbol.to_uppercase());
    }
    out
}

pub fn render_pools(pools: &[Pool]) -> String {
    if pools.is_empty() {
        return "No Solana pools\n".to_string();
    }
    let mut out = String::new();
    for pool in pools {
        let name = pool.attributes.name.as_deref().unwrap_or(&pool.id);
        let reserve = pool
            .reserve_usd()
            .map(format_market_cap)
            .unwrap_or_else(|| "-".to_string());
        let price = pool
            .base_price_usd()
            .map(|p| format!("${}", p))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(out, "{:<30} reserve {:<10} price {}", name, reserve, price);
    }
    out
}
