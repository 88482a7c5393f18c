//! Pure scoring functions behind the trading-signals card.

use std::fmt;

use common::models::{MarketSnapshot, TradingPoints};

const BASE_SCORE: f64 = 50.0;
const MOMENTUM_BONUS: f64 = 10.0;
const TOP_RANK_BONUS: f64 = 10.0;
const TOP_RANK_CUTOFF: u32 = 100;

/// Samples between the latest price and the 30 minute reference price.
pub const THIRTY_MIN_LOOKBACK: usize = 30;

/// Heuristic 0-100 score from liquidity, momentum and rank.
///
/// `50 + volume/market_cap * 100`, plus 10 for a positive 24h change and 10
/// for a top-100 rank, rounded and clamped. A missing or zero market cap
/// divides by one; other missing fields contribute nothing.
pub fn confidence_score(snapshot: &MarketSnapshot) -> u8 {
    let volume = snapshot.total_volume.unwrap_or(0.0);
    let market_cap = snapshot
        .market_cap
        .filter(|cap| *cap != 0.0 && !cap.is_nan())
        .unwrap_or(1.0);

    let ratio = volume / market_cap;
    let mut score = BASE_SCORE;
    if !ratio.is_nan() {
        score += ratio * 100.0;
    }
    if snapshot.price_change_percentage_24h.is_some_and(|c| c > 0.0) {
        score += MOMENTUM_BONUS;
    }
    if snapshot.market_cap_rank.is_some_and(|r| r < TOP_RANK_CUTOFF) {
        score += TOP_RANK_BONUS;
    }

    score.round().clamp(0.0, 100.0) as u8
}

/// Entry, target and stop-loss scaled by the 24h move.
///
/// With `v = |change_24h| / 100`: entry sits `0.2v` under the price, the
/// target `2v` above it and the stop `v` under the entry.
pub fn trading_points(snapshot: &MarketSnapshot) -> TradingPoints {
    let price = match snapshot.current_price {
        Some(p) if p != 0.0 && !p.is_nan() => p,
        _ => return TradingPoints::default(),
    };

    let volatility = snapshot
        .price_change_percentage_24h
        .unwrap_or(0.0)
        .abs()
        / 100.0;

    let entry_price = price * (1.0 - volatility * 0.2);
    let target_price = price * (1.0 + volatility * 2.0);
    let stop_loss = entry_price * (1.0 - volatility);

    let potential_gain = target_price - entry_price;
    let potential_loss = entry_price - stop_loss;
    let risk_reward = if potential_loss == 0.0 {
        0.0
    } else {
        potential_gain / potential_loss
    };

    TradingPoints {
        entry_price,
        target_price,
        stop_loss,
        risk_reward,
    }
}

/// Percent change from the sample 30 positions back (or the first sample
/// when the series is shorter) to the latest one. Samples are assumed to
/// be evenly spaced.
pub fn price_change_30m(prices: &[f64]) -> f64 {
    if prices.len() < 2 {
        return 0.0;
    }
    let current = prices[prices.len() - 1];
    let reference = prices
        .len()
        .checked_sub(THIRTY_MIN_LOOKBACK)
        .map_or(prices[0], |i| prices[i]);

    if reference == 0.0 {
        return 0.0;
    }
    (current - reference) / reference * 100.0
}

/// Same as [`price_change_30m`] over `[timestamp, price]` chart pairs.
pub fn price_change_30m_from_chart(pairs: &[[f64; 2]]) -> f64 {
    let prices: Vec<f64> = pairs.iter().map(|[_, price]| *price).collect();
    price_change_30m(&prices)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
}

impl ConfidenceBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            70.. => Self::High,
            50..=69 => Self::Medium,
            _ => Self::Low,
        }
    }
}

impl fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(
        price: Option<f64>,
        change: Option<f64>,
        volume: Option<f64>,
        cap: Option<f64>,
        rank: Option<u32>,
    ) -> MarketSnapshot {
        MarketSnapshot {
            current_price: price,
            price_change_percentage_24h: change,
            total_volume: volume,
            market_cap: cap,
            market_cap_rank: rank,
        }
    }

    fn sample_grid() -> Vec<MarketSnapshot> {
        let prices = [None, Some(0.0), Some(0.000_02), Some(1.0), Some(65_000.0)];
        let changes = [None, Some(-99.0), Some(-3.5), Some(0.0), Some(12.0), Some(250.0)];
        let volumes = [None, Some(0.0), Some(1e6), Some(5e12)];
        let caps = [None, Some(0.0), Some(1.0), Some(2e9)];
        let ranks = [None, Some(1), Some(99), Some(100), Some(5000)];

        let mut out = Vec::new();
        for p in prices {
            for c in changes {
                for v in volumes {
                    for m in caps {
                        for r in ranks {
                            out.push(snapshot(p, c, v, m, r));
                        }
                    }
                }
            }
        }
        out
    }

    #[test]
    fn test_confidence_is_always_within_bounds() {
        for s in sample_grid() {
            assert!(confidence_score(&s) <= 100, "{:?}", s);
        }
    }

    #[test]
    fn test_confidence_components() {
        // 50 + 1e8/2e9*100 = 55, +10 momentum, +10 rank
        let s = snapshot(Some(1.0), Some(2.0), Some(1e8), Some(2e9), Some(5));
        assert_eq!(confidence_score(&s), 75);

        let no_bonus = snapshot(Some(1.0), Some(-2.0), Some(1e8), Some(2e9), Some(150));
        assert_eq!(confidence_score(&no_bonus), 55);

        assert_eq!(confidence_score(&MarketSnapshot::default()), 50);
    }

    #[test]
    fn test_missing_market_cap_divides_by_one() {
        let s = snapshot(None, None, Some(0.2), None, None);
        assert_eq!(confidence_score(&s), 70);
        let zero_cap = snapshot(None, None, Some(0.2), Some(0.0), None);
        assert_eq!(confidence_score(&zero_cap), 70);
        let huge = snapshot(None, None, Some(1e9), None, None);
        assert_eq!(confidence_score(&huge), 100);
    }

    #[test]
    fn test_entry_below_price_below_target_for_gains() {
        for s in sample_grid() {
            let (Some(price), Some(change)) = (s.current_price, s.price_change_percentage_24h)
            else {
                continue;
            };
            if price == 0.0 || change < 0.0 {
                continue;
            }
            let p = trading_points(&s);
            assert!(p.entry_price <= price, "{:?}", s);
            assert!(price <= p.target_price, "{:?}", s);
        }
    }

    #[test]
    fn test_risk_reward_is_zero_without_volatility() {
        for change in [None, Some(0.0)] {
            let p = trading_points(&snapshot(Some(10.0), change, None, None, None));
            assert_eq!(p.entry_price, p.stop_loss);
            assert_eq!(p.risk_reward, 0.0);
            assert_eq!(p.entry_price, 10.0);
        }
    }

    #[test]
    fn test_trading_points_values() {
        let p = trading_points(&snapshot(Some(100.0), Some(-10.0), None, None, None));
        assert!((p.entry_price - 98.0).abs() < 1e-9);
        assert!((p.target_price - 120.0).abs() < 1e-9);
        assert!((p.stop_loss - 88.2).abs() < 1e-9);
        assert!((p.risk_reward - 22.0 / 9.8).abs() < 1e-9);
    }

    #[test]
    fn test_missing_or_zero_price_gives_zero_points() {
        for price in [None, Some(0.0)] {
            let p = trading_points(&snapshot(price, Some(5.0), None, None, None));
            assert_eq!(p, TradingPoints::default());
        }
    }

    #[test]
    fn test_price_change_30m() {
        assert_eq!(price_change_30m(&[]), 0.0);
        assert_eq!(price_change_30m(&[5.0]), 0.0);
        assert!((price_change_30m(&[100.0, 110.0]) - 10.0).abs() < 1e-9);

        let mut long: Vec<f64> = vec![1.0; 40];
        long[10] = 50.0; // index len - 30
        long[39] = 75.0;
        assert!((price_change_30m(&long) - 50.0).abs() < 1e-9);

        assert_eq!(price_change_30m(&[0.0, 3.0]), 0.0);
    }

    #[test]
    fn test_price_change_30m_from_chart_pairs() {
        let pairs = [[1.0, 200.0], [2.0, 190.0]];
        assert!((price_change_30m_from_chart(&pairs) + 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_bands() {
        assert_eq!(ConfidenceBand::from_score(100), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_score(70), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_score(69), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_score(50), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_score(49), ConfidenceBand::Low);
        assert_eq!(ConfidenceBand::Medium.to_string(), "Medium");
    }
}
