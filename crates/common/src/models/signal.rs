use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    Ai,
    Meme,
    Defi,
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ai => write!(f, "AI"),
            Self::Meme => write!(f, "MEME"),
            Self::Defi => write!(f, "DEFI"),
        }
    }
}

impl FromStr for SignalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AI" => Ok(Self::Ai),
            "MEME" => Ok(Self::Meme),
            "DEFI" => Ok(Self::Defi),
            other => Err(format!("unknown signal type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TradingPoints {
    pub entry_price: f64,
    pub target_price: f64,
    pub stop_loss: f64,
    pub risk_reward: f64,
}

/// Derived per-token record, rebuilt on every poll and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSignal {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: Option<String>,
    pub current_price: f64,
    pub market_cap: f64,
    pub price_change_percentage_30m: f64,
    pub price_change_percentage_24h: f64,
    pub last_updated: Option<DateTime<Utc>>,
    pub confidence_score: u8,
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    #[serde(flatten)]
    pub points: TradingPoints,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_type_round_trips_through_display() {
        for ty in [SignalType::Ai, SignalType::Meme, SignalType::Defi] {
            assert_eq!(ty.to_string().parse::<SignalType>(), Ok(ty));
        }
        assert!("NFT".parse::<SignalType>().is_err());
    }

    #[test]
    fn test_token_signal_serializes_flat_trading_points() {
        let signal = TokenSignal {
            id: "bonk".to_string(),
            name: "Bonk".to_string(),
            symbol: "BONK".to_string(),
            image: None,
            current_price: 0.00002,
            market_cap: 1.5e9,
            price_change_percentage_30m: 0.0,
            price_change_percentage_24h: 4.2,
            last_updated: None,
            confidence_score: 70,
            signal_type: SignalType::Meme,
            points: TradingPoints {
                entry_price: 1.0,
                target_price: 2.0,
                stop_loss: 0.5,
                risk_reward: 2.0,
            },
        };

        let json = serde_json::to_value(&signal).unwrap();
        assert_eq!(json["type"], "MEME");
        assert_eq!(json["entry_price"], 1.0);
        assert_eq!(json["risk_reward"], 2.0);
    }
}
