use common::models::SignalType;

pub const AI_TOKENS: &[&str] = &["solana", "pyth-network", "render-token"];
pub const MEME_TOKENS: &[&str] = &["bonk", "samoyedcoin"];
pub const DEFI_TOKENS: &[&str] = &["raydium", "marinade-staked-sol", "jito-staked-sol"];

/// Solana-ecosystem coin ids the dashboard knows about.
pub const SOLANA_ECOSYSTEM_TOKENS: &[&str] = &[
    "solana",
    "raydium",
    "bonk",
    "jito",
    "pyth-network",
    "render-token",
    "serum",
    "bonfida",
    "step-finance",
    "oxygen",
    "mango-markets",
    "star-atlas",
    "samoyedcoin",
    "marinade-staked-sol",
    "jito-staked-sol",
];

/// Every id the signals card tracks, AI first, then MEME, then DEFI.
pub fn signal_universe() -> Vec<String> {
    AI_TOKENS
        .iter()
        .chain(MEME_TOKENS)
        .chain(DEFI_TOKENS)
        .map(|id| id.to_string())
        .collect()
}

/// Category of a coin id. Anything outside the AI and MEME lists is DEFI.
pub fn classify(id: &str) -> SignalType {
    if AI_TOKENS.contains(&id) {
        SignalType::Ai
    } else if MEME_TOKENS.contains(&id) {
        SignalType::Meme
    } else {
        SignalType::Defi
    }
}

pub fn is_solana_ecosystem(id: &str) -> bool {
    SOLANA_ECOSYSTEM_TOKENS.contains(&id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universe_order_and_size() {
        let ids = signal_universe();
        assert_eq!(ids.len(), 8);
        assert_eq!(ids.first().map(String::as_str), Some("solana"));
        assert_eq!(ids.last().map(String::as_str), Some("jito-staked-sol"));
    }

    #[test]
    fn test_classification_falls_through_to_defi() {
        assert_eq!(classify("render-token"), SignalType::Ai);
        assert_eq!(classify("samoyedcoin"), SignalType::Meme);
        assert_eq!(classify("raydium"), SignalType::Defi);
        assert_eq!(classify("anything-else"), SignalType::Defi);
    }

    #[test]
    fn test_universe_is_solana_ecosystem() {
        assert!(signal_universe().iter().all(|id| is_solana_ecosystem(id)));
        assert!(!is_solana_ecosystem("ethereum"));
    }
}
