use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::anthropic::CompletionModel;
use crate::error::AssistantError;
use crate::message::ChatMessage;

const ANALYST_SYSTEM_PROMPT: &str = "You are a quantitative crypto analyst. Reply with a \
single JSON object and nothing else, using exactly these fields: \"action\" (\"BUY\" or \
\"SELL\"), \"confidence\" (0-100), \"target\" (price), \"stopLoss\" (price), \"explanation\" \
(one or two sentences) and \"riskReward\" (number).";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeAnalysis {
    pub action: TradeAction,
    pub confidence: f64,
    pub target: f64,
    pub stop_loss: f64,
    pub explanation: String,
    pub risk_reward: f64,
}

pub fn analysis_prompt(token: &str, current_price: f64, market_data: &Value) -> String {
    format!(
        "Analyze {token} trading at ${current_price} and produce a trade signal.\n\
         Market data:\n{market_data}"
    )
}

/// Pulls the outermost JSON object out of a reply that may wrap it in
/// prose or a code fence, then validates it.
pub fn parse_analysis(text: &str) -> Result<TradeAnalysis, AssistantError> {
    let start = text
        .find('{')
        .ok_or_else(|| AssistantError::InvalidAnalysis("no JSON object in reply".into()))?;
    let end = text
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| AssistantError::InvalidAnalysis("unterminated JSON object".into()))?;

    let analysis: TradeAnalysis = serde_json::from_str(&text[start..=end])?;
    validate(&analysis)?;
    Ok(analysis)
}

fn validate(analysis: &TradeAnalysis) -> Result<(), AssistantError> {
    if !(0.0..=100.0).contains(&analysis.confidence) {
        return Err(AssistantError::InvalidAnalysis(format!(
            "confidence {} outside 0-100",
            analysis.confidence
        )));
    }
    let prices = [analysis.target, analysis.stop_loss, analysis.risk_reward];
    if prices.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(AssistantError::InvalidAnalysis(
            "prices and risk/reward must be non-negative".into(),
        ));
    }
    Ok(())
}

pub async fn create_trade_analysis(
    model: &dyn CompletionModel,
    token: &str,
    current_price: f64,
    market_data: &Value,
) -> Result<TradeAnalysis, AssistantError> {
    let prompt = analysis_prompt(token, current_price, market_data);
    let reply = model
        .complete(
            Some(ANALYST_SYSTEM_PROMPT.to_string()),
            &[ChatMessage::user(prompt)],
        )
        .await?;
    let analysis = parse_analysis(&reply)?;
    info!(
        "Trade analysis for {}: {:?} at {:.0}% confidence",
        token, analysis.action, analysis.confidence
    );
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::anthropic::MockCompletionModel;

    const REPLY: &str = r#"{"action":"BUY","confidence":72,"target":180.5,"stopLoss":139.0,"explanation":"Momentum with rising volume.","riskReward":2.4}"#;

    #[test]
    fn test_parse_plain_json() {
        let analysis = parse_analysis(REPLY).unwrap();
        assert_eq!(analysis.action, TradeAction::Buy);
        assert_eq!(analysis.stop_loss, 139.0);
        assert_eq!(analysis.risk_reward, 2.4);
    }

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let wrapped = format!("Here is the signal:\n```json\n{REPLY}\n```\nGood luck.");
        assert_eq!(parse_analysis(&wrapped).unwrap().confidence, 72.0);
    }

    #[test]
    fn test_parse_rejects_bad_replies() {
        assert!(matches!(
            parse_analysis("no idea"),
            Err(AssistantError::InvalidAnalysis(_))
        ));
        assert!(matches!(
            parse_analysis(r#"{"action":"HOLD"}"#),
            Err(AssistantError::Json(_))
        ));
        let overconfident = REPLY.replace("72", "140");
        assert!(matches!(
            parse_analysis(&overconfident),
            Err(AssistantError::InvalidAnalysis(_))
        ));
    }

    #[tokio::test]
    async fn test_create_trade_analysis_prompts_with_token() {
        let mut model = MockCompletionModel::new();
        model
            .expect_complete()
            .withf(|system, messages| {
                system.is_some() && messages[0].content.contains("Analyze SOL trading at $150")
            })
            .returning(|_, _| Ok(REPLY.to_string()));

        let analysis = create_trade_analysis(&model, "SOL", 150.0, &json!({"volume": 1}))
            .await
            .unwrap();
        assert_eq!(analysis.action, TradeAction::Buy);
    }
}
