// service/response_parser.rs
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::service::error::{ServiceError, INVALID_AI_RESPONSE};

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\s*(\{[\s\S]*?\})\s*```").expect("valid fenced-json regex"));

static BARE_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[\s\S]*\}").expect("valid bare-object regex"));

/// The schema the basic classifier prompt asks the model for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawClassification {
    pub category: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub confidence: f64,
    #[serde(default)]
    pub explanation: String,
}

impl RawClassification {
    /// Confidence as a whole percentage, never outside 0..=100.
    pub fn confidence_percent(&self) -> u8 {
        if !self.confidence.is_finite() {
            return 0;
        }
        self.confidence.round().clamp(0.0, 100.0) as u8
    }
}

/// Accepts `87`, `87.5`, `"87"` and `"87%"`; anything else reads as 0.
pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// Lenient like [`lenient_number`], then rounded into 0..=100.
pub(crate) fn lenient_percent<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_number(deserializer)?;
    if !value.is_finite() {
        return Ok(0.0);
    }
    Ok(value.round().clamp(0.0, 100.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    Direct,
    Fenced,
    BareObject,
}

/// Tries, in order: the whole text, a ```json fenced block, then the span from the
/// first `{` to the last `}`. Returns which path succeeded.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Result<(T, ParseStrategy), ServiceError> {
    if let Ok(parsed) = serde_json::from_str::<T>(text.trim()) {
        return Ok((parsed, ParseStrategy::Direct));
    }

    if let Some(block) = FENCED_JSON.captures(text).and_then(|c| c.get(1)) {
        match serde_json::from_str::<T>(block.as_str()) {
            Ok(parsed) => return Ok((parsed, ParseStrategy::Fenced)),
            Err(e) => tracing::debug!("fenced JSON block did not parse: {}", e),
        }
    }

    if let Some(object) = BARE_OBJECT.find(text) {
        match serde_json::from_str::<T>(object.as_str()) {
            Ok(parsed) => return Ok((parsed, ParseStrategy::BareObject)),
            Err(e) => tracing::debug!("bare JSON object did not parse: {}", e),
        }
    }

    Err(ServiceError::InvalidAiResponse(INVALID_AI_RESPONSE.to_string()))
}

pub fn parse_classification(text: &str) -> Result<RawClassification, ServiceError> {
    let (parsed, strategy) = extract_json::<RawClassification>(text)?;
    tracing::debug!(?strategy, category = %parsed.category, "parsed classification response");
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: &str =
        r#"{"category": "Glass", "confidence": 92, "explanation": "Green bottle with a screw neck."}"#;

    fn expected() -> RawClassification {
        RawClassification {
            category: "Glass".to_string(),
            confidence: 92.0,
            explanation: "Green bottle with a screw neck.".to_string(),
        }
    }

    #[test]
    fn direct_json_parses() {
        let (parsed, strategy) = extract_json::<RawClassification>(PLAIN).unwrap();
        assert_eq!(parsed, expected());
        assert_eq!(strategy, ParseStrategy::Direct);
    }

    #[test]
    fn fenced_block_matches_unfenced_result() {
        let fenced = format!("Here is my analysis:\n```json\n{}\n```\nHope that helps!", PLAIN);
        let (parsed, strategy) = extract_json::<RawClassification>(&fenced).unwrap();
        assert_eq!(parsed, expected());
        assert_eq!(strategy, ParseStrategy::Fenced);

        let untagged = format!("```\n{}\n```", PLAIN);
        assert_eq!(parse_classification(&untagged).unwrap(), expected());
    }

    #[test]
    fn bare_object_in_prose_matches_direct_result() {
        let prose = format!("Sure! {} Let me know if you need more.", PLAIN);
        let (parsed, strategy) = extract_json::<RawClassification>(&prose).unwrap();
        assert_eq!(parsed, expected());
        assert_eq!(strategy, ParseStrategy::BareObject);
    }

    #[test]
    fn every_strategy_agrees_on_valid_json() {
        let inputs = [
            PLAIN.to_string(),
            format!("```json{}```", PLAIN),
            format!("Result: {}", PLAIN),
        ];
        for input in inputs {
            assert_eq!(parse_classification(&input).unwrap(), expected());
        }
    }

    #[test]
    fn no_json_is_a_hard_failure() {
        let err = parse_classification("I cannot tell what this is, sorry.").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidAiResponse(ref m) if m == INVALID_AI_RESPONSE));
    }

    #[test]
    fn broken_json_is_a_hard_failure() {
        let err = parse_classification("```json\n{\"category\": \"Metal\", \n```").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidAiResponse(_)));
    }

    #[test]
    fn confidence_is_lenient_and_clamped() {
        let parsed =
            parse_classification(r#"{"category":"Paper","confidence":"85%","explanation":""}"#).unwrap();
        assert_eq!(parsed.confidence_percent(), 85);

        let parsed = parse_classification(r#"{"category":"Paper","confidence":140}"#).unwrap();
        assert_eq!(parsed.confidence_percent(), 100);

        let parsed = parse_classification(r#"{"category":"Paper","confidence":-3}"#).unwrap();
        assert_eq!(parsed.confidence_percent(), 0);

        let parsed = parse_classification(r#"{"category":"Paper"}"#).unwrap();
        assert_eq!(parsed.confidence_percent(), 0);
        assert_eq!(parsed.explanation, "");
    }
}
