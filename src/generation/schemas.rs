//! Structured output schemas
//!
//! Typed targets for structured generation. Each schema knows how to
//! describe its expected JSON shape to the model and how to validate a
//! parsed instance against its field constraints.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Number of search queries derived per task
pub const N_QUERIES: usize = 3;

/// A structured-output parse failure, with enough detail to drive the
/// repair prompt.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The completion was not valid JSON for the schema
    #[error("output is not valid JSON for the expected schema: {0}")]
    Json(#[from] serde_json::Error),
    /// The completion parsed but violated a field constraint
    #[error("schema constraint violated: {0}")]
    Constraint(String),
}

/// A type that can be produced by structured generation.
pub trait StructuredOutput: DeserializeOwned {
    /// Machine-readable description of the expected output, appended to the
    /// prompt as formatting instructions.
    fn format_instructions() -> String;

    /// Check every declared field constraint.
    fn validate(&self) -> Result<(), ParseError>;

    /// Parse raw model text into a validated instance.
    fn parse(raw: &str) -> Result<Self, ParseError> {
        let value: Self = serde_json::from_str(strip_code_fences(raw))?;
        value.validate()?;
        Ok(value)
    }
}

/// Remove a surrounding markdown code fence, if present.
///
/// Models frequently wrap JSON in ```json ... ``` despite instructions.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// The synthesized research persona
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expert {
    /// Single emoji glyph representing the persona's field
    pub emoji: String,
    /// Short persona name describing its function or role
    pub name: String,
    /// Full behaviour description, consumed by query generation
    pub description: String,
}

impl StructuredOutput for Expert {
    fn format_instructions() -> String {
        "Respond with a single JSON object, and nothing else:\n\
         {\"emoji\": \"<exactly one emoji character>\", \
         \"name\": \"<the agent's name>\", \
         \"description\": \"<the agent's complete behaviour description>\"}"
            .to_string()
    }

    fn validate(&self) -> Result<(), ParseError> {
        let glyphs = self.emoji.chars().count();
        if glyphs != 1 {
            return Err(ParseError::Constraint(format!(
                "emoji must be exactly one character, got {}",
                glyphs
            )));
        }
        if self.name.trim().is_empty() {
            return Err(ParseError::Constraint("name must not be empty".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(ParseError::Constraint(
                "description must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// The derived search query set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Queries {
    /// Exactly `N_QUERIES` distinct search queries
    pub queries_list: Vec<String>,
}

impl StructuredOutput for Queries {
    fn format_instructions() -> String {
        format!(
            "Respond with a single JSON object, and nothing else:\n\
             {{\"queries_list\": [<exactly {} query strings>]}}",
            N_QUERIES
        )
    }

    fn validate(&self) -> Result<(), ParseError> {
        if self.queries_list.len() != N_QUERIES {
            return Err(ParseError::Constraint(format!(
                "queries_list must contain exactly {} queries, got {}",
                N_QUERIES,
                self.queries_list.len()
            )));
        }
        if self.queries_list.iter().any(|q| q.trim().is_empty()) {
            return Err(ParseError::Constraint(
                "queries must not be empty".to_string(),
            ));
        }
        let distinct: HashSet<&str> = self.queries_list.iter().map(|q| q.as_str()).collect();
        if distinct.len() != self.queries_list.len() {
            return Err(ParseError::Constraint(
                "queries must be distinct".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expert_parses_valid_json() {
        let raw = r#"{"emoji": "☕", "name": "Barista", "description": "Coffee historian."}"#;
        let expert = Expert::parse(raw).unwrap();
        assert_eq!(expert.emoji, "☕");
        assert_eq!(expert.name, "Barista");
    }

    #[test]
    fn test_expert_parses_fenced_json() {
        let raw = "```json\n{\"emoji\": \"☕\", \"name\": \"Barista\", \"description\": \"x\"}\n```";
        assert!(Expert::parse(raw).is_ok());
    }

    #[test]
    fn test_expert_rejects_multi_character_emoji() {
        let raw = r#"{"emoji": "☕☕", "name": "Barista", "description": "x"}"#;
        let err = Expert::parse(raw).unwrap_err();
        assert!(matches!(err, ParseError::Constraint(_)));
        assert!(err.to_string().contains("emoji"));
    }

    #[test]
    fn test_expert_rejects_empty_name() {
        let raw = r#"{"emoji": "☕", "name": " ", "description": "x"}"#;
        assert!(Expert::parse(raw).is_err());
    }

    #[test]
    fn test_expert_rejects_non_json() {
        let err = Expert::parse("I am a barista").unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn test_queries_accepts_exact_count() {
        let raw = r#"{"queries_list": ["history of coffee", "coffee myths", "coffee economics"]}"#;
        let queries = Queries::parse(raw).unwrap();
        assert_eq!(queries.queries_list.len(), N_QUERIES);
    }

    #[test]
    fn test_queries_rejects_wrong_count() {
        let raw = r#"{"queries_list": ["one", "two"]}"#;
        let err = Queries::parse(raw).unwrap_err();
        assert!(err.to_string().contains("exactly 3"));
    }

    #[test]
    fn test_queries_rejects_duplicates() {
        let raw = r#"{"queries_list": ["same", "same", "other"]}"#;
        let err = Queries::parse(raw).unwrap_err();
        assert!(err.to_string().contains("distinct"));
    }

    #[test]
    fn test_strip_code_fences_passthrough() {
        assert_eq!(strip_code_fences("  {\"a\": 1} "), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```{\"a\": 1}```"), "{\"a\": 1}");
    }
}
