use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::PoemError;

/// Input sent by the daily-inspiration flow. The daily prompt ignores it;
/// it only has to pass the presence check.
pub const DAILY_SENTINEL_INPUT: &str = "daily inspiration";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PoemVariant {
    /// Free-form poem seeded by the caller's word or phrase
    #[default]
    Inspire,
    /// One poem per day, cached on the client
    Daily,
}

impl PoemVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inspire => "inspire",
            Self::Daily => "daily",
        }
    }

    /// Endpoint name the variant is served under.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Inspire => "generate-poem",
            Self::Daily => "daily-inspiration",
        }
    }

    /// User-facing message for any generation failure of this variant.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::Inspire => "Failed to generate poem. Please try again in a moment.",
            Self::Daily => "Failed to generate daily inspiration. Please try again in a moment.",
        }
    }
}

/// A caller's request, trimmed and known to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoemRequest {
    input: String,
}

impl PoemRequest {
    pub fn new(input: impl AsRef<str>) -> Result<Self, PoemError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PoemError::InputMissing);
        }
        Ok(Self {
            input: trimmed.to_string(),
        })
    }

    pub fn daily() -> Self {
        Self {
            input: DAILY_SENTINEL_INPUT.to_string(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }
}

/// Ordered poem lines. Serialized as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PoemResult {
    lines: Vec<String>,
}

impl PoemResult {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Plain-text form used when copying or sharing a poem.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_trims_input() {
        let request = PoemRequest::new("  hope \n").unwrap();
        assert_eq!(request.input(), "hope");
    }

    #[test]
    fn test_request_rejects_blank_input() {
        assert!(matches!(PoemRequest::new(""), Err(PoemError::InputMissing)));
        assert!(matches!(
            PoemRequest::new(" \t\n "),
            Err(PoemError::InputMissing)
        ));
    }

    #[test]
    fn test_daily_request_uses_sentinel() {
        assert_eq!(PoemRequest::daily().input(), "daily inspiration");
    }

    #[test]
    fn test_variant_endpoints() {
        assert_eq!(PoemVariant::Inspire.endpoint(), "generate-poem");
        assert_eq!(PoemVariant::Daily.endpoint(), "daily-inspiration");
    }

    #[test]
    fn test_poem_result_serializes_as_array() {
        let poem = PoemResult::new(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(serde_json::to_string(&poem).unwrap(), r#"["a","b"]"#);
        assert_eq!(poem.to_text(), "a\nb");

        let parsed: PoemResult = serde_json::from_str(r#"["x","y","z"]"#).unwrap();
        assert_eq!(parsed.len(), 3);
    }
}
