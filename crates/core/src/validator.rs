//! Shape validation for generated poems.

use crate::domain::PoemResult;
use crate::error::GenerationError;

/// Splits completion text on newlines, dropping lines that are blank once trimmed.
///
/// Surviving lines are kept as-is and in order.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Validates raw completion text against an exact line count.
pub fn validate_poem(text: &str, expected: usize) -> Result<PoemResult, GenerationError> {
    validate_lines(split_lines(text), expected)
}

/// Validates already-split lines, e.g. a poem received over the wire.
pub fn validate_lines(lines: Vec<String>, expected: usize) -> Result<PoemResult, GenerationError> {
    let lines: Vec<String> = lines
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.len() != expected {
        return Err(GenerationError::MalformedResponse {
            expected,
            actual: lines.len(),
        });
    }

    Ok(PoemResult::new(lines))
}
