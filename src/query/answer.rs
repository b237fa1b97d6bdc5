//! Splitting a raw completion into reasoning trace and final answer.
//!
//! Reasoning models wrap their chain of thought in `<think>...</think>` and
//! are often followed by a `Response:` label. Both are stripped from the
//! answer. This is a textual convention, not a protocol: a completion without
//! the delimiter is taken whole.

use std::sync::LazyLock;

use regex::Regex;

static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>(.*?)</think>").unwrap());

/// Label some models put in front of the answer after their reasoning.
pub const RESPONSE_PREFIX: &str = "Response:";

/// A completion split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCompletion {
    pub answer: String,
    /// Trimmed reasoning text; `None` when absent or blank.
    pub reasoning: Option<String>,
}

/// Separate the first `<think>` block from the answer.
pub fn parse_completion(raw: &str) -> ParsedCompletion {
    let Some(caps) = THINK_BLOCK.captures(raw) else {
        return ParsedCompletion {
            answer: raw.trim().to_string(),
            reasoning: None,
        };
    };

    let block = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
    let reasoning = caps
        .get(1)
        .map(|m| m.as_str().trim().to_string())
        .filter(|r| !r.is_empty());

    let remainder = format!("{}{}", &raw[..block.start], &raw[block.end..]);
    let remainder = remainder.trim();
    let answer = remainder
        .strip_prefix(RESPONSE_PREFIX)
        .unwrap_or(remainder)
        .trim()
        .to_string();

    ParsedCompletion { answer, reasoning }
}
