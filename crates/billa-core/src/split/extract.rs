//! Extraction of the structured split result from a prose response.
//!
//! The split service answers with natural language that embeds either a JSON
//! array of `{name, amount}` rows or a `{splits, reasoning}` object somewhere in
//! the text. We scan for delimiter pairs, outermost first, and take the first
//! one that parses.

use super::model::{SplitLine, SplitOutcome};
use crate::error::{BillaError, Result};
use crate::receipt::checked_sum;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum SplitPayload {
    Lines(Vec<SplitLine>),
    Object {
        #[serde(alias = "split")]
        splits: Vec<SplitLine>,
        #[serde(default)]
        reasoning: Option<String>,
    },
}

/// Parses the raw split service response into split lines plus reasoning.
///
/// Fails with [`BillaError::UpstreamFormat`] when the text holds no delimited
/// structure, or none of the candidates parse into at least one split line.
pub fn parse_split_response(text: &str) -> Result<SplitOutcome> {
    let mut last_error: Option<String> = None;
    let mut saw_candidate = false;

    for candidate in candidates(text) {
        saw_candidate = true;
        match serde_json::from_str::<SplitPayload>(candidate) {
            Ok(SplitPayload::Lines(lines)) if !lines.is_empty() => {
                return checked_outcome(lines, text.to_string());
            }
            Ok(SplitPayload::Object { splits, reasoning }) if !splits.is_empty() => {
                let reasoning = reasoning
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| text.to_string());
                return checked_outcome(splits, reasoning);
            }
            Ok(_) => last_error = Some("structured result contained no split lines".to_string()),
            Err(err) => last_error = Some(err.to_string()),
        }
    }

    if !saw_candidate {
        return Err(BillaError::upstream_format(
            "no structured split result found in response",
        ));
    }

    Err(BillaError::upstream_format(format!(
        "could not parse split result: {}",
        last_error.unwrap_or_default()
    )))
}

fn checked_outcome(lines: Vec<SplitLine>, reasoning: String) -> Result<SplitOutcome> {
    if checked_sum(lines.iter().map(|line| line.amount)).is_none() {
        return Err(BillaError::upstream_format(
            "split amounts are out of range",
        ));
    }
    Ok(SplitOutcome { lines, reasoning })
}

/// Locates the first (outermost) delimited structure in `text`.
pub fn locate_structured_payload(text: &str) -> Option<&str> {
    candidates(text).next()
}

/// Yields every delimited span, in order of its opening delimiter.
fn candidates(text: &str) -> impl Iterator<Item = &str> {
    text.char_indices()
        .filter(|(_, c)| *c == '[' || *c == '{')
        .filter_map(move |(start, open)| {
            let end = matching_close(text, start, open)?;
            Some(&text[start..=end])
        })
}

/// Finds the index of the delimiter closing the one at `start`.
///
/// Brackets inside JSON strings are ignored. When the structure never
/// balances, falls back to the last closing delimiter of the same kind, so a
/// truncated tail still gets a chance to parse.
fn matching_close(text: &str, start: usize, open: char) -> Option<usize> {
    let close = if open == '[' { ']' } else { '}' };
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return (c == close).then_some(start + offset);
                }
            }
            _ => {}
        }
    }

    text.rfind(close).filter(|end| *end > start)
}
