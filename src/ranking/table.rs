//! Condition normalization and the condition → rank table.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use serde_json::Value;

use crate::error::{Error, Result};

/// Spellings that mean "no condition" once title-cased.
const NEGATED: [&str; 5] = ["Nil", "Nill", "No", "None", "Nan"];

/// Title-cases `text` the way survey answers are compared: the first
/// letter of every run of letters upper-cased, the rest lower-cased.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

/// Normalizes a free-text condition.
///
/// Returns `None` for empty input and for negated answers ("nil", "none",
/// "no", ...), which never receive a rank.
pub fn normalize_condition(text: &str) -> Option<String> {
    let normalized = title_case(text.trim());
    if normalized.is_empty() || NEGATED.contains(&normalized.as_str()) {
        None
    } else {
        Some(normalized)
    }
}

/// Normalized condition → priority.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankingTable {
    ranks: BTreeMap<String, NonZeroU32>,
}

impl RankingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a condition. Negated conditions are ignored. When two spellings
    /// normalize to the same condition the higher priority (lower number)
    /// is kept whatever the insertion order, so a later spelling never
    /// overrides a higher priority already stored.
    pub fn insert(&mut self, condition: &str, rank: NonZeroU32) {
        let Some(key) = normalize_condition(condition) else {
            log::debug!("ignoring negated condition {condition:?} in ranking table");
            return;
        };
        self.ranks
            .entry(key)
            .and_modify(|r| *r = (*r).min(rank))
            .or_insert(rank);
    }

    pub fn with_rank(mut self, condition: &str, rank: NonZeroU32) -> Self {
        self.insert(condition, rank);
        self
    }

    /// Looks up an already-normalized condition.
    pub fn get(&self, normalized: &str) -> Option<NonZeroU32> {
        self.ranks.get(normalized).copied()
    }

    /// Normalizes `condition` and looks it up.
    pub fn lookup(&self, condition: &str) -> Option<NonZeroU32> {
        normalize_condition(condition).and_then(|key| self.get(&key))
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NonZeroU32)> {
        self.ranks.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Parses a classifier response of the form `{"Asthma": 1, ...}`.
    ///
    /// Markdown code fences around the object are stripped. A response
    /// with no double quotes at all is read with single quotes as string
    /// delimiters. Every rank must be a positive integer.
    pub fn parse_response(text: &str) -> Result<Self> {
        let body = strip_code_fences(text);
        let body = if body.contains('"') {
            body
        } else {
            body.replace('\'', "\"")
        };
        let object: serde_json::Map<String, Value> = serde_json::from_str(&body)
            .map_err(|e| Error::RankingResponse(format!("expected a JSON object: {e}")))?;

        let mut table = RankingTable::new();
        for (condition, value) in &object {
            let rank = value
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .and_then(NonZeroU32::new)
                .ok_or_else(|| {
                    Error::RankingResponse(format!(
                        "rank for {condition:?} must be a positive integer, got {value}"
                    ))
                })?;
            table.insert(condition, rank);
        }
        Ok(table)
    }
}

/// Removes every "```" marker together with a language tag directly after
/// it, then trims.
fn strip_code_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find("```") {
        out.push_str(&rest[..idx]);
        rest = rest[idx + 3..].trim_start_matches(|c: char| c.is_ascii_alphabetic());
    }
    out.push_str(rest);
    out.trim().to_string()
}
