//! Model output parsing — untrusted text in, validated envelope out.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::types::{Confidence, NO_INFO_ANSWER, ResponseEnvelope};

// Greedy: first `{` through last `}`.
static RE_JSON_OBJECT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Outcome of parsing model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedAnswer {
    /// The output held an object of the expected shape.
    Validated(ResponseEnvelope),
    /// The output was used as plain text.
    Fallback(ResponseEnvelope),
}

impl ParsedAnswer {
    pub fn into_envelope(self) -> ResponseEnvelope {
        match self {
            Self::Validated(env) | Self::Fallback(env) => env,
        }
    }

    pub fn is_validated(&self) -> bool {
        matches!(self, Self::Validated(_))
    }
}

/// Parse raw model text into an answer envelope.
pub fn parse_model_output(raw: &str) -> ParsedAnswer {
    match extract_envelope(raw) {
        Some(env) => ParsedAnswer::Validated(env),
        None => {
            let text = raw.trim();
            let answer = if text.is_empty() { NO_INFO_ANSWER } else { text };
            ParsedAnswer::Fallback(ResponseEnvelope::ungrounded(answer))
        }
    }
}

fn extract_envelope(raw: &str) -> Option<ResponseEnvelope> {
    let candidate = RE_JSON_OBJECT.find(raw)?.as_str();
    let value: Value = serde_json::from_str(candidate).ok()?;
    let obj = value.as_object()?;

    let answer = obj.get("answer")?.as_str()?;

    let sources = match obj.get("sources") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            let mut seen = HashSet::new();
            let mut ids = Vec::with_capacity(items.len());
            for item in items {
                let id = item.as_str()?;
                if seen.insert(id) {
                    ids.push(id.to_string());
                }
            }
            ids
        }
        Some(_) => return None,
    };

    let confidence = obj
        .get("confidence")
        .and_then(Value::as_str)
        .and_then(Confidence::parse)
        .unwrap_or(Confidence::Medium);

    // ResponseEnvelope::new forces `low` when sources are empty
    Some(ResponseEnvelope::new(answer, confidence, sources))
}
