//! Result Summaries
//!
//! Turns ranked matches into short, flat descriptions. Only derived scalar
//! fields leave this module; a matched subtree is never serialized as-is.

use serde::Serialize;
use serde_json::Value;

use crate::config::LexiconConfig;
use crate::index::DocumentIndex;
use crate::matcher::{MatchCandidate, MatchStrategy};
use crate::path::{DocPath, PathStep};

const SUMMARY_MAX_CHARS: usize = 200;
const PREVIEW_MAX_CHARS: usize = 100;

/// Attributes surfaced as "key: value" lines
const KEY_ATTRIBUTES: [&str; 6] = ["price", "code", "type", "category", "standard", "optional"];

/// One summarized match
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchSummary {
    pub option_name: String,
    pub category: String,
    pub path: String,
    pub summary: String,
    pub availability: String,
    pub key_attributes: Vec<String>,
    pub confidence: f64,
    pub match_type: MatchStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// An entry in a query result list
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultEntry {
    Match(MatchSummary),
    Advisory { advisory: String },
}

impl ResultEntry {
    pub fn as_match(&self) -> Option<&MatchSummary> {
        match self {
            Self::Match(summary) => Some(summary),
            Self::Advisory { .. } => None,
        }
    }
}

/// Summarize ranked candidates, appending an advisory for long lists
pub fn summarize(index: &DocumentIndex, ranked: &[MatchCandidate], config: &LexiconConfig) -> Vec<ResultEntry> {
    let mut entries: Vec<ResultEntry> = ranked
        .iter()
        .filter_map(|candidate| summarize_match(index, candidate, config))
        .map(ResultEntry::Match)
        .collect();

    let count = entries.len();
    if count > config.advisory_threshold {
        entries.push(ResultEntry::Advisory {
            advisory: format!(
                "Found {count} matching options. Consider narrowing your query, \
                 for example by naming a category such as 'interior' or 'safety'."
            ),
        });
    }
    entries
}

/// Summary of one candidate, `None` if its path is no longer indexed
pub fn summarize_match(
    index: &DocumentIndex,
    candidate: &MatchCandidate,
    config: &LexiconConfig,
) -> Option<MatchSummary> {
    let entry = index.entry(&candidate.path)?;
    let node = entry.path.resolve(index.document())?;

    let note = (candidate.confidence < config.disambiguation_threshold).then(|| {
        format!(
            "Approximate {} match ({:.0}% confidence); confirm this is the option you meant.",
            candidate.strategy,
            candidate.confidence * 100.0
        )
    });

    Some(MatchSummary {
        option_name: option_name(&entry.path),
        category: category(&entry.path),
        path: candidate.path.clone(),
        summary: describe(node),
        availability: availability(node),
        key_attributes: key_attributes(node),
        confidence: candidate.confidence,
        match_type: candidate.strategy,
        note,
    })
}

/// Human name from the final path step
pub fn option_name(path: &DocPath) -> String {
    match path.last() {
        Some(PathStep::Key(key)) => title_case(key),
        Some(PathStep::Index(i)) => {
            let parent = path.last_key().map_or_else(|| "Item".to_string(), title_case);
            format!("{parent} {}", i + 1)
        }
        None => "Document".into(),
    }
}

/// Top-level section the path lives in
pub fn category(path: &DocPath) -> String {
    path.first_key().unwrap_or("root").to_string()
}

fn title_case(raw: &str) -> String {
    raw.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Short text for a node: description, name, size, or scalar form
fn describe(node: &Value) -> String {
    match node {
        Value::Object(map) => {
            if let Some(description) = map.get("description").filter(|d| is_scalar(d) && !d.is_null()) {
                truncate(&scalar_text(description), SUMMARY_MAX_CHARS)
            } else if let Some(name) = map.get("name").and_then(Value::as_str) {
                truncate(name, SUMMARY_MAX_CHARS)
            } else {
                format!("Object with {} properties", map.len())
            }
        }
        Value::Array(items) => format!("List with {} items", items.len()),
        scalar => truncate(&scalar_text(scalar), SUMMARY_MAX_CHARS),
    }
}

fn availability(node: &Value) -> String {
    let Some(map) = node.as_object() else {
        return "Status Unknown".into();
    };

    match map.get("available") {
        Some(Value::Bool(true)) => return "Available".into(),
        Some(Value::Bool(false)) => return "Not Available".into(),
        Some(other) if is_scalar(other) && !other.is_null() => return scalar_text(other),
        _ => {}
    }

    match map.get("status") {
        Some(status) if is_scalar(status) && !status.is_null() => scalar_text(status),
        _ => "Status Unknown".into(),
    }
}

fn key_attributes(node: &Value) -> Vec<String> {
    let Some(map) = node.as_object() else {
        return Vec::new();
    };

    KEY_ATTRIBUTES
        .iter()
        .filter_map(|key| {
            let value = map.get(*key).filter(|v| is_scalar(v))?;
            Some(format!("{key}: {}", truncate(&scalar_text(value), PREVIEW_MAX_CHARS)))
        })
        .collect()
}

/// Bounded one-line preview of any value
pub fn preview_value(value: &Value) -> String {
    match value {
        Value::Object(map) if map.is_empty() => "Empty object".into(),
        Value::Object(map) if map.len() == 1 => map
            .values()
            .next()
            .map_or_else(|| "Empty object".into(), preview_value),
        Value::Object(map) => format!("Object with {} properties", map.len()),
        Value::Array(items) => format!("List with {} items", items.len()),
        scalar => truncate(&scalar_text(scalar), PREVIEW_MAX_CHARS),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

/// Strings render without quotes, everything else as JSON text
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Clip to `max` characters, marking the cut with "..."
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
