//! Modification Planning
//!
//! Turns a free-text modification request into at most one pending change.
//!
//! ```text
//! request ──► kind rules ──► value rules ──► target resolution
//!                                              │
//!                    ┌─────────────────────────┼───────────────────┐
//!                    ▼                         ▼                   ▼
//!               NotFound               Ambiguous (>1)        Planned (1)
//!            (suggestions)          (options, no plan)    (PendingChange)
//! ```
//!
//! Targets are resolved by exact keyword only. Fuzzy and semantic matching
//! are for reading; a mutation must never land on a near miss.

use std::ops::Range;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::config::LexiconConfig;
use crate::error::{LexiconError, Result};
use crate::index::DocumentIndex;
use crate::keyword::extract_keywords;
use crate::matcher::similarity;
use crate::path::{DocPath, PathStep};
use crate::summary::{category, option_name, preview_value};

/// What a change does to its target
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModificationKind {
    Add,
    Remove,
    Update,
}

impl ModificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Update => "update",
        }
    }
}

impl std::fmt::Display for ModificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verb keywords that select a kind; checked in order, first hit wins
pub const KIND_RULES: &[(ModificationKind, &[&str])] = &[
    (ModificationKind::Add, &["add", "create", "insert", "new"]),
    (ModificationKind::Remove, &["remove", "delete", "drop"]),
];

/// Verbs stripped from a request before its target keywords are extracted
const MODIFICATION_VERBS: &[&str] = &[
    "add", "create", "insert", "new", "remove", "delete", "drop", "update", "change", "modify", "set",
];

static VERB_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(?:{})\b", MODIFICATION_VERBS.join("|"))).expect("valid verb pattern")
});

/// How a new value was found in the request text
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueRule {
    /// "change|set|update|modify ... to VALUE"
    ToValue,
    /// add/insert followed by a quoted value
    QuotedAfterAdd,
    /// add/insert followed by a bare trailing value
    TrailingAfterAdd,
}

static VALUE_RULES: Lazy<Vec<(ValueRule, Regex)>> = Lazy::new(|| {
    [
        (ValueRule::ToValue, r"(?i)\b(?:change|set|update|modify)\b.*?\bto\s+(.+?)\s*$"),
        (ValueRule::QuotedAfterAdd, r#"(?i)\b(?:add|insert)\b.*?["']([^"']+)["']"#),
        (ValueRule::TrailingAfterAdd, r"(?i)\b(?:add|insert)\s+(.+?)\s*$"),
    ]
    .into_iter()
    .map(|(rule, pattern)| (rule, Regex::new(pattern).expect("valid value pattern")))
    .collect()
});

/// A literal value pulled out of request text
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractedValue {
    pub rule: ValueRule,
    pub value: Value,

    /// Byte range of the whole "to VALUE" tail, for [`ValueRule::ToValue`]
    pub tail: Option<Range<usize>>,
}

/// Kind implied by the verbs in a request
pub fn detect_kind(request: &str) -> ModificationKind {
    let lowered = request.to_lowercase();
    KIND_RULES
        .iter()
        .find(|(_, verbs)| verbs.iter().any(|verb| lowered.contains(verb)))
        .map_or(ModificationKind::Update, |(kind, _)| *kind)
}

/// First value rule that matches, in rule order
pub fn extract_new_value(request: &str) -> Option<ExtractedValue> {
    VALUE_RULES.iter().find_map(|(rule, pattern)| {
        let captures = pattern.captures(request)?;
        let literal = captures.get(1)?;
        let tail = (*rule == ValueRule::ToValue)
            .then(|| request[..literal.start()].rfind("to").map(|start| start..request.len()))
            .flatten();

        Some(ExtractedValue {
            rule: *rule,
            value: parse_literal(literal.as_str()),
            tail,
        })
    })
}

/// JSON literal when the text is one, otherwise a plain string
pub fn parse_literal(raw: &str) -> Value {
    let trimmed = raw.trim().trim_end_matches(['.', '!']);
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return value;
    }
    let unquoted = trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(trimmed);
    Value::String(unquoted.to_string())
}

/// Keywords naming the target: verbs and any "to VALUE" tail removed
pub fn target_keywords(request: &str, value: Option<&ExtractedValue>) -> Vec<String> {
    let subject = match value.and_then(|v| v.tail.clone()) {
        Some(tail) => &request[..tail.start],
        None => request,
    };
    extract_keywords(&VERB_PATTERN.replace_all(subject, " "))
}

/// Caller input for one modification attempt
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ModificationRequest {
    pub request: String,

    /// Explicit target path; skips keyword resolution
    #[serde(default)]
    pub target_path: Option<String>,

    /// Explicit new value; overrides extraction from the text
    #[serde(default)]
    pub new_value: Option<Value>,
}

/// One choice offered when a request matches several targets
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TargetOption {
    pub option_id: usize,
    pub option_name: String,
    pub category: String,
    pub path: String,
    pub current_value: String,
    pub confidence: f64,
}

/// A planned, not yet applied, single mutation
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PendingChange {
    pub plan_id: String,
    pub modification_type: ModificationKind,
    pub target_path: String,
    pub option_name: String,
    pub category: String,
    pub previous_value: String,
    pub new_value: Option<Value>,
    pub impact: String,
    pub requires_confirmation: bool,
    pub created_at: DateTime<Utc>,
}

/// Result of target resolution
#[derive(Clone, Debug, PartialEq)]
pub enum PlanOutcome {
    NotFound { suggestions: Vec<String> },
    Ambiguous { options: Vec<TargetOption> },
    Planned(PendingChange),
}

/// Fresh plan identifier
pub fn new_plan_id() -> String {
    format!("mod_{}", Uuid::new_v4().simple())
}

/// Resolve a request against the index and plan the change
pub fn plan(index: &DocumentIndex, request: &ModificationRequest, config: &LexiconConfig) -> Result<PlanOutcome> {
    let kind = detect_kind(&request.request);
    let extracted = if kind == ModificationKind::Remove {
        None
    } else {
        extract_new_value(&request.request)
    };

    let new_value = match kind {
        ModificationKind::Remove => None,
        _ => request
            .new_value
            .clone()
            .or_else(|| extracted.as_ref().map(|e| e.value.clone())),
    };
    let targets = match request.target_path.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() => {
            if index.entry(path).is_some() || (kind == ModificationKind::Add && can_insert_at(index, path)) {
                vec![(path.to_string(), 1.0)]
            } else {
                Vec::new()
            }
        }
        _ => resolve_by_keyword(index, &target_keywords(&request.request, extracted.as_ref()), config),
    };

    match targets.as_slice() {
        [] => Ok(PlanOutcome::NotFound {
            suggestions: suggestions(index, request, config),
        }),
        [(path, _)] => {
            if kind != ModificationKind::Remove && new_value.is_none() {
                return Err(LexiconError::ModificationParse(format!(
                    "No new value found in '{}' for the {kind}",
                    request.request
                )));
            }
            build_change(index, kind, path, new_value).map(PlanOutcome::Planned)
        }
        _ => Ok(PlanOutcome::Ambiguous {
            options: targets
                .iter()
                .take(config.max_ambiguous_options)
                .enumerate()
                .filter_map(|(i, (path, confidence))| {
                    let entry = index.entry(path)?;
                    let current = index.node(path)?;
                    Some(TargetOption {
                        option_id: i + 1,
                        option_name: option_name(&entry.path),
                        category: category(&entry.path),
                        path: path.clone(),
                        current_value: preview_value(current),
                        confidence: *confidence,
                    })
                })
                .collect(),
        }),
    }
}

/// Every path indexed under any target keyword, deduplicated
fn resolve_by_keyword(index: &DocumentIndex, keywords: &[String], config: &LexiconConfig) -> Vec<(String, f64)> {
    let mut targets: IndexMap<String, f64> = IndexMap::new();
    for keyword in keywords {
        let Some(paths) = index.lookup(keyword) else {
            continue;
        };
        for path in paths {
            let best = targets.entry(path.clone()).or_insert(config.modify_confidence);
            *best = best.max(config.modify_confidence);
        }
    }
    targets.into_iter().collect()
}

/// Indexed keywords resembling the request, best first
fn suggestions(index: &DocumentIndex, request: &ModificationRequest, config: &LexiconConfig) -> Vec<String> {
    let mut words = extract_keywords(&VERB_PATTERN.replace_all(&request.request, " "));
    if let Some(path) = request.target_path.as_deref() {
        words.extend(extract_keywords(path));
    }

    let mut scored: IndexMap<&str, u8> = IndexMap::new();
    for (keyword, _) in index.keywords() {
        let best = words.iter().map(|w| similarity(w, keyword)).max().unwrap_or(0);
        if best >= config.suggestion_threshold {
            scored.insert(keyword, best);
        }
    }

    let mut scored: Vec<(&str, u8)> = scored.into_iter().collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
        .into_iter()
        .take(config.max_suggestions)
        .map(|(keyword, _)| keyword.to_string())
        .collect()
}

fn build_change(
    index: &DocumentIndex,
    kind: ModificationKind,
    path: &str,
    new_value: Option<Value>,
) -> Result<PendingChange> {
    let doc_path = DocPath::parse(path)?;
    let current = index.node(path);
    if current.is_none() && kind != ModificationKind::Add {
        return Err(LexiconError::Apply(format!("'{path}' does not resolve")));
    }

    let name = option_name(&doc_path);
    let section = category(&doc_path);
    let previous = current.map_or_else(|| "(none)".to_string(), preview_value);
    let proposed = new_value.as_ref().map(preview_value).unwrap_or_default();

    let impact = match (kind, current) {
        (ModificationKind::Remove, _) => {
            format!("Removes '{name}' from {section}. Current value ({previous}) will be deleted.")
        }
        (ModificationKind::Update, _) => format!("Changes '{name}' in {section} from {previous} to {proposed}."),
        (ModificationKind::Add, Some(_)) => format!("Adds {proposed} as '{name}' in {section}, replacing {previous}."),
        (ModificationKind::Add, None) => format!("Adds {proposed} as new entry '{name}' in {section}."),
    };

    Ok(PendingChange {
        plan_id: new_plan_id(),
        modification_type: kind,
        target_path: path.to_string(),
        option_name: name,
        category: section,
        previous_value: previous,
        new_value,
        impact,
        requires_confirmation: true,
        created_at: Utc::now(),
    })
}

/// Whether `path` names a free slot directly below an existing container
fn can_insert_at(index: &DocumentIndex, path: &str) -> bool {
    let Ok(path) = DocPath::parse(path) else {
        return false;
    };
    let (Some(parent), Some(step)) = (path.parent(), path.last()) else {
        return false;
    };
    match (parent.resolve(index.document()), step) {
        (Some(Value::Object(map)), PathStep::Key(key)) => !map.contains_key(key),
        (Some(Value::Array(items)), PathStep::Index(i)) => *i == items.len(),
        _ => false,
    }
}

/// Apply a change to a copy of `document`, leaving the original untouched
pub fn apply(document: &Value, change: &PendingChange) -> Result<Value> {
    let path = DocPath::parse(&change.target_path)?;
    let (parent, step) = match (path.parent(), path.last()) {
        (Some(parent), Some(step)) => (parent, step.clone()),
        _ => return Err(LexiconError::Apply("the document root cannot be modified".into())),
    };

    let mut modified = document.clone();
    let container = parent
        .resolve_mut(&mut modified)
        .ok_or_else(|| LexiconError::Apply(format!("'{parent}' no longer exists")))?;

    let new_value = || {
        change
            .new_value
            .clone()
            .ok_or_else(|| LexiconError::Apply(format!("no new value for the {}", change.modification_type)))
    };

    match (change.modification_type, step, container) {
        (ModificationKind::Remove, PathStep::Key(key), Value::Object(map)) => {
            map.shift_remove(&key);
        }
        (ModificationKind::Remove, PathStep::Index(i), Value::Array(items)) => {
            if i < items.len() {
                items.remove(i);
            }
        }
        (_, PathStep::Key(key), Value::Object(map)) => {
            map.insert(key, new_value()?);
        }
        (kind, PathStep::Index(i), Value::Array(items)) => {
            if i < items.len() {
                items[i] = new_value()?;
            } else if kind == ModificationKind::Add && i == items.len() {
                items.push(new_value()?);
            } else {
                return Err(LexiconError::Apply(format!("index {i} is out of bounds for '{parent}'")));
            }
        }
        _ => {
            return Err(LexiconError::Apply(format!(
                "'{parent}' is not the kind of container '{}' expects",
                change.target_path
            )));
        }
    }

    Ok(modified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn document() -> Value {
        json!({
            "interior": {
                "leather_seats": {
                    "description": "Heated leather seating",
                    "available": true,
                    "price": 1500
                },
                "cloth_seats": {"price": 0}
            },
            "exterior": {
                "sunroof": {"price": 1200}
            },
            "packages": ["winter", "sport"]
        })
    }

    fn index() -> DocumentIndex {
        DocumentIndex::build(Arc::new(document()))
    }

    fn request(text: &str) -> ModificationRequest {
        ModificationRequest {
            request: text.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_detect_kind() {
        assert_eq!(detect_kind("Add a sunroof"), ModificationKind::Add);
        assert_eq!(detect_kind("create new package"), ModificationKind::Add);
        assert_eq!(detect_kind("remove leather seats"), ModificationKind::Remove);
        assert_eq!(detect_kind("DROP the spoiler"), ModificationKind::Remove);
        assert_eq!(detect_kind("change the price to 10"), ModificationKind::Update);
        assert_eq!(detect_kind("make it blue"), ModificationKind::Update);
    }

    #[test]
    fn test_value_rules_in_order() {
        let extracted = extract_new_value("change sunroof price to 1350").unwrap();
        assert_eq!(extracted.rule, ValueRule::ToValue);
        assert_eq!(extracted.value, json!(1350));

        let extracted = extract_new_value("add 'Premium Audio' to technology").unwrap();
        assert_eq!(extracted.rule, ValueRule::QuotedAfterAdd);
        assert_eq!(extracted.value, json!("Premium Audio"));

        let extracted = extract_new_value("insert true").unwrap();
        assert_eq!(extracted.rule, ValueRule::TrailingAfterAdd);
        assert_eq!(extracted.value, json!(true));

        assert!(extract_new_value("remove leather seats").is_none());
    }

    #[test]
    fn test_target_keywords_strip_verbs_and_value() {
        let extracted = extract_new_value("set sunroof price to 1350");
        assert_eq!(target_keywords("set sunroof price to 1350", extracted.as_ref()), vec!["sunroof", "price"]);
        assert_eq!(target_keywords("remove leather seats", None), vec!["leather", "seats"]);
    }

    #[test]
    fn test_single_target_is_planned() {
        // "seats" alone would also hit cloth_seats
        let outcome = plan(&index(), &request("remove heated leather"), &LexiconConfig::default()).unwrap();
        let PlanOutcome::Planned(change) = outcome else {
            panic!("expected a plan, got {outcome:?}");
        };
        assert_eq!(change.modification_type, ModificationKind::Remove);
        assert_eq!(change.target_path, "interior.leather_seats");
        assert_eq!(change.option_name, "Leather Seats");
        assert!(change.requires_confirmation);
        assert!(change.plan_id.starts_with("mod_"));
        assert!(change.new_value.is_none());
    }

    #[test]
    fn test_ambiguous_target_offers_options() {
        let outcome = plan(&index(), &request("remove seats"), &LexiconConfig::default()).unwrap();
        let PlanOutcome::Ambiguous { options } = outcome else {
            panic!("expected options, got {outcome:?}");
        };
        let paths: Vec<&str> = options.iter().map(|o| o.path.as_str()).collect();
        assert_eq!(paths, vec!["interior.leather_seats", "interior.cloth_seats"]);
        assert_eq!(options[0].option_id, 1);
        assert_eq!(options[1].current_value, "0");
        assert!(options.iter().all(|o| (o.confidence - 0.9).abs() < f64::EPSILON));
    }

    #[test]
    fn test_not_found_suggests_similar_keywords() {
        let outcome = plan(&index(), &request("remove sunrooff"), &LexiconConfig::default()).unwrap();
        let PlanOutcome::NotFound { suggestions } = outcome else {
            panic!("expected suggestions, got {outcome:?}");
        };
        assert_eq!(suggestions.first().map(String::as_str), Some("sunroof"));
        assert!(suggestions.len() <= 10);
    }

    #[test]
    fn test_explicit_path_skips_keyword_resolution() {
        let req = ModificationRequest {
            request: "update price".into(),
            target_path: Some("exterior.sunroof.price".into()),
            new_value: Some(json!(1350)),
        };
        let outcome = plan(&index(), &req, &LexiconConfig::default()).unwrap();
        let PlanOutcome::Planned(change) = outcome else {
            panic!("expected a plan, got {outcome:?}");
        };
        assert_eq!(change.target_path, "exterior.sunroof.price");
        assert_eq!(change.previous_value, "1200");
        assert_eq!(change.new_value, Some(json!(1350)));

        let req = ModificationRequest {
            target_path: Some("exterior.moonroof".into()),
            ..req
        };
        let outcome = plan(&index(), &req, &LexiconConfig::default()).unwrap();
        assert!(matches!(outcome, PlanOutcome::NotFound { .. }));
    }

    #[test]
    fn test_add_targets_a_new_slot() {
        let req = ModificationRequest {
            request: "add a tow hitch".into(),
            target_path: Some("exterior.tow_hitch".into()),
            new_value: Some(json!({"price": 650})),
        };
        let outcome = plan(&index(), &req, &LexiconConfig::default()).unwrap();
        let PlanOutcome::Planned(change) = outcome else {
            panic!("expected a plan, got {outcome:?}");
        };
        assert_eq!(change.previous_value, "(none)");

        let modified = apply(&document(), &change).unwrap();
        assert_eq!(modified["exterior"]["tow_hitch"]["price"], 650);

        // only free slots directly under an existing container qualify
        let req = ModificationRequest {
            target_path: Some("packages[5]".into()),
            ..req
        };
        let outcome = plan(&index(), &req, &LexiconConfig::default()).unwrap();
        assert!(matches!(outcome, PlanOutcome::NotFound { .. }));
    }

    #[test]
    fn test_missing_value_is_a_parse_failure() {
        let err = plan(&index(), &request("update sunroof"), &LexiconConfig::default()).unwrap_err();
        assert!(matches!(err, LexiconError::ModificationParse(_)));
    }

    #[test]
    fn test_target_resolution_precedes_value_check() {
        let config = LexiconConfig::default();

        let outcome = plan(&index(), &request("update seats"), &config).unwrap();
        assert!(matches!(outcome, PlanOutcome::Ambiguous { .. }), "got {outcome:?}");

        let outcome = plan(&index(), &request("update sunrof"), &config).unwrap();
        let PlanOutcome::NotFound { suggestions } = outcome else {
            panic!("expected suggestions, got {outcome:?}");
        };
        assert!(suggestions.iter().any(|s| s == "sunroof"));
    }

    #[test]
    fn test_apply_remove_and_update() {
        let original = document();
        let index = index();

        let PlanOutcome::Planned(remove) = plan(&index, &request("remove leather"), &LexiconConfig::default()).unwrap() else {
            panic!("expected a plan");
        };
        let modified = apply(&original, &remove).unwrap();
        assert!(modified["interior"].get("leather_seats").is_none());
        assert!(modified["interior"].get("cloth_seats").is_some());
        assert!(original["interior"].get("leather_seats").is_some());

        let PlanOutcome::Planned(update) = plan(&index, &request("change sunroof to 900"), &LexiconConfig::default()).unwrap() else {
            panic!("expected a plan");
        };
        let modified = apply(&original, &update).unwrap();
        assert_eq!(modified["exterior"]["sunroof"], json!(900));
    }

    #[test]
    fn test_apply_on_sequences() {
        let original = document();
        let mut change = PendingChange {
            plan_id: new_plan_id(),
            modification_type: ModificationKind::Add,
            target_path: "packages[2]".into(),
            option_name: "Packages 3".into(),
            category: "packages".into(),
            previous_value: String::new(),
            new_value: Some(json!("towing")),
            impact: String::new(),
            requires_confirmation: true,
            created_at: Utc::now(),
        };
        let modified = apply(&original, &change).unwrap();
        assert_eq!(modified["packages"], json!(["winter", "sport", "towing"]));

        change.modification_type = ModificationKind::Remove;
        change.target_path = "packages[0]".into();
        let modified = apply(&original, &change).unwrap();
        assert_eq!(modified["packages"], json!(["sport"]));

        change.modification_type = ModificationKind::Update;
        change.target_path = "packages[7]".into();
        assert!(matches!(apply(&original, &change), Err(LexiconError::Apply(_))));
    }
}
