//! Search & Planning Configuration
//!
//! Thresholds and the semantic group table are heuristics. They are kept
//! here as named, overridable values instead of being scattered through the
//! matcher and planner.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{LexiconError, Result};

/// Tunables for matching, ranking, summarizing and planning
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LexiconConfig {
    /// Minimum fuzzy similarity (0-100) for a query match
    pub fuzzy_threshold: u8,

    /// Minimum fuzzy similarity (0-100) for a "did you mean" suggestion
    pub suggestion_threshold: u8,

    /// Confidence of an exact keyword hit
    pub exact_confidence: f64,

    /// Confidence of a context-scoped hit
    pub context_confidence: f64,

    /// Confidence of a semantic-group hit
    pub semantic_confidence: f64,

    /// Confidence of a modification target found by keyword
    pub modify_confidence: f64,

    /// Results below this confidence carry a disambiguation note
    pub disambiguation_threshold: f64,

    /// Maximum ranked results
    pub max_results: usize,

    /// Result count above which a "narrow your query" advisory is appended
    pub advisory_threshold: usize,

    /// Maximum "did you mean" suggestions
    pub max_suggestions: usize,

    /// Maximum options shown when a modification is ambiguous
    pub max_ambiguous_options: usize,

    /// Category -> related terms
    pub semantic_groups: SemanticGroups,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 70,
            suggestion_threshold: 60,
            exact_confidence: 1.0,
            context_confidence: 0.8,
            semantic_confidence: 0.6,
            modify_confidence: 0.9,
            disambiguation_threshold: 0.8,
            max_results: 20,
            advisory_threshold: 5,
            max_suggestions: 10,
            max_ambiguous_options: 5,
            semantic_groups: SemanticGroups::default(),
        }
    }
}

impl LexiconConfig {
    /// Defaults with environment overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = env_parse::<u8>("LEXICON_FUZZY_THRESHOLD")? {
            config.fuzzy_threshold = v;
        }
        if let Some(v) = env_parse::<u8>("LEXICON_SUGGESTION_THRESHOLD")? {
            config.suggestion_threshold = v;
        }
        if let Some(v) = env_parse::<usize>("LEXICON_MAX_RESULTS")? {
            config.max_results = v;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fuzzy_threshold > 100 || self.suggestion_threshold > 100 {
            return Err(LexiconError::Config(
                "similarity thresholds must be between 0 and 100".into(),
            ));
        }
        if self.max_results == 0 {
            return Err(LexiconError::Config("max_results must be at least 1".into()));
        }
        let confidences = [
            self.exact_confidence,
            self.context_confidence,
            self.semantic_confidence,
            self.modify_confidence,
            self.disambiguation_threshold,
        ];
        if confidences.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(LexiconError::Config("confidences must be within [0, 1]".into()));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| LexiconError::Config(format!("{key} has an invalid value: {raw}"))),
        Err(_) => Ok(None),
    }
}

/// Fixed table of domain categories and their related terms
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SemanticGroups(IndexMap<String, Vec<String>>);

impl Default for SemanticGroups {
    fn default() -> Self {
        let table: [(&str, &[&str]); 6] = [
            ("safety", &[
                "safety", "airbag", "airbags", "brake", "brakes", "collision", "warning",
                "assist", "camera", "sensor", "sensors", "lane", "blind", "protection",
            ]),
            ("comfort", &[
                "comfort", "seat", "seats", "seating", "heated", "cooled", "ventilated",
                "climate", "leather", "massage", "lumbar", "armrest",
            ]),
            ("performance", &[
                "performance", "engine", "turbo", "horsepower", "torque", "transmission",
                "suspension", "sport", "exhaust", "drivetrain",
            ]),
            ("exterior", &[
                "exterior", "paint", "color", "wheels", "wheel", "rims", "sunroof",
                "roof", "mirror", "mirrors", "lights", "headlights",
            ]),
            ("interior", &[
                "interior", "cabin", "dashboard", "upholstery", "console", "steering",
                "ambient", "trim", "floor", "mats",
            ]),
            ("technology", &[
                "technology", "navigation", "display", "screen", "audio", "speaker",
                "speakers", "bluetooth", "wireless", "charging", "infotainment", "connectivity",
            ]),
        ];

        Self(
            table
                .into_iter()
                .map(|(group, terms)| {
                    (group.to_string(), terms.iter().map(|t| (*t).to_string()).collect())
                })
                .collect(),
        )
    }
}

impl SemanticGroups {
    pub fn new(groups: IndexMap<String, Vec<String>>) -> Self {
        Self(groups)
    }

    /// Groups whose term list contains `term`
    pub fn groups_for<'a>(&'a self, term: &'a str) -> impl Iterator<Item = (&'a str, &'a [String])> + 'a {
        self.0
            .iter()
            .filter(move |(_, terms)| terms.iter().any(|t| t == term))
            .map(|(name, terms)| (name.as_str(), terms.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
