//! Multi-Strategy Matching
//!
//! Four independent strategies produce scored candidates from the same
//! index. They never filter each other; merging happens in [`crate::rank`].
//!
//! | Strategy   | Source of hits                                   | Confidence     |
//! |------------|--------------------------------------------------|----------------|
//! | exact      | query keyword present in the keyword index       | 1.0            |
//! | fuzzy      | indexed keyword similar to the raw query (>= 70) | similarity/100 |
//! | contextual | path words contain a context and a query keyword | 0.8            |
//! | semantic   | other terms of a group the query keyword is in   | 0.6            |

use serde::Serialize;
use similar::TextDiff;

use crate::config::LexiconConfig;
use crate::index::DocumentIndex;
use crate::keyword::extract_keywords;

/// Which strategy produced a candidate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    Fuzzy,
    Contextual,
    Semantic,
}

impl MatchStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Fuzzy => "fuzzy",
            Self::Contextual => "contextual",
            Self::Semantic => "semantic",
        }
    }
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scored hit on an indexed path
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchCandidate {
    pub path: String,
    pub strategy: MatchStrategy,
    pub confidence: f64,

    /// Keyword that produced the hit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,

    /// Context keyword that scoped the hit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_group: Option<String>,
}

impl MatchCandidate {
    pub fn new(path: impl Into<String>, strategy: MatchStrategy, confidence: f64) -> Self {
        Self {
            path: path.into(),
            strategy,
            confidence,
            keyword: None,
            context: None,
            semantic_group: None,
        }
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_semantic_group(mut self, group: impl Into<String>) -> Self {
        self.semantic_group = Some(group.into());
        self
    }
}

/// Similarity of two strings on a 0-100 scale
pub fn similarity(a: &str, b: &str) -> u8 {
    if a.is_empty() && b.is_empty() {
        return 100;
    }
    let ratio = TextDiff::from_chars(a, b).ratio();
    // ratio is within [0, 1]
    (f64::from(ratio) * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Runs every strategy against one index
pub struct Matcher<'a> {
    index: &'a DocumentIndex,
    config: &'a LexiconConfig,
}

impl<'a> Matcher<'a> {
    pub fn new(index: &'a DocumentIndex, config: &'a LexiconConfig) -> Self {
        Self { index, config }
    }

    /// All strategies, concatenated in strategy order
    pub fn find(&self, query: &str, context: Option<&str>) -> Vec<MatchCandidate> {
        let keywords = extract_keywords(query);

        let mut candidates = self.exact(&keywords);
        candidates.extend(self.fuzzy(query));
        if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
            candidates.extend(self.contextual(&keywords, context));
        }
        candidates.extend(self.semantic(&keywords));

        tracing::debug!(query, candidates = candidates.len(), "Matched lexicon query");
        candidates
    }

    /// Query keywords looked up directly in the keyword index
    pub fn exact(&self, keywords: &[String]) -> Vec<MatchCandidate> {
        let mut candidates = Vec::new();
        for keyword in keywords {
            if let Some(paths) = self.index.lookup(keyword) {
                candidates.extend(paths.iter().map(|path| {
                    MatchCandidate::new(path.as_str(), MatchStrategy::Exact, self.config.exact_confidence)
                        .with_keyword(keyword.as_str())
                }));
            }
        }
        candidates
    }

    /// Every indexed keyword compared against the whole lowercased query
    pub fn fuzzy(&self, query: &str) -> Vec<MatchCandidate> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut candidates = Vec::new();
        for (keyword, paths) in self.index.keywords() {
            let score = similarity(keyword, &query);
            if score < self.config.fuzzy_threshold {
                continue;
            }
            let confidence = f64::from(score) / 100.0;
            candidates.extend(paths.iter().map(|path| {
                MatchCandidate::new(path.as_str(), MatchStrategy::Fuzzy, confidence).with_keyword(keyword)
            }));
        }
        candidates
    }

    /// Paths whose own words include both a context keyword and a query keyword
    pub fn contextual(&self, keywords: &[String], context: &str) -> Vec<MatchCandidate> {
        let context_keywords = extract_keywords(context);
        if context_keywords.is_empty() || keywords.is_empty() {
            return Vec::new();
        }

        let mut candidates = Vec::new();
        for (path, _) in self.index.paths() {
            let path_words = extract_keywords(path);
            let Some(context_hit) = context_keywords.iter().find(|c| path_words.contains(*c)) else {
                continue;
            };
            let Some(query_hit) = keywords.iter().find(|k| path_words.contains(*k)) else {
                continue;
            };
            candidates.push(
                MatchCandidate::new(path, MatchStrategy::Contextual, self.config.context_confidence)
                    .with_keyword(query_hit.as_str())
                    .with_context(context_hit.as_str()),
            );
        }
        candidates
    }

    /// Paths indexed under sibling terms of a query keyword's group
    pub fn semantic(&self, keywords: &[String]) -> Vec<MatchCandidate> {
        let mut candidates = Vec::new();
        for keyword in keywords {
            for (group, terms) in self.config.semantic_groups.groups_for(keyword) {
                for term in terms.iter().filter(|t| *t != keyword) {
                    let Some(paths) = self.index.lookup(term) else {
                        continue;
                    };
                    candidates.extend(paths.iter().map(|path| {
                        MatchCandidate::new(path.as_str(), MatchStrategy::Semantic, self.config.semantic_confidence)
                            .with_keyword(term.as_str())
                            .with_semantic_group(group)
                    }));
                }
            }
        }
        candidates
    }
}
