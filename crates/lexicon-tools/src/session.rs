//! Lexicon Session
//!
//! Holds the loaded lexicon, its lazily built index, pending plans and the
//! modification history. Replacing the document always replaces the index
//! cell with it, so an index can never outlive the version it describes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::Value;

use crate::config::LexiconConfig;
use crate::error::{LexiconError, Result};
use crate::index::DocumentIndex;
use crate::matcher::Matcher;
use crate::planner::{self, ModificationRequest, PendingChange, PlanOutcome};
use crate::rank::rank;
use crate::source::FetchRequest;
use crate::summary::{summarize, ResultEntry};

/// Where the loaded lexicon came from
#[derive(Clone, Debug, Serialize)]
pub struct DocumentMeta {
    pub model: String,
    pub country: String,
    pub date: String,

    /// Bumped on every replacement of the document
    pub version: u64,
    pub loaded_at: DateTime<Utc>,
}

struct LoadedDocument {
    meta: DocumentMeta,
    document: Arc<Value>,
    index: OnceCell<Arc<DocumentIndex>>,
}

impl LoadedDocument {
    fn new(meta: DocumentMeta, document: Value) -> Self {
        Self {
            meta,
            document: Arc::new(document),
            index: OnceCell::new(),
        }
    }

    fn index(&self) -> Arc<DocumentIndex> {
        Arc::clone(
            self.index
                .get_or_init(|| Arc::new(DocumentIndex::build(Arc::clone(&self.document)))),
        )
    }
}

/// A change that has been confirmed and applied
#[derive(Clone, Debug, Serialize)]
pub struct AppliedChange {
    #[serde(flatten)]
    pub change: PendingChange,
    pub applied_at: DateTime<Utc>,
    pub document_version: u64,
}

/// Result of confirming a plan
#[derive(Clone, Debug)]
pub struct ConfirmedChange {
    pub applied: AppliedChange,
    pub original: Arc<Value>,
    pub modified: Arc<Value>,
}

/// One user's lexicon workspace
pub struct LexiconSession {
    config: LexiconConfig,
    loaded: Option<LoadedDocument>,
    pending: IndexMap<String, PendingChange>,
    history: Vec<AppliedChange>,
}

impl Default for LexiconSession {
    fn default() -> Self {
        Self::new(LexiconConfig::default())
    }
}

impl LexiconSession {
    pub fn new(config: LexiconConfig) -> Self {
        Self {
            config,
            loaded: None,
            pending: IndexMap::new(),
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &LexiconConfig {
        &self.config
    }

    /// Install a freshly fetched lexicon
    ///
    /// Pending plans were made against the previous document and are
    /// discarded.
    pub fn load(&mut self, request: &FetchRequest, document: Value) -> &DocumentMeta {
        let version = self.loaded.as_ref().map_or(1, |l| l.meta.version + 1);
        if !self.pending.is_empty() {
            tracing::info!(discarded = self.pending.len(), "Discarding plans for the replaced lexicon");
            self.pending.clear();
        }

        let meta = DocumentMeta {
            model: request.model.clone(),
            country: request.country.clone(),
            date: request.date.clone(),
            version,
            loaded_at: Utc::now(),
        };
        let loaded = self.loaded.insert(LoadedDocument::new(meta, document));
        &loaded.meta
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    fn loaded(&self) -> Result<&LoadedDocument> {
        self.loaded.as_ref().ok_or(LexiconError::NoDocumentLoaded)
    }

    pub fn meta(&self) -> Result<&DocumentMeta> {
        Ok(&self.loaded()?.meta)
    }

    pub fn document(&self) -> Result<Arc<Value>> {
        Ok(Arc::clone(&self.loaded()?.document))
    }

    /// Index for the current document, built on first use
    pub fn index(&self) -> Result<Arc<DocumentIndex>> {
        Ok(self.loaded()?.index())
    }

    /// Search the lexicon and summarize the best matches
    pub fn query(&self, query: &str, context: Option<&str>) -> Result<Vec<ResultEntry>> {
        let index = self.index()?;
        if !query.chars().any(char::is_alphanumeric) {
            return Err(LexiconError::QueryProcessing(format!("'{query}' has no searchable text")));
        }
        let candidates = Matcher::new(&index, &self.config).find(query, context);
        let ranked = rank(candidates, self.config.max_results);
        Ok(summarize(&index, &ranked, &self.config))
    }

    /// Resolve a modification request; a single target becomes a pending plan
    pub fn plan_modification(&mut self, request: &ModificationRequest) -> Result<PlanOutcome> {
        let index = self.index()?;
        let mut outcome = planner::plan(&index, request, &self.config)?;

        if let PlanOutcome::Planned(change) = &mut outcome {
            while self.pending.contains_key(&change.plan_id) {
                change.plan_id = planner::new_plan_id();
            }

            let superseded: Vec<String> = self
                .pending
                .values()
                .filter(|p| p.target_path == change.target_path)
                .map(|p| p.plan_id.clone())
                .collect();
            for id in &superseded {
                self.pending.shift_remove(id);
            }

            tracing::info!(
                plan_id = %change.plan_id,
                kind = %change.modification_type,
                target = %change.target_path,
                superseded = superseded.len(),
                "Planned lexicon modification"
            );
            self.pending.insert(change.plan_id.clone(), change.clone());
        }

        Ok(outcome)
    }

    /// Apply a pending plan and retire its id
    ///
    /// An unknown id changes nothing. If applying fails the plan stays
    /// pending and the document is untouched.
    pub fn confirm(&mut self, plan_id: &str) -> Result<ConfirmedChange> {
        let loaded = self.loaded.as_ref().ok_or(LexiconError::NoDocumentLoaded)?;
        let Some(change) = self.pending.get(plan_id) else {
            return Err(LexiconError::UnknownConfirmationId {
                id: plan_id.to_string(),
                valid: self.pending_ids(),
            });
        };

        let original = Arc::clone(&loaded.document);
        let modified = planner::apply(&original, change)?;

        let mut meta = loaded.meta.clone();
        meta.version += 1;
        let version = meta.version;
        let loaded = self.loaded.insert(LoadedDocument::new(meta, modified));
        let modified = Arc::clone(&loaded.document);

        let change = self
            .pending
            .shift_remove(plan_id)
            .ok_or_else(|| LexiconError::Apply(format!("plan {plan_id} vanished while applying")))?;
        let applied = AppliedChange {
            change,
            applied_at: Utc::now(),
            document_version: version,
        };
        self.history.push(applied.clone());

        tracing::info!(
            plan_id,
            target = %applied.change.target_path,
            version,
            "Applied lexicon modification"
        );

        Ok(ConfirmedChange {
            applied,
            original,
            modified,
        })
    }

    pub fn pending_ids(&self) -> Vec<String> {
        self.pending.keys().cloned().collect()
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingChange> {
        self.pending.values()
    }

    pub fn history(&self) -> &[AppliedChange] {
        &self.history
    }
}
