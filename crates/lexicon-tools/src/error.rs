//! Error Types for Lexicon Tools

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LexiconError>;

#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("No lexicon loaded")]
    NoDocumentLoaded,

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Query processing failed: {0}")]
    QueryProcessing(String),

    #[error("Could not parse modification request: {0}")]
    ModificationParse(String),

    #[error("No targets found for '{request}'")]
    NoTargetsFound {
        request: String,
        suggestions: Vec<String>,
    },

    #[error("Request matches {0} targets")]
    AmbiguousTargets(usize),

    #[error("Unknown confirmation id: {id}")]
    UnknownConfirmationId {
        id: String,
        valid: Vec<String>,
    },

    #[error("Failed to apply modification: {0}")]
    Apply(String),

    #[error("Change order generation failed: {0}")]
    ChangeOrder(String),

    #[error("Response too large: {size} bytes exceeds {limit} bytes")]
    ResponseTooLarge { size: usize, limit: usize },

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LexiconError {
    /// Stable code for structured responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoDocumentLoaded => "NO_DOCUMENT_LOADED",
            Self::Fetch(_) | Self::Network(_) => "FETCH_FAILURE",
            Self::QueryProcessing(_) => "QUERY_PROCESSING_FAILURE",
            Self::ModificationParse(_) => "MODIFICATION_PARSE_FAILURE",
            Self::NoTargetsFound { .. } => "NO_TARGETS_FOUND",
            Self::AmbiguousTargets(_) => "AMBIGUOUS_TARGETS",
            Self::UnknownConfirmationId { .. } => "UNKNOWN_CONFIRMATION_ID",
            Self::Apply(_) | Self::InvalidPath { .. } => "APPLY_FAILURE",
            Self::ChangeOrder(_) => "CHANGE_ORDER_FAILURE",
            Self::ResponseTooLarge { .. } => "RESPONSE_TOO_LARGE",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Convert to an actionable message for the caller
    pub fn user_message(&self) -> String {
        match self {
            Self::NoDocumentLoaded => {
                "No lexicon is loaded. Fetch one with lexicon_fetch (model, country, date) first.".into()
            }
            Self::Fetch(msg) => format!("Could not fetch the lexicon: {msg}. Check the model and country and try again."),
            Self::Network(_) => "The lexicon service is unreachable. Please try again shortly.".into(),
            Self::QueryProcessing(_) => "The query could not be processed. Try simpler search terms.".into(),
            Self::ModificationParse(msg) => format!(
                "{msg}. Phrase the request as 'change <option> to <value>' or pass new_value explicitly."
            ),
            Self::NoTargetsFound { suggestions, .. } if !suggestions.is_empty() => format!(
                "Nothing matched that request. Did you mean: {}?",
                suggestions.join(", ")
            ),
            Self::NoTargetsFound { .. } => {
                "Nothing matched that request. Try the option name as it appears in the lexicon.".into()
            }
            Self::AmbiguousTargets(n) => {
                format!("The request matches {n} options. Pick one by path or be more specific.")
            }
            Self::UnknownConfirmationId { valid, .. } if valid.is_empty() => {
                "That plan id is not pending and there are no pending plans.".into()
            }
            Self::UnknownConfirmationId { valid, .. } => {
                format!("That plan id is not pending. Valid ids: {}", valid.join(", "))
            }
            Self::Apply(msg) => format!("The change could not be applied: {msg}"),
            Self::InvalidPath { path, .. } => format!("'{path}' is not a valid lexicon path."),
            Self::ChangeOrder(_) => "The change was applied but no change order could be generated.".into(),
            Self::ResponseTooLarge { .. } => "The response was too large and has been truncated.".into(),
            Self::Config(msg) => format!("Configuration problem: {msg}"),
            Self::Serialization(_) => "An unexpected error occurred.".into(),
        }
    }

    /// Whether the condition is part of the normal interaction flow
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NoDocumentLoaded
                | Self::ModificationParse(_)
                | Self::NoTargetsFound { .. }
                | Self::AmbiguousTargets(_)
                | Self::UnknownConfirmationId { .. }
                | Self::ChangeOrder(_)
        )
    }
}
