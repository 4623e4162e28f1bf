//! # lexicon-tools
//!
//! Agent tools for searching and safely modifying vehicle option lexicons:
//! large nested documents of options, packages and prices keyed by model,
//! market and date.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │lexicon_fetch │──►│DocumentIndex │──►│   Matcher    │──►│ rank +       │
//! │ (source)     │   │paths/keywords│   │ exact/fuzzy/ │   │ summarize    │
//! └──────────────┘   └──────┬───────┘   │ context/sem. │   └──────────────┘
//!                           │           └──────────────┘
//!                           ▼
//!                    ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!                    │   planner    │──►│ pending plan │──►│ apply +      │
//!                    │ kind/value/  │   │ (confirm id) │   │ change order │
//!                    │ target       │   └──────────────┘   └──────────────┘
//!                    └──────────────┘
//! ```
//!
//! Documents never leave the crate whole. Queries return flat summaries and
//! every tool payload is bounded by [`ResponseLimits`]. Changes are planned
//! first and applied only against a confirmation id.

pub mod change_order;
pub mod config;
pub mod error;
pub mod index;
pub mod keyword;
pub mod matcher;
pub mod path;
pub mod planner;
pub mod rank;
pub mod response;
pub mod session;
pub mod source;
pub mod summary;
pub mod svckit;

pub use config::{LexiconConfig, SemanticGroups};
pub use error::{LexiconError, Result};
pub use index::DocumentIndex;
pub use path::DocPath;
pub use planner::{ModificationKind, ModificationRequest, PendingChange, PlanOutcome};
pub use response::ResponseLimits;
pub use session::LexiconSession;
pub use source::{DocumentSource, FetchRequest, SourceConfig};
pub use svckit::{register_tools, shared_session, Collaborators, SharedSession};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{LexiconFetchTool, LexiconModifyTool, LexiconQueryTool};
}
