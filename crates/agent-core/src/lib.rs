//! # agent-core
//!
//! Tool abstraction shared by agent-facing services.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ToolRegistry                           │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  ToolCall   │──│  validate   │──│  Tool::execute      │  │
//! │  │  (name,args)│  │  (schema)   │  │  -> ToolResult      │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A host (HTTP server, LLM loop, test) builds a `ToolCall`, the registry
//! checks it against the tool's `ToolSchema` and dispatches it.

pub mod error;
pub mod tool;

pub use error::{AgentError, Result};
pub use tool::{ParameterSchema, Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
