//! Error Types

use thiserror::Error;

/// Result type alias for tool operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Tool framework errors
///
/// Both variants are caller faults: a tool reports its own failures inside
/// its [`ToolResult`](crate::ToolResult) rather than as an `Err`.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Arguments do not satisfy the tool schema
    #[error("Tool validation error: {0}")]
    ToolValidation(String),
}

impl AgentError {
    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::ToolNotFound(name) => format!("The tool '{name}' is not available."),
            Self::ToolValidation(msg) => format!("Invalid tool input: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            AgentError::ToolNotFound("lexicon_fetch".into()).user_message(),
            "The tool 'lexicon_fetch' is not available."
        );
        assert_eq!(
            AgentError::ToolValidation("query is required".into()).user_message(),
            "Invalid tool input: query is required"
        );
    }
}
