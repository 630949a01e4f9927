use thiserror::Error;

/// Failures inside the dispatcher. None of these reach `HookDispatcher::execute`
/// callers; they are logged and turned into allow results.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HookError {
    #[error("Hook not found: {0}")]
    NotFound(String),

    #[error("Hook {name} timed out after {timeout_ms}ms")]
    Timeout { name: String, timeout_ms: u64 },

    #[error("Hook {name} failed: {message}")]
    Execution { name: String, message: String },

    #[error("Failed to serialize hook context: {0}")]
    CacheSerialization(String),
}

impl HookError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, HookError::Timeout { .. })
    }
}
