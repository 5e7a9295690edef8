//! Error types for the clonekit domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error type.

use thiserror::Error;

/// Failures that stop the binary before or around an agent run.
///
/// Nothing inside a run is fatal; those failures have their own types
/// below and are turned into conversation text instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// The service refused the request because the conversation is too big.
    #[error("Request too large: {0}")]
    PayloadTooLarge(String),

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Whether this failure means the conversation must be shrunk before retrying.
    ///
    /// Some gateways report oversize requests as a generic API error, so a
    /// 413 status or a "Request too large" message counts as well.
    pub fn is_payload_too_large(&self) -> bool {
        match self {
            Self::PayloadTooLarge(_) => true,
            Self::ApiError {
                status_code,
                message,
            } => *status_code == 413 || message.contains("Request too large"),
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("{tool_name} failed: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    /// Shorthand for an execution failure of a named tool.
    pub fn failed(tool_name: &str, reason: impl std::fmt::Display) -> Self {
        Self::ExecutionFailed {
            tool_name: tool_name.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Failed to navigate to {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Page script failed: {0}")]
    Script(String),

    #[error("Malformed capture result: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("Failed to write {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Asset fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn config_error_carries_message() {
        let err = Error::Config {
            message: "No API key found".into(),
        };
        assert_eq!(err.to_string(), "Configuration error: No API key found");
    }

    #[test]
    fn payload_too_large_detection() {
        assert!(ProviderError::PayloadTooLarge("x".into()).is_payload_too_large());
        assert!(
            ProviderError::ApiError {
                status_code: 413,
                message: String::new()
            }
            .is_payload_too_large()
        );
        assert!(
            ProviderError::ApiError {
                status_code: 400,
                message: "Request too large for model".into()
            }
            .is_payload_too_large()
        );
        assert!(!ProviderError::Network("reset".into()).is_payload_too_large());
        assert!(
            !ProviderError::RateLimited {
                retry_after_secs: 5
            }
            .is_payload_too_large()
        );
    }

    #[test]
    fn execution_failure_names_the_tool() {
        let err = ToolError::failed("executeCommand", "spawn failed");
        assert_eq!(err.to_string(), "executeCommand failed: spawn failed");
    }

    #[test]
    fn nested_bundle_error_is_transparent() {
        let err: ToolError = BundleError::Template("bad tag".into()).into();
        assert_eq!(err.to_string(), "Template rendering failed: bad tag");
    }
}
