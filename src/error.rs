//! Error types and result aliases

use thiserror::Error;

/// Errors raised by browser sessions, page hosts and tools
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Chrome could not be launched
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Connecting to a running browser failed
    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    /// A tab could not be created, listed or closed
    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    /// Navigation failed or timed out
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// A script evaluated in the page threw or returned nothing
    #[error("JavaScript evaluation failed: {0}")]
    EvaluationFailed(String),

    /// The page's geometry, style or hit-test APIs were unavailable.
    ///
    /// Marking never turns this into an empty result: a page that cannot be
    /// queried is reported, not treated as a page without elements.
    #[error("Host query failed: {0}")]
    HostQuery(String),

    /// Capturing a screenshot failed
    #[error("Screenshot failed: {0}")]
    ScreenshotFailed(String),

    /// A caller passed an argument the operation cannot use
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No tool is registered under the requested name
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// A tool ran but did not complete
    #[error("Tool '{tool}' failed: {reason}")]
    ToolExecutionFailed { tool: String, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, BrowserError>;
