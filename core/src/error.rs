//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// Every variant is fatal for a conversion run. String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors (unreadable input or filter-list files).
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The descriptor document could not be decoded.
    #[display("Decode Error: {_0}")]
    Decode(serde_json::Error),

    /// A method that neither requires login nor is reachable anonymously.
    #[from(ignore)]
    #[display("method {_0} does not require login and is not allowed from ajax")]
    Unreachable(String),

    /// Both an allow-list and a deny-list were supplied.
    #[from(ignore)]
    #[display("allow-list and deny-list are mutually exclusive")]
    ConflictingFilters,

    /// The external formatter failed or is missing while required.
    #[from(ignore)]
    #[display("Formatter Error: {_0}")]
    Formatter(String),

    /// The document could not be rendered as JSON or YAML.
    #[from(ignore)]
    #[display("Serialization Error: {_0}")]
    Serialize(String),

    /// The output destination could not be created or written.
    #[from(ignore)]
    #[display("Output Error: {_0}")]
    Output(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
