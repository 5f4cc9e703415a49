//! JSON output types for machine-readable CLI output.
//!
//! Every command accepts `--json`. The scoring actions print the wire
//! response of the WebSocket server; all other commands print a
//! [`CommandOutput`] envelope.

use nftune_battle::BattleError;
use serde::{Deserialize, Serialize};

/// Error codes for CLI operations.
///
/// Battle errors keep their own `BTL_xxx` codes; these cover the CLI itself.
pub mod error_codes {
    /// File could not be read
    pub const FILE_READ: &str = "CLI_001";
    /// JSON parse error
    pub const JSON_PARSE: &str = "CLI_003";
    /// Invalid seed argument
    pub const INVALID_SEED: &str = "CLI_004";
    /// JSON serialization error
    pub const JSON_SERIALIZE: &str = "CLI_009";
    /// Binary WebSocket frame was not UTF-8
    pub const INVALID_UTF8: &str = "CLI_014";
    /// WebSocket request was not a known request
    pub const INVALID_REQUEST: &str = "CLI_015";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "CLI_001", "BTL_001")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Transport status of battle errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Source file path (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl JsonError {
    /// Creates a new error with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status: None,
            file: None,
        }
    }

    /// Sets the file path for this error.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl From<&BattleError> for JsonError {
    fn from(err: &BattleError) -> Self {
        Self {
            status: Some(err.status()),
            ..Self::new(err.code(), err.to_string())
        }
    }
}

/// Envelope printed by every non-action command under `--json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandOutput<T> {
    /// Whether the command succeeded
    pub success: bool,
    /// Command-specific result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    /// Errors (empty on success)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JsonError>,
}

impl<T> CommandOutput<T> {
    /// Successful output.
    pub fn success(result: T) -> Self {
        Self {
            success: true,
            result: Some(result),
            errors: Vec::new(),
        }
    }

    /// Failed output.
    pub fn failure(errors: Vec<JsonError>) -> Self {
        Self {
            success: false,
            result: None,
            errors,
        }
    }
}

impl<T> From<Result<T, BattleError>> for CommandOutput<T> {
    fn from(result: Result<T, BattleError>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(err) => Self::failure(vec![JsonError::from(&err)]),
        }
    }
}

/// Serializes `value` as pretty JSON, falling back to a fixed error body.
pub fn to_json_string<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        let output = CommandOutput::<()>::failure(vec![JsonError::new(
            error_codes::JSON_SERIALIZE,
            format!("Failed to serialize output: {}", e),
        )]);
        serde_json::to_string(&output).unwrap_or_else(|_| {
            r#"{"success":false,"errors":[{"code":"CLI_009","message":"Failed to serialize output"}]}"#
                .to_string()
        })
    })
}
