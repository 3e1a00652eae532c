//! Structured error types for sheet generation.
//!
//! Everything that can stop a run ends up here: bad configuration, missing
//! files, fonts, encoder rejections and rendering failures. None of them are
//! retried; they are surfaced to the caller at the point they occur.

use std::path::PathBuf;

use thiserror::Error;

use crate::barcode::{EncodeError, Symbology};

/// The unified error type returned by all public Barcodiche functions.
#[derive(Debug, Error)]
pub enum SheetError {
    /// Settings are well-formed JSON but describe an impossible layout.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The configuration file failed to parse.
    #[error("Failed to parse configuration: {source}{}", hint_suffix(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// No configuration file with the requested name.
    #[error("Configuration not found: {}", .0.display())]
    MissingConfig(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A font could not be found, parsed, or was used before being set.
    #[error("Font error: {0}")]
    Font(String),

    /// The barcode encoder rejected an ID.
    #[error("Cannot encode ID {id} as {symbology}: {source}")]
    Encode {
        id: u64,
        symbology: Symbology,
        #[source]
        source: EncodeError,
    },

    /// Drawing or serialization failed.
    #[error("Render error: {0}")]
    Surface(String),
}

pub type Result<T, E = SheetError> = std::result::Result<T, E>;

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for SheetError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the configuration schema. Check section and field names.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the file truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        SheetError::Parse { source: e, hint }
    }
}

impl SheetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SheetError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_carries_hint() {
        let err: SheetError = serde_json::from_str::<serde_json::Value>("{ \"a\": 1, }")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse configuration"));
        assert!(msg.contains("trailing commas"));
    }

    #[test]
    fn eof_error_hint() {
        let err: SheetError = serde_json::from_str::<serde_json::Value>("{ \"a\": ")
            .unwrap_err()
            .into();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn encode_error_names_the_id() {
        let err = SheetError::Encode {
            id: 42,
            symbology: Symbology::Ean13,
            source: EncodeError::new("wrong length"),
        };
        assert_eq!(err.to_string(), "Cannot encode ID 42 as ean13: wrong length");
    }
}
