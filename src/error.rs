//! Error types for bidocx library.

use serde::Serialize;
use std::io;
use thiserror::Error;

/// Result type alias for bidocx operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a conversion.
///
/// Almost nothing in the assembly engine is fatal: malformed blocks are
/// downgraded and reported as [`RenderWarning`]s instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading input or writing the package.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input text is empty or whitespace only.
    #[error("Input text is empty")]
    EmptyInput,

    /// Error while writing the zip container.
    #[error("Package error: {0}")]
    Package(String),

    /// Error during rendering (JSON, text).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            _ => Error::Package(err.to_string()),
        }
    }
}

/// A recoverable problem found while building one block.
///
/// The offending block is downgraded to plain-text paragraphs and the
/// conversion continues.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderWarning {
    /// A table block exceeds the column limit of the target format.
    #[error("line {line}: table has {columns} columns (limit {limit})")]
    TooManyColumns {
        /// First source line of the block (1-indexed)
        line: usize,
        /// Column count of the assembled grid
        columns: usize,
        /// Configured limit
        limit: usize,
    },

    /// A placeholder references an asset the resolver does not know.
    #[error("line {line}: asset `{id}` not found")]
    MissingAsset {
        /// Source line (1-indexed)
        line: usize,
        /// Placeholder id
        id: String,
    },

    /// An asset payload could not be decoded.
    #[error("line {line}: asset `{id}` could not be decoded: {reason}")]
    AssetDecode {
        /// Source line (1-indexed)
        line: usize,
        /// Placeholder id
        id: String,
        /// Decoder message
        reason: String,
    },

    /// The asset kind is not embedded in the output (images).
    #[error("line {line}: asset `{id}` is not embeddable")]
    UnsupportedAsset {
        /// Source line (1-indexed)
        line: usize,
        /// Placeholder id
        id: String,
    },
}

impl RenderWarning {
    /// Source line the warning refers to.
    pub fn line(&self) -> usize {
        match self {
            RenderWarning::TooManyColumns { line, .. }
            | RenderWarning::MissingAsset { line, .. }
            | RenderWarning::AssetDecode { line, .. }
            | RenderWarning::UnsupportedAsset { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::EmptyInput;
        assert_eq!(err.to_string(), "Input text is empty");

        let err = Error::Package("bad header".into());
        assert_eq!(err.to_string(), "Package error: bad header");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_warning_display_and_line() {
        let warning = RenderWarning::TooManyColumns {
            line: 4,
            columns: 70,
            limit: 63,
        };
        assert_eq!(warning.to_string(), "line 4: table has 70 columns (limit 63)");
        assert_eq!(warning.line(), 4);

        let warning = RenderWarning::MissingAsset {
            line: 9,
            id: "t1".into(),
        };
        assert_eq!(warning.line(), 9);
        assert!(warning.to_string().contains("`t1`"));
    }

    #[test]
    fn test_warning_serializes_with_kind_tag() {
        let warning = RenderWarning::UnsupportedAsset {
            line: 2,
            id: "img".into(),
        };
        let json = serde_json::to_string(&warning).unwrap();
        assert!(json.contains("\"kind\":\"unsupported_asset\""));
    }
}
