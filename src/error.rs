//! Error types for ferro-coords
//!
//! Three non-recoverable failure classes cover every operation in this
//! crate:
//!
//! - [`CoordsError::Format`] — malformed coords/CIGAR/indel/insert-file
//!   syntax; carries the offending literal and, where available, the
//!   source file and line.
//! - [`CoordsError::Range`] — a mapped or relative coordinate fell outside
//!   the bounds of its target space.
//! - [`CoordsError::Consistency`] — fragments or segment lists that were
//!   expected to agree (adjacency, lengths, counts) did not.
//!
//! A call either fully succeeds or fails; whether a failed record is
//! skipped while a batch continues is the enclosing pipeline's decision,
//! never this crate's.

use thiserror::Error;

/// Render an optional file/line location for error messages.
fn location(file: &Option<String>, line: &Option<usize>) -> String {
    match (file, line) {
        (Some(f), Some(l)) => format!(" [{}:{}]", f, l),
        (Some(f), None) => format!(" [{}]", f),
        (None, Some(l)) => format!(" [line {}]", l),
        (None, None) => String::new(),
    }
}

/// Main error type for ferro-coords operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordsError {
    /// Malformed input syntax
    #[error("format error{}: {msg}: '{literal}'", location(.file, .line))]
    Format {
        /// The offending literal, verbatim.
        literal: String,
        /// What was wrong with it.
        msg: String,
        /// Source file, when the input came from a named file.
        file: Option<String>,
        /// Line number within that file, when known.
        line: Option<usize>,
    },

    /// Coordinate outside the bounds of its target space
    #[error("range error: {msg}")]
    Range { msg: String },

    /// Expected-adjacent or expected-equal structures disagree
    #[error("consistency error: {msg}")]
    Consistency { msg: String },
}

impl CoordsError {
    /// Create a format error without file context.
    pub fn format(literal: impl Into<String>, msg: impl Into<String>) -> Self {
        CoordsError::Format {
            literal: literal.into(),
            msg: msg.into(),
            file: None,
            line: None,
        }
    }

    /// Create a format error naming the file and line it came from.
    pub fn format_at(
        literal: impl Into<String>,
        msg: impl Into<String>,
        file: impl Into<String>,
        line: usize,
    ) -> Self {
        CoordsError::Format {
            literal: literal.into(),
            msg: msg.into(),
            file: Some(file.into()),
            line: Some(line),
        }
    }

    /// Create a range error.
    pub fn range(msg: impl Into<String>) -> Self {
        CoordsError::Range { msg: msg.into() }
    }

    /// Create a consistency error.
    pub fn consistency(msg: impl Into<String>) -> Self {
        CoordsError::Consistency { msg: msg.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_display() {
        let err = CoordsError::format("1..x:+", "stop is not a number");
        let text = err.to_string();
        assert!(text.contains("format error"));
        assert!(text.contains("1..x:+"));
        assert!(text.contains("stop is not a number"));
    }

    #[test]
    fn test_format_error_with_location() {
        let err = CoordsError::format_at("garbage", "expected 4 fields", "model.ifile", 17);
        let text = err.to_string();
        assert!(text.contains("model.ifile:17"));
        assert!(text.contains("garbage"));
    }

    #[test]
    fn test_range_error_display() {
        let err = CoordsError::range("relative position 50 exceeds space of length 30");
        assert!(err.to_string().starts_with("range error"));
    }

    #[test]
    fn test_consistency_error_display() {
        let err = CoordsError::consistency("fragment end 100 not adjacent to middle start 150");
        assert!(err.to_string().starts_with("consistency error"));
    }
}
