//! Error types for cursor operations.

use std::fmt;

/// Result type for cursor operations.
pub type StreamResult<T> = Result<T, StreamError>;

/// Errors that can occur while reading from or writing to a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// Attempted to read past the end of the buffer.
    TruncatedInput {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// A write would grow the message past the configured cap.
    MessageTooLarge {
        /// Total size the write would have produced.
        attempted: usize,
        /// Configured maximum message size.
        max: usize,
    },

    /// Seek target lies outside the written portion of the buffer.
    BadSeek {
        /// Requested position.
        position: usize,
        /// Current written length.
        len: usize,
    },
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TruncatedInput {
                requested,
                available,
            } => {
                write!(
                    f,
                    "attempted to read {requested} bytes but only {available} bytes available"
                )
            }
            Self::MessageTooLarge { attempted, max } => {
                write!(
                    f,
                    "write would grow the message to {attempted} bytes, maximum is {max}"
                )
            }
            Self::BadSeek { position, len } => {
                write!(f, "seek to {position} outside written length {len}")
            }
        }
    }
}

impl std::error::Error for StreamError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_truncated_input() {
        let err = StreamError::TruncatedInput {
            requested: 4,
            available: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("4 bytes"), "should mention requested bytes");
        assert!(msg.contains("1 bytes"), "should mention available bytes");
        assert!(msg.contains("read"), "should mention read operation");
    }

    #[test]
    fn display_message_too_large() {
        let err = StreamError::MessageTooLarge {
            attempted: 70_000,
            max: 65_536,
        };
        let msg = err.to_string();
        assert!(msg.contains("70000"));
        assert!(msg.contains("65536"));
    }

    #[test]
    fn display_bad_seek() {
        let err = StreamError::BadSeek {
            position: 10,
            len: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains("4"));
    }

    #[test]
    fn error_equality() {
        let err1 = StreamError::TruncatedInput {
            requested: 2,
            available: 0,
        };
        let err2 = StreamError::TruncatedInput {
            requested: 2,
            available: 0,
        };
        let err3 = StreamError::TruncatedInput {
            requested: 2,
            available: 1,
        };
        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<StreamError>();
    }
}
