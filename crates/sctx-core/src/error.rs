//! Error types for store snapshots and streams.

/// Errors raised while building state snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A JSON value used as a snapshot was not an object.
    NotAnObject {
        /// JSON type name of the rejected value.
        found: &'static str,
    },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject { found } => {
                write!(f, "state snapshot must be a JSON object, found {found}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Terminal error carried by a [`Stream`](crate::Stream).
///
/// A stream that signals an error is finished; the error is a store
/// contract violation, not a recoverable event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamError {
    message: String,
}

impl StreamError {
    /// Create a stream error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stream error: {}", self.message)
    }
}

impl std::error::Error for StreamError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = StoreError::NotAnObject { found: "array" };
        assert_eq!(
            err.to_string(),
            "state snapshot must be a JSON object, found array"
        );
        assert_eq!(StreamError::new("boom").to_string(), "stream error: boom");
    }
}
