//! Errors raised while compiling or applying selectors.

use thiserror::Error;

/// Result alias used throughout the selector engine.
pub type Result<T, E = SelectorError> = core::result::Result<T, E>;

/// Failure categories surfaced to callers.
///
/// Compilation stops at the first failure. Nothing is retried or recovered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// Malformed selector text, an invalid regular expression, or a region
    /// limit that is not a direct child of the context node.
    #[error("invalid selector: {0}")]
    Format(String),
    /// Syntactically valid input the engine does not implement, such as an
    /// `an+b` formula with a coefficient.
    #[error("unsupported selector: {0}")]
    NotSupported(String),
    /// Missing or invalid argument supplied by the caller.
    #[error("invalid argument: {0}")]
    Argument(String),
}

impl SelectorError {
    /// Build a [`SelectorError::Format`].
    #[inline]
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    /// Build a [`SelectorError::NotSupported`].
    #[inline]
    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::NotSupported(message.into())
    }

    /// Build a [`SelectorError::Argument`].
    #[inline]
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }

    #[inline]
    pub const fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }

    #[inline]
    pub const fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported(_))
    }

    #[inline]
    pub const fn is_argument(&self) -> bool {
        matches!(self, Self::Argument(_))
    }

    /// The message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Format(message) | Self::NotSupported(message) | Self::Argument(message) => {
                message
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_category() {
        let error = SelectorError::format("Unexpected token ']'");
        assert_eq!(error.to_string(), "invalid selector: Unexpected token ']'");
        assert_eq!(error.message(), "Unexpected token ']'");
    }

    #[test]
    fn predicates_match_variant() {
        assert!(SelectorError::format("x").is_format());
        assert!(SelectorError::not_supported("x").is_not_supported());
        assert!(SelectorError::argument("x").is_argument());
        assert!(!SelectorError::argument("x").is_format());
    }
}
