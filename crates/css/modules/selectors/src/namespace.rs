//! Namespace qualifiers on type and attribute names.

use core::fmt;

/// Namespace prefix written before a type or attribute name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum NamespacePrefix {
    /// No prefix was written.
    #[default]
    None,
    /// Explicit empty prefix: `|name`.
    Empty,
    /// Wildcard prefix: `*|name`.
    Any,
    /// Named prefix: `ns|name`.
    Specific(String),
}

impl NamespacePrefix {
    #[inline]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    #[inline]
    pub const fn is_specific(&self) -> bool {
        matches!(self, Self::Specific(_))
    }

    /// Name of a specific namespace.
    #[inline]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Specific(namespace) => Some(namespace),
            Self::None | Self::Empty | Self::Any => None,
        }
    }

    /// Qualified, lowercased form of `name` under this prefix.
    ///
    /// Only a specific namespace changes the name (`ns:name`); the empty and
    /// wildcard prefixes leave it unqualified.
    pub fn qualify(&self, name: &str) -> String {
        match self {
            Self::Specific(namespace) => format!("{namespace}:{name}").to_ascii_lowercase(),
            Self::None | Self::Empty | Self::Any => name.to_ascii_lowercase(),
        }
    }
}

impl fmt::Display for NamespacePrefix {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Empty => formatter.write_str("|"),
            Self::Any => formatter.write_str("*|"),
            Self::Specific(namespace) => write!(formatter, "{namespace}|"),
        }
    }
}
