//! Lexical alphabet of the selector grammar.

use core::fmt;

/// Closed set of token kinds produced by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifier such as `div` or `first-child`.
    Ident,
    /// `#name`; the token text excludes the `#`.
    Hash,
    /// Quoted string with escapes resolved; the text excludes the quotes.
    String,
    /// Decimal integer, optionally preceded by `-`.
    Integer,
    /// Identifier immediately followed by `(`; the text excludes the paren.
    Function,
    /// A run of whitespace acting as the descendant combinator.
    WhiteSpace,
    Plus,
    Greater,
    Tilde,
    Comma,
    Dot,
    Colon,
    Semicolon,
    Slash,
    Star,
    Pipe,
    LeftBracket,
    RightBracket,
    LeftParen,
    RightParen,
    Equals,
    /// `!=`
    NotEqual,
    /// `~=`
    Includes,
    /// `|=`
    DashMatch,
    /// `^=`
    PrefixMatch,
    /// `$=`
    SuffixMatch,
    /// `*=`
    SubstringMatch,
    /// `%=`
    RegexMatch,
    /// End of input.
    Eoi,
}

impl TokenKind {
    /// Text fixed by the grammar, or `None` for kinds carrying free text.
    pub const fn fixed_text(self) -> Option<&'static str> {
        Some(match self {
            Self::Ident
            | Self::Hash
            | Self::String
            | Self::Integer
            | Self::Function
            | Self::WhiteSpace => return None,
            Self::Plus => "+",
            Self::Greater => ">",
            Self::Tilde => "~",
            Self::Comma => ",",
            Self::Dot => ".",
            Self::Colon => ":",
            Self::Semicolon => ";",
            Self::Slash => "/",
            Self::Star => "*",
            Self::Pipe => "|",
            Self::LeftBracket => "[",
            Self::RightBracket => "]",
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::Equals => "=",
            Self::NotEqual => "!=",
            Self::Includes => "~=",
            Self::DashMatch => "|=",
            Self::PrefixMatch => "^=",
            Self::SuffixMatch => "$=",
            Self::SubstringMatch => "*=",
            Self::RegexMatch => "%=",
            Self::Eoi => "",
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ident => "identifier",
            Self::Hash => "hash",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Function => "function",
            Self::WhiteSpace => "whitespace",
            Self::Eoi => "end of input",
            fixed => return write!(formatter, "'{}'", fixed.fixed_text().unwrap_or_default()),
        };
        formatter.write_str(name)
    }
}

/// A single lexical token.
///
/// Equality compares the text only for kinds whose text is not fixed by the
/// grammar, so `Token::of(TokenKind::Plus)` equals any other `+` token.
#[derive(Debug, Clone, Eq)]
pub struct Token {
    kind: TokenKind,
    text: String,
}

impl Token {
    /// Build a token of `kind` carrying `text`.
    #[inline]
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Build a token whose text is fixed by its kind.
    #[inline]
    pub fn of(kind: TokenKind) -> Self {
        Self::new(kind, kind.fixed_text().unwrap_or_default())
    }

    #[inline]
    pub fn ident(text: impl Into<String>) -> Self {
        Self::new(TokenKind::Ident, text)
    }

    #[inline]
    pub fn hash(text: impl Into<String>) -> Self {
        Self::new(TokenKind::Hash, text)
    }

    #[inline]
    pub fn string(text: impl Into<String>) -> Self {
        Self::new(TokenKind::String, text)
    }

    #[inline]
    pub fn integer(text: impl Into<String>) -> Self {
        Self::new(TokenKind::Integer, text)
    }

    #[inline]
    pub fn function(text: impl Into<String>) -> Self {
        Self::new(TokenKind::Function, text)
    }

    #[inline]
    pub fn whitespace(text: impl Into<String>) -> Self {
        Self::new(TokenKind::WhiteSpace, text)
    }

    #[inline]
    pub fn eoi() -> Self {
        Self::of(TokenKind::Eoi)
    }

    #[inline]
    pub const fn kind(&self) -> TokenKind {
        self.kind
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && (self.kind.fixed_text().is_some() || self.text == other.text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Ident | TokenKind::Integer => write!(formatter, "'{}'", self.text),
            TokenKind::Hash => write!(formatter, "'#{}'", self.text),
            TokenKind::String => write!(formatter, "string \"{}\"", self.text),
            TokenKind::Function => write!(formatter, "'{}('", self.text),
            kind => fmt::Display::fmt(&kind, formatter),
        }
    }
}

/// Matches a token either by kind alone or by exact value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSpec {
    /// Any token of this kind.
    Kind(TokenKind),
    /// A token equal to this one.
    Token(Token),
}

impl TokenSpec {
    /// True if `token` satisfies this spec.
    #[inline]
    pub fn matches(&self, token: &Token) -> bool {
        match self {
            Self::Kind(kind) => token.kind() == *kind,
            Self::Token(expected) => expected == token,
        }
    }

    #[inline]
    pub const fn kind(&self) -> TokenKind {
        match self {
            Self::Kind(kind) => *kind,
            Self::Token(token) => token.kind(),
        }
    }
}

impl From<TokenKind> for TokenSpec {
    #[inline]
    fn from(kind: TokenKind) -> Self {
        Self::Kind(kind)
    }
}

impl From<Token> for TokenSpec {
    #[inline]
    fn from(token: Token) -> Self {
        Self::Token(token)
    }
}

impl fmt::Display for TokenSpec {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kind(kind) => fmt::Display::fmt(kind, formatter),
            Self::Token(token) => fmt::Display::fmt(token, formatter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_kinds_ignore_text() {
        assert_eq!(Token::of(TokenKind::Plus), Token::new(TokenKind::Plus, "anything"));
        assert_ne!(Token::ident("div"), Token::ident("span"));
        assert_ne!(Token::ident("div"), Token::function("div"));
    }

    #[test]
    fn spec_matches_by_kind_or_value() {
        let any_ident = TokenSpec::from(TokenKind::Ident);
        let exact = TokenSpec::from(Token::ident("odd"));
        assert!(any_ident.matches(&Token::ident("even")));
        assert!(exact.matches(&Token::ident("odd")));
        assert!(!exact.matches(&Token::ident("even")));
        assert_eq!(exact.kind(), TokenKind::Ident);
    }

    #[test]
    fn display_names_token() {
        assert_eq!(Token::ident("div").to_string(), "'div'");
        assert_eq!(Token::of(TokenKind::RightBracket).to_string(), "']'");
        assert_eq!(Token::eoi().to_string(), "end of input");
        assert_eq!(TokenSpec::from(TokenKind::String).to_string(), "string");
    }
}
