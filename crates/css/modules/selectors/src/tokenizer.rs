//! Selector text to token stream.
//!
//! Whitespace is significant only as the descendant combinator, so a run of
//! whitespace is emitted as a single token and dropped entirely where it
//! cannot be a combinator: at either end of the input and before `,`, `+`,
//! `>`, `~`, `)`, `]` or `;`.

use crate::error::{Result, SelectorError};
use crate::token::{Token, TokenKind};
use log::trace;

/// Tokenize `input` into a finite sequence terminated by [`TokenKind::Eoi`].
///
/// # Errors
/// Returns [`SelectorError::Format`] on a character that starts no token, an
/// unterminated string, or a dangling escape.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let tokens = Tokenizer::new(input).run()?;
    trace!("tokenized {input:?} into {} tokens", tokens.len());
    Ok(tokens)
}

/// Cursor over the characters of one selector string.
struct Tokenizer {
    /// Input characters.
    chars: Vec<char>,
    /// Current cursor index into `chars`.
    index: usize,
    /// Whitespace seen since the last emitted token.
    pending_whitespace: Option<String>,
    /// Tokens emitted so far.
    tokens: Vec<Token>,
}

impl Tokenizer {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            index: 0,
            pending_whitespace: None,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        while let Some(current) = self.peek() {
            if is_whitespace(current) {
                let run = self.consume_while(is_whitespace);
                self.pending_whitespace = Some(run);
                continue;
            }
            let token = self.next_token(current)?;
            self.emit(token);
        }
        self.emit(Token::eoi());
        Ok(self.tokens)
    }

    /// Push `token`, first flushing pending whitespace when it can act as a
    /// combinator.
    fn emit(&mut self, token: Token) {
        if let Some(run) = self.pending_whitespace.take() {
            let follows_token = !self.tokens.is_empty();
            let suppressed = matches!(
                token.kind(),
                TokenKind::Comma
                    | TokenKind::Plus
                    | TokenKind::Greater
                    | TokenKind::Tilde
                    | TokenKind::RightParen
                    | TokenKind::RightBracket
                    | TokenKind::Semicolon
                    | TokenKind::Eoi
            );
            if follows_token && !suppressed {
                self.tokens.push(Token::whitespace(run));
            }
        }
        self.tokens.push(token);
    }

    fn next_token(&mut self, current: char) -> Result<Token> {
        let start = self.index;
        match current {
            '#' => {
                self.advance();
                let name = self.consume_name()?;
                if name.is_empty() {
                    return Err(self.error_at(start, "expected a name after '#'"));
                }
                Ok(Token::hash(name))
            }
            '"' | '\'' => self.consume_string(current),
            '0'..='9' => Ok(Token::integer(self.consume_while(|ch| ch.is_ascii_digit()))),
            '-' if self.peek_at(1).is_some_and(|next| next.is_ascii_digit()) => {
                self.advance();
                let digits = self.consume_while(|ch| ch.is_ascii_digit());
                Ok(Token::integer(format!("-{digits}")))
            }
            ch if self.starts_ident(ch) => self.consume_ident_like(),
            '~' => self.operator(TokenKind::Includes, TokenKind::Tilde),
            '|' => self.operator(TokenKind::DashMatch, TokenKind::Pipe),
            '*' => self.operator(TokenKind::SubstringMatch, TokenKind::Star),
            '^' => self.required_operator(TokenKind::PrefixMatch),
            '$' => self.required_operator(TokenKind::SuffixMatch),
            '%' => self.required_operator(TokenKind::RegexMatch),
            '!' => self.required_operator(TokenKind::NotEqual),
            single => {
                let kind = match single {
                    '=' => TokenKind::Equals,
                    '+' => TokenKind::Plus,
                    '>' => TokenKind::Greater,
                    ',' => TokenKind::Comma,
                    '.' => TokenKind::Dot,
                    ':' => TokenKind::Colon,
                    ';' => TokenKind::Semicolon,
                    '/' => TokenKind::Slash,
                    '[' => TokenKind::LeftBracket,
                    ']' => TokenKind::RightBracket,
                    '(' => TokenKind::LeftParen,
                    ')' => TokenKind::RightParen,
                    other => {
                        return Err(self.error_at(start, &format!("invalid character '{other}'")));
                    }
                };
                self.advance();
                Ok(Token::of(kind))
            }
        }
    }

    /// `<ch>=` yields `with_equals`, a lone `<ch>` yields `alone`.
    fn operator(&mut self, with_equals: TokenKind, alone: TokenKind) -> Result<Token> {
        self.advance();
        if self.peek() == Some('=') {
            self.advance();
            return Ok(Token::of(with_equals));
        }
        Ok(Token::of(alone))
    }

    /// `<ch>=` yields `kind`; the character alone is not a token.
    fn required_operator(&mut self, kind: TokenKind) -> Result<Token> {
        let start = self.index;
        self.advance();
        if self.peek() == Some('=') {
            self.advance();
            return Ok(Token::of(kind));
        }
        let text = kind.fixed_text().unwrap_or_default();
        Err(self.error_at(start, &format!("expected '{text}'")))
    }

    /// Identifier, or function name when directly followed by `(`.
    fn consume_ident_like(&mut self) -> Result<Token> {
        let mut name = String::new();
        if self.peek() == Some('-') {
            self.advance();
            name.push('-');
        }
        name.push_str(&self.consume_name()?);
        if self.peek() == Some('(') {
            self.advance();
            return Ok(Token::function(name));
        }
        Ok(Token::ident(name))
    }

    /// Zero or more name characters, resolving escapes.
    fn consume_name(&mut self) -> Result<String> {
        let mut name = String::new();
        while let Some(current) = self.peek() {
            if current == '\\' {
                name.push(self.consume_escape()?);
            } else if is_name_char(current) {
                name.push(current);
                self.advance();
            } else {
                break;
            }
        }
        Ok(name)
    }

    /// Escape sequence starting at the backslash under the cursor.
    fn consume_escape(&mut self) -> Result<char> {
        let start = self.index;
        self.advance();
        let Some(current) = self.peek() else {
            return Err(self.error_at(start, "dangling escape at end of input"));
        };
        if !current.is_ascii_hexdigit() {
            self.advance();
            return Ok(current);
        }
        let mut digits = String::new();
        while digits.len() < 6 {
            match self.peek() {
                Some(hex) if hex.is_ascii_hexdigit() => {
                    digits.push(hex);
                    self.advance();
                }
                _ => break,
            }
        }
        // A single whitespace character terminates a hex escape.
        if self.peek().is_some_and(is_whitespace) {
            self.advance();
        }
        let code = u32::from_str_radix(&digits, 16).unwrap_or_default();
        Ok(char::from_u32(code)
            .filter(|ch| *ch != '\0')
            .unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn consume_string(&mut self, quote: char) -> Result<Token> {
        let start = self.index;
        self.advance();
        let mut text = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error_at(start, "unterminated string")),
                Some(ch) if ch == quote => {
                    self.advance();
                    return Ok(Token::string(text));
                }
                Some('\\') => match self.peek_at(1) {
                    None => return Err(self.error_at(start, "unterminated string")),
                    Some('\n') => {
                        // Escaped newline continues the string.
                        self.index = self.index.saturating_add(2);
                    }
                    Some(_) => text.push(self.consume_escape()?),
                },
                Some(ch) => {
                    text.push(ch);
                    self.advance();
                }
            }
        }
    }

    fn starts_ident(&self, current: char) -> bool {
        if current == '-' {
            return self
                .peek_at(1)
                .is_some_and(|next| is_name_start(next) || next == '\\');
        }
        is_name_start(current) || current == '\\'
    }

    fn consume_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(current) = self.peek() {
            if !predicate(current) {
                break;
            }
            text.push(current);
            self.advance();
        }
        text
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index.saturating_add(offset)).copied()
    }

    #[inline]
    fn advance(&mut self) {
        self.index = self.index.saturating_add(1);
    }

    fn error_at(&self, position: usize, message: &str) -> SelectorError {
        let source: String = self.chars.iter().collect();
        SelectorError::format(format!(
            "{message} at position {position} in {source:?}"
        ))
    }
}

#[inline]
const fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\u{c}')
}

#[inline]
fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || !ch.is_ascii()
}

#[inline]
fn is_name_char(ch: char) -> bool {
    is_name_start(ch) || ch.is_ascii_digit() || ch == '-'
}
