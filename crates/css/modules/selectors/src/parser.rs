//! Recursive-descent parser for CSS3 selector groups.
//!
//! The grammar, with the engine's extensions:
//!
//! ```text
//! selector_group  := '/'? selector (',' S* selector)* EOI
//! selector        := simple_sequence (combinator simple_sequence)*
//! combinator      := S | '+' S* | '>' S* | '~' S*
//! simple_sequence := type_or_universal modifier* | modifier+
//! modifier        := HASH | '.' IDENT | '[' attrib ']' | ':' pseudo
//! attrib          := S* namespace? IDENT S* (operator S* (IDENT | STRING) S*)?
//! pseudo          := IDENT | FUNCTION S* arguments ')'
//! ```
//!
//! Nested selectors are parsed by a child parser that shares the token
//! reader, so it resumes exactly where the parent stopped and returns at the
//! first token it cannot consume.

use crate::error::{Result, SelectorError};
use crate::generator::SelectorGenerator;
use crate::namespace::NamespacePrefix;
use crate::registry::{ArgType, CustomArg};
use crate::token::{Token, TokenKind, TokenSpec};
use core::iter::Peekable;
use log::trace;
use std::vec;

/// Token stream with one token of pushback.
#[derive(Debug)]
pub struct TokenReader {
    tokens: Peekable<vec::IntoIter<Token>>,
    pushed_back: Option<Token>,
    /// Returned once the stream is exhausted.
    end: Token,
}

impl TokenReader {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter().peekable(),
            pushed_back: None,
            end: Token::eoi(),
        }
    }

    /// The next token without consuming it.
    pub fn peek(&mut self) -> &Token {
        if let Some(token) = &self.pushed_back {
            return token;
        }
        self.tokens.peek().unwrap_or(&self.end)
    }

    /// Consume the next token. Past the end this keeps returning
    /// [`TokenKind::Eoi`].
    pub fn read(&mut self) -> Token {
        self.pushed_back
            .take()
            .or_else(|| self.tokens.next())
            .unwrap_or_else(|| self.end.clone())
    }

    /// Push `token` back so the next read returns it.
    pub fn unread(&mut self, token: Token) {
        debug_assert!(self.pushed_back.is_none(), "only one token of pushback");
        self.pushed_back = Some(token);
    }
}

/// Parse `tokens` as a complete selector group, reporting every production
/// to `generator`.
///
/// # Errors
/// [`SelectorError::Format`] on the first unexpected token or unknown
/// pseudo-selector, [`SelectorError::NotSupported`] for `an+b` formulas,
/// and whatever the generator raises.
pub fn parse<G: SelectorGenerator>(tokens: Vec<Token>, generator: &mut G) -> Result<()> {
    let mut reader = TokenReader::new(tokens);
    Parser {
        reader: &mut reader,
        generator,
        expect_eoi: true,
    }
    .parse(false)
}

struct Parser<'parse, G> {
    reader: &'parse mut TokenReader,
    generator: &'parse mut G,
    /// Top-level parsers must consume the whole stream; nested ones stop at
    /// the first token they cannot use.
    expect_eoi: bool,
}

impl<G: SelectorGenerator> Parser<'_, G> {
    fn parse(&mut self, always_anchor: bool) -> Result<()> {
        self.generator.on_init();
        if always_anchor {
            self.generator.anchor_to_root();
        }
        if self.try_read_kind(TokenKind::Slash).is_some() {
            self.generator.anchor_to_root();
            self.try_read_kind(TokenKind::WhiteSpace);
        }
        self.selector_group()?;
        self.generator.on_close()
    }

    fn selector_group(&mut self) -> Result<()> {
        self.selector()?;
        while self.try_read_kind(TokenKind::Comma).is_some() {
            self.try_read_kind(TokenKind::WhiteSpace);
            self.selector()?;
        }
        if self.expect_eoi {
            self.read_kind(TokenKind::Eoi)?;
        }
        Ok(())
    }

    fn selector(&mut self) -> Result<()> {
        self.generator.on_selector();
        self.simple_selector_sequence()?;
        while self.try_combinator() {
            self.simple_selector_sequence()?;
        }
        Ok(())
    }

    fn try_combinator(&mut self) -> bool {
        let Some(token) = self.try_read(&[
            TokenSpec::Kind(TokenKind::Plus),
            TokenSpec::Kind(TokenKind::Greater),
            TokenSpec::Kind(TokenKind::Tilde),
            TokenSpec::Kind(TokenKind::WhiteSpace),
        ]) else {
            return false;
        };
        match token.kind() {
            TokenKind::WhiteSpace => {
                self.generator.descendant();
                return true;
            }
            TokenKind::Plus => self.generator.adjacent(),
            TokenKind::Greater => self.generator.child(),
            _ => self.generator.general_sibling(),
        }
        self.try_read_kind(TokenKind::WhiteSpace);
        true
    }

    fn simple_selector_sequence(&mut self) -> Result<()> {
        let mut named = false;
        let mut modifiers = 0_usize;
        loop {
            let Some(token) = self.try_read(&[
                TokenSpec::Kind(TokenKind::Hash),
                TokenSpec::Kind(TokenKind::Dot),
                TokenSpec::Kind(TokenKind::LeftBracket),
                TokenSpec::Kind(TokenKind::Colon),
            ]) else {
                if named || modifiers > 0 {
                    return Ok(());
                }
                self.type_selector_or_universal()?;
                named = true;
                continue;
            };

            if modifiers == 0 && !named {
                // `.a` means `*.a`.
                self.generator.universal(&NamespacePrefix::None);
            }
            match token.kind() {
                TokenKind::Hash => self.generator.id(token.text()),
                TokenKind::Dot => {
                    let class = self.read_kind(TokenKind::Ident)?;
                    self.generator.class(class.text());
                }
                TokenKind::LeftBracket => self.attrib()?,
                _ => self.pseudo_class()?,
            }
            modifiers = modifiers.saturating_add(1);
        }
    }

    fn type_selector_or_universal(&mut self) -> Result<()> {
        let prefix = self.try_namespace_prefix().unwrap_or_default();
        let token = self.read(&[
            TokenSpec::Kind(TokenKind::Ident),
            TokenSpec::Kind(TokenKind::Star),
        ])?;
        if token.kind() == TokenKind::Ident {
            self.generator.type_selector(&prefix, token.text());
        } else {
            self.generator.universal(&prefix);
        }
        Ok(())
    }

    /// `ident|`, `*|` or `|`; anything else is left unread.
    fn try_namespace_prefix(&mut self) -> Option<NamespacePrefix> {
        let token = self.try_read(&[
            TokenSpec::Kind(TokenKind::Ident),
            TokenSpec::Kind(TokenKind::Star),
            TokenSpec::Kind(TokenKind::Pipe),
        ])?;
        if token.kind() == TokenKind::Pipe {
            return Some(NamespacePrefix::Empty);
        }
        if self.try_read_kind(TokenKind::Pipe).is_none() {
            self.reader.unread(token);
            return None;
        }
        Some(if token.kind() == TokenKind::Ident {
            NamespacePrefix::Specific(token.text().to_owned())
        } else {
            NamespacePrefix::Any
        })
    }

    /// Attribute selector body after the opening bracket.
    fn attrib(&mut self) -> Result<()> {
        self.try_read_kind(TokenKind::WhiteSpace);
        let prefix = self.try_namespace_prefix().unwrap_or_default();
        let name = self.read_kind(TokenKind::Ident)?;
        self.try_read_kind(TokenKind::WhiteSpace);

        let operator = self.try_read(&[
            TokenSpec::Kind(TokenKind::Equals),
            TokenSpec::Kind(TokenKind::NotEqual),
            TokenSpec::Kind(TokenKind::Includes),
            TokenSpec::Kind(TokenKind::RegexMatch),
            TokenSpec::Kind(TokenKind::DashMatch),
            TokenSpec::Kind(TokenKind::PrefixMatch),
            TokenSpec::Kind(TokenKind::SuffixMatch),
            TokenSpec::Kind(TokenKind::SubstringMatch),
        ]);
        if let Some(operator) = operator {
            self.try_read_kind(TokenKind::WhiteSpace);
            let value = self.read(&[
                TokenSpec::Kind(TokenKind::String),
                TokenSpec::Kind(TokenKind::Ident),
            ])?;
            self.try_read_kind(TokenKind::WhiteSpace);

            let (name, value) = (name.text(), value.text());
            let generator = &mut *self.generator;
            match operator.kind() {
                TokenKind::Equals => generator.attribute_exact(&prefix, name, value),
                TokenKind::NotEqual => generator.attribute_not_equal(&prefix, name, value),
                TokenKind::Includes => generator.attribute_includes(&prefix, name, value),
                TokenKind::RegexMatch => generator.attribute_regex_match(&prefix, name, value)?,
                TokenKind::DashMatch => generator.attribute_dash_match(&prefix, name, value),
                TokenKind::PrefixMatch => generator.attribute_prefix_match(&prefix, name, value),
                TokenKind::SuffixMatch => generator.attribute_suffix_match(&prefix, name, value),
                _ => generator.attribute_substring(&prefix, name, value),
            }
        } else {
            self.generator.attribute_exists(&prefix, name.text());
        }

        self.read_kind(TokenKind::RightBracket)?;
        Ok(())
    }

    /// Pseudo-class after the colon.
    fn pseudo_class(&mut self) -> Result<()> {
        if self.try_functional_pseudo()? {
            return Ok(());
        }
        let name = self.read_kind(TokenKind::Ident)?;
        match name.text() {
            "first-child" => self.generator.first_child(),
            "last-child" => self.generator.last_child(),
            "only-child" => self.generator.only_child(),
            "empty" => self.generator.empty(),
            "last" => self.generator.last(),
            "select-parent" => self.generator.select_parent(),
            custom => self.custom_selector(custom, false)?,
        }
        Ok(())
    }

    fn try_functional_pseudo(&mut self) -> Result<bool> {
        let Some(function) = self.try_read_kind(TokenKind::Function) else {
            return Ok(false);
        };
        self.try_read_kind(TokenKind::WhiteSpace);

        match function.text() {
            "eq" => {
                let index = self.integer()?;
                self.generator.eq(index);
            }
            "nth-child" => {
                let offset = self.nth_offset("nth-child")?;
                self.generator.nth_child(1, offset)?;
            }
            "nth-last-child" => {
                let offset = self.nth_offset("nth-last-child")?;
                self.generator.nth_last_child(1, offset)?;
            }
            "has" => {
                let sub = self.sub_generator(false)?;
                self.generator.has(sub)?;
            }
            "not" => {
                let sub = self.sub_generator(true)?;
                self.generator.not(sub)?;
            }
            "split-after" => {
                let splitter = self.sub_generator(false)?;
                self.generator.split_after(splitter)?;
            }
            "split-before" => {
                let splitter = self.sub_generator(false)?;
                self.generator.split_before(splitter)?;
            }
            "split-between" => {
                let splitter = self.sub_generator(false)?;
                self.generator.split_between(splitter)?;
            }
            "split-all" => {
                let splitter = self.sub_generator(false)?;
                self.generator.split_all(splitter)?;
            }
            "before" => {
                let limit = self.sub_generator(false)?;
                self.generator.before(limit)?;
            }
            "after" => {
                let limit = self.sub_generator(false)?;
                self.generator.after(limit)?;
            }
            "between" => {
                let start = self.sub_generator(false)?;
                self.argument_separator()?;
                let end = self.sub_generator(false)?;
                self.generator.between(start, end)?;
            }
            "contains" => {
                let text = self.read_kind(TokenKind::String)?;
                self.generator.contains(text.text());
            }
            "matches" => {
                let pattern = self.read_kind(TokenKind::String)?;
                self.generator.matches(pattern.text())?;
            }
            custom => self.custom_selector(custom, true)?,
        }

        self.read_kind(TokenKind::RightParen)?;
        Ok(true)
    }

    /// Registered pseudo-selector `name`, reading its declared arguments.
    fn custom_selector(&mut self, name: &str, functional: bool) -> Result<()> {
        let Some(info) = self.generator.custom_selector_info(name) else {
            return Err(SelectorError::format(format!(
                "Unknown pseudo-selector '{name}'."
            )));
        };
        let arg_types = info.arg_types();
        if !functional && !arg_types.is_empty() {
            return Err(SelectorError::format(format!(
                "Pseudo-selector '{name}' expects {} argument(s).",
                arg_types.len()
            )));
        }

        let mut args = Vec::with_capacity(arg_types.len());
        for (position, arg_type) in arg_types.iter().enumerate() {
            if position > 0 {
                self.argument_separator()?;
            }
            args.push(match arg_type {
                ArgType::String => {
                    CustomArg::String(self.read_kind(TokenKind::String)?.text().to_owned())
                }
                ArgType::Integer => CustomArg::Integer(self.integer()?),
                ArgType::SubSelector => {
                    CustomArg::SubSelector(self.sub_generator(false)?.compiled()?)
                }
            });
        }
        trace!("applying custom selector '{name}' with {args:?}");
        let selector = info.invoke(args)?;
        self.generator.custom_selector(selector);
        Ok(())
    }

    /// Arguments are separated by `;` and mandatory whitespace.
    fn argument_separator(&mut self) -> Result<()> {
        self.read_kind(TokenKind::Semicolon)?;
        self.read_kind(TokenKind::WhiteSpace)?;
        Ok(())
    }

    /// Parse a nested selector group into a fresh generator.
    fn sub_generator(&mut self, always_anchor: bool) -> Result<G> {
        let mut sub = self.generator.create_new();
        Parser {
            reader: &mut *self.reader,
            generator: &mut sub,
            expect_eoi: false,
        }
        .parse(always_anchor)?;
        Ok(sub)
    }

    /// The `b` of an `an+b` argument.
    ///
    /// Only a bare integer position compiles. Any argument carrying an `n`
    /// term raises [`SelectorError::NotSupported`], including `n+2` and
    /// `1n+2` whose coefficient is one, as do the `odd` and `even` keywords.
    /// Other identifiers are [`SelectorError::Format`].
    fn nth_offset(&mut self, function: &str) -> Result<i32> {
        self.try_read_kind(TokenKind::Plus);
        let token = self.read(&[
            TokenSpec::Kind(TokenKind::Integer),
            TokenSpec::Kind(TokenKind::Ident),
        ])?;
        let formula = match token.kind() {
            TokenKind::Ident if is_formula_term(token.text()) => Some(token.text().to_owned()),
            TokenKind::Ident => {
                return Err(unexpected(&token, &[TokenSpec::Kind(TokenKind::Integer)]));
            }
            _ => {
                let next = self.reader.peek();
                (next.kind() == TokenKind::Ident && is_formula_term(next.text()))
                    .then(|| format!("{}{}", token.text(), next.text()))
            }
        };
        if let Some(formula) = formula {
            return Err(SelectorError::not_supported(format!(
                "The {function}({formula}) formula is not supported; only a constant position is."
            )));
        }
        parse_integer(&token)
    }

    fn integer(&mut self) -> Result<i32> {
        let token = self.read_kind(TokenKind::Integer)?;
        parse_integer(&token)
    }

    fn try_read_kind(&mut self, kind: TokenKind) -> Option<Token> {
        self.try_read(&[TokenSpec::Kind(kind)])
    }

    fn read_kind(&mut self, kind: TokenKind) -> Result<Token> {
        self.read(&[TokenSpec::Kind(kind)])
    }

    /// Consume the next token if it satisfies one of `specs`.
    fn try_read(&mut self, specs: &[TokenSpec]) -> Option<Token> {
        let next = self.reader.peek();
        specs
            .iter()
            .any(|spec| spec.matches(next))
            .then(|| self.reader.read())
    }

    /// Consume the next token, which must satisfy one of `specs`.
    fn read(&mut self, specs: &[TokenSpec]) -> Result<Token> {
        if let Some(token) = self.try_read(specs) {
            return Ok(token);
        }
        let found = self.reader.peek().clone();
        Err(unexpected(&found, specs))
    }
}

/// `odd`, `even`, or an `n` term such as `n`, `-n` or `n-1`.
fn is_formula_term(text: &str) -> bool {
    text.eq_ignore_ascii_case("odd")
        || text.eq_ignore_ascii_case("even")
        || text.trim_start_matches('-').starts_with(['n', 'N'])
}

fn parse_integer(token: &Token) -> Result<i32> {
    token.text().parse().map_err(|_| {
        SelectorError::format(format!("Integer '{}' is out of range.", token.text()))
    })
}

fn unexpected(found: &Token, specs: &[TokenSpec]) -> SelectorError {
    let message = match specs {
        [single] => format!("Unexpected token {found} where {single} was expected."),
        _ => {
            let expected: Vec<String> = specs.iter().map(ToString::to_string).collect();
            format!(
                "Unexpected token {found} where one of [{}] was expected.",
                expected.join(", ")
            )
        }
    };
    SelectorError::format(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CustomSelectorInfo, CustomSelectorRegistry};
    use crate::selector::{self, Selector};
    use crate::tokenizer::tokenize;
    use std::sync::Arc;

    /// Generator recording every event as text.
    struct Recorder {
        events: Vec<String>,
        registry: Arc<CustomSelectorRegistry<u8>>,
    }

    impl Recorder {
        fn new(registry: Arc<CustomSelectorRegistry<u8>>) -> Self {
            Self {
                events: Vec::new(),
                registry,
            }
        }

        fn push(&mut self, event: impl Into<String>) {
            self.events.push(event.into());
        }

        fn nested(&mut self, name: &str, sub: &Self) {
            let event = format!("{name}[{}]", sub.events.join(" "));
            self.push(event);
        }
    }

    impl SelectorGenerator for Recorder {
        type Element = u8;

        fn on_init(&mut self) {
            self.push("init");
        }
        fn on_selector(&mut self) {
            self.push("selector");
        }
        fn on_close(&mut self) -> Result<()> {
            self.push("close");
            Ok(())
        }
        fn anchor_to_root(&mut self) {
            self.push("anchor");
        }
        fn create_new(&self) -> Self {
            Self::new(Arc::clone(&self.registry))
        }
        fn compiled(&self) -> Result<Selector<u8>> {
            Ok(selector::identity())
        }
        fn custom_selector_info(&self, name: &str) -> Option<CustomSelectorInfo<u8>> {
            self.registry.get(name)
        }
        fn custom_selector(&mut self, _: Selector<u8>) {
            self.push("custom");
        }
        fn type_selector(&mut self, prefix: &NamespacePrefix, name: &str) {
            self.push(format!("type({prefix}{name})"));
        }
        fn universal(&mut self, prefix: &NamespacePrefix) {
            self.push(format!("universal({prefix})"));
        }
        fn id(&mut self, id: &str) {
            self.push(format!("id({id})"));
        }
        fn class(&mut self, class: &str) {
            self.push(format!("class({class})"));
        }
        fn attribute_exists(&mut self, prefix: &NamespacePrefix, name: &str) {
            self.push(format!("attr({prefix}{name})"));
        }
        fn attribute_exact(&mut self, prefix: &NamespacePrefix, name: &str, value: &str) {
            self.push(format!("attr({prefix}{name}={value})"));
        }
        fn attribute_not_equal(&mut self, prefix: &NamespacePrefix, name: &str, value: &str) {
            self.push(format!("attr({prefix}{name}!={value})"));
        }
        fn attribute_includes(&mut self, prefix: &NamespacePrefix, name: &str, value: &str) {
            self.push(format!("attr({prefix}{name}~={value})"));
        }
        fn attribute_dash_match(&mut self, prefix: &NamespacePrefix, name: &str, value: &str) {
            self.push(format!("attr({prefix}{name}|={value})"));
        }
        fn attribute_prefix_match(&mut self, prefix: &NamespacePrefix, name: &str, value: &str) {
            self.push(format!("attr({prefix}{name}^={value})"));
        }
        fn attribute_suffix_match(&mut self, prefix: &NamespacePrefix, name: &str, value: &str) {
            self.push(format!("attr({prefix}{name}$={value})"));
        }
        fn attribute_substring(&mut self, prefix: &NamespacePrefix, name: &str, value: &str) {
            self.push(format!("attr({prefix}{name}*={value})"));
        }
        fn attribute_regex_match(
            &mut self,
            prefix: &NamespacePrefix,
            name: &str,
            pattern: &str,
        ) -> Result<()> {
            self.push(format!("attr({prefix}{name}%={pattern})"));
            Ok(())
        }
        fn first_child(&mut self) {
            self.push("first-child");
        }
        fn last_child(&mut self) {
            self.push("last-child");
        }
        fn only_child(&mut self) {
            self.push("only-child");
        }
        fn empty(&mut self) {
            self.push("empty");
        }
        fn last(&mut self) {
            self.push("last");
        }
        fn select_parent(&mut self) {
            self.push("select-parent");
        }
        fn nth_child(&mut self, step: i32, offset: i32) -> Result<()> {
            self.push(format!("nth-child({step}n+{offset})"));
            Ok(())
        }
        fn nth_last_child(&mut self, step: i32, offset: i32) -> Result<()> {
            self.push(format!("nth-last-child({step}n+{offset})"));
            Ok(())
        }
        fn eq(&mut self, index: i32) {
            self.push(format!("eq({index})"));
        }
        fn child(&mut self) {
            self.push(">");
        }
        fn descendant(&mut self) {
            self.push("_");
        }
        fn adjacent(&mut self) {
            self.push("+");
        }
        fn general_sibling(&mut self) {
            self.push("~");
        }
        fn has(&mut self, sub: Self) -> Result<()> {
            self.nested("has", &sub);
            Ok(())
        }
        fn not(&mut self, sub: Self) -> Result<()> {
            self.nested("not", &sub);
            Ok(())
        }
        fn split_after(&mut self, splitter: Self) -> Result<()> {
            self.nested("split-after", &splitter);
            Ok(())
        }
        fn split_before(&mut self, splitter: Self) -> Result<()> {
            self.nested("split-before", &splitter);
            Ok(())
        }
        fn split_between(&mut self, splitter: Self) -> Result<()> {
            self.nested("split-between", &splitter);
            Ok(())
        }
        fn split_all(&mut self, splitter: Self) -> Result<()> {
            self.nested("split-all", &splitter);
            Ok(())
        }
        fn before(&mut self, limit: Self) -> Result<()> {
            self.nested("before", &limit);
            Ok(())
        }
        fn after(&mut self, limit: Self) -> Result<()> {
            self.nested("after", &limit);
            Ok(())
        }
        fn between(&mut self, start: Self, end: Self) -> Result<()> {
            self.nested("between-start", &start);
            self.nested("between-end", &end);
            Ok(())
        }
        fn contains(&mut self, text: &str) {
            self.push(format!("contains({text})"));
        }
        fn matches(&mut self, pattern: &str) -> Result<()> {
            self.push(format!("matches({pattern})"));
            Ok(())
        }
    }

    fn record_with(input: &str, registry: Arc<CustomSelectorRegistry<u8>>) -> Result<String> {
        let mut recorder = Recorder::new(registry);
        parse(tokenize(input)?, &mut recorder)?;
        Ok(recorder.events.join(" "))
    }

    fn record(input: &str) -> Result<String> {
        record_with(input, Arc::new(CustomSelectorRegistry::new()))
    }

    #[test]
    fn compound_and_combinators() {
        let _ = env_logger::builder().is_test(true).try_init();
        assert_eq!(
            record("div.item > a[href^=\"http\"]").unwrap(),
            "init selector type(div) class(item) > type(a) attr(href^=http) close"
        );
        assert_eq!(
            record("ul li + li ~ p").unwrap(),
            "init selector type(ul) _ type(li) + type(li) ~ type(p) close"
        );
    }

    #[test]
    fn leading_modifier_implies_universal() {
        assert_eq!(
            record("#main.wide").unwrap(),
            "init selector universal() id(main) class(wide) close"
        );
    }

    #[test]
    fn groups_and_anchor() {
        assert_eq!(
            record("/ a, b").unwrap(),
            "init anchor selector type(a) selector type(b) close"
        );
    }

    #[test]
    fn namespaces() {
        assert_eq!(
            record("svg|rect *|a |b [xml|lang] *").unwrap(),
            "init selector type(svg|rect) _ type(*|a) _ type(|b) _ universal() \
             attr(xml|lang) _ universal() close"
        );
    }

    #[test]
    fn attribute_operators_and_whitespace() {
        assert_eq!(
            record("[ lang |= en ][a!='b'][c%=\"^x\"][d]").unwrap(),
            "init selector universal() attr(lang|=en) attr(a!=b) attr(c%=^x) attr(d) close"
        );
    }

    #[test]
    fn pseudo_classes() {
        assert_eq!(
            record("li:first-child:last:select-parent:nth-child(2):nth-last-child(+1):eq(-1)")
                .unwrap(),
            "init selector type(li) first-child last select-parent nth-child(1n+2) \
             nth-last-child(1n+1) eq(-1) close"
        );
    }

    #[test]
    fn nested_selectors_share_the_reader() {
        assert_eq!(
            record("div:has(p span):not(.x), b").unwrap(),
            "init selector type(div) has[init selector type(p) _ type(span) close] \
             not[init anchor selector universal() class(x) close] selector type(b) close"
        );
        assert_eq!(
            record("body:between(h1; h2)").unwrap(),
            "init selector type(body) between-start[init selector type(h1) close] \
             between-end[init selector type(h2) close] close"
        );
    }

    #[test]
    fn text_functions() {
        assert_eq!(
            record("p:contains('hi'):matches(\"a.b\")").unwrap(),
            "init selector type(p) contains(hi) matches(a.b) close"
        );
    }

    #[test]
    fn custom_selectors_read_declared_arguments() {
        let registry = Arc::new(CustomSelectorRegistry::<u8>::new());
        registry.register0("odd-index", selector::identity).unwrap();
        registry
            .register2("window", |_: i32, sub: Selector<u8>| sub)
            .unwrap();
        assert_eq!(
            record_with("p:odd-index:window(3; a b)", Arc::clone(&registry)).unwrap(),
            "init selector type(p) custom custom close"
        );
        let error = record_with("p:window", registry).unwrap_err();
        assert!(error.is_format(), "{error}");
    }

    #[test]
    fn unknown_pseudo_is_format_error() {
        let error = record("p:bogus").unwrap_err();
        assert!(error.is_format());
        assert_eq!(error.message(), "Unknown pseudo-selector 'bogus'.");
    }

    #[test]
    fn unexpected_token_names_expectation() {
        let error = record("div[class=").unwrap_err();
        assert!(error.is_format());
        assert_eq!(
            error.message(),
            "Unexpected token end of input where one of [string, identifier] was expected."
        );
        let error = record("a b,").unwrap_err();
        assert!(error.is_format(), "{error}");
        let error = record("a )").unwrap_err();
        assert_eq!(
            error.message(),
            "Unexpected token ')' where end of input was expected."
        );
    }

    #[test]
    fn linear_formulas_are_not_supported() {
        for input in [
            "li:nth-child(2n+1)",
            "li:nth-child(odd)",
            "li:nth-last-child(-n+3)",
            "li:nth-child(n)",
            "li:nth-child(n+2)",
            "li:nth-child(1n+2)",
            "li:nth-last-child(+n)",
        ] {
            let error = record(input).unwrap_err();
            assert!(error.is_not_supported(), "{input}: {error}");
        }
        assert!(record("li:nth-child(foo)").unwrap_err().is_format());
    }

    #[test]
    fn reader_pushback() {
        let mut reader = TokenReader::new(vec![Token::ident("a"), Token::eoi()]);
        let first = reader.read();
        reader.unread(first.clone());
        assert_eq!(reader.peek(), &first);
        assert_eq!(reader.read(), first);
        assert_eq!(reader.read().kind(), TokenKind::Eoi);
        assert_eq!(reader.read().kind(), TokenKind::Eoi);
    }
}
