//! Visitor protocol the parser drives while reading selector text.
//!
//! The parser never builds a syntax tree. Each production it recognizes is
//! reported straight to a [`SelectorGenerator`], which is free to compile,
//! record, or pretty-print what it sees.

use crate::error::Result;
use crate::namespace::NamespacePrefix;
use crate::registry::CustomSelectorInfo;
use crate::selector::Selector;

/// Receiver of parse events.
///
/// Nested selectors (`:has(..)`, `:not(..)`, the region operators and
/// sub-selector arguments of custom selectors) are parsed into a fresh
/// generator obtained from [`create_new`](Self::create_new) and handed back
/// to the outer generator once closed.
pub trait SelectorGenerator: Sized {
    /// Element type of the compiled selector.
    type Element;

    /// Start of a selector group.
    fn on_init(&mut self);

    /// A `,` ended the current alternative.
    fn on_selector(&mut self);

    /// End of the selector group.
    ///
    /// # Errors
    /// Implementations may reject the finished group.
    fn on_close(&mut self) -> Result<()>;

    /// Evaluate against the input itself instead of its descendants.
    fn anchor_to_root(&mut self);

    /// A fresh generator for a nested selector, sharing configuration.
    fn create_new(&self) -> Self;

    /// The selector compiled by a closed generator.
    ///
    /// # Errors
    /// Fails when the generator was not closed or compiles nothing.
    fn compiled(&self) -> Result<Selector<Self::Element>>;

    /// Custom selector registered under `name`.
    fn custom_selector_info(&self, name: &str) -> Option<CustomSelectorInfo<Self::Element>>;

    /// A custom selector with its arguments applied.
    fn custom_selector(&mut self, selector: Selector<Self::Element>);

    fn type_selector(&mut self, prefix: &NamespacePrefix, name: &str);
    fn universal(&mut self, prefix: &NamespacePrefix);
    fn id(&mut self, id: &str);
    fn class(&mut self, class: &str);

    fn attribute_exists(&mut self, prefix: &NamespacePrefix, name: &str);
    fn attribute_exact(&mut self, prefix: &NamespacePrefix, name: &str, value: &str);
    fn attribute_not_equal(&mut self, prefix: &NamespacePrefix, name: &str, value: &str);
    fn attribute_includes(&mut self, prefix: &NamespacePrefix, name: &str, value: &str);
    fn attribute_dash_match(&mut self, prefix: &NamespacePrefix, name: &str, value: &str);
    fn attribute_prefix_match(&mut self, prefix: &NamespacePrefix, name: &str, value: &str);
    fn attribute_suffix_match(&mut self, prefix: &NamespacePrefix, name: &str, value: &str);
    fn attribute_substring(&mut self, prefix: &NamespacePrefix, name: &str, value: &str);

    /// # Errors
    /// Fails when `pattern` is not a valid regular expression.
    fn attribute_regex_match(
        &mut self,
        prefix: &NamespacePrefix,
        name: &str,
        pattern: &str,
    ) -> Result<()>;

    fn first_child(&mut self);
    fn last_child(&mut self);
    fn only_child(&mut self);
    fn empty(&mut self);
    fn last(&mut self);
    fn select_parent(&mut self);

    /// # Errors
    /// Fails for formulas the generator cannot evaluate.
    fn nth_child(&mut self, step: i32, offset: i32) -> Result<()>;

    /// # Errors
    /// Fails for formulas the generator cannot evaluate.
    fn nth_last_child(&mut self, step: i32, offset: i32) -> Result<()>;

    fn eq(&mut self, index: i32);

    fn child(&mut self);
    fn descendant(&mut self);
    fn adjacent(&mut self);
    fn general_sibling(&mut self);

    /// # Errors
    /// Fails when `sub` did not compile.
    fn has(&mut self, sub: Self) -> Result<()>;

    /// # Errors
    /// Fails when `sub` did not compile.
    fn not(&mut self, sub: Self) -> Result<()>;

    /// # Errors
    /// Fails when `splitter` did not compile.
    fn split_after(&mut self, splitter: Self) -> Result<()>;

    /// # Errors
    /// Fails when `splitter` did not compile.
    fn split_before(&mut self, splitter: Self) -> Result<()>;

    /// # Errors
    /// Fails when `splitter` did not compile.
    fn split_between(&mut self, splitter: Self) -> Result<()>;

    /// # Errors
    /// Fails when `splitter` did not compile.
    fn split_all(&mut self, splitter: Self) -> Result<()>;

    /// # Errors
    /// Fails when `limit` did not compile.
    fn before(&mut self, limit: Self) -> Result<()>;

    /// # Errors
    /// Fails when `limit` did not compile.
    fn after(&mut self, limit: Self) -> Result<()>;

    /// # Errors
    /// Fails when either limit did not compile.
    fn between(&mut self, start: Self, end: Self) -> Result<()>;

    fn contains(&mut self, text: &str);

    /// # Errors
    /// Fails when `pattern` is not a valid regular expression.
    fn matches(&mut self, pattern: &str) -> Result<()>;
}
