//! Capability contract between the compiler and a host element tree.

use crate::error::Result;
use crate::namespace::NamespacePrefix;
use crate::selector::Selector;

/// Factories producing one selector stage per grammar construct.
///
/// Every stage must be pure: it reads the input sequence and returns a new
/// one. A stage yields an empty sequence for "no match" rather than failing;
/// only the operations documented with `# Errors` may fail.
///
/// Names arrive as written. Implementations compare them ASCII
/// case-insensitively, qualified by [`NamespacePrefix::qualify`].
pub trait ElementOperations<E> {
    /// Elements with the given tag name.
    fn type_selector(&self, prefix: &NamespacePrefix, name: &str) -> Selector<E>;

    /// Every element. A specific namespace prefix matches nothing.
    fn universal(&self, prefix: &NamespacePrefix) -> Selector<E>;

    /// The first element whose `id` attribute equals `id`.
    fn id(&self, id: &str) -> Selector<E>;

    /// Elements whose `class` attribute contains `class` as a word.
    fn class(&self, class: &str) -> Selector<E>;

    /// `[name]`
    fn attribute_exists(&self, prefix: &NamespacePrefix, name: &str) -> Selector<E>;

    /// `[name=value]`
    fn attribute_exact(&self, prefix: &NamespacePrefix, name: &str, value: &str) -> Selector<E>;

    /// `[name!=value]`: attribute absent or different.
    fn attribute_not_equal(&self, prefix: &NamespacePrefix, name: &str, value: &str)
    -> Selector<E>;

    /// `[name~=value]`: `value` is one of the whitespace separated words.
    fn attribute_includes(&self, prefix: &NamespacePrefix, name: &str, value: &str) -> Selector<E>;

    /// `[name|=value]`: `value` is one of the hyphen separated parts.
    fn attribute_dash_match(&self, prefix: &NamespacePrefix, name: &str, value: &str)
    -> Selector<E>;

    /// `[name^=value]`
    fn attribute_prefix_match(
        &self,
        prefix: &NamespacePrefix,
        name: &str,
        value: &str,
    ) -> Selector<E>;

    /// `[name$=value]`
    fn attribute_suffix_match(
        &self,
        prefix: &NamespacePrefix,
        name: &str,
        value: &str,
    ) -> Selector<E>;

    /// `[name*=value]`
    fn attribute_substring(&self, prefix: &NamespacePrefix, name: &str, value: &str)
    -> Selector<E>;

    /// `[name%=pattern]`: the attribute value matches a regular expression.
    ///
    /// # Errors
    /// [`SelectorError::Format`](crate::SelectorError::Format) when `pattern`
    /// does not compile.
    fn attribute_regex_match(
        &self,
        prefix: &NamespacePrefix,
        name: &str,
        pattern: &str,
    ) -> Result<Selector<E>>;

    fn first_child(&self) -> Selector<E>;

    fn last_child(&self) -> Selector<E>;

    fn only_child(&self) -> Selector<E>;

    /// Elements without any child nodes, text included.
    fn empty(&self) -> Selector<E>;

    /// Elements that are the `offset`-th (one-based) element child of their
    /// parent. `step` is the coefficient of `n` in `an+b`.
    ///
    /// # Errors
    /// [`SelectorError::NotSupported`](crate::SelectorError::NotSupported)
    /// unless `step` is 1.
    fn nth_child(&self, step: i32, offset: i32) -> Result<Selector<E>>;

    /// Like [`nth_child`](Self::nth_child), counting from the last child.
    ///
    /// # Errors
    /// [`SelectorError::NotSupported`](crate::SelectorError::NotSupported)
    /// unless `step` is 1.
    fn nth_last_child(&self, step: i32, offset: i32) -> Result<Selector<E>>;

    /// The element at zero-based `index` of the working set.
    fn eq(&self, index: i32) -> Selector<E>;

    /// The final element of the working set.
    fn last(&self) -> Selector<E>;

    /// Parents of the working set.
    fn select_parent(&self) -> Selector<E>;

    /// Element children.
    fn child(&self) -> Selector<E>;

    /// Element descendants in document order.
    fn descendant(&self) -> Selector<E>;

    /// The next element sibling.
    fn adjacent(&self) -> Selector<E>;

    /// Every following element sibling.
    fn general_sibling(&self) -> Selector<E>;

    /// Elements for which `sub`, evaluated from the element alone, matches.
    fn has(&self, sub: Selector<E>) -> Selector<E>;

    /// The working set minus whatever `sub` yields from it.
    fn not(&self, sub: Selector<E>) -> Selector<E>;

    /// Child runs each ending at a splitter.
    fn split_after(&self, splitter: Selector<E>) -> Selector<E>;

    /// Child runs each starting at a splitter.
    fn split_before(&self, splitter: Selector<E>) -> Selector<E>;

    /// Child runs strictly between consecutive splitters.
    fn split_between(&self, splitter: Selector<E>) -> Selector<E>;

    /// Child runs between splitters, each splitter shared by both sides.
    fn split_all(&self, splitter: Selector<E>) -> Selector<E>;

    /// The children before the first match of `limit`.
    fn before(&self, limit: Selector<E>) -> Selector<E>;

    /// The children after the first match of `limit`.
    fn after(&self, limit: Selector<E>) -> Selector<E>;

    /// The children strictly between the first `start` match and the first
    /// `end` match at or after it.
    fn between(&self, start: Selector<E>, end: Selector<E>) -> Selector<E>;

    /// Elements whose flattened text contains `text`.
    fn contains(&self, text: &str) -> Selector<E>;

    /// Elements whose flattened text matches a regular expression.
    ///
    /// # Errors
    /// [`SelectorError::Format`](crate::SelectorError::Format) when `pattern`
    /// does not compile.
    fn matches(&self, pattern: &str) -> Result<Selector<E>>;
}
