//! Compiler turning parse events into one composed [`Selector`].
//!
//! Each production becomes a stage obtained from the host's
//! [`ElementOperations`] and is chained after the stages before it. A `,`
//! closes the current alternative. Closing the group concatenates the
//! results of every alternative and removes duplicates, keeping the first
//! occurrence of each element.

use crate::error::{Result, SelectorError};
use crate::generator::SelectorGenerator;
use crate::memo::{StageKey, StageMemo};
use crate::namespace::NamespacePrefix;
use crate::operations::ElementOperations;
use crate::registry::{CustomSelectorInfo, CustomSelectorRegistry};
use crate::selector::{self, Selector};
use core::fmt;
use core::hash::Hash;
use core::mem;
use log::debug;
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Compiling [`SelectorGenerator`] over the element type `E`.
///
/// ```no_run
/// # use css_selectors::{Generator, ElementOperations, Selector, Result};
/// # use std::sync::Arc;
/// # fn demo<E, O>(ops: Arc<O>, input: &[E]) -> Result<Vec<E>>
/// # where
/// #     E: Clone + Eq + core::hash::Hash + Send + Sync + 'static,
/// #     O: ElementOperations<E> + Send + Sync + 'static,
/// # {
/// let selector: Selector<E> = css_selectors::compile("ul > li.active", Generator::new(ops))?
///     .selector()?;
/// selector(input)
/// # }
/// ```
pub struct Generator<E, O> {
    ops: Arc<O>,
    registry: Arc<CustomSelectorRegistry<E>>,
    memo: Option<Arc<StageMemo<E>>>,
    /// Finished alternatives of the current group.
    alternatives: Vec<Selector<E>>,
    /// Stages of the alternative being built.
    current: Option<Selector<E>>,
    anchor_to_root: bool,
    /// Set once the group is closed.
    compiled: Option<Selector<E>>,
}

impl<E, O> fmt::Debug for Generator<E, O> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Generator")
            .field("alternatives", &self.alternatives.len())
            .field("building", &self.current.is_some())
            .field("anchor_to_root", &self.anchor_to_root)
            .field("compiled", &self.compiled.is_some())
            .field("memoized", &self.memo.is_some())
            .finish_non_exhaustive()
    }
}

impl<E, O> Generator<E, O>
where
    E: Clone + Eq + Hash + Send + Sync + 'static,
    O: ElementOperations<E> + Send + Sync + 'static,
{
    /// Compile against `ops`, resolving custom selectors in the global
    /// registry for `E`.
    pub fn new(ops: Arc<O>) -> Self {
        Self {
            ops,
            registry: CustomSelectorRegistry::global(),
            memo: None,
            alternatives: Vec::new(),
            current: None,
            anchor_to_root: false,
            compiled: None,
        }
    }

    /// Resolve custom selectors in `registry` instead of the global one.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<CustomSelectorRegistry<E>>) -> Self {
        self.registry = registry;
        self
    }

    /// Share memoized stage results through `memo`.
    #[must_use]
    pub fn with_stage_memo(mut self, memo: Arc<StageMemo<E>>) -> Self {
        self.memo = Some(memo);
        self
    }

    #[inline]
    pub const fn ops(&self) -> &Arc<O> {
        &self.ops
    }

    #[inline]
    pub const fn registry(&self) -> &Arc<CustomSelectorRegistry<E>> {
        &self.registry
    }

    /// The compiled selector.
    ///
    /// # Errors
    /// [`SelectorError::Argument`] if the generator has not been closed.
    pub fn selector(&self) -> Result<Selector<E>> {
        self.compiled.clone().ok_or_else(|| {
            SelectorError::argument("the selector group has not been compiled yet")
        })
    }

    /// Consume the generator, returning the compiled selector.
    ///
    /// # Errors
    /// [`SelectorError::Argument`] if the generator has not been closed.
    pub fn into_selector(self) -> Result<Selector<E>> {
        self.selector()
    }

    /// The alternatives collected so far, including the one being built.
    pub fn selectors(&self) -> Vec<Selector<E>> {
        self.alternatives
            .iter()
            .chain(self.current.as_ref())
            .cloned()
            .collect()
    }

    /// Chain `stage` after the current alternative.
    fn add(&mut self, stage: Selector<E>) {
        self.current = Some(match self.current.take() {
            Some(previous) => selector::chain(previous, stage),
            None => stage,
        });
    }

    /// Chain `stage`, memoized under `key` when a memo is configured.
    fn add_keyed(&mut self, stage: Selector<E>, key: impl FnOnce() -> StageKey) {
        let stage = match &self.memo {
            Some(memo) => {
                let key = key();
                match memo.memoize(key.clone(), Arc::clone(&stage)) {
                    Ok(memoized) => memoized,
                    Err(error) => {
                        debug!("stage {key} left unmemoized: {error}");
                        stage
                    }
                }
            }
            None => stage,
        };
        self.add(stage);
    }
}

impl<E, O> SelectorGenerator for Generator<E, O>
where
    E: Clone + Eq + Hash + Send + Sync + 'static,
    O: ElementOperations<E> + Send + Sync + 'static,
{
    type Element = E;

    fn on_init(&mut self) {
        self.alternatives.clear();
        self.current = None;
        self.anchor_to_root = false;
        self.compiled = None;
    }

    fn on_selector(&mut self) {
        if let Some(current) = self.current.take() {
            self.alternatives.push(current);
        }
    }

    fn on_close(&mut self) -> Result<()> {
        let mut alternatives = mem::take(&mut self.alternatives);
        alternatives.extend(self.current.take());
        let normalize = (!self.anchor_to_root).then(|| self.ops.descendant());
        debug!(
            "closing selector group with {} alternative(s), anchored: {}",
            alternatives.len(),
            self.anchor_to_root
        );

        self.compiled = Some(selector::from_fn(move |elements: &[E]| {
            let expanded;
            let input = match &normalize {
                Some(descendants) => {
                    expanded = descendants(elements)?;
                    expanded.as_slice()
                }
                None => elements,
            };
            let mut seen = FxHashSet::default();
            let mut output = Vec::new();
            for alternative in &alternatives {
                for element in alternative(input)? {
                    if seen.insert(element.clone()) {
                        output.push(element);
                    }
                }
            }
            Ok(output)
        }));
        Ok(())
    }

    fn anchor_to_root(&mut self) {
        self.anchor_to_root = true;
    }

    fn create_new(&self) -> Self {
        Self {
            ops: Arc::clone(&self.ops),
            registry: Arc::clone(&self.registry),
            memo: self.memo.clone(),
            alternatives: Vec::new(),
            current: None,
            anchor_to_root: false,
            compiled: None,
        }
    }

    fn compiled(&self) -> Result<Selector<E>> {
        self.selector()
    }

    fn custom_selector_info(&self, name: &str) -> Option<CustomSelectorInfo<E>> {
        self.registry.get(name)
    }

    fn custom_selector(&mut self, selector: Selector<E>) {
        self.add(selector);
    }

    fn type_selector(&mut self, prefix: &NamespacePrefix, name: &str) {
        let stage = self.ops.type_selector(prefix, name);
        self.add_keyed(stage, || StageKey::new("Type").with_prefix(prefix).with(name));
    }

    fn universal(&mut self, prefix: &NamespacePrefix) {
        let stage = self.ops.universal(prefix);
        self.add_keyed(stage, || StageKey::new("Universal").with_prefix(prefix));
    }

    fn id(&mut self, id: &str) {
        let stage = self.ops.id(id);
        self.add_keyed(stage, || StageKey::new("Id").with(id));
    }

    fn class(&mut self, class: &str) {
        let stage = self.ops.class(class);
        self.add_keyed(stage, || StageKey::new("Class").with(class));
    }

    fn attribute_exists(&mut self, prefix: &NamespacePrefix, name: &str) {
        let stage = self.ops.attribute_exists(prefix, name);
        self.add_keyed(stage, || StageKey::new("AttributeExists").with_prefix(prefix).with(name));
    }

    fn attribute_exact(&mut self, prefix: &NamespacePrefix, name: &str, value: &str) {
        let stage = self.ops.attribute_exact(prefix, name, value);
        self.add_keyed(stage, || {
            StageKey::new("AttributeExact")
                .with_prefix(prefix)
                .with(name)
                .with(value)
        });
    }

    fn attribute_not_equal(&mut self, prefix: &NamespacePrefix, name: &str, value: &str) {
        let stage = self.ops.attribute_not_equal(prefix, name, value);
        self.add_keyed(stage, || {
            StageKey::new("AttributeNotEqual")
                .with_prefix(prefix)
                .with(name)
                .with(value)
        });
    }

    fn attribute_includes(&mut self, prefix: &NamespacePrefix, name: &str, value: &str) {
        let stage = self.ops.attribute_includes(prefix, name, value);
        self.add_keyed(stage, || {
            StageKey::new("AttributeIncludes")
                .with_prefix(prefix)
                .with(name)
                .with(value)
        });
    }

    fn attribute_dash_match(&mut self, prefix: &NamespacePrefix, name: &str, value: &str) {
        let stage = self.ops.attribute_dash_match(prefix, name, value);
        self.add_keyed(stage, || {
            StageKey::new("AttributeDashMatch")
                .with_prefix(prefix)
                .with(name)
                .with(value)
        });
    }

    fn attribute_prefix_match(&mut self, prefix: &NamespacePrefix, name: &str, value: &str) {
        let stage = self.ops.attribute_prefix_match(prefix, name, value);
        self.add_keyed(stage, || {
            StageKey::new("AttributePrefixMatch")
                .with_prefix(prefix)
                .with(name)
                .with(value)
        });
    }

    fn attribute_suffix_match(&mut self, prefix: &NamespacePrefix, name: &str, value: &str) {
        let stage = self.ops.attribute_suffix_match(prefix, name, value);
        self.add_keyed(stage, || {
            StageKey::new("AttributeSuffixMatch")
                .with_prefix(prefix)
                .with(name)
                .with(value)
        });
    }

    fn attribute_substring(&mut self, prefix: &NamespacePrefix, name: &str, value: &str) {
        let stage = self.ops.attribute_substring(prefix, name, value);
        self.add_keyed(stage, || {
            StageKey::new("AttributeSubstring")
                .with_prefix(prefix)
                .with(name)
                .with(value)
        });
    }

    fn attribute_regex_match(
        &mut self,
        prefix: &NamespacePrefix,
        name: &str,
        pattern: &str,
    ) -> Result<()> {
        let stage = self.ops.attribute_regex_match(prefix, name, pattern)?;
        self.add_keyed(stage, || {
            StageKey::new("AttributeRegexMatch")
                .with_prefix(prefix)
                .with(name)
                .with(pattern)
        });
        Ok(())
    }

    fn first_child(&mut self) {
        let stage = self.ops.first_child();
        self.add_keyed(stage, || StageKey::new("FirstChild"));
    }

    fn last_child(&mut self) {
        let stage = self.ops.last_child();
        self.add_keyed(stage, || StageKey::new("LastChild"));
    }

    fn only_child(&mut self) {
        let stage = self.ops.only_child();
        self.add_keyed(stage, || StageKey::new("OnlyChild"));
    }

    fn empty(&mut self) {
        let stage = self.ops.empty();
        self.add_keyed(stage, || StageKey::new("Empty"));
    }

    fn last(&mut self) {
        let stage = self.ops.last();
        self.add_keyed(stage, || StageKey::new("Last"));
    }

    fn select_parent(&mut self) {
        let stage = self.ops.select_parent();
        self.add_keyed(stage, || StageKey::new("SelectParent"));
    }

    fn nth_child(&mut self, step: i32, offset: i32) -> Result<()> {
        let stage = self.ops.nth_child(step, offset)?;
        self.add_keyed(stage, || StageKey::new("NthChild").with(step).with(offset));
        Ok(())
    }

    fn nth_last_child(&mut self, step: i32, offset: i32) -> Result<()> {
        let stage = self.ops.nth_last_child(step, offset)?;
        self.add_keyed(stage, || StageKey::new("NthLastChild").with(step).with(offset));
        Ok(())
    }

    fn eq(&mut self, index: i32) {
        let stage = self.ops.eq(index);
        self.add_keyed(stage, || StageKey::new("Eq").with(index));
    }

    fn child(&mut self) {
        let stage = self.ops.child();
        self.add_keyed(stage, || StageKey::new("Child"));
    }

    fn descendant(&mut self) {
        let stage = self.ops.descendant();
        self.add_keyed(stage, || StageKey::new("Descendant"));
    }

    fn adjacent(&mut self) {
        let stage = self.ops.adjacent();
        self.add_keyed(stage, || StageKey::new("Adjacent"));
    }

    fn general_sibling(&mut self) {
        let stage = self.ops.general_sibling();
        self.add_keyed(stage, || StageKey::new("GeneralSibling"));
    }

    fn has(&mut self, sub: Self) -> Result<()> {
        let stage = self.ops.has(sub.selector()?);
        self.add(stage);
        Ok(())
    }

    fn not(&mut self, sub: Self) -> Result<()> {
        let stage = self.ops.not(sub.selector()?);
        self.add(stage);
        Ok(())
    }

    fn split_after(&mut self, splitter: Self) -> Result<()> {
        let stage = self.ops.split_after(splitter.selector()?);
        self.add(stage);
        Ok(())
    }

    fn split_before(&mut self, splitter: Self) -> Result<()> {
        let stage = self.ops.split_before(splitter.selector()?);
        self.add(stage);
        Ok(())
    }

    fn split_between(&mut self, splitter: Self) -> Result<()> {
        let stage = self.ops.split_between(splitter.selector()?);
        self.add(stage);
        Ok(())
    }

    fn split_all(&mut self, splitter: Self) -> Result<()> {
        let stage = self.ops.split_all(splitter.selector()?);
        self.add(stage);
        Ok(())
    }

    fn before(&mut self, limit: Self) -> Result<()> {
        let stage = self.ops.before(limit.selector()?);
        self.add(stage);
        Ok(())
    }

    fn after(&mut self, limit: Self) -> Result<()> {
        let stage = self.ops.after(limit.selector()?);
        self.add(stage);
        Ok(())
    }

    fn between(&mut self, start: Self, end: Self) -> Result<()> {
        let stage = self.ops.between(start.selector()?, end.selector()?);
        self.add(stage);
        Ok(())
    }

    fn contains(&mut self, text: &str) {
        let stage = self.ops.contains(text);
        self.add_keyed(stage, || StageKey::new("Contains").with(text));
    }

    fn matches(&mut self, pattern: &str) -> Result<()> {
        let stage = self.ops.matches(pattern)?;
        self.add_keyed(stage, || StageKey::new("Matches").with(pattern));
        Ok(())
    }
}
