//! Built-in [`ElementOperations`] for any [`ElementAdapter`] host.

use crate::adapter::ElementAdapter;
use crate::error::{Result, SelectorError};
use crate::namespace::NamespacePrefix;
use crate::node::{GroupDirection, NodeGroup, NodeRef, TreeView};
use crate::operations::ElementOperations;
use crate::regions::{self, SplitMode};
use crate::selector::{self, Selector};
use core::fmt;
use core::hash::Hash;
use core::ops::Range;
use log::debug;
use regex::{Regex, RegexBuilder};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// Element type produced by [`NodeOps`] over adapter `A`.
pub type Node<A> = NodeRef<<A as ElementAdapter>::Handle>;

/// Selector stages evaluated against a shared host tree.
pub struct NodeOps<A> {
    adapter: Arc<A>,
}

impl<A> fmt::Debug for NodeOps<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("NodeOps").finish_non_exhaustive()
    }
}

impl<A> Clone for NodeOps<A> {
    fn clone(&self) -> Self {
        Self {
            adapter: Arc::clone(&self.adapter),
        }
    }
}

const SPLITTER_NOT_CHILD: &str = "The node splitter must be a direct child of the context node.";
const LIMIT_NOT_CHILD: &str = "The limit node must be a direct child of the context node.";

/// Child positions of one parent, for locating splitters and limits.
struct ChildIndex<H> {
    positions: FxHashMap<NodeRef<H>, usize>,
    len: usize,
}

impl<H: Copy + Eq + Hash> ChildIndex<H> {
    fn new(children: &[NodeRef<H>]) -> Self {
        Self {
            positions: children
                .iter()
                .enumerate()
                .map(|(position, child)| (*child, position))
                .collect(),
            len: children.len(),
        }
    }

    fn locate(&self, node: &NodeRef<H>, message: &str) -> Result<usize> {
        self.positions
            .get(node)
            .copied()
            .ok_or_else(|| SelectorError::format(message))
    }

    /// Position of the first `matched` node at or after `from`.
    fn first_from(&self, matched: &[NodeRef<H>], from: usize) -> Result<Option<usize>> {
        for node in matched {
            let position = self.locate(node, LIMIT_NOT_CHILD)?;
            if position >= from {
                return Ok(Some(position));
            }
        }
        Ok(None)
    }
}

/// Group over `run` of `parent`'s children. Runs inside a group are rebased
/// onto the group's own parent.
fn group_of<H: Copy>(
    parent: NodeRef<H>,
    run: Range<usize>,
    direction: Option<GroupDirection>,
) -> NodeRef<H> {
    let (handle, base) = match parent {
        NodeRef::Node(handle) => (handle, 0),
        NodeRef::Group(outer) => (outer.parent, outer.start),
    };
    NodeRef::Group(NodeGroup {
        parent: handle,
        start: base.saturating_add(run.start),
        end: base.saturating_add(run.end),
        direction,
    })
}

fn build_regex(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .multi_line(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|error| {
            SelectorError::format(format!("Invalid regular expression {pattern:?}: {error}"))
        })
}

fn unsupported_formula(function: &str) -> SelectorError {
    SelectorError::not_supported(format!(
        "The {function}(an+b) selector where a is not 1 is not supported."
    ))
}

impl<A: ElementAdapter> NodeOps<A> {
    pub const fn new(adapter: Arc<A>) -> Self {
        Self { adapter }
    }

    #[inline]
    pub const fn adapter(&self) -> &Arc<A> {
        &self.adapter
    }

    /// Stage keeping the nodes satisfying `predicate`.
    fn keep<P>(&self, predicate: P) -> Selector<Node<A>>
    where
        P: Fn(&TreeView<'_, A>, Node<A>) -> bool + Send + Sync + 'static,
    {
        let adapter = Arc::clone(&self.adapter);
        selector::filter(move |node: &Node<A>| predicate(&TreeView::new(&*adapter), *node))
    }

    /// Stage replacing each node with what `expand` yields for it.
    fn expand<F>(&self, expand: F) -> Selector<Node<A>>
    where
        F: Fn(&TreeView<'_, A>, Node<A>) -> Vec<Node<A>> + Send + Sync + 'static,
    {
        let adapter = Arc::clone(&self.adapter);
        selector::from_fn(move |nodes: &[Node<A>]| {
            let view = TreeView::new(&*adapter);
            Ok(nodes.iter().flat_map(|node| expand(&view, *node)).collect())
        })
    }

    /// Stage keeping elements whose attribute `name` passes `test`.
    fn attribute<T>(&self, prefix: &NamespacePrefix, name: &str, test: T) -> Selector<Node<A>>
    where
        T: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let qualified = prefix.qualify(name);
        self.keep(move |view, node| {
            view.is_element(node) && view.attr(node, &qualified).is_some_and(&test)
        })
    }

    /// Stage keeping elements at a one-based position among element siblings,
    /// counted from whichever end `siblings` walks towards.
    fn nth<S>(&self, offset: i32, siblings: S) -> Selector<Node<A>>
    where
        S: for<'tree> Fn(&TreeView<'tree, A>, Node<A>) -> usize + Send + Sync + 'static,
    {
        let Some(preceding) = usize::try_from(offset)
            .ok()
            .and_then(|position| position.checked_sub(1))
        else {
            return selector::nothing();
        };
        self.keep(move |view, node| {
            view.is_element(node) && view.parent(node).is_some() && siblings(view, node) == preceding
        })
    }

    /// Stage yielding the `mode` runs of every input node.
    fn split(&self, splitter: Selector<Node<A>>, mode: SplitMode) -> Selector<Node<A>> {
        let adapter = Arc::clone(&self.adapter);
        selector::from_fn(move |nodes: &[Node<A>]| {
            let view = TreeView::new(&*adapter);
            let mut groups = Vec::new();
            for &parent in nodes {
                let children = view.child_nodes(parent);
                let index = ChildIndex::new(&children);
                let mut positions = splitter(&[parent])?
                    .iter()
                    .map(|node| index.locate(node, SPLITTER_NOT_CHILD))
                    .collect::<Result<Vec<usize>>>()?;
                positions.sort_unstable();
                positions.dedup();

                if positions.is_empty() {
                    if mode.keeps_unsplit() {
                        groups.push(parent);
                    }
                    continue;
                }
                groups.extend(
                    regions::split_runs(mode, &positions, index.len)
                        .into_iter()
                        .map(|run| group_of(parent, run, mode.direction())),
                );
            }
            debug!("{} produced {} groups", mode.name(), groups.len());
            Ok(groups)
        })
    }

    /// Stage yielding, per input node, the group `locate` picks out.
    fn region<F>(&self, direction: Option<GroupDirection>, locate: F) -> Selector<Node<A>>
    where
        F: Fn(Node<A>, &ChildIndex<A::Handle>) -> Result<Option<Range<usize>>>
            + Send
            + Sync
            + 'static,
    {
        let adapter = Arc::clone(&self.adapter);
        selector::from_fn(move |nodes: &[Node<A>]| {
            let view = TreeView::new(&*adapter);
            let mut groups = Vec::new();
            for &parent in nodes {
                let index = ChildIndex::new(&view.child_nodes(parent));
                if let Some(run) = locate(parent, &index)? {
                    groups.push(group_of(parent, run, direction));
                }
            }
            Ok(groups)
        })
    }
}

impl<A: ElementAdapter> ElementOperations<Node<A>> for NodeOps<A> {
    fn type_selector(&self, prefix: &NamespacePrefix, name: &str) -> Selector<Node<A>> {
        let qualified = prefix.qualify(name);
        self.keep(move |view, node| {
            view.is_element(node)
                && view
                    .tag_name(node)
                    .is_some_and(|tag| tag.eq_ignore_ascii_case(&qualified))
        })
    }

    fn universal(&self, prefix: &NamespacePrefix) -> Selector<Node<A>> {
        if prefix.is_specific() {
            return selector::nothing();
        }
        self.keep(|view, node| view.is_element(node))
    }

    fn id(&self, id: &str) -> Selector<Node<A>> {
        let adapter = Arc::clone(&self.adapter);
        let id = id.to_owned();
        selector::from_fn(move |nodes: &[Node<A>]| {
            let view = TreeView::new(&*adapter);
            Ok(nodes
                .iter()
                .find(|node| view.is_element(**node) && view.attr(**node, "id") == Some(id.as_str()))
                .into_iter()
                .copied()
                .collect())
        })
    }

    fn class(&self, class: &str) -> Selector<Node<A>> {
        let class = class.to_owned();
        self.keep(move |view, node| view.is_element(node) && view.has_class(node, &class))
    }

    fn attribute_exists(&self, prefix: &NamespacePrefix, name: &str) -> Selector<Node<A>> {
        self.attribute(prefix, name, |_| true)
    }

    fn attribute_exact(&self, prefix: &NamespacePrefix, name: &str, value: &str) -> Selector<Node<A>> {
        let value = value.to_owned();
        self.attribute(prefix, name, move |actual| actual == value)
    }

    fn attribute_not_equal(
        &self,
        prefix: &NamespacePrefix,
        name: &str,
        value: &str,
    ) -> Selector<Node<A>> {
        let qualified = prefix.qualify(name);
        let value = value.to_owned();
        self.keep(move |view, node| {
            view.is_element(node) && view.attr(node, &qualified) != Some(value.as_str())
        })
    }

    fn attribute_includes(
        &self,
        prefix: &NamespacePrefix,
        name: &str,
        value: &str,
    ) -> Selector<Node<A>> {
        if value.is_empty() || value.contains(char::is_whitespace) {
            return selector::nothing();
        }
        let value = value.to_owned();
        self.attribute(prefix, name, move |actual| {
            actual.split_ascii_whitespace().any(|word| word == value)
        })
    }

    fn attribute_dash_match(
        &self,
        prefix: &NamespacePrefix,
        name: &str,
        value: &str,
    ) -> Selector<Node<A>> {
        if value.is_empty() {
            return selector::nothing();
        }
        let value = value.to_owned();
        self.attribute(prefix, name, move |actual| {
            actual.split('-').any(|part| part == value)
        })
    }

    fn attribute_prefix_match(
        &self,
        prefix: &NamespacePrefix,
        name: &str,
        value: &str,
    ) -> Selector<Node<A>> {
        if value.is_empty() {
            return selector::nothing();
        }
        let value = value.to_owned();
        self.attribute(prefix, name, move |actual| actual.starts_with(&value))
    }

    fn attribute_suffix_match(
        &self,
        prefix: &NamespacePrefix,
        name: &str,
        value: &str,
    ) -> Selector<Node<A>> {
        if value.is_empty() {
            return selector::nothing();
        }
        let value = value.to_owned();
        self.attribute(prefix, name, move |actual| actual.ends_with(&value))
    }

    fn attribute_substring(
        &self,
        prefix: &NamespacePrefix,
        name: &str,
        value: &str,
    ) -> Selector<Node<A>> {
        if value.is_empty() {
            return selector::nothing();
        }
        let value = value.to_owned();
        self.attribute(prefix, name, move |actual| actual.contains(&value))
    }

    fn attribute_regex_match(
        &self,
        prefix: &NamespacePrefix,
        name: &str,
        pattern: &str,
    ) -> Result<Selector<Node<A>>> {
        let regex = build_regex(pattern)?;
        Ok(self.attribute(prefix, name, move |actual| regex.is_match(actual)))
    }

    fn first_child(&self) -> Selector<Node<A>> {
        self.keep(|view, node| {
            view.is_element(node)
                && view.parent(node).is_some()
                && view.preceding_elements(node).next().is_none()
        })
    }

    fn last_child(&self) -> Selector<Node<A>> {
        self.keep(|view, node| {
            view.is_element(node)
                && view.parent(node).is_some()
                && view.following_elements(node).next().is_none()
        })
    }

    fn only_child(&self) -> Selector<Node<A>> {
        self.keep(|view, node| {
            view.is_element(node)
                && view.parent(node).is_some()
                && view.preceding_elements(node).next().is_none()
                && view.following_elements(node).next().is_none()
        })
    }

    fn empty(&self) -> Selector<Node<A>> {
        self.keep(|view, node| view.is_element(node) && view.child_nodes(node).is_empty())
    }

    fn nth_child(&self, step: i32, offset: i32) -> Result<Selector<Node<A>>> {
        if step != 1 {
            return Err(unsupported_formula("nth-child"));
        }
        Ok(self.nth(offset, |view, node| view.preceding_elements(node).count()))
    }

    fn nth_last_child(&self, step: i32, offset: i32) -> Result<Selector<Node<A>>> {
        if step != 1 {
            return Err(unsupported_formula("nth-last-child"));
        }
        Ok(self.nth(offset, |view, node| view.following_elements(node).count()))
    }

    fn eq(&self, index: i32) -> Selector<Node<A>> {
        let Ok(index) = usize::try_from(index) else {
            return selector::nothing();
        };
        selector::from_fn(move |nodes: &[Node<A>]| Ok(nodes.get(index).copied().into_iter().collect()))
    }

    fn last(&self) -> Selector<Node<A>> {
        selector::from_fn(|nodes: &[Node<A>]| Ok(nodes.last().copied().into_iter().collect()))
    }

    fn select_parent(&self) -> Selector<Node<A>> {
        self.expand(|view, node| view.parent(node).into_iter().collect())
    }

    fn child(&self) -> Selector<Node<A>> {
        self.expand(|view, node| view.element_children(node))
    }

    fn descendant(&self) -> Selector<Node<A>> {
        self.expand(|view, node| view.descendants(node))
    }

    fn adjacent(&self) -> Selector<Node<A>> {
        self.expand(|view, node| view.following_elements(node).take(1).collect())
    }

    fn general_sibling(&self) -> Selector<Node<A>> {
        self.expand(|view, node| view.following_elements(node).collect())
    }

    fn has(&self, sub: Selector<Node<A>>) -> Selector<Node<A>> {
        selector::from_fn(move |nodes: &[Node<A>]| {
            let mut kept = Vec::new();
            for &node in nodes {
                if !sub(&[node])?.is_empty() {
                    kept.push(node);
                }
            }
            Ok(kept)
        })
    }

    fn not(&self, sub: Selector<Node<A>>) -> Selector<Node<A>> {
        selector::from_fn(move |nodes: &[Node<A>]| {
            let excluded: FxHashSet<Node<A>> = sub(nodes)?.into_iter().collect();
            Ok(nodes
                .iter()
                .filter(|node| !excluded.contains(*node))
                .copied()
                .collect())
        })
    }

    fn split_after(&self, splitter: Selector<Node<A>>) -> Selector<Node<A>> {
        self.split(splitter, SplitMode::After)
    }

    fn split_before(&self, splitter: Selector<Node<A>>) -> Selector<Node<A>> {
        self.split(splitter, SplitMode::Before)
    }

    fn split_between(&self, splitter: Selector<Node<A>>) -> Selector<Node<A>> {
        self.split(splitter, SplitMode::Between)
    }

    fn split_all(&self, splitter: Selector<Node<A>>) -> Selector<Node<A>> {
        self.split(splitter, SplitMode::All)
    }

    fn before(&self, limit: Selector<Node<A>>) -> Selector<Node<A>> {
        self.region(Some(GroupDirection::Left), move |parent, index| {
            let found = index.first_from(&limit(&[parent])?, 0)?;
            Ok(found.map(regions::before_range))
        })
    }

    fn after(&self, limit: Selector<Node<A>>) -> Selector<Node<A>> {
        self.region(Some(GroupDirection::Right), move |parent, index| {
            let found = index.first_from(&limit(&[parent])?, 0)?;
            Ok(found.map(|position| regions::after_range(position, index.len)))
        })
    }

    fn between(&self, start: Selector<Node<A>>, end: Selector<Node<A>>) -> Selector<Node<A>> {
        self.region(None, move |parent, index| {
            let Some(first) = index.first_from(&start(&[parent])?, 0)? else {
                return Ok(None);
            };
            let found = index.first_from(&end(&[parent])?, first)?;
            Ok(found.map(|last| regions::between_range(first, last)))
        })
    }

    fn contains(&self, text: &str) -> Selector<Node<A>> {
        let text = text.to_owned();
        self.keep(move |view, node| view.is_element(node) && view.inner_text(node).contains(&text))
    }

    fn matches(&self, pattern: &str) -> Result<Selector<Node<A>>> {
        let regex = build_regex(pattern)?;
        Ok(self.keep(move |view, node| {
            view.is_element(node) && regex.is_match(&view.inner_text(node))
        }))
    }
}
