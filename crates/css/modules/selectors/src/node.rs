//! Element type flowing through selectors built on an [`ElementAdapter`].
//!
//! Region operators do not create nodes. They yield a [`NodeGroup`]: a view
//! over a contiguous run of a parent's children. A group behaves like an
//! element named `node-group` whose children are the nodes in its range; it
//! has no parent and no siblings.

use crate::adapter::ElementAdapter;
use core::iter;

/// Tag name reported for region groups.
pub const GROUP_TAG: &str = "node-group";

/// Attribute of a region group naming the side its limit lies on.
pub const GROUP_DIRECTION_ATTR: &str = "group-direction";

/// Side of a region group facing the node that delimited it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupDirection {
    Left,
    Right,
}

impl GroupDirection {
    /// Value of the `group-direction` attribute.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Children `start..end` of `parent`, counting every child node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeGroup<H> {
    pub parent: H,
    pub start: usize,
    pub end: usize,
    pub direction: Option<GroupDirection>,
}

impl<H> NodeGroup<H> {
    /// Number of child nodes in the group.
    #[inline]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A host node or a region group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef<H> {
    Node(H),
    Group(NodeGroup<H>),
}

impl<H: Copy> NodeRef<H> {
    /// The host handle, unless this is a group.
    #[inline]
    pub const fn handle(&self) -> Option<H> {
        match self {
            Self::Node(handle) => Some(*handle),
            Self::Group(_) => None,
        }
    }

    #[inline]
    pub const fn group(&self) -> Option<&NodeGroup<H>> {
        match self {
            Self::Node(_) => None,
            Self::Group(group) => Some(group),
        }
    }
}

impl<H> From<H> for NodeRef<H> {
    #[inline]
    fn from(handle: H) -> Self {
        Self::Node(handle)
    }
}

/// Navigation over [`NodeRef`]s, treating groups as detached elements.
pub(crate) struct TreeView<'tree, A: ElementAdapter> {
    adapter: &'tree A,
}

impl<'tree, A: ElementAdapter> TreeView<'tree, A> {
    #[inline]
    pub(crate) const fn new(adapter: &'tree A) -> Self {
        Self { adapter }
    }

    #[inline]
    pub(crate) fn is_element(&self, node: NodeRef<A::Handle>) -> bool {
        match node {
            NodeRef::Node(handle) => self.adapter.is_element(handle),
            NodeRef::Group(_) => true,
        }
    }

    pub(crate) fn tag_name(&self, node: NodeRef<A::Handle>) -> Option<&'tree str> {
        match node {
            NodeRef::Node(handle) => self.adapter.tag_name(handle),
            NodeRef::Group(_) => Some(GROUP_TAG),
        }
    }

    pub(crate) fn attr(&self, node: NodeRef<A::Handle>, name: &str) -> Option<&'tree str> {
        match node {
            NodeRef::Node(handle) => self.adapter.attr(handle, name),
            NodeRef::Group(group) => group
                .direction
                .filter(|_| name == GROUP_DIRECTION_ATTR)
                .map(GroupDirection::as_str),
        }
    }

    pub(crate) fn has_class(&self, node: NodeRef<A::Handle>, class: &str) -> bool {
        node.handle()
            .is_some_and(|handle| self.adapter.has_class(handle, class))
    }

    pub(crate) fn parent(&self, node: NodeRef<A::Handle>) -> Option<NodeRef<A::Handle>> {
        node.handle()
            .and_then(|handle| self.adapter.parent(handle))
            .map(NodeRef::Node)
    }

    /// Every child node, elements or not.
    pub(crate) fn child_nodes(&self, node: NodeRef<A::Handle>) -> Vec<NodeRef<A::Handle>> {
        match node {
            NodeRef::Node(handle) => self.adapter.children(handle).map(NodeRef::Node).collect(),
            NodeRef::Group(group) => self
                .adapter
                .children(group.parent)
                .skip(group.start)
                .take(group.len())
                .map(NodeRef::Node)
                .collect(),
        }
    }

    pub(crate) fn element_children(&self, node: NodeRef<A::Handle>) -> Vec<NodeRef<A::Handle>> {
        self.child_nodes(node)
            .into_iter()
            .filter(|child| self.is_element(*child))
            .collect()
    }

    /// Element descendants in document order.
    pub(crate) fn descendants(&self, node: NodeRef<A::Handle>) -> Vec<NodeRef<A::Handle>> {
        let mut found = Vec::new();
        let mut pending: Vec<_> = self.child_nodes(node).into_iter().rev().collect();
        while let Some(current) = pending.pop() {
            if self.is_element(current) {
                found.push(current);
            }
            pending.extend(self.child_nodes(current).into_iter().rev());
        }
        found
    }

    /// Element siblings after `node`, nearest first.
    pub(crate) fn following_elements(
        &self,
        node: NodeRef<A::Handle>,
    ) -> impl Iterator<Item = NodeRef<A::Handle>> + 'tree {
        let adapter = self.adapter;
        iter::successors(node.handle(), move |handle| adapter.next_sibling(*handle))
            .skip(1)
            .filter(move |handle| adapter.is_element(*handle))
            .map(NodeRef::Node)
    }

    /// Element siblings before `node`, nearest first.
    pub(crate) fn preceding_elements(
        &self,
        node: NodeRef<A::Handle>,
    ) -> impl Iterator<Item = NodeRef<A::Handle>> + 'tree {
        let adapter = self.adapter;
        iter::successors(node.handle(), move |handle| adapter.previous_sibling(*handle))
            .skip(1)
            .filter(move |handle| adapter.is_element(*handle))
            .map(NodeRef::Node)
    }

    /// Flattened text of `node` and everything below it.
    pub(crate) fn inner_text(&self, node: NodeRef<A::Handle>) -> String {
        match node {
            NodeRef::Node(handle) => self.adapter.inner_text(handle),
            NodeRef::Group(_) => self
                .child_nodes(node)
                .into_iter()
                .filter_map(|child| child.handle())
                .map(|child| self.adapter.inner_text(child))
                .collect(),
        }
    }
}
