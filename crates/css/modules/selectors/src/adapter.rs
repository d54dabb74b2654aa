//! Tree access a host document provides to the built-in operations.

use core::fmt::Debug;
use core::hash::Hash;
use core::iter;

/// Kind of a host node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Document,
    Element,
    Text,
    Comment,
    /// Anything else the host models, such as doctypes.
    Other,
}

/// An adapter that abstracts DOM access for selector evaluation.
/// Implement this for your DOM layer.
///
/// Only navigation and raw data are required; class lookup and text
/// flattening have default implementations built on top of them.
pub trait ElementAdapter: Send + Sync + 'static {
    /// Stable, cheap node identity.
    type Handle: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    fn node_type(&self, node: Self::Handle) -> NodeType;

    fn parent(&self, node: Self::Handle) -> Option<Self::Handle>;

    fn first_child(&self, node: Self::Handle) -> Option<Self::Handle>;

    fn next_sibling(&self, node: Self::Handle) -> Option<Self::Handle>;

    fn previous_sibling(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// Tag name of an element; compared ASCII case-insensitively.
    fn tag_name(&self, node: Self::Handle) -> Option<&str>;

    /// Attribute value if present. `name` arrives lowercased.
    fn attr(&self, node: Self::Handle, name: &str) -> Option<&str>;

    /// Character data of a text node.
    fn text(&self, node: Self::Handle) -> Option<&str>;

    /// Children of `node`, in order, including non-element nodes.
    fn children(&self, node: Self::Handle) -> impl Iterator<Item = Self::Handle> + '_ {
        iter::successors(self.first_child(node), move |child| self.next_sibling(*child))
    }

    /// Elements and the document itself take part in structural matching.
    #[inline]
    fn is_element(&self, node: Self::Handle) -> bool {
        matches!(
            self.node_type(node),
            NodeType::Element | NodeType::Document
        )
    }

    /// True if the `class` attribute lists `class` as a word.
    fn has_class(&self, node: Self::Handle, class: &str) -> bool {
        self.attr(node, "class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|word| word == class))
    }

    /// Concatenated text of every text node below `node`.
    fn inner_text(&self, node: Self::Handle) -> String {
        let mut text = String::new();
        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            if let Some(data) = self.text(current) {
                text.push_str(data);
            }
            let children: Vec<_> = self.children(current).collect();
            pending.extend(children.into_iter().rev());
        }
        text
    }
}
