//! Arena-backed document tree for evaluating compiled selectors.
//!
//! Documents are built programmatically, usually through a
//! [`DocumentBuilder`]; no markup is parsed here. [`Document`] implements
//! [`ElementAdapter`], so any selector compiled with
//! [`css_selectors::compile_for`] runs against it.
//!
//! ```
//! use selector_dom::Document;
//! use std::sync::Arc;
//!
//! let document = Arc::new(
//!     Document::builder()
//!         .element("ul")
//!         .element("li").attr("class", "done").text("write tests").close()
//!         .element("li").text("ship").close()
//!         .close()
//!         .build(),
//! );
//! let done = document.select_all("li.done")?;
//! assert_eq!(done.len(), 1);
//! # Ok::<(), css_selectors::SelectorError>(())
//! ```

#![cfg_attr(
    test,
    allow(clippy::unwrap_used, reason = "Tests unwrap known-good values")
)]

mod builder;
mod printing;

pub use builder::DocumentBuilder;

use css_selectors::{ElementAdapter, Node, NodeRef, NodeType, Result};
use indextree::{Arena, NodeId};
use log::debug;
use smallvec::SmallVec;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeKind {
    #[default]
    Document,
    Element {
        tag: String,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DOMNode {
    pub kind: NodeKind,
    /// Attributes in insertion order; names are lowercased.
    pub attrs: SmallVec<(String, String), 4>,
}

impl DOMNode {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: SmallVec::new(),
        }
    }
}

/// A document tree rooted at a `Document` node.
pub struct Document {
    dom: Arena<DOMNode>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document holding only its root.
    pub fn new() -> Self {
        let mut dom = Arena::new();
        Self {
            root: dom.new_node(DOMNode::default()),
            dom,
        }
    }

    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }

    #[inline]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&DOMNode> {
        self.dom.get(id).map(|node| node.get())
    }

    /// Number of nodes, the root included.
    pub fn len(&self) -> usize {
        self.dom.len()
    }

    /// A document always holds its root.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Append a `tag` element as the last child of `parent`.
    pub fn create_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        self.append(
            parent,
            NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
            },
        )
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append(
            parent,
            NodeKind::Text {
                text: text.to_owned(),
            },
        )
    }

    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append(
            parent,
            NodeKind::Comment {
                text: text.to_owned(),
            },
        )
    }

    fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        parent.append_value(DOMNode::with_kind(kind), &mut self.dom)
    }

    /// Set attribute `name` on `node`, replacing any previous value.
    /// Names are stored lowercased.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(entry) = self.dom.get_mut(node) else {
            return;
        };
        let name = name.to_ascii_lowercase();
        let attrs = &mut entry.get_mut().attrs;
        match attrs.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => value.clone_into(existing),
            None => attrs.push((name, value.to_owned())),
        }
    }

    /// Tag name of an element node.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element { tag } => Some(tag),
            _ => None,
        }
    }

    pub fn get_attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node)?
            .attrs
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Element nodes in document order, excluding the root.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.root
            .descendants(&self.dom)
            .filter(|id| self.tag(*id).is_some())
    }

    /// Evaluate `selector` below the document root.
    ///
    /// # Errors
    /// Whatever compiling or evaluating the selector reports.
    pub fn select_all(self: &Arc<Self>, selector: &str) -> Result<Vec<Node<Self>>> {
        let compiled = css_selectors::compile_for(selector, Arc::clone(self))?;
        let matched = compiled(&[NodeRef::Node(self.root)])?;
        debug!("{selector:?} matched {} node(s)", matched.len());
        Ok(matched)
    }

    /// First node [`select_all`](Self::select_all) yields.
    ///
    /// # Errors
    /// Same as [`select_all`](Self::select_all).
    pub fn select(self: &Arc<Self>, selector: &str) -> Result<Option<Node<Self>>> {
        Ok(self.select_all(selector)?.into_iter().next())
    }
}

impl ElementAdapter for Document {
    type Handle = NodeId;

    fn node_type(&self, node: NodeId) -> NodeType {
        match self.node(node).map(|entry| &entry.kind) {
            Some(NodeKind::Document) => NodeType::Document,
            Some(NodeKind::Element { .. }) => NodeType::Element,
            Some(NodeKind::Text { .. }) => NodeType::Text,
            Some(NodeKind::Comment { .. }) => NodeType::Comment,
            None => NodeType::Other,
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.dom.get(node)?.parent()
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.dom.get(node)?.first_child()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.dom.get(node)?.next_sibling()
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.dom.get(node)?.previous_sibling()
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.tag(node)
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.get_attr(node, name)
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Text { text } => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_attr_lowercases_and_replaces() {
        let mut document = Document::new();
        let div = document.create_element(document.root(), "DIV");
        document.set_attr(div, "Class", "a");
        document.set_attr(div, "class", "b");
        assert_eq!(document.tag(div), Some("div"));
        assert_eq!(document.get_attr(div, "CLASS"), Some("b"));
        assert_eq!(document.node(div).unwrap().attrs.len(), 1);
    }

    #[test]
    fn adapter_navigates_siblings_and_text() {
        let mut document = Document::new();
        let root = document.root();
        let para = document.create_element(root, "p");
        let hello = document.append_text(para, "hello ");
        document.append_comment(para, "ignored");
        let bold = document.create_element(para, "b");
        document.append_text(bold, "world");

        assert_eq!(document.first_child(para), Some(hello));
        assert_eq!(document.previous_sibling(bold).and_then(|id| document.previous_sibling(id)), Some(hello));
        assert_eq!(document.parent(bold), Some(para));
        assert_eq!(document.node_type(root), NodeType::Document);
        assert!(document.is_element(root));
        assert!(!document.is_element(hello));
        assert_eq!(document.inner_text(para), "hello world");
        assert_eq!(document.len(), 6);
    }

    #[test]
    fn elements_skip_text_and_root() {
        let mut document = Document::new();
        let root = document.root();
        let list = document.create_element(root, "ul");
        document.append_text(list, "\n");
        let item = document.create_element(list, "li");
        assert_eq!(document.elements().collect::<Vec<_>>(), vec![list, item]);
    }
}
