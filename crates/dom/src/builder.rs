//! Fluent construction of [`Document`] trees.

use crate::Document;
use indextree::NodeId;

/// Builds a document by opening and closing elements in document order.
///
/// Content is appended to the innermost open element, or to the root when
/// none is open. Elements left open are closed by [`build`](Self::build).
pub struct DocumentBuilder {
    document: Document,
    open: Vec<NodeId>,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self {
            document: Document::new(),
            open: Vec::new(),
        }
    }

    /// The node new content is appended to.
    #[inline]
    pub fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or(self.document.root)
    }

    /// Open a `tag` element inside the current node.
    #[must_use]
    pub fn element(mut self, tag: &str) -> Self {
        let parent = self.current();
        let id = self.document.create_element(parent, tag);
        self.open.push(id);
        self
    }

    /// Append an element with no content and leave the current node as is.
    #[must_use]
    pub fn leaf(self, tag: &str) -> Self {
        self.element(tag).close()
    }

    /// Set an attribute on the innermost open element.
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        if let Some(&id) = self.open.last() {
            self.document.set_attr(id, name, value);
        }
        self
    }

    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        let parent = self.current();
        self.document.append_text(parent, text);
        self
    }

    #[must_use]
    pub fn comment(mut self, text: &str) -> Self {
        let parent = self.current();
        self.document.append_comment(parent, text);
        self
    }

    /// Close the innermost open element. Does nothing at the root.
    #[must_use]
    pub fn close(mut self) -> Self {
        self.open.pop();
        self
    }

    pub fn build(self) -> Document {
        self.document
    }
}
