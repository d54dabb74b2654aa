use crate::{DOMNode, Document, NodeKind};
use core::fmt;
use indextree::NodeId;

fn write_indent(formatter: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        formatter.write_str("  ")?;
    }
    Ok(())
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

/// Attributes sorted by name, for deterministic output.
fn write_attrs(formatter: &mut fmt::Formatter<'_>, node: &DOMNode) -> fmt::Result {
    let mut pairs: Vec<&(String, String)> = node.attrs.iter().collect();
    pairs.sort_by(|left, right| left.0.cmp(&right.0));
    for (name, value) in pairs {
        write!(formatter, " {name}=\"{}\"", escape_text(value))?;
    }
    Ok(())
}

fn fmt_children(
    document: &Document,
    id: NodeId,
    formatter: &mut fmt::Formatter<'_>,
    depth: usize,
) -> fmt::Result {
    for child in id.children(&document.dom) {
        fmt_node(document, child, formatter, depth.saturating_add(1))?;
    }
    Ok(())
}

fn fmt_node(
    document: &Document,
    id: NodeId,
    formatter: &mut fmt::Formatter<'_>,
    depth: usize,
) -> fmt::Result {
    let Some(node) = document.node(id) else {
        return Ok(());
    };
    match &node.kind {
        NodeKind::Document => {
            write_indent(formatter, depth)?;
            writeln!(formatter, "#document")?;
            fmt_children(document, id, formatter, depth)?;
        }
        NodeKind::Element { tag } => {
            write_indent(formatter, depth)?;
            write!(formatter, "<{tag}")?;
            write_attrs(formatter, node)?;
            writeln!(formatter, ">")?;
            fmt_children(document, id, formatter, depth)?;
            write_indent(formatter, depth)?;
            writeln!(formatter, "</{tag}>")?;
        }
        NodeKind::Text { text } => {
            // Whitespace-only text is left out of the dump.
            if text.chars().all(char::is_whitespace) {
                return Ok(());
            }
            write_indent(formatter, depth)?;
            writeln!(formatter, "\"{}\"", escape_text(text))?;
        }
        NodeKind::Comment { text } => {
            write_indent(formatter, depth)?;
            writeln!(formatter, "<!--{text}-->")?;
        }
    }
    Ok(())
}

impl fmt::Debug for Document {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_node(self, self.root, formatter, 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::Document;

    #[test]
    fn prints_indented_tree() {
        let document = Document::builder()
            .element("p")
            .attr("title", "say \"hi\"")
            .attr("class", "greeting")
            .text("hello")
            .text("  ")
            .comment("note")
            .build();

        let expected = "#document\n  <p class=\"greeting\" title=\"say \\\"hi\\\"\">\n    \"hello\"\n    <!--note-->\n  </p>\n";
        assert_eq!(format!("{document:?}"), expected);
    }
}
