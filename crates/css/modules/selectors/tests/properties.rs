//! Property-based checks of selector algebra over generated documents.

#![allow(clippy::unwrap_used, reason = "Tests unwrap known-good values")]

use css_selectors::{NodeRef, compile_for};
use proptest::prelude::*;
use selector_dom::Document;
use std::sync::Arc;

/// Children of `#box`: 0 = p, 1 = hr, 2 = span, 3 = text. Flagged elements
/// get `class="a"` and a `data` attribute.
fn build(children: &[(u8, bool)]) -> Arc<Document> {
    let mut document = Document::new();
    let container = document.create_element(document.root(), "div");
    document.set_attr(container, "id", "box");
    for &(kind, flagged) in children {
        let node = match kind {
            0 => document.create_element(container, "p"),
            1 => document.create_element(container, "hr"),
            2 => document.create_element(container, "span"),
            _ => {
                document.append_text(container, "text");
                continue;
            }
        };
        if flagged {
            document.set_attr(node, "class", "a");
            document.set_attr(node, "data", "1");
        }
    }
    Arc::new(document)
}

fn children() -> impl Strategy<Value = Vec<(u8, bool)>> {
    prop::collection::vec((0_u8..4, any::<bool>()), 0..12)
}

const SIMPLE: [&str; 6] = [".a", "[data]", ":first-child", ":last-child", ":empty", ":only-child"];

proptest! {
    #[test]
    fn double_negation_is_identity(children in children()) {
        let _ = env_logger::builder().is_test(true).try_init();
        let document = build(&children);
        for simple in SIMPLE {
            let direct = document.select_all(&format!("#box > *{simple}")).unwrap();
            let negated = document
                .select_all(&format!("#box > *:not(:not({simple}))"))
                .unwrap();
            prop_assert_eq!(negated, direct);
        }
    }

    #[test]
    fn duplicate_alternatives_collapse(children in children()) {
        let document = build(&children);
        for simple in SIMPLE {
            let single = document.select_all(&format!("#box *{simple}")).unwrap();
            let doubled = document
                .select_all(&format!("#box *{simple}, #box *{simple}"))
                .unwrap();
            prop_assert_eq!(doubled, single);
        }
    }

    #[test]
    fn empty_input_stays_empty(children in children()) {
        let document = build(&children);
        for text in ["*", "#box > p", "#box:split-all(hr)", "/.a", ":not(span)"] {
            let compiled = compile_for(text, Arc::clone(&document)).unwrap();
            prop_assert!(compiled(&[]).unwrap().is_empty());
        }
    }

    #[test]
    fn split_before_and_after_cover_every_child(children in children()) {
        let document = build(&children);
        let has_splitter = children.iter().any(|(kind, _)| *kind == 1);
        for text in ["#box:split-before(hr)", "#box:split-after(hr)"] {
            let covered: Vec<usize> = document
                .select_all(text)
                .unwrap()
                .iter()
                .filter_map(NodeRef::group)
                .flat_map(|group| group.start..group.end)
                .collect();
            if has_splitter {
                prop_assert_eq!(covered, (0..children.len()).collect::<Vec<_>>());
            } else {
                prop_assert!(covered.is_empty());
            }
        }
    }

    #[test]
    fn nth_child_matches_position(children in children()) {
        let document = build(&children);
        let elements = document.select_all("#box > *").unwrap();
        for (index, element) in elements.iter().enumerate() {
            let position = index + 1;
            let nth = document
                .select_all(&format!("#box > *:nth-child({position})"))
                .unwrap();
            prop_assert_eq!(nth, vec![*element]);
            let eq = document.select_all(&format!("#box > *:eq({index})")).unwrap();
            prop_assert_eq!(eq, vec![*element]);
        }
    }
}
