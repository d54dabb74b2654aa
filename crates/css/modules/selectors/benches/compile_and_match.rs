#![allow(clippy::unwrap_used, reason = "Benchmark setup is known to be valid")]

use anyhow::Result;
use criterion::{Criterion, criterion_group, criterion_main};
use css_selectors::{Node, NodeRef, Selector, compile_for, tokenize};
use selector_dom::Document;
use std::hint::black_box;
use std::sync::Arc;

const SELECTORS: [&str; 5] = [
    "ul.menu > li:first-child a[href^=\"http\"]",
    "section p:contains(\"lorem\")",
    "li:not(.hidden), li.hidden:last-child",
    "article:split-before(h2) > p",
    "section:between(article; hr) li",
];

/// `sections` sections, each a heading, paragraphs, a rule and a menu.
fn synthetic_document(sections: usize) -> Arc<Document> {
    let mut builder = Document::builder().element("body");
    for section in 0..sections {
        builder = builder
            .element("section")
            .attr("id", &format!("s{section}"))
            .element("article")
            .element("h2").text("heading").close()
            .element("p").text("lorem ipsum").close()
            .element("h2").text("second heading").close()
            .element("p").text("dolor sit amet").close()
            .close()
            .element("h2").text("menu").close()
            .element("ul")
            .attr("class", "menu");
        for item in 0..8 {
            builder = builder
                .element("li")
                .attr("class", if item % 3 == 0 { "hidden" } else { "shown" })
                .element("a")
                .attr("href", "http://example.test")
                .text("link")
                .close()
                .close();
        }
        builder = builder
            .close()
            .leaf("hr")
            .element("p")
            .text("lorem")
            .close()
            .close();
    }
    Arc::new(builder.build())
}

fn compile_all(document: &Arc<Document>) -> Result<Vec<Selector<Node<Document>>>> {
    SELECTORS
        .iter()
        .map(|text| Ok(compile_for(text, Arc::clone(document))?))
        .collect()
}

fn bench_compile(criterion: &mut Criterion) {
    let document = synthetic_document(1);
    criterion.bench_function("selector_tokenize", |bencher| {
        bencher.iter(|| {
            for text in SELECTORS {
                black_box(tokenize(black_box(text)).unwrap());
            }
        });
    });
    criterion.bench_function("selector_compile", |bencher| {
        bencher.iter(|| black_box(compile_all(&document).unwrap()));
    });
}

fn bench_match(criterion: &mut Criterion) {
    let document = synthetic_document(50);
    let selectors = compile_all(&document).unwrap();
    let root = [NodeRef::Node(document.root())];
    for (text, selector) in SELECTORS.iter().zip(&selectors) {
        criterion.bench_function(&format!("match {text}"), |bencher| {
            bencher.iter(|| black_box(selector(black_box(&root)).unwrap().len()));
        });
    }
}

criterion_group!(selector_benches, bench_compile, bench_match);
criterion_main!(selector_benches);
