//! Selectors Level 3 compiled to composable element-sequence functions.
//! Reference: <https://www.w3.org/TR/selectors-3/>
//!
//! Selector text is tokenized, parsed by a recursive-descent [`parser`] and
//! reported, production by production, to a [`SelectorGenerator`]. The
//! compiling [`Generator`] turns those events into a single [`Selector`]: a
//! function from an ordered element sequence to an ordered element sequence.
//! No syntax tree is built in between.
//!
//! Besides CSS3 the grammar accepts a few extensions:
//! - `[attr!=value]` and `[attr%=regex]`
//! - a leading `/` anchoring the selector at its input
//! - `:eq(n)`, `:last`, `:select-parent`, `:contains("text")`, `:matches("regex")`, `:has(s)`
//! - region operators `:split-before(s)`, `:split-after(s)`, `:split-between(s)`,
//!   `:split-all(s)`, `:before(s)`, `:after(s)` and `:between(s; t)`
//! - custom pseudo-selectors looked up in a [`CustomSelectorRegistry`]
//!
//! The element type is up to the host. Implement [`ElementOperations`]
//! directly, or implement the smaller [`ElementAdapter`] and use [`NodeOps`].
//!
//! ```text
//! text ── tokenize ──> [Token] ── parse ──> SelectorGenerator ── compiled ──> Selector<E>
//!                                               │
//!                                   ElementOperations<E> stages
//! ```

#![cfg_attr(
    test,
    allow(clippy::unwrap_used, reason = "Tests unwrap known-good values")
)]
#![allow(
    clippy::module_name_repetitions,
    reason = "Names like SelectorError read better than Error at use sites"
)]

mod adapter;
mod compiler;
mod error;
mod generator;
mod memo;
mod namespace;
mod node;
mod node_ops;
mod operations;
pub mod parser;
mod regions;
mod registry;
pub mod selector;
mod token;
mod tokenizer;

// Re-export public API
pub use adapter::{ElementAdapter, NodeType};
pub use compiler::Generator;
pub use error::{Result, SelectorError};
pub use generator::SelectorGenerator;
pub use memo::{StageKey, StageMemo};
pub use namespace::NamespacePrefix;
pub use node::{GROUP_DIRECTION_ATTR, GROUP_TAG, GroupDirection, NodeGroup, NodeRef};
pub use node_ops::{Node, NodeOps};
pub use operations::ElementOperations;
pub use parser::{TokenReader, parse};
pub use registry::{ArgType, CustomArg, CustomArgument, CustomSelectorInfo, CustomSelectorRegistry};
pub use selector::Selector;
pub use token::{Token, TokenKind, TokenSpec};
pub use tokenizer::tokenize;

use log::debug;
use std::sync::Arc;

/// Tokenize and parse `text`, driving `generator` to completion.
///
/// Returns the closed generator; for a [`Generator`] call
/// [`selector`](Generator::selector) on it to get the compiled function.
///
/// # Errors
/// [`SelectorError::Argument`] for empty text, otherwise whatever
/// tokenizing, parsing or the generator reports.
pub fn compile<G: SelectorGenerator>(text: &str, generator: G) -> Result<G> {
    if text.is_empty() {
        return Err(SelectorError::argument("selector text must not be empty"));
    }
    debug!("compiling selector {text:?}");
    compile_tokens(tokenize(text)?, generator)
}

/// Like [`compile`], then hand the closed generator to `result_selector`.
///
/// # Errors
/// Same as [`compile`].
pub fn compile_with<G, T, F>(text: &str, generator: G, result_selector: F) -> Result<T>
where
    G: SelectorGenerator,
    F: FnOnce(G) -> T,
{
    compile(text, generator).map(result_selector)
}

/// Parse already tokenized selector text.
///
/// # Errors
/// Whatever parsing or the generator reports.
pub fn compile_tokens<G: SelectorGenerator>(tokens: Vec<Token>, mut generator: G) -> Result<G> {
    parse(tokens, &mut generator)?;
    Ok(generator)
}

/// Compile `text` against a host tree using the built-in operations and the
/// global custom-selector registry.
///
/// # Errors
/// Same as [`compile`].
pub fn compile_for<A: ElementAdapter>(text: &str, adapter: Arc<A>) -> Result<Selector<Node<A>>> {
    compile(text, Generator::new(Arc::new(NodeOps::new(adapter))))?.into_selector()
}

