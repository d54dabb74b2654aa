//! The compiled selector shape and helpers for building stages.
//!
//! Every primitive stage and every compiled selector is the same kind of
//! value: a shareable function from an ordered element sequence to an
//! ordered element sequence. Stages compose by chaining.

use crate::error::Result;
use std::sync::Arc;

/// A compiled selector or a single stage of one.
pub type Selector<E> = Arc<dyn Fn(&[E]) -> Result<Vec<E>> + Send + Sync>;

/// Wrap a closure as a [`Selector`].
#[inline]
pub fn from_fn<E, F>(function: F) -> Selector<E>
where
    F: Fn(&[E]) -> Result<Vec<E>> + Send + Sync + 'static,
{
    Arc::new(function)
}

/// Stage keeping the elements for which `predicate` holds, in order.
pub fn filter<E, P>(predicate: P) -> Selector<E>
where
    E: Clone + 'static,
    P: Fn(&E) -> bool + Send + Sync + 'static,
{
    from_fn(move |elements: &[E]| {
        Ok(elements
            .iter()
            .filter(|element| predicate(element))
            .cloned()
            .collect())
    })
}

/// Stage replacing each element by the elements `expand` yields for it.
pub fn flat_map<E, I, F>(expand: F) -> Selector<E>
where
    E: 'static,
    I: IntoIterator<Item = E>,
    F: Fn(&E) -> I + Send + Sync + 'static,
{
    from_fn(move |elements: &[E]| Ok(elements.iter().flat_map(&expand).collect()))
}

/// Stage passing its input through unchanged.
pub fn identity<E: Clone + 'static>() -> Selector<E> {
    from_fn(|elements: &[E]| Ok(elements.to_vec()))
}

/// Stage that never yields anything.
pub fn nothing<E: 'static>() -> Selector<E> {
    from_fn(|_: &[E]| Ok(Vec::new()))
}

/// Run `first`, then feed its output to `next`.
pub fn chain<E: 'static>(first: Selector<E>, next: Selector<E>) -> Selector<E> {
    from_fn(move |elements: &[E]| {
        let intermediate = first(elements)?;
        next(&intermediate)
    })
}
