//! Index arithmetic for the region operators.
//!
//! Splitter positions are indices into a parent's child node list, sorted and
//! without duplicates. Runs are half-open ranges over the same list; empty
//! runs are never produced.

use crate::node::GroupDirection;
use core::ops::Range;

/// How `split-*` treats the splitter nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SplitMode {
    /// Each splitter starts a run.
    Before,
    /// Each splitter ends a run.
    After,
    /// Only the nodes strictly between two splitters.
    Between,
    /// Each splitter ends one run and starts the next.
    All,
}

impl SplitMode {
    /// Direction attribute carried by the produced groups.
    pub(crate) const fn direction(self) -> Option<GroupDirection> {
        match self {
            Self::Before | Self::After => Some(GroupDirection::Right),
            Self::Between | Self::All => None,
        }
    }

    /// Whether a parent without splitters is yielded whole.
    pub(crate) const fn keeps_unsplit(self) -> bool {
        matches!(self, Self::All)
    }

    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::Before => "split-before",
            Self::After => "split-after",
            Self::Between => "split-between",
            Self::All => "split-all",
        }
    }
}

/// Runs of `0..len` cut at `positions` according to `mode`.
pub(crate) fn split_runs(mode: SplitMode, positions: &[usize], len: usize) -> Vec<Range<usize>> {
    let (Some(&first), Some(&last)) = (positions.first(), positions.last()) else {
        return Vec::new();
    };
    let pairs = positions.windows(2).filter_map(|pair| match pair {
        [left, right] => Some((*left, *right)),
        _ => None,
    });

    let runs: Vec<Range<usize>> = match mode {
        SplitMode::Before => edge_runs(0, positions.iter().copied(), len),
        SplitMode::After => edge_runs(0, positions.iter().map(|pos| pos.saturating_add(1)), len),
        SplitMode::Between => pairs
            .map(|(left, right)| left.saturating_add(1)..right)
            .collect(),
        SplitMode::All => {
            let mut runs = vec![0..first.saturating_add(1)];
            runs.extend(pairs.map(|(left, right)| left..right.saturating_add(1)));
            runs.push(last..len);
            runs
        }
    };
    runs.into_iter()
        .filter(|run| run.start < run.end && run.end <= len)
        .collect()
}

/// Consecutive ranges between `start`, each of `cuts`, and `end`.
fn edge_runs(start: usize, cuts: impl Iterator<Item = usize>, end: usize) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut from = start;
    for cut in cuts.chain([end]) {
        runs.push(from..cut);
        from = cut;
    }
    runs
}

/// Children before the limit at `limit`.
#[inline]
pub(crate) const fn before_range(limit: usize) -> Range<usize> {
    0..limit
}

/// Children after the limit at `limit`.
#[inline]
pub(crate) fn after_range(limit: usize, len: usize) -> Range<usize> {
    let start = limit.saturating_add(1).min(len);
    start..len
}

/// Children strictly between `start` and `end`, empty when they touch.
#[inline]
pub(crate) fn between_range(start: usize, end: usize) -> Range<usize> {
    let first = start.saturating_add(1);
    first..end.max(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn before_starts_runs_at_splitters() {
        assert_eq!(
            split_runs(SplitMode::Before, &[1, 3], 5),
            vec![0..1, 1..3, 3..5]
        );
        // A leading splitter leaves no empty run in front.
        assert_eq!(split_runs(SplitMode::Before, &[0], 2), vec![0..2]);
    }

    #[test]
    fn after_ends_runs_at_splitters() {
        assert_eq!(
            split_runs(SplitMode::After, &[1, 3], 5),
            vec![0..2, 2..4, 4..5]
        );
        assert_eq!(split_runs(SplitMode::After, &[4], 5), vec![0..5]);
    }

    #[test]
    fn between_drops_outer_runs_and_splitters() {
        assert_eq!(
            split_runs(SplitMode::Between, &[0, 2, 5], 7),
            vec![1..2, 3..5]
        );
        assert!(split_runs(SplitMode::Between, &[1, 2], 4).is_empty());
    }

    #[test]
    fn all_shares_splitters() {
        assert_eq!(
            split_runs(SplitMode::All, &[1, 3], 5),
            vec![0..2, 1..4, 3..5]
        );
    }

    #[test]
    fn no_splitters_no_runs() {
        for mode in [SplitMode::Before, SplitMode::After, SplitMode::Between, SplitMode::All] {
            assert!(split_runs(mode, &[], 3).is_empty());
        }
    }

    #[test]
    fn before_and_after_cover_every_child() {
        for len in 1..6_usize {
            for splitter in 0..len {
                for mode in [SplitMode::Before, SplitMode::After] {
                    let covered: Vec<usize> = split_runs(mode, &[splitter], len)
                        .into_iter()
                        .flatten()
                        .collect();
                    assert_eq!(covered, (0..len).collect::<Vec<_>>());
                }
            }
        }
    }

    #[test]
    fn limit_ranges() {
        assert_eq!(before_range(2), 0..2);
        assert_eq!(after_range(2, 5), 3..5);
        assert_eq!(after_range(4, 5), 5..5);
        assert_eq!(between_range(1, 4), 2..4);
        assert_eq!(between_range(3, 3), 4..4);
    }
}
