//! The candidate structure: an augmented interval tree.
//!
//! Intervals are added one at a time to a [`TreeBuilder`] and then indexed in a separate step,
//! which produces an immutable [`IntervalTree`]. The tree is laid out implicitly over the sorted
//! intervals: the node for the range `lo .. hi` is the midpoint, and every node records the largest
//! stop found in its subtree so whole subtrees can be skipped during a search.
//!
//! Searches are inclusive of the query stop by default, mirroring a closed `[start, stop]` query.
//! An explicit flag switches to half-open `[start, stop)` queries. Stored intervals always cover
//! the positions `start .. stop`.
//!
//! ```rust
//! use ivcompare::TreeBuilder;
//!
//! let mut builder = TreeBuilder::new();
//! builder.insert((10, 20, "a")).unwrap();
//! builder.insert((20, 30, "b")).unwrap();
//! let tree = builder.index().unwrap();
//!
//! assert_eq!(tree.search(5, 10).len(), 1);
//! assert_eq!(tree.search_with(5, 10, false).len(), 0);
//! ```
use crate::errors::BuildError;
use crate::interval::Interval;

/// Collects intervals before the index step.
#[derive(Debug, Clone)]
pub struct TreeBuilder<T> {
    pending: Vec<Interval<T>>,
}

impl<T> Default for TreeBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TreeBuilder<T> {
    pub fn new() -> Self {
        TreeBuilder {
            pending: Vec::new(),
        }
    }

    /// Reserve room for `capacity` intervals up front.
    pub fn with_capacity(capacity: usize) -> Result<Self, BuildError> {
        let mut pending = Vec::new();
        pending
            .try_reserve_exact(capacity)
            .map_err(|_| exhausted(capacity))?;
        Ok(TreeBuilder { pending })
    }

    /// Add one `(start, stop, val)` triple. Zero length intervals are rejected.
    pub fn insert(&mut self, (start, stop, val): (u32, u32, T)) -> Result<(), BuildError> {
        let iv = Interval { start, stop, val };
        if iv.is_degenerate() {
            return Err(BuildError::InvalidInterval { start, stop });
        }
        self.pending
            .try_reserve(1)
            .map_err(|_| exhausted(self.pending.len() + 1))?;
        self.pending.push(iv);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Sort the pending intervals and compute the subtree maxima. Searching is only possible on
    /// the returned tree.
    pub fn index(self) -> Result<IntervalTree<T>, BuildError> {
        let mut intervals = self.pending;
        // unstable, so indexing allocates nothing beyond `max_stop`
        intervals.sort_unstable_by(|a, b| a.start.cmp(&b.start).then(a.stop.cmp(&b.stop)));

        let mut max_stop = Vec::new();
        max_stop
            .try_reserve_exact(intervals.len())
            .map_err(|_| exhausted(intervals.len()))?;
        max_stop.resize(intervals.len(), 0);
        fill_max(&intervals, &mut max_stop, 0, intervals.len());

        Ok(IntervalTree {
            intervals,
            max_stop,
        })
    }
}

fn exhausted(requested: usize) -> BuildError {
    BuildError::ResourceExhausted {
        structure: "IntervalTree",
        requested,
    }
}

/// Returns the max stop of the subtree rooted at the midpoint of `lo .. hi`.
fn fill_max<T>(intervals: &[Interval<T>], max_stop: &mut [u32], lo: usize, hi: usize) -> u32 {
    if lo >= hi {
        return 0;
    }
    let mid = lo + (hi - lo) / 2;
    let left = fill_max(intervals, max_stop, lo, mid);
    let right = fill_max(intervals, max_stop, mid + 1, hi);
    let max = intervals[mid].stop.max(left).max(right);
    max_stop[mid] = max;
    max
}

/// Immutable, indexed interval tree.
#[derive(Debug, Clone)]
pub struct IntervalTree<T> {
    /// Intervals sorted by (start, stop)
    intervals: Vec<Interval<T>>,
    /// Largest stop in the subtree rooted at each position
    max_stop: Vec<u32>,
}

impl<T> IntervalTree<T> {
    #[inline]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval<T>> {
        self.intervals.iter()
    }

    /// Find all intervals overlapping the closed query `[start, stop]`.
    #[inline]
    pub fn search(&self, start: u32, stop: u32) -> Vec<&Interval<T>> {
        self.search_with(start, stop, true)
    }

    /// Find all intervals overlapping `[start, stop]` when `inclusive` is set, otherwise
    /// `[start, stop)`. Results come back in (start, stop) order.
    pub fn search_with(&self, start: u32, stop: u32, inclusive: bool) -> Vec<&Interval<T>> {
        let mut found = Vec::new();
        self.visit(0, self.intervals.len(), start, stop, inclusive, &mut found);
        found
    }

    fn visit<'a>(
        &'a self,
        lo: usize,
        hi: usize,
        start: u32,
        stop: u32,
        inclusive: bool,
        found: &mut Vec<&'a Interval<T>>,
    ) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        // nothing below here reaches past the query start
        if self.max_stop[mid] <= start {
            return;
        }
        self.visit(lo, mid, start, stop, inclusive, found);

        let node = &self.intervals[mid];
        let past_query = if inclusive {
            node.start > stop
        } else {
            node.start >= stop
        };
        if past_query {
            // every interval to the right starts at or after this one
            return;
        }
        if node.stop > start {
            found.push(node);
        }
        self.visit(mid + 1, hi, start, stop, inclusive, found);
    }
}

#[cfg(test)]
#[rustfmt::skip]
mod tests {
    use super::*;
    type Iv = Interval<u32>;

    fn build(data: Vec<(u32, u32, u32)>) -> IntervalTree<u32> {
        let mut builder = TreeBuilder::new();
        for triple in data {
            builder.insert(triple).unwrap();
        }
        builder.index().unwrap()
    }

    fn setup_nonoverlapping() -> IntervalTree<u32> {
        build((0..100).step_by(20).map(|x| (x, x + 10, 0)).collect())
    }

    fn setup_nested() -> IntervalTree<u32> {
        build(vec![(0, 100, 1), (10, 20, 2), (50, 60, 3)])
    }

    #[test]
    fn test_rejects_zero_length() {
        let mut builder = TreeBuilder::new();
        assert_eq!(
            builder.insert((5, 5, 0u32)),
            Err(BuildError::InvalidInterval { start: 5, stop: 5 })
        );
        assert!(builder.is_empty());
    }

    // Test that a query stop that hits an interval start only matches when inclusive
    #[test]
    fn test_query_stop_interval_start() {
        let tree = setup_nonoverlapping();
        assert_eq!(tree.search_with(15, 20, false), Vec::<&Iv>::new());
        assert_eq!(tree.search(15, 20), vec![&Iv{start: 20, stop: 30, val: 0}]);
    }

    // Test that a query start that hits an interval stop never matches
    #[test]
    fn test_query_start_interval_stop() {
        let tree = setup_nonoverlapping();
        assert!(tree.search_with(30, 35, false).is_empty());
        assert!(tree.search(30, 35).is_empty());
    }

    #[test]
    fn test_query_envolops_interval() {
        let tree = setup_nonoverlapping();
        assert_eq!(tree.search(15, 35), vec![&Iv{start: 20, stop: 30, val: 0}]);
    }

    #[test]
    fn test_nested() {
        let tree = setup_nested();
        assert_eq!(tree.search_with(15, 16, false).len(), 2);
        assert_eq!(tree.search_with(55, 56, false).len(), 2);
        assert_eq!(tree.search_with(5, 6, false), vec![&Iv{start: 0, stop: 100, val: 1}]);
    }

    #[test]
    fn test_sorted_results() {
        let tree = build(vec![(20, 30, 3), (0, 10, 1), (5, 15, 2)]);
        let vals: Vec<u32> = tree.search(0, 30).iter().map(|iv| iv.val).collect();
        assert_eq!(vals, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_tree() {
        let tree: IntervalTree<u32> = TreeBuilder::new().index().unwrap();
        assert!(tree.is_empty());
        assert!(tree.search(0, u32::MAX).is_empty());
        assert!(tree.search_with(0, 1, false).is_empty());
    }

    #[test]
    fn test_matches_brute_force() {
        let data: Vec<(u32, u32, u32)> = (0..200u32)
            .map(|i| {
                let start = (i * 37) % 500;
                (start, start + 1 + (i * 13) % 40, i)
            })
            .collect();
        let tree = build(data.clone());
        for start in (0..560).step_by(7) {
            for width in [0u32, 1, 3, 25] {
                let stop = start + width;
                for inclusive in [true, false] {
                    let mut expected: Vec<u32> = data
                        .iter()
                        .filter(|(s, e, _)| {
                            if inclusive { *s <= stop && *e > start } else { *s < stop && *e > start }
                        })
                        .map(|(_, _, v)| *v)
                        .collect();
                    let mut found: Vec<u32> = tree
                        .search_with(start, stop, inclusive)
                        .iter()
                        .map(|iv| iv.val)
                        .collect();
                    expected.sort();
                    found.sort();
                    assert_eq!(found, expected, "[{}, {}] inclusive={}", start, stop, inclusive);
                }
            }
        }
    }
}
