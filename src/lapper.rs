//! The reference structure: a start-sorted interval list searched with a single binary search.
//!
//! Queries are half-open, `[start, stop)`, and so are the stored intervals. There is no flag to
//! change that; an inclusive query has to be widened by one before it gets here.
//!
//! The search relies on the longest interval in the set. Every interval overlapping `start` must
//! begin at or after `start - max_len`, so a binary search on that position followed by a linear
//! scan until the first start at or past `stop` finds them all. Results are produced lazily.
//!
//! # Examples
//!
//! ```rust
//!    use ivcompare::{Interval, Lapper};
//!    type Iv = Interval<u32>;
//!
//!    // create some fake data
//!    let data: Vec<Iv> = (0..20).step_by(5).map(|x| Iv{start: x, stop: x + 2, val: 0}).collect();
//!
//!    // make lapper structure
//!    let laps = Lapper::new(data);
//!
//!    assert_eq!(laps.find(6, 11).next(), Some(&Iv{start: 5, stop: 7, val: 0}));
//!    assert_eq!(laps.find(7, 10).next(), None);
//! ```
use crate::errors::BuildError;
use crate::interval::Interval;

/// Primary object of the reference structure. The public intervals holds all the intervals and can
/// be used for iterating / pulling values out of the list.
#[derive(Debug, Clone)]
pub struct Lapper<T> {
    /// List of intervals, sorted by start
    pub intervals: Vec<Interval<T>>,
    /// The length of the longest interval
    max_len: u32,
}

impl<T: Ord> Lapper<T> {
    /// Create a new instance of Lapper by passing in a vector of Intervals. This vector will
    /// immediately be sorted by start order.
    /// ```
    /// use ivcompare::{Lapper, Interval};
    /// let data = (0..20).step_by(5)
    ///                   .map(|x| Interval{start: x, stop: x + 10, val: true})
    ///                   .collect::<Vec<Interval<bool>>>();
    /// let lapper = Lapper::new(data);
    /// assert_eq!(lapper.len(), 4);
    /// ```
    pub fn new(mut intervals: Vec<Interval<T>>) -> Self {
        // payload is part of the ordering, so an unstable sort is deterministic and needs no
        // scratch allocation
        intervals.sort_unstable();
        let max_len = intervals.iter().map(Interval::len).max().unwrap_or(0);
        Lapper { intervals, max_len }
    }
}

impl<T: Ord + Clone> Lapper<T> {
    /// Bulk construction from borrowed tuples. The backing storage is reserved up front so an
    /// allocation failure surfaces as [`BuildError::ResourceExhausted`] instead of aborting.
    pub fn from_slice(intervals: &[Interval<T>]) -> Result<Self, BuildError> {
        let mut owned = Vec::new();
        owned
            .try_reserve_exact(intervals.len())
            .map_err(|_| BuildError::ResourceExhausted {
                structure: "Lapper",
                requested: intervals.len(),
            })?;
        owned.extend_from_slice(intervals);
        Ok(Self::new(owned))
    }
}

impl<T> Lapper<T> {
    /// Determine the first index that we should start checking for overlaps for via a binary
    /// search.
    #[inline]
    pub fn lower_bound(start: u32, intervals: &[Interval<T>]) -> usize {
        let mut size = intervals.len();
        let mut low = 0;

        while size > 0 {
            let half = size / 2;
            let other_half = size - half;
            let probe = low + half;
            let other_low = low + other_half;
            let v = &intervals[probe];
            size = half;
            low = if v.start < start { other_low } else { low }
        }
        low
    }

    /// Get the number over intervals in Lapper
    #[inline]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Check if lapper is empty
    /// ```
    /// use ivcompare::{Lapper, Interval};
    /// let data: Vec<Interval<bool>> = vec![];
    /// let lapper = Lapper::new(data);
    /// assert_eq!(lapper.is_empty(), true);
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Return an iterator over the intervals in Lapper
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Interval<T>> {
        self.intervals.iter()
    }

    /// Find all intervals that overlap start .. stop
    /// ```
    /// use ivcompare::{Lapper, Interval};
    /// let lapper = Lapper::new((0..100).step_by(5)
    ///                                 .map(|x| Interval{start: x, stop: x+2 , val: true})
    ///                                 .collect::<Vec<Interval<bool>>>());
    /// assert_eq!(lapper.find(5, 11).count(), 2);
    /// ```
    #[inline]
    pub fn find(&self, start: u32, stop: u32) -> IterFind<'_, T> {
        IterFind {
            inner: self,
            off: Self::lower_bound(start.saturating_sub(self.max_len), &self.intervals),
            start,
            stop,
        }
    }
}

/// Find Iterator
#[derive(Debug)]
pub struct IterFind<'a, T> {
    inner: &'a Lapper<T>,
    off: usize,
    start: u32,
    stop: u32,
}

impl<'a, T> Iterator for IterFind<'a, T> {
    type Item = &'a Interval<T>;

    #[inline]
    // interval.start < stop && interval.stop > start
    fn next(&mut self) -> Option<Self::Item> {
        while self.off < self.inner.intervals.len() {
            let interval = &self.inner.intervals[self.off];
            self.off += 1;
            if interval.overlap(self.start, self.stop) {
                return Some(interval);
            } else if interval.start >= self.stop {
                break;
            }
        }
        None
    }
}
