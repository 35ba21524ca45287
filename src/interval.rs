use std::cmp::Ordering::{self};

/// Represent a range from [start, stop) with an attached payload.
/// How the stop position is treated during a query depends on the
/// [`Convention`](crate::Convention) in use.
#[derive(Debug, Clone)]
pub struct Interval<T> {
    pub start: u32,
    pub stop: u32,
    pub val: T,
}

/// Payload carried by generated intervals. `None` is a null payload, `Some(i)` labels the i-th
/// interval of a generated set.
pub type Payload = Option<u32>;

impl<T> Interval<T> {
    /// Check if the interval overlaps start .. stop with both sides exclusive of the stop
    /// position.
    #[inline]
    pub fn overlap(&self, start: u32, stop: u32) -> bool {
        self.start < stop && self.stop > start
    }

    /// Check if the interval overlaps the closed query start ..= stop. The interval itself still
    /// covers the integer positions start .. stop, so this is `overlap(start, stop + 1)`.
    #[inline]
    pub fn overlap_inclusive(&self, start: u32, stop: u32) -> bool {
        self.start <= stop && self.stop > start
    }

    /// A zero length interval can't be represented by the harness.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.start >= self.stop
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.stop.saturating_sub(self.start)
    }
}

impl<T: Clone> Interval<T> {
    /// The canonical (start, stop, val) form used when comparing result sets.
    #[inline]
    pub fn to_tuple(&self) -> (u32, u32, T) {
        (self.start, self.stop, self.val.clone())
    }
}

impl<T: Ord> Ord for Interval<T> {
    #[inline]
    fn cmp(&self, other: &Interval<T>) -> Ordering {
        if self.start < other.start {
            Ordering::Less
        } else if other.start < self.start {
            Ordering::Greater
        } else {
            self.stop
                .cmp(&other.stop)
                .then_with(|| self.val.cmp(&other.val))
        }
    }
}
impl<T: Ord> Eq for Interval<T> {}

impl<T: Ord> PartialOrd for Interval<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Ord> PartialEq for Interval<T> {
    #[inline]
    fn eq(&self, other: &Interval<T>) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

/// A query range. Generated queries always satisfy `start < stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Query {
    pub start: u32,
    pub stop: u32,
}

impl Query {
    #[inline]
    pub fn width(&self) -> u32 {
        self.stop.saturating_sub(self.start)
    }
}
