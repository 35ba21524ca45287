//! Endpoint conventions and the translation of a query into the convention a structure speaks
//! natively.
//!
//! Stored intervals always cover the integer positions `start .. stop`. The convention only
//! decides whether the query stop is part of the query:
//!
//! * [`Convention::HalfOpen`]: `[ql, qr)`, an interval overlaps iff `start < qr && ql < stop`
//! * [`Convention::Inclusive`]: `[ql, qr]`, an interval overlaps iff `start <= qr && ql < stop`
//!
//! so an inclusive query is the half-open query `[ql, qr + 1)`.
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::NormalizeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Convention {
    Inclusive,
    HalfOpen,
}

impl Convention {
    pub const ALL: [Convention; 2] = [Convention::Inclusive, Convention::HalfOpen];
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Convention::Inclusive => write!(f, "inclusive"),
            Convention::HalfOpen => write!(f, "half-open"),
        }
    }
}

impl FromStr for Convention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inclusive" => Ok(Convention::Inclusive),
            "half-open" | "half_open" => Ok(Convention::HalfOpen),
            _ => Err(format!(
                "Invalid convention: {}. Valid options are 'inclusive' or 'half-open'",
                s
            )),
        }
    }
}

/// How a wrapped structure interprets the bounds it is handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeConvention {
    /// Always uses the given convention.
    Fixed(Convention),
    /// Inclusive by default, but takes an explicit inclusive/exclusive flag.
    Flagged,
}

/// A query as it should be issued to one particular structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeQuery {
    pub start: u32,
    pub stop: u32,
    /// Only read by [`NativeConvention::Flagged`] structures.
    pub inclusive: bool,
}

/// Translate the query `[ql, qr]` under `target` into what a structure with the `native`
/// convention must be asked.
///
/// ```
/// use ivcompare::{normalize, Convention, NativeConvention};
///
/// let q = normalize(Convention::Inclusive, NativeConvention::Fixed(Convention::HalfOpen), 10, 20).unwrap();
/// assert_eq!((q.start, q.stop), (10, 21));
/// ```
pub fn normalize(
    target: Convention,
    native: NativeConvention,
    ql: u32,
    qr: u32,
) -> Result<NativeQuery, NormalizeError> {
    match native {
        NativeConvention::Fixed(native) if native == target => Ok(NativeQuery {
            start: ql,
            stop: qr,
            inclusive: native == Convention::Inclusive,
        }),
        NativeConvention::Fixed(Convention::HalfOpen) => {
            let stop = qr
                .checked_add(1)
                .ok_or(NormalizeError::BoundOverflow { stop: qr })?;
            Ok(NativeQuery {
                start: ql,
                stop,
                inclusive: false,
            })
        }
        NativeConvention::Fixed(native) => Err(NormalizeError::NoInverse { target, native }),
        NativeConvention::Flagged => Ok(NativeQuery {
            start: ql,
            stop: qr,
            inclusive: target == Convention::Inclusive,
        }),
    }
}

/// A canonical, order independent result set. Tuples are keyed by their full identity,
/// payload included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hits<T: Ord> {
    set: BTreeSet<(u32, u32, T)>,
}

impl<T: Ord> Default for Hits<T> {
    fn default() -> Self {
        Hits {
            set: BTreeSet::new(),
        }
    }
}

impl<T: Ord> Hits<T> {
    pub fn from_tuples<I>(tuples: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32, T)>,
    {
        Hits {
            set: tuples.into_iter().collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.set.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn contains(&self, tuple: &(u32, u32, T)) -> bool {
        self.set.contains(tuple)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(u32, u32, T)> {
        self.set.iter()
    }

    /// Tuples only in `self`, and tuples only in `other`.
    pub fn symmetric_difference<'a>(
        &'a self,
        other: &'a Hits<T>,
    ) -> (Vec<&'a (u32, u32, T)>, Vec<&'a (u32, u32, T)>) {
        (
            self.set.difference(&other.set).collect(),
            other.set.difference(&self.set).collect(),
        )
    }
}

impl<T: Ord> FromIterator<(u32, u32, T)> for Hits<T> {
    fn from_iter<I: IntoIterator<Item = (u32, u32, T)>>(iter: I) -> Self {
        Hits::from_tuples(iter)
    }
}
