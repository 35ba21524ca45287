//! The capability interface every wrapped structure satisfies, the two adapters, and the
//! registry that decides which of them take part in a run.
//!
//! An adapter hides how a structure is built (bulk constructor vs. incremental insert plus an
//! index step) and what a query hands back (a lazy iterator vs. a sized collection). The harness
//! only ever sees [`IvStore::build`], [`Handle::count`] and [`Handle::hits`].
use log::{debug, info, warn};

use crate::convention::{normalize, Convention, Hits, NativeConvention, NativeQuery};
use crate::errors::{AdapterError, BuildError, NormalizeError};
use crate::interval::Interval;
use crate::lapper::Lapper;
use crate::tree::{IntervalTree, TreeBuilder};

/// Name of the reference adapter in configs and on the command line.
pub const LAPPER: &str = "lapper";
/// Name of the candidate adapter in configs and on the command line.
pub const TREE: &str = "tree";

/// A built structure, ready to be queried with bounds already in its native convention.
pub trait Handle<T> {
    /// Number of hits. Cheap path used while timing.
    fn count(&self, query: NativeQuery) -> usize;
    /// Every hit projected into canonical `(start, stop, val)` form.
    fn hits(&self, query: NativeQuery) -> Vec<(u32, u32, T)>;
}

/// Uniform construction contract over one wrapped structure.
pub trait IvStore<T> {
    fn name(&self) -> &'static str;
    fn native_convention(&self) -> NativeConvention;
    /// Build a fresh handle from the full interval set. Any finalize step the structure needs
    /// has been run by the time this returns.
    fn build(&self, intervals: &[Interval<T>]) -> Result<Box<dyn Handle<T>>, BuildError>;
}

/// Adapter over the reference [`Lapper`]: bulk constructor, half-open, lazy results.
#[derive(Debug, Clone, Copy, Default)]
pub struct LapperStore;

impl<T: Ord + Clone + 'static> Handle<T> for Lapper<T> {
    #[inline]
    fn count(&self, query: NativeQuery) -> usize {
        // results are lazy, count them one at a time
        self.find(query.start, query.stop).count()
    }

    fn hits(&self, query: NativeQuery) -> Vec<(u32, u32, T)> {
        self.find(query.start, query.stop)
            .map(Interval::to_tuple)
            .collect()
    }
}

impl<T: Ord + Clone + 'static> IvStore<T> for LapperStore {
    fn name(&self) -> &'static str {
        LAPPER
    }

    fn native_convention(&self) -> NativeConvention {
        NativeConvention::Fixed(Convention::HalfOpen)
    }

    fn build(&self, intervals: &[Interval<T>]) -> Result<Box<dyn Handle<T>>, BuildError> {
        Ok(Box::new(Lapper::from_slice(intervals)?))
    }
}

/// Adapter over the candidate [`IntervalTree`]: incremental inserts followed by the index step,
/// inclusive by default with an explicit flag, sized results.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeStore;

impl<T: Clone + 'static> Handle<T> for IntervalTree<T> {
    #[inline]
    fn count(&self, query: NativeQuery) -> usize {
        self.search_with(query.start, query.stop, query.inclusive)
            .len()
    }

    fn hits(&self, query: NativeQuery) -> Vec<(u32, u32, T)> {
        self.search_with(query.start, query.stop, query.inclusive)
            .into_iter()
            .map(Interval::to_tuple)
            .collect()
    }
}

impl<T: Clone + 'static> IvStore<T> for TreeStore {
    fn name(&self) -> &'static str {
        TREE
    }

    fn native_convention(&self) -> NativeConvention {
        NativeConvention::Flagged
    }

    fn build(&self, intervals: &[Interval<T>]) -> Result<Box<dyn Handle<T>>, BuildError> {
        let mut builder = TreeBuilder::with_capacity(intervals.len())?;
        for iv in intervals {
            builder.insert((iv.start, iv.stop, iv.val.clone()))?;
        }
        Ok(Box::new(builder.index()?))
    }
}

/// Run `[ql, qr]` under `convention` through the normalizer and the structure, returning the
/// canonical result set.
pub fn query_canonical<T: Ord>(
    store: &dyn IvStore<T>,
    handle: &dyn Handle<T>,
    convention: Convention,
    ql: u32,
    qr: u32,
) -> Result<Hits<T>, NormalizeError> {
    let query = normalize(convention, store.native_convention(), ql, qr)?;
    Ok(Hits::from_tuples(handle.hits(query)))
}

/// Look up an adapter by name.
pub fn lookup<T: Ord + Clone + 'static>(name: &str) -> Option<Box<dyn IvStore<T>>> {
    match name {
        LAPPER => Some(Box::new(LapperStore)),
        TREE => Some(Box::new(TreeStore)),
        _ => None,
    }
}

/// Build a tiny fixed set and check the structure answers it correctly under every convention it
/// can be normalized to.
pub fn probe<T: Ord + Clone + Default>(store: &dyn IvStore<T>) -> Result<(), AdapterError> {
    let fixture: Vec<Interval<T>> = [(10, 20), (20, 30), (40, 50)]
        .iter()
        .map(|&(start, stop)| Interval {
            start,
            stop,
            val: T::default(),
        })
        .collect();
    let handle = store
        .build(&fixture)
        .map_err(|source| AdapterError::ProbeBuild {
            name: store.name(),
            source,
        })?;

    let (start, stop) = (15, 20);
    for convention in Convention::ALL {
        let expected = fixture
            .iter()
            .filter(|iv| match convention {
                Convention::Inclusive => iv.overlap_inclusive(start, stop),
                Convention::HalfOpen => iv.overlap(start, stop),
            })
            .count();
        let query = match normalize(convention, store.native_convention(), start, stop) {
            Ok(query) => query,
            Err(e @ NormalizeError::NoInverse { .. }) => {
                debug!("{}: skipping {} probe: {}", store.name(), convention, e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let found = handle.count(query);
        if found != expected {
            return Err(AdapterError::ProbeQuery {
                name: store.name(),
                start,
                stop,
                found,
                expected,
            });
        }
    }
    Ok(())
}

/// Resolve configured names into the active set. Unknown names and adapters failing their probe
/// are reported once and left out; the run goes on with whatever remains.
pub fn resolve<T>(names: &[String]) -> Vec<Box<dyn IvStore<T>>>
where
    T: Ord + Clone + Default + 'static,
{
    let mut active: Vec<Box<dyn IvStore<T>>> = Vec::with_capacity(names.len());
    for name in names {
        if active.iter().any(|store| store.name() == name.as_str()) {
            warn!("Skipping duplicate implementation: {}", name);
            continue;
        }
        let store = match lookup::<T>(name) {
            Some(store) => store,
            None => {
                warn!("Skipping {}: {}", name, AdapterError::Unknown(name.clone()));
                continue;
            }
        };
        match probe(store.as_ref()) {
            Ok(()) => {
                info!("Using implementation {}", store.name());
                active.push(store);
            }
            Err(e) => warn!("Skipping {}: {}", name, e),
        }
    }
    if active.len() < 2 {
        warn!(
            "{} implementation(s) available; output will not be comparative",
            active.len()
        );
    }
    active
}
