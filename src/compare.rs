//! Differential comparison of a reference and a candidate structure.
//!
//! Both structures are built from the same intervals and asked the same queries under the same
//! convention. Every single query must produce exactly the same canonical result set; the first
//! query that does not is reported with its bounds, the convention and the symmetric difference
//! of the two sets so it can be replayed from the seed.
use std::fmt::Debug;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::adapter::{query_canonical, Handle, IvStore};
use crate::config::GridConfig;
use crate::convention::Convention;
use crate::errors::CompareError;
use crate::generate::{generate_intervals, generate_queries};
use crate::interval::{Interval, Payload, Query};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompareSummary {
    /// Queries checked.
    pub queries: usize,
    /// Sum of result set sizes over all queries.
    pub total_hits: usize,
    /// Queries whose result set was empty for both structures.
    pub empty_queries: usize,
}

impl CompareSummary {
    fn merge(&mut self, other: CompareSummary) {
        self.queries += other.queries;
        self.total_hits += other.total_hits;
        self.empty_queries += other.empty_queries;
    }
}

fn build<T>(
    store: &dyn IvStore<T>,
    intervals: &[Interval<T>],
) -> Result<Box<dyn Handle<T>>, CompareError> {
    store.build(intervals).map_err(|source| CompareError::Build {
        name: store.name(),
        source,
    })
}

/// Build both structures from `intervals` and require equal result sets for every query.
pub fn compare_batch<T>(
    reference: &dyn IvStore<T>,
    candidate: &dyn IvStore<T>,
    intervals: &[Interval<T>],
    queries: &[Query],
    convention: Convention,
) -> Result<CompareSummary, CompareError>
where
    T: Ord + Clone + Debug,
{
    let reference_handle = build(reference, intervals)?;
    let candidate_handle = build(candidate, intervals)?;

    let mut summary = CompareSummary::default();
    for query in queries {
        let expected = query_canonical(
            reference,
            reference_handle.as_ref(),
            convention,
            query.start,
            query.stop,
        )?;
        let found = query_canonical(
            candidate,
            candidate_handle.as_ref(),
            convention,
            query.start,
            query.stop,
        )?;

        if expected != found {
            let (only_reference, only_candidate) = expected.symmetric_difference(&found);
            return Err(CompareError::Mismatch {
                start: query.start,
                stop: query.stop,
                convention,
                reference: reference.name(),
                candidate: candidate.name(),
                only_reference: only_reference.iter().map(|t| format!("{:?}", t)).collect(),
                only_candidate: only_candidate.iter().map(|t| format!("{:?}", t)).collect(),
            });
        }

        summary.queries += 1;
        summary.total_hits += expected.len();
        if expected.is_empty() {
            summary.empty_queries += 1;
        }
    }
    Ok(summary)
}

/// Run [`compare_batch`] over every (seed, size, width, convention) cell of the grid.
///
/// A grid that would check nothing is a [`ConfigError`](crate::ConfigError), never a pass.
///
/// Each (seed, size, width) cell gets a fresh rng seeded with `seed`; intervals are drawn first,
/// then the queries, from that single stream.
pub fn compare_grid(
    grid: &GridConfig,
    reference: &dyn IvStore<Payload>,
    candidate: &dyn IvStore<Payload>,
) -> Result<CompareSummary, CompareError> {
    grid.validate()?;
    let mut total = CompareSummary::default();
    for &seed in &grid.seeds {
        for &size in &grid.sizes {
            for &width in &grid.widths {
                let cell = grid.cell(seed, size, width).clamped()?;
                let mut rng = StdRng::seed_from_u64(seed);
                let intervals = generate_intervals(
                    size,
                    cell.max_coord,
                    cell.avg_len,
                    cell.labeled,
                    &mut rng,
                )?;
                let queries =
                    generate_queries(cell.n_queries, cell.max_coord, cell.query_widths[0], &mut rng)?;

                for &convention in &grid.conventions {
                    let summary =
                        compare_batch(reference, candidate, &intervals, &queries, convention)?;
                    debug!(
                        "seed={} n={} width={} {}: {} queries, {} hits",
                        seed, size, width, convention, summary.queries, summary.total_hits
                    );
                    total.merge(summary);
                }
            }
        }
    }
    info!(
        "{} vs {}: {} queries matched ({} hits, {} empty)",
        reference.name(),
        candidate.name(),
        total.queries,
        total.total_hits,
        total.empty_queries
    );
    Ok(total)
}
