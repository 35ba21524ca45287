//! This crate checks that two independently written interval overlap structures agree, and
//! measures how fast each of them is.
//! ## Features
//! - Seeded generation of interval sets (exponential lengths) and fixed-width query batches
//! - One capability interface, [`IvStore`], over structures that are built and queried in
//! different ways
//! - Normalization between inclusive and half-open query conventions
//! - A differential comparator that checks every query of a batch, payloads included
//! - A best-of-N benchmark sweep over interval-set sizes and query widths
//!
//! ## Details:
//!
//! ```text
//!       0  1  2  3  4  5  6  7  8  9  10 11
//! [0,10) X  X  X  X  X  X  X  X  X  X
//! [2,5)        X  X  X
//! [5,9)                 X  X  X  X
//! [8,11)                         X  X  X
//!
//! Half-open query [9, 10): [0,10), [8,11)
//! Inclusive query [9, 10]: [0,10), [8,11)
//! Half-open query [4, 5):  [0,10), [2,5)
//! Inclusive query [4, 5]:  [0,10), [2,5), [5,9)
//! ```
//! Intervals always cover the positions start .. stop. Only the query stop changes meaning
//! between conventions, so an inclusive query `[ql, qr]` is the half-open query `[ql, qr + 1)`.
//!
//! ```rust
//! use ivcompare::{compare_batch, Convention, Interval, LapperStore, Query, TreeStore};
//!
//! let intervals = vec![
//!     Interval { start: 0, stop: 10, val: Some(0) },
//!     Interval { start: 5, stop: 9, val: Some(1) },
//! ];
//! let queries = vec![Query { start: 4, stop: 5 }, Query { start: 9, stop: 12 }];
//! let summary = compare_batch(&LapperStore, &TreeStore, &intervals, &queries, Convention::Inclusive).unwrap();
//! assert_eq!(summary.queries, 2);
//! ```
mod adapter;
mod bench;
mod compare;
mod config;
mod convention;
mod errors;
mod generate;
mod interval;
mod lapper;
mod report;
mod tree;

// Rexport to flatten structure
pub use self::adapter::{
    lookup, probe, query_canonical, resolve, Handle, IvStore, LapperStore, TreeStore, LAPPER, TREE,
};
pub use self::bench::{run_sweep, time_best_of, BenchTable, Series};
pub use self::compare::{compare_batch, compare_grid, CompareSummary};
pub use self::config::{Clock, GridConfig, HarnessConfig};
pub use self::convention::{normalize, Convention, Hits, NativeConvention, NativeQuery};
pub use self::errors::{AdapterError, BuildError, CompareError, ConfigError, NormalizeError};
pub use self::generate::{clamp_width, generate_intervals, generate_queries};
pub use self::interval::{Interval, Payload, Query};
pub use self::lapper::{IterFind, Lapper};
pub use self::report::{samples, summary_lines, write_json, write_tsv, Phase, Sample};
pub use self::tree::{IntervalTree, TreeBuilder};
