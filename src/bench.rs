//! The benchmark driver: a single threaded sweep over interval-set sizes, query widths and
//! implementations.
//!
//! For every size one interval set and one query batch per width are generated and shared by all
//! implementations. Each implementation is then timed with a best-of-N strategy: `repeats` builds,
//! keeping the fastest, followed by one fresh build whose handle serves every query batch at that
//! size. A batch is likewise run `repeats` times and the fastest total kept, from which
//! throughput is derived. A build that fails records `NaN` for the build and every width of that
//! (implementation, size) and the sweep moves on.
use std::hint::black_box;
use std::time::Instant;

use cpu_time::ProcessTime;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::adapter::{Handle, IvStore};
use crate::config::{Clock, HarnessConfig};
use crate::convention::{normalize, NativeQuery};
use crate::errors::{BuildError, ConfigError};
use crate::generate::{generate_intervals, generate_queries};
use crate::interval::{Interval, Payload, Query};

/// Throughput is allowed to grow by this factor between consecutive sizes before the soft
/// monotonicity check complains.
const MONOTONIC_SLACK: f64 = 1.25;

enum Stopwatch {
    Wall(Instant),
    Cpu(ProcessTime),
}

impl Stopwatch {
    fn start(clock: Clock) -> Self {
        match clock {
            Clock::Wall => Stopwatch::Wall(Instant::now()),
            Clock::ProcessCpu => match ProcessTime::try_now() {
                Ok(now) => Stopwatch::Cpu(now),
                Err(_) => Stopwatch::Wall(Instant::now()),
            },
        }
    }

    fn elapsed_secs(&self) -> f64 {
        match self {
            Stopwatch::Wall(t0) => t0.elapsed().as_secs_f64(),
            Stopwatch::Cpu(t0) => t0
                .try_elapsed()
                .map(|d| d.as_secs_f64())
                .unwrap_or(f64::NAN),
        }
    }
}

/// Run `f` `repeats` times (at least once) and return the smallest elapsed time in seconds.
pub fn time_best_of<F, R>(repeats: usize, clock: Clock, mut f: F) -> f64
where
    F: FnMut() -> R,
{
    let mut best = f64::INFINITY;
    for _ in 0..repeats.max(1) {
        let watch = Stopwatch::start(clock);
        black_box(f());
        let dt = watch.elapsed_secs();
        if dt < best {
            best = dt;
        }
    }
    best
}

/// Best-of-N build time, then one more build whose handle is kept for querying.
fn time_build(
    store: &dyn IvStore<Payload>,
    intervals: &[Interval<Payload>],
    repeats: usize,
    clock: Clock,
) -> Result<(f64, Box<dyn Handle<Payload>>), BuildError> {
    let mut best = f64::INFINITY;
    for _ in 0..repeats.max(1) {
        let watch = Stopwatch::start(clock);
        let handle = store.build(intervals)?;
        let dt = watch.elapsed_secs();
        drop(handle);
        if dt < best {
            best = dt;
        }
    }
    Ok((best, store.build(intervals)?))
}

/// Timings of one implementation across the sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    /// Build time per size.
    pub build: Vec<f64>,
    /// Total batch time, indexed `[width][size]`.
    pub query: Vec<Vec<f64>>,
    /// Queries per second, indexed `[width][size]`.
    pub throughput: Vec<Vec<f64>>,
}

impl Series {
    fn new(name: &str, widths: usize) -> Self {
        Series {
            name: name.to_string(),
            build: Vec::new(),
            query: vec![Vec::new(); widths],
            throughput: vec![Vec::new(); widths],
        }
    }

    fn push_failed(&mut self) {
        self.build.push(f64::NAN);
        for w in 0..self.query.len() {
            self.query[w].push(f64::NAN);
            self.throughput[w].push(f64::NAN);
        }
    }
}

/// Output of a sweep: `implementation -> size -> build time` and
/// `implementation -> width -> size -> (query time, throughput)`.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchTable {
    pub sizes: Vec<usize>,
    pub widths: Vec<u32>,
    pub n_queries: usize,
    /// One entry per implementation, in resolution order.
    pub series: Vec<Series>,
}

impl BenchTable {
    fn series(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }

    fn size_idx(&self, size: usize) -> Option<usize> {
        self.sizes.iter().position(|&s| s == size)
    }

    fn width_idx(&self, width: u32) -> Option<usize> {
        self.widths.iter().position(|&w| w == width)
    }

    pub fn implementations(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.name.as_str())
    }

    pub fn build_time(&self, name: &str, size: usize) -> Option<f64> {
        let s = self.size_idx(size)?;
        self.series(name)?.build.get(s).copied()
    }

    pub fn query_time(&self, name: &str, width: u32, size: usize) -> Option<f64> {
        let (w, s) = (self.width_idx(width)?, self.size_idx(size)?);
        self.series(name)?.query.get(w)?.get(s).copied()
    }

    pub fn throughput(&self, name: &str, width: u32, size: usize) -> Option<f64> {
        let (w, s) = (self.width_idx(width)?, self.size_idx(size)?);
        self.series(name)?.throughput.get(w)?.get(s).copied()
    }

    /// Soft sanity check on the timing methodology: for a fixed implementation and width,
    /// throughput should not go up as the set grows. Returns `(implementation, width, size)` for
    /// every size where it clearly did. Never an error.
    pub fn monotonicity_violations(&self) -> Vec<(String, u32, usize)> {
        let mut out = Vec::new();
        for series in &self.series {
            for (w, per_size) in series.throughput.iter().enumerate() {
                for s in 1..per_size.len() {
                    let (prev, cur) = (per_size[s - 1], per_size[s]);
                    if prev.is_finite() && cur.is_finite() && cur > prev * MONOTONIC_SLACK {
                        out.push((series.name.clone(), self.widths[w], self.sizes[s]));
                    }
                }
            }
        }
        out
    }
}

/// Run the full sweep described by `config` over the active implementations.
pub fn run_sweep(
    config: &HarnessConfig,
    stores: &[Box<dyn IvStore<Payload>>],
) -> Result<BenchTable, ConfigError> {
    let config = config.clone().clamped()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut table = BenchTable {
        sizes: config.sizes.clone(),
        widths: config.query_widths.clone(),
        n_queries: config.n_queries,
        series: stores
            .iter()
            .map(|store| Series::new(store.name(), config.query_widths.len()))
            .collect(),
    };
    if stores.is_empty() {
        warn!("No implementations available, nothing to benchmark");
        return Ok(table);
    }

    for &n in &config.sizes {
        info!("=== N={} ===", n);
        let intervals = generate_intervals(
            n,
            config.max_coord,
            config.avg_len,
            config.labeled,
            &mut rng,
        )?;
        // same queries for every implementation
        let queries_by_width = config
            .query_widths
            .iter()
            .map(|&w| generate_queries(config.n_queries, config.max_coord, w, &mut rng))
            .collect::<Result<Vec<Vec<Query>>, ConfigError>>()?;

        for (store, series) in stores.iter().zip(table.series.iter_mut()) {
            let handle = match time_build(store.as_ref(), &intervals, config.repeats, config.clock)
            {
                Ok((t_build, handle)) => {
                    info!("{}: build {:.4}s", store.name(), t_build);
                    series.build.push(t_build);
                    handle
                }
                Err(e) => {
                    warn!("{}: build failed at N={}: {}", store.name(), n, e);
                    series.push_failed();
                    continue;
                }
            };

            for (w, queries) in queries_by_width.iter().enumerate() {
                let width = config.query_widths[w];
                let native = match queries
                    .iter()
                    .map(|q| normalize(config.convention, store.native_convention(), q.start, q.stop))
                    .collect::<Result<Vec<NativeQuery>, _>>()
                {
                    Ok(native) => native,
                    Err(e) => {
                        warn!("{}: can't issue width={} queries: {}", store.name(), width, e);
                        series.query[w].push(f64::NAN);
                        series.throughput[w].push(f64::NAN);
                        continue;
                    }
                };

                let t_query = time_best_of(config.repeats, config.clock, || {
                    native.iter().map(|&q| handle.count(q)).sum::<usize>()
                });
                let qps = config.n_queries as f64 / t_query;
                info!(
                    "{}: search width={} total {:.4}s ({:.0} q/s)",
                    store.name(),
                    width,
                    t_query,
                    qps
                );
                series.query[w].push(t_query);
                series.throughput[w].push(qps);
            }
        }
    }

    for (name, width, size) in table.monotonicity_violations() {
        warn!(
            "{}: throughput went up at N={} for width={}; timings may be noisy",
            name, size, width
        );
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{resolve, LAPPER, TREE};
    use std::thread::sleep;
    use std::time::Duration;

    struct Exhausted;

    impl IvStore<Payload> for Exhausted {
        fn name(&self) -> &'static str {
            "exhausted"
        }

        fn native_convention(&self) -> crate::convention::NativeConvention {
            crate::convention::NativeConvention::Flagged
        }

        fn build(&self, intervals: &[Interval<Payload>]) -> Result<Box<dyn Handle<Payload>>, BuildError> {
            Err(BuildError::ResourceExhausted {
                structure: "exhausted",
                requested: intervals.len(),
            })
        }
    }

    fn small_config() -> HarnessConfig {
        HarnessConfig {
            sizes: vec![100, 1_000],
            n_queries: 50,
            max_coord: 100_000,
            query_widths: vec![1, 100],
            repeats: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_best_of_keeps_minimum() {
        let mut delays = vec![40u64, 10, 40].into_iter();
        let best = time_best_of(3, Clock::Wall, || {
            sleep(Duration::from_millis(delays.next().unwrap_or(0)))
        });
        assert!(best >= 0.010, "{}", best);
        assert!(best < 0.040, "{}", best);
    }

    #[test]
    fn test_best_of_runs_at_least_once() {
        let mut calls = 0;
        time_best_of(0, Clock::Wall, || calls += 1);
        assert_eq!(calls, 1);
        let mut calls = 0;
        time_best_of(4, Clock::ProcessCpu, || calls += 1);
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_sweep_shape() {
        let stores = resolve::<Payload>(&[LAPPER.to_string(), TREE.to_string()]);
        let table = run_sweep(&small_config(), &stores).unwrap();
        assert_eq!(table.implementations().collect::<Vec<_>>(), vec![LAPPER, TREE]);
        for name in [LAPPER, TREE] {
            for &size in &[100, 1_000] {
                let build = table.build_time(name, size).unwrap();
                assert!(build.is_finite() && build >= 0.0);
                for &width in &[1, 100] {
                    assert!(!table.query_time(name, width, size).unwrap().is_nan());
                    assert!(table.throughput(name, width, size).unwrap() > 0.0);
                }
            }
        }
        assert_eq!(table.build_time(LAPPER, 7), None);
        assert_eq!(table.query_time("nope", 1, 100), None);
    }

    #[test]
    fn test_failed_build_records_nan_and_continues() {
        let stores: Vec<Box<dyn IvStore<Payload>>> = vec![
            Box::new(Exhausted),
            Box::new(crate::adapter::LapperStore),
        ];
        let table = run_sweep(&small_config(), &stores).unwrap();
        for &size in &[100, 1_000] {
            assert!(table.build_time("exhausted", size).unwrap().is_nan());
            assert!(table.query_time("exhausted", 1, size).unwrap().is_nan());
            assert!(table.throughput("exhausted", 100, size).unwrap().is_nan());
            assert!(table.build_time(LAPPER, size).unwrap().is_finite());
            assert!(!table.throughput(LAPPER, 100, size).unwrap().is_nan());
        }
    }

    #[test]
    fn test_no_implementations() {
        let table = run_sweep(&small_config(), &[]).unwrap();
        assert!(table.series.is_empty());
    }

    #[test]
    fn test_invalid_config() {
        let config = HarnessConfig { sizes: vec![], ..small_config() };
        assert!(run_sweep(&config, &[]).is_err());
    }

    #[test]
    fn test_zero_queries_is_rejected() {
        let stores = resolve::<Payload>(&[LAPPER.to_string()]);
        let config = HarnessConfig { n_queries: 0, sizes: vec![100], query_widths: vec![10], ..small_config() };
        assert!(matches!(run_sweep(&config, &stores), Err(ConfigError::NoQueries)));
    }

    #[test]
    fn test_clamped_widths_key_the_table() {
        let stores = resolve::<Payload>(&[LAPPER.to_string()]);
        let config = HarnessConfig {
            max_coord: 1_000,
            query_widths: vec![50_000, 5_000, 10],
            ..small_config()
        };
        let table = run_sweep(&config, &stores).unwrap();
        assert_eq!(table.widths, vec![999, 10]);
        assert!(table.throughput(LAPPER, 999, 100).unwrap() > 0.0);
        assert_eq!(table.series[0].query.len(), 2);
    }

    #[test]
    fn test_monotonicity_violations() {
        let table = BenchTable {
            sizes: vec![10, 100, 1_000],
            widths: vec![1],
            n_queries: 10,
            series: vec![Series {
                name: "x".to_string(),
                build: vec![0.1, 0.2, 0.3],
                query: vec![vec![1.0, 1.0, 1.0]],
                throughput: vec![vec![100.0, 90.0, 500.0]],
            }],
        };
        assert_eq!(table.monotonicity_violations(), vec![("x".to_string(), 1, 1_000)]);
    }
}
