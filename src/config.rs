//! Harness configuration. One explicit value passed to the generator, the comparator and the
//! benchmark driver; nothing is read from global state.
use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::convention::Convention;
use crate::errors::ConfigError;
use crate::generate::clamp_width;

/// Which clock the benchmark driver reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Clock {
    /// Monotonic wall clock.
    Wall,
    /// CPU time consumed by the whole process.
    ProcessCpu,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub seed: u64,
    /// Interval-set sizes swept by the benchmark.
    pub sizes: Vec<usize>,
    /// Number of queries per batch.
    pub n_queries: usize,
    /// Upper bound of the coordinate universe.
    pub max_coord: u32,
    /// Mean of the interval length distribution.
    pub avg_len: u32,
    pub query_widths: Vec<u32>,
    /// Timing repeats per point; the minimum is kept.
    pub repeats: usize,
    /// Implementations to resolve, reference first.
    pub implementations: Vec<String>,
    pub clock: Clock,
    /// Convention the benchmark issues its queries under.
    pub convention: Convention,
    /// Attach `Some(i)` payloads to generated intervals.
    pub labeled: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            seed: 123,
            sizes: vec![1_000, 10_000, 100_000, 300_000, 1_000_000],
            n_queries: 5_000,
            max_coord: 10_000_000,
            avg_len: 500,
            query_widths: vec![1, 10_000, 1_000_000],
            repeats: 3,
            implementations: vec![
                crate::adapter::LAPPER.to_string(),
                crate::adapter::TREE.to_string(),
            ],
            clock: Clock::Wall,
            convention: Convention::HalfOpen,
            labeled: false,
        }
    }
}

impl HarnessConfig {
    /// Defaults used by the differential comparator: a smaller universe, labeled payloads and
    /// 500 queries per batch.
    pub fn differential() -> Self {
        HarnessConfig {
            seed: 7,
            sizes: vec![500, 5_000],
            n_queries: 500,
            max_coord: 1_000_000,
            avg_len: 500,
            query_widths: vec![1, 10, 1_000, 10_000],
            labeled: true,
            ..Default::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Reject what can't be repaired.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_coord < 2 || self.max_coord == u32::MAX {
            return Err(ConfigError::CoordinateUniverse(self.max_coord));
        }
        if self.avg_len == 0 {
            return Err(ConfigError::ZeroAverageLength);
        }
        if self.sizes.is_empty() {
            return Err(ConfigError::NoSizes);
        }
        if self.query_widths.is_empty() {
            return Err(ConfigError::NoWidths);
        }
        if self.n_queries == 0 {
            return Err(ConfigError::NoQueries);
        }
        Ok(())
    }

    /// Validate, then clamp recoverable values into range. Every clamp is logged. Widths that
    /// collapse onto the same value after clamping are kept once.
    pub fn clamped(mut self) -> Result<Self, ConfigError> {
        self.validate()?;
        let max_coord = self.max_coord;
        let mut widths: Vec<u32> = Vec::with_capacity(self.query_widths.len());
        for &w in &self.query_widths {
            let w = clamp_width(w, max_coord);
            if widths.contains(&w) {
                warn!("Query width {} given more than once after clamping; keeping one", w);
                continue;
            }
            widths.push(w);
        }
        self.query_widths = widths;
        if self.repeats == 0 {
            warn!("repeats must be at least 1; using 1");
            self.repeats = 1;
        }
        Ok(self)
    }
}

/// Settings of a differential run over a grid of seeds, sizes and widths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub seeds: Vec<u64>,
    pub sizes: Vec<usize>,
    pub widths: Vec<u32>,
    pub n_queries: usize,
    pub max_coord: u32,
    pub avg_len: u32,
    pub conventions: Vec<Convention>,
}

impl Default for GridConfig {
    fn default() -> Self {
        let base = HarnessConfig::differential();
        GridConfig {
            seeds: vec![7, 123, 99_991],
            sizes: base.sizes,
            widths: base.query_widths,
            n_queries: base.n_queries,
            max_coord: base.max_coord,
            avg_len: base.avg_len,
            conventions: Convention::ALL.to_vec(),
        }
    }
}

impl GridConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Reject a grid that would compare nothing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seeds.is_empty() {
            return Err(ConfigError::NoSeeds);
        }
        if self.sizes.is_empty() {
            return Err(ConfigError::NoSizes);
        }
        if self.widths.is_empty() {
            return Err(ConfigError::NoWidths);
        }
        if self.conventions.is_empty() {
            return Err(ConfigError::NoConventions);
        }
        if self.n_queries == 0 {
            return Err(ConfigError::NoQueries);
        }
        Ok(())
    }

    /// The harness configuration for one (seed, size, width) cell.
    pub fn cell(&self, seed: u64, size: usize, width: u32) -> HarnessConfig {
        HarnessConfig {
            seed,
            sizes: vec![size],
            n_queries: self.n_queries,
            max_coord: self.max_coord,
            avg_len: self.avg_len,
            query_widths: vec![width],
            labeled: true,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        assert!(HarnessConfig::default().validate().is_ok());
        assert!(HarnessConfig::differential().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config = HarnessConfig::from_toml_str(
            r#"
            seed = 42
            sizes = [10, 20]
            clock = "process-cpu"
            convention = "inclusive"
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.sizes, vec![10, 20]);
        assert_eq!(config.clock, Clock::ProcessCpu);
        assert_eq!(config.convention, Convention::Inclusive);
        assert_eq!(config.n_queries, 5_000);
        assert_eq!(config.implementations, vec!["lapper", "tree"]);
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            HarnessConfig::from_toml_str("seed = \"seven\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_coord = 1000\nquery_widths = [1, 5000]").unwrap();
        let config = HarnessConfig::from_path(file.path()).unwrap();
        assert_eq!(config.max_coord, 1_000);
        assert!(matches!(
            HarnessConfig::from_path("/nonexistent/ivcompare.toml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_clamped() {
        let config = HarnessConfig {
            max_coord: 1_000,
            query_widths: vec![0, 10, 1_000, 50_000],
            repeats: 0,
            ..Default::default()
        }
        .clamped()
        .unwrap();
        assert_eq!(config.query_widths, vec![1, 10, 999]);
        assert_eq!(config.repeats, 1);
    }

    #[test]
    fn test_unrepairable() {
        let bad = |config: HarnessConfig| config.clamped().is_err();
        assert!(bad(HarnessConfig { max_coord: 1, ..Default::default() }));
        assert!(bad(HarnessConfig { avg_len: 0, ..Default::default() }));
        assert!(bad(HarnessConfig { sizes: vec![], ..Default::default() }));
        assert!(bad(HarnessConfig { query_widths: vec![], ..Default::default() }));
        assert!(matches!(
            HarnessConfig { n_queries: 0, ..Default::default() }.clamped(),
            Err(ConfigError::NoQueries)
        ));
    }

    #[test]
    fn test_clamped_widths_are_unique() {
        let config = HarnessConfig {
            max_coord: 1_000,
            query_widths: vec![0, 1, 50_000, 2_000, 10],
            ..Default::default()
        }
        .clamped()
        .unwrap();
        assert_eq!(config.query_widths, vec![1, 999, 10]);
    }

    #[test]
    fn test_empty_grid_is_rejected() {
        assert!(GridConfig::default().validate().is_ok());
        let check = |grid: GridConfig| grid.validate().unwrap_err();
        assert!(matches!(check(GridConfig { seeds: vec![], ..Default::default() }), ConfigError::NoSeeds));
        assert!(matches!(check(GridConfig { sizes: vec![], ..Default::default() }), ConfigError::NoSizes));
        assert!(matches!(check(GridConfig { widths: vec![], ..Default::default() }), ConfigError::NoWidths));
        assert!(matches!(check(GridConfig { conventions: vec![], ..Default::default() }), ConfigError::NoConventions));
        assert!(matches!(check(GridConfig { n_queries: 0, ..Default::default() }), ConfigError::NoQueries));
    }

    #[test]
    fn test_grid_cell() {
        let grid = GridConfig::default();
        assert_eq!(grid.seeds, vec![7, 123, 99_991]);
        let cell = grid.cell(99_991, 5_000, 10);
        assert_eq!((cell.seed, cell.sizes[0], cell.query_widths[0]), (99_991, 5_000, 10));
        assert!(cell.labeled);
        assert_eq!(cell.max_coord, 1_000_000);
    }

    #[test]
    fn test_grid_from_toml() {
        let grid = GridConfig::from_toml_str(
            r#"
            seeds = [1]
            conventions = ["half-open"]
            "#,
        )
        .unwrap();
        assert_eq!(grid.seeds, vec![1]);
        assert_eq!(grid.conventions, vec![Convention::HalfOpen]);
        assert_eq!(grid.widths, vec![1, 10, 1_000, 10_000]);
    }
}
