//! Flattening of a [`BenchTable`] into time-series rows for an external renderer.
//!
//! Rows are keyed by (implementation, size, width, phase). Build rows carry no width. Undefined
//! timings stay `NaN`: TSV prints them literally, JSON writes `null`.
use std::io::Write;

use serde::Serialize;

use crate::bench::BenchTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Build,
    Query,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub implementation: String,
    pub size: usize,
    pub width: Option<u32>,
    pub phase: Phase,
    pub seconds: f64,
    /// Queries per second; only set for the query phase.
    pub throughput: Option<f64>,
}

/// Every timing in the table, build rows first, then queries by width.
pub fn samples(table: &BenchTable) -> Vec<Sample> {
    let mut out = Vec::new();
    for series in &table.series {
        for (s, &size) in table.sizes.iter().enumerate() {
            if let Some(&seconds) = series.build.get(s) {
                out.push(Sample {
                    implementation: series.name.clone(),
                    size,
                    width: None,
                    phase: Phase::Build,
                    seconds,
                    throughput: None,
                });
            }
        }
        for (w, &width) in table.widths.iter().enumerate() {
            for (s, &size) in table.sizes.iter().enumerate() {
                let seconds = match series.query.get(w).and_then(|q| q.get(s)) {
                    Some(&seconds) => seconds,
                    None => continue,
                };
                let throughput = series
                    .throughput
                    .get(w)
                    .and_then(|t| t.get(s))
                    .copied();
                out.push(Sample {
                    implementation: series.name.clone(),
                    size,
                    width: Some(width),
                    phase: Phase::Query,
                    seconds,
                    throughput,
                });
            }
        }
    }
    out
}

pub fn write_tsv<W: Write>(samples: &[Sample], mut writer: W) -> std::io::Result<()> {
    writeln!(writer, "implementation\tsize\twidth\tphase\tseconds\tthroughput")?;
    for sample in samples {
        let width = sample.width.map(|w| w.to_string()).unwrap_or_default();
        let phase = match sample.phase {
            Phase::Build => "build",
            Phase::Query => "query",
        };
        let throughput = sample
            .throughput
            .map(|t| format!("{:.0}", t))
            .unwrap_or_default();
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{:.6}\t{}",
            sample.implementation, sample.size, width, phase, sample.seconds, throughput
        )?;
    }
    Ok(())
}

pub fn write_json<W: Write>(samples: &[Sample], writer: W) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, samples)
}

/// Console summary in the order the sweep produced it.
pub fn summary_lines(table: &BenchTable) -> Vec<String> {
    let mut lines = Vec::new();
    for (s, size) in table.sizes.iter().enumerate() {
        lines.push(format!("=== N={} ===", size));
        for series in &table.series {
            if let Some(t) = series.build.get(s) {
                lines.push(format!("{}: build {:.4}s", series.name, t));
            }
            for (w, width) in table.widths.iter().enumerate() {
                let t = series.query.get(w).and_then(|q| q.get(s));
                let qps = series.throughput.get(w).and_then(|q| q.get(s));
                if let (Some(t), Some(qps)) = (t, qps) {
                    lines.push(format!(
                        "{}: search width={} total {:.4}s ({:.0} q/s)",
                        series.name, width, t, qps
                    ));
                }
            }
        }
    }
    lines
}
