use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{anyhow, bail, Context, Result};
use clap::ArgMatches;
use log::{error, info};

use ivcompare::{
    compare_grid, resolve, run_sweep, samples, summary_lines, write_json, write_tsv, Clock,
    CompareError, Convention, GridConfig, HarnessConfig, Payload,
};

enum OutputFormat {
    Tsv,
    Json,
}

fn parse_convention(raw: &str) -> Result<Convention> {
    raw.parse::<Convention>().map_err(|e| anyhow!(e))
}

fn parse_clock(raw: &str) -> Result<Clock> {
    match raw {
        "wall" => Ok(Clock::Wall),
        "process-cpu" | "cpu" => Ok(Clock::ProcessCpu),
        _ => Err(anyhow!(
            "Invalid clock: {}. Valid options are 'wall' or 'process-cpu'",
            raw
        )),
    }
}

pub fn run_compare(matches: &ArgMatches) -> Result<()> {
    let mut grid = match matches.get_one::<String>("config") {
        Some(path) => GridConfig::from_path(path)
            .with_context(|| format!("Failed to read grid config {}", path))?,
        None => GridConfig::default(),
    };
    if let Some(raw) = matches.get_one::<String>("convention") {
        grid.conventions = vec![parse_convention(raw)?];
    }
    if let Some(seeds) = matches.get_many::<u64>("seeds") {
        grid.seeds = seeds.copied().collect();
    }
    if let Some(sizes) = matches.get_many::<usize>("sizes") {
        grid.sizes = sizes.copied().collect();
    }
    if let Some(widths) = matches.get_many::<u32>("widths") {
        grid.widths = widths.copied().collect();
    }
    if let Some(&n) = matches.get_one::<usize>("queries") {
        grid.n_queries = n;
    }

    let default_reference = ivcompare::LAPPER.to_string();
    let reference = matches
        .get_one::<String>("reference")
        .unwrap_or(&default_reference);
    let default_candidate = ivcompare::TREE.to_string();
    let candidate = matches
        .get_one::<String>("candidate")
        .unwrap_or(&default_candidate);

    let active = resolve::<Payload>(&[reference.clone(), candidate.clone()]);
    if active.len() < 2 {
        bail!(
            "Need two usable implementations to compare, got {} ({} vs {})",
            active.len(),
            reference,
            candidate
        );
    }

    match compare_grid(&grid, active[0].as_ref(), active[1].as_ref()) {
        Ok(summary) => {
            info!(
                "OK: {} queries over {} seeds, {} sizes, {} widths",
                summary.queries,
                grid.seeds.len(),
                grid.sizes.len(),
                grid.widths.len()
            );
            Ok(())
        }
        Err(e @ CompareError::Mismatch { .. }) => {
            error!("{}", e);
            bail!("{} and {} disagree", reference, candidate)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn run_bench(matches: &ArgMatches) -> Result<()> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => HarnessConfig::from_path(path)
            .with_context(|| format!("Failed to read bench config {}", path))?,
        None => HarnessConfig::default(),
    };
    if let Some(sizes) = matches.get_many::<usize>("sizes") {
        config.sizes = sizes.copied().collect();
    }
    if let Some(&repeats) = matches.get_one::<usize>("repeats") {
        config.repeats = repeats;
    }
    if let Some(raw) = matches.get_one::<String>("clock") {
        config.clock = parse_clock(raw)?;
    }
    if let Some(raw) = matches.get_one::<String>("convention") {
        config.convention = parse_convention(raw)?;
    }

    let default_format = "tsv".to_string();
    let format = match matches
        .get_one::<String>("format")
        .unwrap_or(&default_format)
        .as_str()
    {
        "tsv" => OutputFormat::Tsv,
        "json" => OutputFormat::Json,
        other => bail!(
            "Invalid format: {}. Valid options are 'tsv' or 'json'",
            other
        ),
    };

    let stores = resolve::<Payload>(&config.implementations);
    let table = run_sweep(&config, &stores)?;
    for line in summary_lines(&table) {
        info!("{}", line);
    }

    if matches.get_flag("quiet") {
        return Ok(());
    }
    let writer: Box<dyn Write> = match matches.get_one::<String>("output") {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let rows = samples(&table);
    match format {
        OutputFormat::Tsv => write_tsv(&rows, writer)?,
        OutputFormat::Json => write_json(&rows, writer)?,
    }
    Ok(())
}
