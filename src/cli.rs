use clap::{arg, value_parser, Arg, ArgAction, Command};

use ivcompare::{LAPPER, TREE};

pub const COMPARE_CMD: &str = "compare";
pub const BENCH_CMD: &str = "bench";

pub fn create_compare_cli() -> Command {
    Command::new(COMPARE_CMD)
        .about("Check that two implementations return identical results for every generated query")
        .arg(arg!(-c --config <config> "TOML file with the grid to run"))
        .arg(
            arg!(--reference <reference> "Implementation whose answers are taken as correct")
                .default_value(LAPPER),
        )
        .arg(arg!(--candidate <candidate> "Implementation under test").default_value(TREE))
        .arg(arg!(--convention <convention> "Only check one convention (inclusive or half-open)"))
        .arg(
            Arg::new("seeds")
                .long("seeds")
                .value_name("SEED")
                .help("Comma separated seeds")
                .value_delimiter(',')
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("sizes")
                .long("sizes")
                .value_name("N")
                .help("Comma separated interval-set sizes")
                .value_delimiter(',')
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("widths")
                .long("widths")
                .value_name("WIDTH")
                .help("Comma separated query widths")
                .value_delimiter(',')
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("queries")
                .short('q')
                .long("queries")
                .value_name("NUMBER")
                .help("Queries per batch")
                .value_parser(value_parser!(usize)),
        )
}

pub fn create_bench_cli() -> Command {
    Command::new(BENCH_CMD)
        .about("Time building and querying every implementation across sizes and query widths")
        .arg(arg!(-c --config <config> "TOML file with the sweep settings"))
        .arg(
            Arg::new("sizes")
                .long("sizes")
                .value_name("N")
                .help("Comma separated interval-set sizes")
                .value_delimiter(',')
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("repeats")
                .short('r')
                .long("repeats")
                .value_name("NUMBER")
                .help("Timing repeats per point, the fastest is kept")
                .value_parser(value_parser!(usize)),
        )
        .arg(arg!(--clock <clock> "wall or process-cpu"))
        .arg(arg!(--convention <convention> "Convention the queries are issued under"))
        .arg(
            arg!(-f --format <format> "Output format for the timing table (tsv or json)")
                .default_value("tsv"),
        )
        .arg(arg!(-o --output <output> "Write the timing table here instead of stdout"))
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Don't write the timing table, only log the summary")
                .action(ArgAction::SetTrue),
        )
}
