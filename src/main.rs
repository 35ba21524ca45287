mod cli;
mod handlers;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "ivcompare";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Seth Stadick")
        .about("Differential checking and benchmarking of interval overlap structures.")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log debug output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(cli::create_compare_cli())
        .subcommand(cli::create_bench_cli())
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    let level = if matches.get_flag("verbose") {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match matches.subcommand() {
        //
        // DIFFERENTIAL CHECK
        //
        Some((cli::COMPARE_CMD, matches)) => {
            handlers::run_compare(matches)?;
        }

        //
        // BENCHMARK SWEEP
        //
        Some((cli::BENCH_CMD, matches)) => {
            handlers::run_bench(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
