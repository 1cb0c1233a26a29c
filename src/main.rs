use std::{
    io::{self, Write},
    process::ExitCode,
};

use clap::Parser;
use edit::{
    Plumber,
    Query,
    SearchOptions,
    SearchPath,
    cli::{Action, Cli},
    error,
    rank,
    walker,
};
use tracing_subscriber::EnvFilter;

/// Exit status when nothing matched. Shares the value of [`FAILURE`], so
/// scripts only need to test for success; the two differ in that a miss
/// prints nothing.
const NOT_FOUND: u8 = 1;

/// Exit status for runtime failures.
const FAILURE: u8 = 1;

fn init_tracing(verbose: u8) {
    let filter = if let Ok(env) = std::env::var("EDIT_LOG") {
        EnvFilter::new(env)
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(NOT_FOUND),
        Err(e) => {
            eprintln!("edit: {e}");
            ExitCode::from(FAILURE)
        }
    }
}

/// Returns whether anything matched.
fn run(cli: &Cli) -> error::Result<bool> {
    let target = SearchPath::from_env().resolve(&cli.query, &cli.roots);
    let query = Query::parse(&target.query)?;
    let options = if cli.dirs {
        SearchOptions::dirs()
    } else {
        SearchOptions::files()
    };

    tracing::debug!(query = query.as_str(), dirs = ?target.roots, "searching");

    let hits =
        rank::rank(walker::search(&target.roots, &query, &options).collect());
    for hit in &hits {
        tracing::debug!("{hit}");
    }

    match cli.action() {
        Action::List => {
            let mut out = io::stdout().lock();
            for hit in rank::unique(&hits) {
                writeln!(out, "{}", hit.path().display())?;
            }
        }
        Action::First => {
            if let Some(hit) = rank::best(&hits) {
                writeln!(io::stdout().lock(), "{}", hit.path().display())?;
            }
        }
        Action::Open => {
            if let Some(hit) = rank::best(&hits) {
                Plumber::new(&cli.plumber, &cli.dest)
                    .open(&hit.candidate.absolute_path, cli.addr.as_deref())?;
            }
        }
    }

    Ok(!hits.is_empty())
}
