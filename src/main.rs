#![forbid(unsafe_code)]

use error_iter::ErrorIter as _;
use is_terminal::IsTerminal as _;
use onlyargs::CliError;
use onlyargs_derive::OnlyArgs;
use spendcount::client::{ClientApi as _, StatementClient};
use spendcount::export;
use spendcount::imports::roster::read_roster;
use spendcount::model::{Analyzer, Dataset, Stats};
use spendcount::monoda::personal::AccountId;
use spendcount::sink::{ChartSink as _, TextSink};
use spendcount::util::clock::SystemClock;
use std::fs::File;
use std::io::{self, BufWriter, Write as _};
use std::path::PathBuf;
use std::{env, process::ExitCode, sync::Arc};
use thiserror::Error;
use tracing::{debug, error};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::prelude::*;

const DEFAULT_MONOBANK_URL: &str = "https://api.monobank.ua/";

#[derive(Debug, OnlyArgs)]
#[footer = "Additional environment variables:"]
#[footer = "  - MONOBANK_URL accepts a http: or https: URL"]
#[footer = "      default is \"https://api.monobank.ua/\""]
#[footer = "  - RAYON_NUM_THREADS sets the connection concurrency for the statement client"]
#[footer = "      default is 4"]
#[footer = "  - TERM_COLOR accepts \"always\" to override automatic terminal sensing"]
struct Args {
    /// Read the family roster RON from a file.
    #[short('r')]
    roster: PathBuf,

    /// Number of days of statement history to fetch.
    #[default(30)]
    days: u32,

    /// Write the combined transaction CSV to a file.
    #[short('o')]
    output_csv: Option<PathBuf>,

    /// Enable verbose output.
    /// Prints the combined transaction CSV to stdout when not written to a file.
    verbose: bool,
}

#[derive(Debug, Error)]
enum Error {
    #[error("Argument parsing error")]
    Args(#[from] CliError),

    #[error("Unable to read roster {0:?}")]
    Roster(PathBuf, #[source] spendcount::errors::RosterError),

    #[error("Statement client error")]
    StatementClient(#[from] spendcount::errors::StatementClientError),

    #[error("Dataset combination error")]
    Dataset(#[from] spendcount::errors::DatasetError),

    #[error("Chart rendering error")]
    Sink(#[from] spendcount::errors::SinkError),

    #[error("Unable to write transaction CSV {0:?}")]
    ExportCsv(PathBuf, #[source] spendcount::errors::ExportError),

    #[error("Transaction CSV error")]
    Export(#[from] spendcount::errors::ExportError),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("{failed} of {total} statement fetches failed")]
    FailedFetches { failed: usize, total: usize },
}

fn main() -> ExitCode {
    // Initialize the tracing subscriber for instrumentation.
    // Uses the `RUST_LOG` environment var for configuration. E.g. `RUST_LOG=debug cargo run`
    // This is very useful to see which upstream response caused a fetch to fail.
    //
    // See: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/struct.EnvFilter.html#directives
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let term_color = env::var("TERM_COLOR")
        .map(|color| color == "always")
        .unwrap_or_else(|_| std::io::stdout().is_terminal());
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(term_color))
        .with(env_filter)
        .init();

    match run(onlyargs::parse()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            for source in err.sources().skip(1) {
                eprintln!("  Caused by: {source}");
            }

            ExitCode::FAILURE
        }
    }
}

fn run(args: Result<Args, CliError>) -> Result<(), Error> {
    let args = args?;

    let monobank_url =
        env::var("MONOBANK_URL").unwrap_or_else(|_| DEFAULT_MONOBANK_URL.to_string());

    let mut stats = Stats::default();

    let roster = read_roster(&mut stats, &args.roster)
        .map_err(|err| Error::Roster(args.roster.clone(), err))?;

    let credentials: Vec<_> = roster
        .iter()
        .map(|member| (member.account.clone(), member.token.clone()))
        .collect();
    let client =
        StatementClient::new(&monobank_url, credentials, args.days, Arc::new(SystemClock))?;

    let accounts: Vec<AccountId> = roster.iter().map(|member| member.account.clone()).collect();
    let results = client.get_statements(&accounts);

    // Normalize and tag each member's statement. A failed fetch skips that member and is
    // reported at exit; the rest of the family is still processed.
    let mut datasets = Vec::with_capacity(roster.len());
    let mut failed = 0_usize;
    for member in &roster {
        match results[&member.account].as_ref() {
            Ok(statement) => {
                stats.add_statement_rows(statement.len());
                datasets.push(Dataset::from_statement(statement).tag(&member.name));
            }
            Err(err) => {
                failed += 1;
                stats.inc_failed_fetches();
                error!("Skipping `{name}`: {err}", name = member.name);
            }
        }
    }

    let combined = Dataset::concat(datasets)?;
    debug!("Combined dataset has {len} rows", len = combined.len());

    let analyzer = Analyzer::new(&combined);
    let charts = [
        analyzer.sum_by_source().into_chart("Spending by Source"),
        analyzer.spending_by_day().into_chart("Spending by Day"),
        analyzer.sum_by_hour().into_chart("Spending by Hour of Day"),
        analyzer
            .sum_by_user_and_date()
            .into_chart("Spending by Family Member and Day"),
    ];

    let mut sink = TextSink::new(io::stdout());
    for chart in &charts {
        sink.emit(chart)?;
    }

    if let Some(path) = args.output_csv.as_ref() {
        let mut file = BufWriter::new(File::create(path)?);
        export::write_dataset(&mut file, &combined)
            .map_err(|err| Error::ExportCsv(path.clone(), err))?;
        file.flush()?;

        let path = path.display();
        let underline = "=".repeat(path.to_string().len());
        println!("Transaction CSV written to {path}");
        println!("=========== === ======= == {underline}");
        println!();
    } else if args.verbose {
        let mut buf = Vec::new();
        export::write_dataset(&mut buf, &combined)?;

        println!("Combined Transactions");
        println!("======== ============");
        println!();
        print!("{}", String::from_utf8_lossy(&buf));
        println!();
    }

    stats.pretty_print();

    if failed > 0 {
        return Err(Error::FailedFetches {
            failed,
            total: roster.len(),
        });
    }

    Ok(())
}
