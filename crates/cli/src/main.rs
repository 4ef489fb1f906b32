//! datacap CLI — operator controls for the transaction-conflict harness.
//!
//! The backing store is in-memory and lives for one invocation, so each
//! demo subcommand seeds its baseline before running; reset-before-demo is
//! structural rather than something the operator can get wrong.

mod commands;
mod format;
mod seed;

use std::process;
use std::str::FromStr;
use std::time::Duration;

use clap::ArgMatches;
use rust_decimal::Decimal;

use datacap_core::error::{Error, Result};
use datacap_core::traits::CounterStore;
use datacap_core::types::{CustomerFilter, IsolationLevel, PageRequest, RetryPolicy, USAGE_RECORD_ID};
use datacap_harness::demo::{ConflictDemo, ResolutionDemo};
use datacap_store::UsageStore;

use commands::build_cli;
use format::{format_customer_page, format_demo_report, format_usage_report, OutputMode};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();
    let mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    match run(&matches, mode) {
        Ok(output) => {
            if !output.is_empty() {
                print!("{output}");
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

fn run(matches: &ArgMatches, mode: OutputMode) -> Result<String> {
    match matches.subcommand() {
        Some(("conflict", sub)) => run_conflict(sub, mode),
        Some(("resolve", sub)) => run_resolve(sub, mode),
        Some(("reset", sub)) => run_reset(sub, mode),
        Some(("report", _)) => Ok(format_usage_report(
            &seed::demo_directory().exceeded_usage_report(),
            mode,
        )),
        Some(("customers", sub)) => run_customers(sub, mode),
        _ => Err(Error::InvalidInput("unknown subcommand".into())),
    }
}

fn parse_decimal(matches: &ArgMatches, name: &str) -> Result<Decimal> {
    let raw = matches
        .get_one::<String>(name)
        .ok_or_else(|| Error::InvalidInput(format!("missing --{name}")))?;
    Decimal::from_str(raw)
        .map_err(|_| Error::InvalidInput(format!("--{name} expects a decimal, got '{raw}'")))
}

fn run_conflict(matches: &ArgMatches, mode: OutputMode) -> Result<String> {
    let baseline = parse_decimal(matches, "baseline")?;
    let window = Duration::from_millis(*matches.get_one::<u64>("window-ms").unwrap_or(&1500));

    let store = UsageStore::new();
    store.reset(USAGE_RECORD_ID, baseline)?;
    let report = ConflictDemo::new(&store, USAGE_RECORD_ID, window).run()?;
    Ok(format_demo_report(&report, false, mode))
}

fn run_resolve(matches: &ArgMatches, mode: OutputMode) -> Result<String> {
    let baseline = parse_decimal(matches, "baseline")?;
    let isolation = matches
        .get_one::<String>("isolation")
        .map(|s| IsolationLevel::from_str(s))
        .transpose()?
        .unwrap_or_default();
    let policy = RetryPolicy::new(
        *matches.get_one::<u32>("max-attempts").unwrap_or(&3),
        *matches.get_one::<u64>("backoff-ms").unwrap_or(&40),
    )?;

    let store = UsageStore::new();
    store.reset(USAGE_RECORD_ID, baseline)?;
    let report = ResolutionDemo::new(&store, USAGE_RECORD_ID, isolation, policy).run()?;
    Ok(format_demo_report(&report, true, mode))
}

fn run_reset(matches: &ArgMatches, mode: OutputMode) -> Result<String> {
    let value = parse_decimal(matches, "value")?;
    let store = UsageStore::new();
    store.reset(USAGE_RECORD_ID, value)?;
    let record = store.record(USAGE_RECORD_ID)?;
    Ok(match mode {
        OutputMode::Json => {
            serde_json::json!({ "id": record.id, "value": record.value }).to_string()
        }
        OutputMode::Human => format!("record {} reset to {}\n", record.id, record.value),
    })
}

fn run_customers(matches: &ArgMatches, mode: OutputMode) -> Result<String> {
    let filter = CustomerFilter {
        first_name_prefix: matches.get_one::<String>("first").cloned(),
        last_name_prefix: matches.get_one::<String>("last").cloned(),
        active: matches.get_one::<bool>("active").copied(),
    };
    let page = PageRequest::new(
        *matches.get_one::<usize>("page").unwrap_or(&1),
        *matches.get_one::<usize>("per-page").unwrap_or(&10),
    )?;

    let dir = seed::demo_directory();
    let listing = dir.list(&filter, page)?;
    Ok(format_customer_page(&listing, mode))
}
