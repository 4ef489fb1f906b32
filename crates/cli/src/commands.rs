//! CLI definition for the datacap operator tool.

use clap::{Arg, ArgAction, Command};

/// Build the clap command tree.
pub fn build_cli() -> Command {
    Command::new("datacap")
        .about("Usage-ledger transaction-conflict harness")
        .arg_required_else_help(true)
        .arg(
            Arg::new("json")
                .long("json")
                .help("Emit JSON instead of human-readable output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("conflict")
                .about("Run the unprotected demo and report the lost-update anomaly")
                .arg(baseline_arg())
                .arg(
                    Arg::new("window-ms")
                        .long("window-ms")
                        .help("Artificial delay widening the race window")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("1500"),
                ),
        )
        .subcommand(
            Command::new("resolve")
                .about("Run the coordinated demo with locking, isolation, and retry")
                .arg(baseline_arg())
                .arg(
                    Arg::new("isolation")
                        .long("isolation")
                        .help(
                            "Isolation level: read-uncommitted, read-committed, \
                             repeatable-read, serializable, or snapshot",
                        )
                        .default_value("read-committed"),
                )
                .arg(
                    Arg::new("max-attempts")
                        .long("max-attempts")
                        .help("Retry budget per transaction")
                        .value_parser(clap::value_parser!(u32))
                        .default_value("3"),
                )
                .arg(
                    Arg::new("backoff-ms")
                        .long("backoff-ms")
                        .help("Base backoff, scaled linearly by attempt count")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("40"),
                ),
        )
        .subcommand(
            Command::new("reset")
                .about("Rewrite the usage record to a baseline value")
                .arg(
                    Arg::new("value")
                        .long("value")
                        .help("Baseline value in GB")
                        .default_value("100"),
                ),
        )
        .subcommand(Command::new("report").about("Print the exceeded-usage report"))
        .subcommand(
            Command::new("customers")
                .about("List customers with optional filters, paged")
                .arg(
                    Arg::new("first")
                        .long("first")
                        .help("First-name prefix filter"),
                )
                .arg(Arg::new("last").long("last").help("Last-name prefix filter"))
                .arg(
                    Arg::new("active")
                        .long("active")
                        .help("Filter on the active flag (true/false); omit for both")
                        .value_parser(clap::value_parser!(bool)),
                )
                .arg(
                    Arg::new("page")
                        .long("page")
                        .help("Page number, starting at 1")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    Arg::new("per-page")
                        .long("per-page")
                        .help("Items per page")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                ),
        )
}

fn baseline_arg() -> Arg {
    Arg::new("baseline")
        .long("baseline")
        .help("Baseline value seeded before the run")
        .default_value("100")
}
