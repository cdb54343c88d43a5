use backfill_cli::{
    describe_spans, init_tracing, load_rules, outcomes_json, process_file, Mode,
};
use backfill_core::Delimiters;
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;
use std::process::ExitCode;

fn cli() -> Command {
    Command::new("backfill")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Backfill missing named arguments in constructor invocations")
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log every insertion"),
        )
        .subcommand(
            Command::new("apply")
                .about("Rewrite files using a TOML rule file")
                .arg(
                    Arg::new("rules")
                        .long("rules")
                        .short('r')
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Rule file"),
                )
                .arg(
                    Arg::new("check")
                        .long("check")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("dry-run")
                        .help("Write nothing; exit 1 if any file would change"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .alias("diff")
                        .action(ArgAction::SetTrue)
                        .help("Print rewritten text instead of writing"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print per-file report as JSON"),
                )
                .arg(
                    Arg::new("paths")
                        .required(true)
                        .num_args(1..)
                        .value_parser(value_parser!(PathBuf))
                        .help("Source files to rewrite"),
                ),
        )
        .subcommand(
            Command::new("locate")
                .about("List invocations of a construct")
                .arg(
                    Arg::new("construct")
                        .long("construct")
                        .short('c')
                        .required(true)
                        .help("Construct name, e.g. Product"),
                )
                .arg(
                    Arg::new("open")
                        .long("open")
                        .default_value("(")
                        .value_parser(value_parser!(char))
                        .help("Opening delimiter"),
                )
                .arg(
                    Arg::new("close")
                        .long("close")
                        .default_value(")")
                        .value_parser(value_parser!(char))
                        .help("Closing delimiter"),
                )
                .arg(
                    Arg::new("path")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Source file"),
                ),
        )
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    let result = match matches.subcommand() {
        Some(("apply", args)) => run_apply(args),
        Some(("locate", args)) => run_locate(args),
        _ => Ok(ExitCode::SUCCESS),
    };

    result.unwrap_or_else(|err| {
        tracing::error!("{err:#}");
        ExitCode::from(2)
    })
}

fn run_apply(args: &clap::ArgMatches) -> anyhow::Result<ExitCode> {
    let Some(rules_path) = args.get_one::<PathBuf>("rules") else {
        anyhow::bail!("--rules is required");
    };
    let rules = load_rules(rules_path)?;
    let mode = if args.get_flag("check") {
        Mode::Check
    } else if args.get_flag("dry-run") {
        Mode::Print
    } else {
        Mode::Write
    };

    let mut outcomes = Vec::new();
    let mut failed = false;
    for path in args.get_many::<PathBuf>("paths").into_iter().flatten() {
        match process_file(path, &rules, mode) {
            Ok(outcome) => {
                if let Some(output) = &outcome.output {
                    print!("{output}");
                }
                outcomes.push(outcome);
            }
            Err(err) => {
                tracing::error!("{err:#}");
                failed = true;
            }
        }
    }

    if args.get_flag("json") {
        println!("{}", outcomes_json(&outcomes)?);
    }

    let changed = outcomes.iter().filter(|o| o.changed).count();
    tracing::info!(files = outcomes.len(), changed, "done");

    Ok(if failed {
        ExitCode::from(2)
    } else if mode == Mode::Check && changed > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

fn run_locate(args: &clap::ArgMatches) -> anyhow::Result<ExitCode> {
    let (Some(construct), Some(path)) = (
        args.get_one::<String>("construct"),
        args.get_one::<PathBuf>("path"),
    ) else {
        anyhow::bail!("--construct and a path are required");
    };
    let open = args.get_one::<char>("open").copied().unwrap_or('(');
    let close = args.get_one::<char>("close").copied().unwrap_or(')');

    let buffer = std::fs::read_to_string(path)?;
    for span in describe_spans(&buffer, construct, Delimiters::new(open, close))? {
        println!(
            "{}:{}:{}\t{}..{}\t{}",
            path.display(),
            span.line,
            span.column,
            span.start,
            span.end,
            span.text
        );
    }
    Ok(ExitCode::SUCCESS)
}
