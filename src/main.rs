//! lexiload-cli entry point.
//!
//! ## CLI Subcommands
//!
//! - `lexiload-cli plan <catalog>` - Print the load plan for a catalog
//! - `lexiload-cli warm <catalog>` - Fetch the critical path over HTTP
//! - `lexiload-cli config show|defaults|validate` - Inspect configuration

use std::process::ExitCode;

use lexiload::cli::{config_cmd, run_plan, run_warm, EXIT_CONFIG, EXIT_FAILURE};
use lexiload::config;
use lexiload::telemetry::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");
    let rest = args.get(2..).unwrap_or(&[]);

    match command {
        "plan" => ExitCode::from(run_plan(rest) as u8),
        "warm" => {
            if let Err(e) = init_logging(&config::load().logging) {
                eprintln!("Logging setup failed: {}", e);
                return ExitCode::from(EXIT_CONFIG as u8);
            }
            ExitCode::from(run_warm(rest).await as u8)
        }
        "config" => {
            let subcommand = rest.first().map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" => {
                    config_cmd::run_show();
                    ExitCode::SUCCESS
                }
                "defaults" => {
                    config_cmd::run_defaults();
                    ExitCode::SUCCESS
                }
                "validate" => ExitCode::from(config_cmd::run_validate() as u8),
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_command_help("config");
                    ExitCode::from(EXIT_FAILURE as u8)
                }
            }
        }
        "help" | "--help" | "-h" => {
            if let Some(subcommand) = rest.first() {
                print_command_help(subcommand);
            } else {
                print_usage();
            }
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("lexiload {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::from(EXIT_FAILURE as u8)
        }
    }
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "lexiload - localized resource cache and prefetch scheduler v{}

USAGE:
    lexiload-cli <COMMAND> [OPTIONS]

COMMANDS:
    plan         Print the load plan for a catalog (no network)
    warm         Fetch a catalog's critical path, optionally a route
    config       Inspect configuration (show, defaults, validate)
    version      Show version information
    help         Show this help message

ENVIRONMENT:
    LEXILOAD_*   See `lexiload-cli config defaults`

EXIT CODES:
    0  Success
    1  Failure
    2  Configuration error
",
        version
    );
}

/// Print detailed help for a specific command.
fn print_command_help(command: &str) {
    match command {
        "plan" => {
            eprintln!(
                "lexiload-cli plan - Print the load plan

USAGE:
    lexiload-cli plan <CATALOG> [--route ROUTE] [--auth] [--json]

DESCRIPTION:
    Loads a TOML or JSON namespace catalog and prints the critical path,
    global load order and dependency tiers. With --route, also prints the
    namespaces relevant to that route and the batches they load in.

EXAMPLES:
    lexiload-cli plan catalog.toml
    lexiload-cli plan catalog.json --route /admin/users --auth --json
"
            );
        }
        "warm" => {
            eprintln!(
                "lexiload-cli warm - Fetch bundles over HTTP

USAGE:
    lexiload-cli warm <CATALOG> [--locale L] [--route R] [--base-url URL] [--auth]

DESCRIPTION:
    Loads the critical path from LEXILOAD_BASE_URL (or --base-url) and,
    with --route, the namespaces for that route. Prints a JSON summary.

EXIT CODES:
    0  All requested bundles loaded
    1  A critical bundle or a route bundle failed
    2  Invalid catalog or configuration
"
            );
        }
        "config" => {
            eprintln!(
                "lexiload-cli config - Inspect configuration

USAGE:
    lexiload-cli config <SUBCOMMAND>

SUBCOMMANDS:
    show           Show effective configuration
    validate       Warn about values that will misbehave
    defaults       Show default configuration
"
            );
        }
        _ => {
            eprintln!(
                "No detailed help available for '{}'. Use 'lexiload-cli help' for general usage.",
                command
            );
        }
    }
}
