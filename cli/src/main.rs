#![deny(missing_docs)]

//! # ws2oas CLI
//!
//! Command Line Interface for converting webservice method descriptors into an
//! OpenAPI 3.1 document.
//!
//! Supported Commands:
//! - `convert`: descriptor file -> filtered, patched OpenAPI document (JSON or YAML).

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod convert;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Webservice descriptors to OpenAPI")]
struct Cli {
    /// Enable verbose logging (debug level).
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert webservice methods to an OpenAPI Specification (version 3.1).
    Convert(convert::ConvertArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Convert(args) => {
            // The document owns stdout when no output path is given.
            init_tracing(cli.verbose, args.writes_to_stdout());
            convert::execute(args)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool, to_stderr: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    if to_stderr {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_outpath_help_lists_unsupported_placeholders() {
        use clap::CommandFactory;
        let mut cmd = Cli::command();
        let convert = cmd.find_subcommand_mut("convert").unwrap();
        let help = convert.render_long_help().to_string();
        assert!(help.contains("{VERSION}"));
        assert!(help.contains("{COMMIT}"));
        assert!(help.contains("{TAG}"));
    }

    #[test]
    fn test_parse_convert_defaults() {
        let cli = Cli::try_parse_from(["ws2oas", "convert", "webservices.json"]).unwrap();
        let Commands::Convert(args) = cli.command;
        assert_eq!(args.input.to_str(), Some("webservices.json"));
        assert!(args.writes_to_stdout());
        assert!(!args.skip_fix_defaults);
        assert_eq!(args.prettier, "prettier");
    }

    #[test]
    fn test_allow_and_deny_conflict() {
        let res = Cli::try_parse_from([
            "ws2oas",
            "convert",
            "webservices.json",
            "--allowlist",
            "allow.txt",
            "--denylist",
            "deny.txt",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_parse_skip_flags() {
        let cli = Cli::try_parse_from([
            "ws2oas",
            "-v",
            "convert",
            "webservices.json",
            "-o",
            "openapi.yaml",
            "--skip-add-tags",
            "--skip-prettier",
            "--parents",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Convert(args) = cli.command;
        assert!(args.skip_add_tags);
        assert!(args.skip_prettier);
        assert!(args.parents);
        assert!(!args.writes_to_stdout());
    }
}
