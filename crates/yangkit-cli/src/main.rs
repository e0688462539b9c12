//! # yangkit CLI entry point
//!
//! Parses command-line arguments, sets up logging, and dispatches to the
//! subcommand handlers in the library crate.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use yangkit_cli::check::{run_check, CheckArgs};
use yangkit_cli::config::ValidatorConfig;
use yangkit_cli::procedure::{run_run, RunArgs};
use yangkit_cli::resolve_path;

/// YANG schema parser and data-tree validator.
///
/// Without a subcommand, runs the bundled validation procedure.
#[derive(Parser, Debug)]
#[command(name = "yangkit", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML validator configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding `mainSources/` and `all_the_modules/`. Overrides
    /// the configured resource root.
    #[arg(long, global = true)]
    resources: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the schema context and commit the sample document.
    Run(RunArgs),

    /// Parse and link YANG files and summarize their modules.
    Check(CheckArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let repo_root = resolve_repo_root().unwrap_or_else(|| {
        tracing::warn!("could not locate repository root; using current directory");
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    });
    tracing::debug!(repo_root = %repo_root.display(), "resolved repository root");

    let result = dispatch(cli, &repo_root);

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn dispatch(cli: Cli, repo_root: &std::path::Path) -> Result<u8> {
    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => {
            let config = match &cli.config {
                Some(path) => ValidatorConfig::load(&resolve_path(path, repo_root))?,
                None => ValidatorConfig::default(),
            };
            let resource_root = resolve_path(cli.resources.as_ref().unwrap_or(&config.resource_root), repo_root);
            tracing::debug!(resource_root = %resource_root.display(), "resolved resource root");
            run_run(&args, &config, &resource_root)
        }
        Commands::Check(args) => run_check(&args, repo_root),
    }
}

/// Walk up from the current directory to the first directory holding the
/// bundled `resources/mainSources`.
fn resolve_repo_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_repo_root(&cwd)
}

fn find_repo_root(start: &std::path::Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join("resources").join("mainSources").is_dir() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_without_subcommand_defaults_to_run() {
        let cli = Cli::try_parse_from(["yangkit"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_run_dump() {
        let cli = Cli::try_parse_from(["yangkit", "run", "--dump"]).unwrap();
        match cli.command {
            Some(Commands::Run(args)) => assert!(args.dump),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_check_with_libs() {
        let cli = Cli::try_parse_from(["yangkit", "check", "a.yang", "b.yang", "--lib", "c.yang", "--lib", "d.yang"])
            .unwrap();
        match cli.command {
            Some(Commands::Check(args)) => {
                assert_eq!(args.files, vec![PathBuf::from("a.yang"), PathBuf::from("b.yang")]);
                assert_eq!(args.libs, vec![PathBuf::from("c.yang"), PathBuf::from("d.yang")]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_check_requires_files() {
        assert!(Cli::try_parse_from(["yangkit", "check"]).is_err());
    }

    #[test]
    fn test_parse_verbose_levels() {
        assert_eq!(Cli::try_parse_from(["yangkit", "-v"]).unwrap().verbose, 1);
        assert_eq!(Cli::try_parse_from(["yangkit", "-vv", "run"]).unwrap().verbose, 2);
        assert_eq!(Cli::try_parse_from(["yangkit", "run", "-vvv"]).unwrap().verbose, 3);
    }

    #[test]
    fn test_parse_global_options() {
        let cli =
            Cli::try_parse_from(["yangkit", "run", "--config", "v.yaml", "--resources", "/opt/yang"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("v.yaml")));
        assert_eq!(cli.resources, Some(PathBuf::from("/opt/yang")));
    }

    #[test]
    fn test_parse_invalid_subcommand_errors() {
        assert!(Cli::try_parse_from(["yangkit", "nonexistent"]).is_err());
    }

    #[test]
    fn test_dispatch_reports_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from(["yangkit", "--config", "missing.yaml"]).unwrap();
        let err = dispatch(cli, dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("missing.yaml"), "{err:#}");
    }

    #[test]
    fn test_find_repo_root_walks_up_to_resources() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("repo");
        std::fs::create_dir_all(root.join("resources").join("mainSources")).unwrap();
        let nested = root.join("crates").join("yangkit-cli");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_repo_root(&nested), Some(root.clone()));
        assert_eq!(find_repo_root(&root), Some(root));
        assert_eq!(find_repo_root(dir.path()), None);
    }
}
