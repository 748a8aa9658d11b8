mod check;
mod manifest;
mod report;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use convoke_argparse::{ExecError, Executor, Invocation, LifecycleHooks};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

use crate::manifest::load_catalog;
use crate::report::InvocationReport;

/// Exit code used when argv names no action.
const EXIT_UNRESOLVED: i32 = 2;

#[derive(Parser)]
#[command(name = "convoke")]
#[command(version, about = "Convention-driven command dispatch", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve tokens against the catalog and print the invocation
    Resolve(ResolveArgs),

    /// Resolve tokens and run the matched action through the executor
    Run(RunArgs),

    /// Write a sample convoke.json
    Init(InitArgs),

    /// Validate the catalog and list its commands
    Check(CheckArgs),
}

#[derive(Parser)]
struct CatalogArg {
    /// Catalog manifest (default: $CONVOKE_CATALOG or ./convoke.json)
    #[arg(short, long, value_name = "FILE")]
    catalog: Option<PathBuf>,
}

#[derive(Parser)]
struct ResolveArgs {
    #[command(flatten)]
    catalog: CatalogArg,

    /// Print the invocation as JSON
    #[arg(long)]
    json: bool,

    /// Tokens to resolve (pass them after `--`)
    #[arg(value_name = "TOKENS", trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

#[derive(Parser)]
struct RunArgs {
    #[command(flatten)]
    catalog: CatalogArg,

    /// Tokens to run (pass them after `--`)
    #[arg(value_name = "TOKENS", trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

#[derive(Parser)]
struct InitArgs {
    /// Project directory (default: current directory)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Replace an existing convoke.json
    #[arg(long)]
    force: bool,
}

#[derive(Parser)]
struct CheckArgs {
    #[command(flatten)]
    catalog: CatalogArg,

    /// Only output JSON (no human-readable output)
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve(args) => resolve(args),
        Commands::Run(args) => run(args),
        Commands::Init(args) => init(args),
        Commands::Check(args) => check_command(args),
    }
}

fn resolve(args: ResolveArgs) -> Result<()> {
    tracing::debug!("executing resolve command");

    let loaded = load_catalog(args.catalog.catalog.as_deref())?;
    let catalog = loaded.build()?;
    let invocation = catalog
        .resolve(&args.tokens)
        .context("failed to bind parameters")?;
    let report = InvocationReport::from(&invocation);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render());
    }

    if !invocation.is_resolved() {
        std::process::exit(EXIT_UNRESOLVED);
    }
    Ok(())
}

/// Logs around every action the `run` command executes.
struct TraceHooks;

impl LifecycleHooks for TraceHooks {
    fn before(&self, invocation: &Invocation<'_>) {
        tracing::info!(
            command = %invocation.command_path().join(" "),
            action = invocation.action().map(|a| a.name()).unwrap_or("-"),
            "running"
        );
    }

    fn after(&self, _invocation: &Invocation<'_>, exit_code: i32) -> i32 {
        tracing::info!(exit_code, "finished");
        exit_code
    }
}

fn echo(invocation: &Invocation<'_>) -> Result<i32> {
    let report = InvocationReport::from(invocation);
    println!("{}", serde_json::to_string(&report)?);
    Ok(0)
}

fn run(args: RunArgs) -> Result<()> {
    tracing::debug!("executing run command");

    let loaded = load_catalog(args.catalog.catalog.as_deref())?;
    let catalog = Arc::new(loaded.build()?);
    let executor = Executor::new(catalog).fallback(echo).hook(TraceHooks);

    match executor.execute(&args.tokens) {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(err @ ExecError::Unresolved { .. }) => {
            eprintln!("error: {err}");
            std::process::exit(EXIT_UNRESOLVED);
        }
        Err(err) => Err(err.into()),
    }
}

fn init(args: InitArgs) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;

    let manifest_path = dir.join(convoke_metadata::DEFAULT_CATALOG_NAME);
    if manifest_path.exists() && !args.force {
        bail!(
            "{} already exists (use --force to replace it)",
            manifest_path.display()
        );
    }

    let written = manifest::write_default_manifest(&dir, args.force)?;

    eprintln!("Created: {}", written.display());
    eprintln!("\nNext steps:");
    eprintln!("  1. Edit convoke.json to declare your commands");
    eprintln!("  2. Run: convoke check");
    eprintln!("  3. Run: convoke resolve -- Greet world");

    Ok(())
}

fn check_command(args: CheckArgs) -> Result<()> {
    tracing::debug!("executing check command");

    let loaded = load_catalog(args.catalog.catalog.as_deref())?;
    let report = check::check_catalog(&loaded);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        eprintln!();
        eprintln!("=== Catalog Check Results ===");
        eprintln!("Catalog: {}", report.catalog);
        for cmd in &report.commands {
            eprintln!();
            eprintln!("{} ({})", cmd.path, cmd.conventions.join(", "));
            for action in &cmd.actions {
                eprintln!("  - {action}");
            }
            if !cmd.shared_parameters.is_empty() {
                eprintln!("  shared: {}", cmd.shared_parameters.join(", "));
            }
        }
        eprintln!();
    }

    match &report.error {
        Some(error) if args.json => {
            tracing::debug!(%error, "catalog is invalid");
            std::process::exit(1);
        }
        Some(error) => bail!("catalog is invalid: {error}"),
        None => {
            if !args.json {
                eprintln!("OK: {} command(s)", report.commands.len());
            }
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
