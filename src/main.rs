//! # Barcodiche CLI
//!
//! Usage:
//!   barcodiche run sample            configs/sample.json → output/<pdf_name>.pdf
//!   barcodiche sample                same as `run sample`
//!   barcodiche list                  configurations in configs/
//!   barcodiche --dry-run run sample  validate and lay out, write nothing

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use barcodiche::{Directories, SheetError};

#[derive(Debug, Parser)]
#[command(name = "barcodiche", version, about = "Barcode label sheets as PDF")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Directory holding <name>.json configurations
    #[arg(long, global = true, default_value = "configs")]
    configs_dir: PathBuf,

    /// Directory holding TrueType label fonts
    #[arg(long, global = true, default_value = "fonts")]
    fonts_dir: PathBuf,

    /// Directory generated PDFs are written to
    #[arg(long, global = true, default_value = "output")]
    output_dir: PathBuf,

    /// Lay the sheet out without writing the PDF
    #[arg(long, global = true)]
    dry_run: bool,

    /// Log every placed label
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate the sheet described by a configuration
    Run {
        /// Configuration name, without the .json extension
        config: String,
    },
    /// List available configurations
    List,
    /// A bare configuration name runs it
    #[command(external_subcommand)]
    Bare(Vec<String>),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let dirs = Directories {
        configs: cli.configs_dir.clone(),
        fonts: cli.fonts_dir.clone(),
        output: cli.output_dir.clone(),
    };

    let result = match cli.command {
        None => {
            let _ = Cli::command().print_help();
            Ok(())
        }
        Some(Command::List) => list(&dirs),
        Some(Command::Run { ref config }) => run(config, &dirs, cli.dry_run),
        Some(Command::Bare(ref args)) => match args.as_slice() {
            [config] => run(config, &dirs, cli.dry_run),
            _ => {
                eprintln!("✗ Unexpected arguments: {}", args.join(" "));
                return ExitCode::FAILURE;
            }
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &str, dirs: &Directories, dry_run: bool) -> Result<(), SheetError> {
    if dry_run {
        let (summary, surface) = barcodiche::dry_run(config, dirs)?;
        eprintln!(
            "✓ Dry run: {} labels on {} pages ({} drawing operations), would write {}",
            summary.placed,
            summary.pages,
            surface.ops().len(),
            summary.output.display()
        );
    } else {
        let summary = barcodiche::generate(config, dirs)?;
        eprintln!(
            "✓ Written {} labels on {} pages to {}",
            summary.placed,
            summary.pages,
            summary.output.display()
        );
    }
    Ok(())
}

fn list(dirs: &Directories) -> Result<(), SheetError> {
    let names = barcodiche::list(&dirs.configs)?;
    if names.is_empty() {
        eprintln!("No configurations in {}", dirs.configs.display());
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "barcodiche=debug" } else { "barcodiche=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
