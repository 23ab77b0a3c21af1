use clap::Parser;
use dirsort::cli::{OrganizeCommand, run_with_config};
use dirsort::config::SortConfig;
use dirsort::logging::init_logging;
use dirsort::output::OutputFormatter;
use std::path::PathBuf;
use std::process::ExitCode;

/// Sort a directory into category subfolders by file extension.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory to sort
    path: PathBuf,

    /// Show what would be moved without touching any file
    #[arg(short = 'n', long, conflicts_with = "classify")]
    dry_run: bool,

    /// Only list the files found per category
    #[arg(short, long)]
    classify: bool,

    /// Configuration file (default: .dirsortrc.toml or ~/.config/dirsort/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Worker threads, 0 = available parallelism
    #[arg(short, long, value_name = "N")]
    workers: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = match SortConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            OutputFormatter::error(&format!("Error loading configuration: {}", e));
            return ExitCode::FAILURE;
        }
    };
    if let Some(workers) = args.workers {
        config.sort.workers = workers;
    }
    let config = match config.compile() {
        Ok(config) => config,
        Err(e) => {
            OutputFormatter::error(&format!("Error compiling configuration: {}", e));
            return ExitCode::FAILURE;
        }
    };

    let command = if args.classify {
        OrganizeCommand::Classify
    } else {
        OrganizeCommand::Organize {
            dry_run: args.dry_run,
        }
    };

    match run_with_config(command, &args.path, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&e);
            ExitCode::FAILURE
        }
    }
}
