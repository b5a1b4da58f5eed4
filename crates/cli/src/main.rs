use anyhow::Result;
use clap::{Parser, Subcommand};
use samplebank::commands::{self, RepositoryArgs};
use samplebank::init_tracing;

/// Maintenance CLI for training-sample repositories.
///
/// This is a thin wrapper around `samplebank-core` (exposed in code as
/// `samplebank_core`). All substantive logic lives in the library.
#[derive(Parser, Debug)]
#[command(
    name = "samplebank",
    version,
    about = "Inspect and maintain training-sample repositories",
    long_about = None
)]
struct Cli {
    /// Folder holding the archives. Defaults to the current working directory.
    #[arg(long, global = true, default_value = ".")]
    root: String,

    /// Address the `<BOOK>-samples.db` repository instead of the global one.
    #[arg(long, global = true)]
    book: Option<String>,

    /// Log debug output to stderr (`RUST_LOG` takes precedence).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show repository paths, counts and load problems.
    Info {
        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List sheets with their aliases, sample counts and image status.
    ListSheets {
        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print sample counts per shape as a markdown table.
    Counts {
        /// Emit JSON instead of a markdown table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Detect conflicting and redundant samples.
    Check {
        /// Remove redundant samples and store the repository.
        #[arg(long, default_value_t = false)]
        remove_redundant: bool,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Merge another repository into this one.
    Include {
        /// Path to a `samples.db` or `<radix>-samples.db` file.
        #[arg(long)]
        from: String,
    },

    /// Remove empty sheets and orphan descriptors.
    Purge,

    /// Keep at most a number of randomly chosen samples per shape.
    Shrink {
        /// Maximum samples per shape. Defaults to `shrink_max_count` from the config.
        #[arg(long)]
        max_count: Option<usize>,

        /// Seed for a reproducible selection.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Report train/test split counts per shape, using the configured bounds.
    Split {
        /// Seed for a reproducible split.
        #[arg(long)]
        seed: Option<u64>,

        /// Emit JSON instead of a markdown table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let args = RepositoryArgs::new(cli.root, cli.book);
    match cli.command {
        Command::Info { json } => commands::info_command(&args, json)?,
        Command::ListSheets { json } => commands::list_sheets_command(&args, json)?,
        Command::Counts { json } => commands::counts_command(&args, json)?,
        Command::Check { remove_redundant, json } => {
            commands::check_command(&args, remove_redundant, json)?
        }
        Command::Include { from } => commands::include_command(&args, &from)?,
        Command::Purge => commands::purge_command(&args)?,
        Command::Shrink { max_count, seed } => commands::shrink_command(&args, max_count, seed)?,
        Command::Split { seed, json } => commands::split_command(&args, seed, json)?,
    }

    Ok(())
}
