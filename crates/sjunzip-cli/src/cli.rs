//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use clap_complete::Shell;
use sjunzip_core::LegacyEncoding;
use sjunzip_core::batch::SortOrder;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sjunzip")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output and debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract ZIP archives into sibling directories named after them
    Extract(ExtractArgs),
    /// List archive contents with decoded names
    List(ListArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Archive file, or directory whose ZIP files are all extracted
    /// (default: current directory)
    #[arg(value_name = "TARGET")]
    pub target: Option<PathBuf>,

    /// Create destination directories here instead of next to each archive
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Legacy encoding of entry names
    #[arg(long, value_name = "LABEL", default_value = "shift_jis", value_parser = parse_encoding)]
    pub encoding: LegacyEncoding,

    /// Order in which archives are extracted
    #[arg(long, value_enum, default_value_t = SortArg::Name)]
    pub sort: SortArg,

    /// Continue with the next archive when one fails
    #[arg(long)]
    pub keep_going: bool,

    /// Do not apply permission bits stored in the archive
    #[arg(long)]
    pub no_preserve_permissions: bool,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Legacy encoding of entry names
    #[arg(long, value_name = "LABEL", default_value = "shift_jis", value_parser = parse_encoding)]
    pub encoding: LegacyEncoding,

    /// Show kind, mode and size of each entry
    #[arg(short, long)]
    pub long: bool,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    /// Lexicographic by path
    Name,
    /// Newest modification time first
    Modified,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => Self::Name,
            SortArg::Modified => Self::Modified,
        }
    }
}

fn parse_encoding(label: &str) -> Result<LegacyEncoding, String> {
    LegacyEncoding::from_label(label).map_err(|e| e.to_string())
}
