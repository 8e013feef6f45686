use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bipo",
    version,
    about = "BiPo214 coincidence tagger for reconstructed detector event streams",
    long_about = "Search time-ordered event streams (JSON lines, one reconstructed event per\n\
                  line) for BiPo214 decay coincidences: a Bi candidate followed within bounded\n\
                  time and space windows by a correlated Po candidate."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Tag coincidences in one or more event files
    Run(RunArgs),
    /// Stream a file end-to-end and report record statistics
    Validate(ValidateArgs),
    /// Print the effective cut thresholds
    Cuts(CutsArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Input event files (JSON lines)
    #[arg(long, num_args = 1.., conflicts_with = "glob")]
    pub files: Option<Vec<String>>,

    /// Glob pattern selecting input event files
    #[arg(long)]
    pub glob: Option<String>,

    /// Cut thresholds file (JSON); missing fields keep their defaults
    #[arg(long, env = "BIPO_CUTS_FILE")]
    pub cuts: Option<String>,

    /// Treat the input as simulated data (skips the data-cleaning cut)
    #[arg(long, default_value_t = false)]
    pub simulated: bool,

    /// Tag independent files in parallel
    #[arg(long, default_value_t = false)]
    pub parallel: bool,

    /// Directory for per-file JSON reports (default: JSONL to stdout)
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Also write per-file GTID lists, one id per line, Bi then Po
    #[arg(long, default_value_t = false, requires = "output_dir")]
    pub gtid_lists: bool,

    /// Print the resolved file list and exit
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    /// Suppress progress messages on stderr
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Input event file path
    #[arg(long)]
    pub file: String,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct CutsArgs {
    /// Cut thresholds file (JSON); missing fields keep their defaults
    #[arg(long, env = "BIPO_CUTS_FILE")]
    pub cuts: Option<String>,

    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,
}
