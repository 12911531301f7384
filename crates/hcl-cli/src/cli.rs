use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hcl",
    about = "HashChain Ledger: tamper-evident append-only records",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a TOML config file (defaults to ./hcl.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Ledger snapshot file, overriding the config
    #[arg(short, long, global = true)]
    pub ledger: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the in-memory demonstration: build, verify, tamper, verify again
    Demo(DemoArgs),
    /// Create a new ledger file with a genesis record
    Init(InitArgs),
    /// Append a record to the ledger file
    Append(AppendArgs),
    /// Show a single record
    Show(ShowArgs),
    /// List records
    Log(LogArgs),
    /// Verify hash chain integrity
    Verify(VerifyArgs),
    /// Overwrite a record's payload without rehashing (debug only)
    Tamper(TamperArgs),
}

#[derive(Args)]
pub struct DemoArgs {
    /// Record index to tamper with
    #[arg(long, default_value = "1")]
    pub target: u64,
    /// Replacement payload written by the tamper step
    #[arg(long, default_value = "Hacker steals 100 ETH")]
    pub forged: String,
}

#[derive(Args)]
pub struct InitArgs {
    /// Genesis payload entries
    #[arg(long)]
    pub payload: Vec<String>,
    /// Replace an existing ledger file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct AppendArgs {
    /// Payload entries, in order
    #[arg(required = true)]
    pub entries: Vec<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    pub index: u64,
}

#[derive(Args)]
pub struct LogArgs {
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
    #[arg(long)]
    pub oneline: bool,
}

#[derive(Args)]
pub struct VerifyArgs {}

#[derive(Args)]
pub struct TamperArgs {
    pub index: u64,
    /// Replacement payload entries
    pub entries: Vec<String>,
}
