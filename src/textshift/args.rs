use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "textshift")]
#[command(version)]
#[command(about = "Convert a TextExpander snippet library into AutoKey phrase folders", long_about = None)]
pub struct Cli {
    /// TextExpander settings directory (or index file) to read
    pub source: PathBuf,

    /// Directory to write AutoKey phrase folders into
    pub target: PathBuf,

    /// Verbose output (debug-level logging)
    #[arg(short, long)]
    pub verbose: bool,
}
