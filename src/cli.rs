use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docsearch")]
#[command(about = "Build and query compact documentation search indexes", long_about = None)]
pub struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read a JSON document array on stdin and write the search payload to stdout
    Build {
        /// TOML search configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Do not index or ship docstrings
        #[arg(long)]
        no_index_docstrings: bool,
    },
    /// Run a query against a previously built payload
    Search {
        /// Payload written by `build`
        #[arg(short, long)]
        index: PathBuf,
        /// TOML search configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Edit distance applied to terms without an explicit `~N`
        #[arg(short, long)]
        fuzziness: Option<u32>,
        /// Emit result markup instead of plain lines
        #[arg(long)]
        html: bool,
        query: String,
    },
}
