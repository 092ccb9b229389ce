use clap::{Parser, Subcommand, ValueEnum};

/// Watches CUNY GlobalSearch course sections and notifies recipients when they open.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Log output format
    #[arg(long, value_enum, default_value_t = default_tracing_format())]
    pub tracing: TracingFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Refresh the available terms and schools from the main search page
    SyncTerms,
    /// Refresh careers and subjects for one school and term
    RefreshSemester {
        /// School name or GlobalSearch key
        #[arg(long)]
        school: String,
        /// Term name or GlobalSearch key
        #[arg(long)]
        term: String,
    },
    /// Scrape and store the sections listed for one search
    RefreshClasses {
        #[arg(long)]
        school: String,
        #[arg(long)]
        term: String,
        /// Subject name or GlobalSearch key
        #[arg(long)]
        subject: String,
        /// Career name or GlobalSearch key
        #[arg(long)]
        career: String,
        /// Only list open sections
        #[arg(long)]
        open_only: bool,
    },
    /// Run the watch job once
    Check,
    /// Run the watch job on an interval until interrupted
    Watch,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable output
    Pretty,
    /// One JSON object per line
    Json,
}

fn default_tracing_format() -> TracingFormat {
    if cfg!(debug_assertions) {
        TracingFormat::Pretty
    } else {
        TracingFormat::Json
    }
}
