use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use methodtrail::config::PipelineConfig;

#[derive(Parser, Debug)]
#[command(name = "methodtrail", about = "Extract per-method change history features from a git repository")]
pub struct Cli {
    /// Path to the git repository
    #[arg(default_value = ".")]
    pub repo_path: PathBuf,

    /// Branch to walk (defaults to HEAD)
    #[arg(long)]
    pub branch: Option<String>,

    /// Directory where feature files are written
    #[arg(long, default_value = "data")]
    pub destination: PathBuf,

    /// Length of the bounded change histories
    #[arg(long, default_value_t = 10)]
    pub result_gap: usize,

    /// Split history into windows of this many commits
    #[arg(long)]
    pub window_size: Option<usize>,

    /// Number of windows to produce
    #[arg(long, default_value_t = 20)]
    pub windows: usize,

    /// Output format of feature files
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Feature cache database (defaults to a per-repository file in the cache directory)
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Do not read or write the feature cache
    #[arg(long)]
    pub no_cache: bool,

    /// Source file extensions to analyze
    #[arg(long, value_delimiter = ',', default_value = "java")]
    pub extensions: Vec<String>,

    /// Skip commits carrying more source files than this
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Skip source files larger than this many bytes
    #[arg(long, default_value_t = 1024 * 1024)]
    pub max_file_bytes: u64,

    /// Also write one feature file per commit author
    #[arg(long)]
    pub by_author: bool,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print per-phase timings
    #[arg(long)]
    pub profile: bool,
}

#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `<id>, <v1>, <v2>, ...` per line
    Text,
    /// Columns plus one object per method
    Json,
}

impl Cli {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            branch: self.branch.clone(),
            extensions: self.extensions.clone(),
            history_capacity: self.result_gap,
            max_files_per_commit: self.max_files,
            max_file_bytes: Some(self.max_file_bytes),
        }
    }
}
