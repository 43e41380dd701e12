//! CLI mode implementation
//!
//! Argument definitions for the school-core commands

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// school-core CLI
#[derive(Parser, Debug)]
#[command(name = "school-core")]
#[command(about = "Fuzzy search, filtering and grading over school records", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Config file (defaults to <config dir>/school-core/config.json)
    #[arg(long, global = true, env = "SCHOOL_CORE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Filter, fuzzy-search and sort a JSON array of records
    Search(SearchArgs),
    /// Autocomplete suggestions for a partial query
    Suggest(SuggestArgs),
    /// Distinct values of a field, for building filters
    Facets(FacetsArgs),
    /// Classify a single score
    Grade(GradeArgs),
    /// Risk tier for a score and attendance
    Risk(RiskArgs),
    /// Report card with overall grade and insights for one student
    Report(ReportArgs),
}

/// Search command arguments
#[derive(Args, Clone, Debug, Default)]
pub struct SearchArgs {
    /// JSON file holding an array of records (`-` for stdin)
    #[arg(short = 'i', long)]
    pub input: String,

    /// Search terms; empty lists every record that passes the filters
    #[arg(short = 'q', long, default_value = "")]
    pub query: String,

    /// Field to search (repeatable, dot paths allowed)
    #[arg(short = 'f', long = "field")]
    pub fields: Vec<String>,

    /// Filter expression `field:operator:value` (repeatable, all must match)
    #[arg(long = "filter")]
    pub filters: Vec<String>,

    /// Sort expression `field[:asc|desc]`
    #[arg(short = 's', long)]
    pub sort: Option<String>,

    /// Maximum number of results
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,

    /// Minimum match score between 0 and 1
    #[arg(short = 't', long)]
    pub threshold: Option<f64>,

    /// Match case exactly
    #[arg(long)]
    pub case_sensitive: bool,

    /// Print JSON instead of markdown
    #[arg(long)]
    pub json: bool,
}

/// Suggest command arguments
#[derive(Args, Clone, Debug, Default)]
pub struct SuggestArgs {
    /// JSON file holding an array of records (`-` for stdin)
    #[arg(short = 'i', long)]
    pub input: String,

    /// Partial query
    #[arg(short = 'q', long)]
    pub query: String,

    /// Field to index (repeatable)
    #[arg(short = 'f', long = "field")]
    pub fields: Vec<String>,

    /// Maximum number of suggestions
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,

    #[arg(long)]
    pub json: bool,
}

/// Facets command arguments
#[derive(Args, Clone, Debug, Default)]
pub struct FacetsArgs {
    /// JSON file holding an array of records (`-` for stdin)
    #[arg(short = 'i', long)]
    pub input: String,

    /// Field whose distinct values to list
    #[arg(short = 'f', long)]
    pub field: String,

    #[arg(long)]
    pub json: bool,
}

/// Grade command arguments
#[derive(Args, Clone, Debug, Default)]
pub struct GradeArgs {
    /// Score between 0 and 100, or X for absent
    #[arg(long, allow_hyphen_values = true)]
    pub score: String,

    /// Grade level, e.g. form1 or grade11
    #[arg(long)]
    pub level: Option<String>,

    #[arg(long)]
    pub json: bool,
}

/// Risk command arguments
#[derive(Args, Clone, Debug, Default)]
pub struct RiskArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub score: f64,

    /// Attendance percentage (assumed 100 when omitted)
    #[arg(long)]
    pub attendance: Option<f64>,

    #[arg(long)]
    pub json: bool,
}

/// Report command arguments
#[derive(Args, Clone, Debug, Default)]
pub struct ReportArgs {
    /// JSON file holding one student (`-` for stdin)
    #[arg(short = 'i', long)]
    pub input: String,

    /// Grade level, e.g. form1 or grade11
    #[arg(long)]
    pub level: Option<String>,

    #[arg(long)]
    pub json: bool,
}
