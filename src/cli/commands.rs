use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "biovigil", version, about = "Biosecurity vulnerability triage pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest vulnerabilities from the NVD and KEV feeds
    Ingest(IngestArgs),
    /// Run bio-relevance analysis and scoring over ingested vulnerabilities
    Analyze(AnalyzeArgs),
    /// Generate action recommendations from stored scores
    Recommend(RecommendArgs),
    /// Show database counts and the last ingestion run
    Status,
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone)]
pub struct IngestArgs {
    /// How many days of NVD publications to fetch (default 7)
    #[arg(long)]
    pub days_back: Option<u32>,
}

#[derive(Args, Clone)]
pub struct AnalyzeArgs {
    /// Maximum number of vulnerabilities to analyze
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Re-analyze vulnerabilities that already have a score
    #[arg(long)]
    pub force: bool,

    /// Analyze a single CVE identifier
    #[arg(long)]
    pub cve: Option<String>,
}

#[derive(Args, Clone)]
pub struct RecommendArgs {
    /// CVE identifier to generate recommendations for
    pub cve: Option<String>,

    /// Generate recommendations for every scored CVE that lacks them
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: String,
}
