use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "allergen-mappr",
    about = "Collect food-product records and map allergen declarations to the nine common allergens",
    version
)]
pub struct Cli {
    /// Raw-records flat file to read (ignored with --fetch)
    #[arg(default_value = "foodraw.txt")]
    pub input: PathBuf,

    /// Fetch fresh records from Open Food Facts instead of reading the input file
    #[arg(long)]
    pub fetch: bool,

    /// Collection config file [default: ./.allergen-mappr/config.toml, fallback ~/.config/allergen-mappr/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// CSV output path; use without value to default to food-dataset.csv
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "food-dataset.csv")]
    pub csv: Option<PathBuf>,

    /// Save fetched raw records to a flat file for later offline runs
    #[arg(long, value_name = "FILE")]
    pub save_raw: Option<PathBuf>,

    /// Show every record (not just the summary and distribution)
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
    Csv,
}
