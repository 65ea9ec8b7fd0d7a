use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{histogram::Binning, pipeline::FailurePolicy, threshold::CutoffPolicy};

#[derive(Debug, Parser)]
#[command(author, version, about = "Discover matching attributes across CSV datasets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the global value-to-rank index for a corpus of CSV files
    Ranks(RanksArgs),
    /// Run distribution and attribute clustering over a corpus of CSV files
    Discover(DiscoverArgs),
}

#[derive(Debug, Args)]
pub struct RanksArgs {
    /// Directory containing the corpus CSV files
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Destination rank index file
    #[arg(short = 'r', long = "ranks")]
    pub ranks: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct DiscoverArgs {
    /// Directory containing the corpus CSV files
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Directory to write the cluster reports into
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Existing rank index file (built in-process when omitted)
    #[arg(short = 'r', long = "ranks")]
    pub ranks: Option<PathBuf>,
    /// Number of quantile bins for every histogram
    #[arg(short = 'q', long)]
    pub quantiles: usize,
    /// Global cutoff threshold for distribution clustering
    #[arg(long)]
    pub threshold1: f64,
    /// Global cutoff threshold for attribute-graph construction
    #[arg(long)]
    pub threshold2: f64,
    /// Per-column cutoff policy
    #[arg(long, value_enum, default_value_t = CutoffPolicy::LargestGap)]
    pub policy: CutoffPolicy,
    /// Histogram binning strategy
    #[arg(long, value_enum, default_value_t = Binning::EqualFrequency)]
    pub binning: Binning,
    /// Whether a per-cluster solver failure aborts the run or skips the cluster
    #[arg(long = "on-solver-failure", value_enum, default_value_t = FailurePolicy::Abort)]
    pub on_solver_failure: FailurePolicy,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_delimiter_accepts_names_and_characters() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert_eq!(parse_delimiter("|"), Ok(b'|'));
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("").is_err());
    }
}
