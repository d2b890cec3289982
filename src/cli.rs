//! Command-line argument definitions using clap

use crate::render::DEFAULT_BRAND;
use crate::util::DEFAULT_TIMEZONE;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Merge order exports and print per-region driver dispatch sheets
#[derive(Parser, Debug)]
#[command(name = "dispatch-sheets")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Order exports to merge (.xlsx, .xls, .ods or .csv), in order
    pub inputs: Vec<PathBuf>,

    /// Output PDF path. Defaults to the dated dispatch file name in --out-dir
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for the dated dispatch document
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// TrueType font with Arabic coverage. Defaults to Amiri-Bold.ttf in the
    /// working directory when present
    #[arg(short, long)]
    pub font: Option<PathBuf>,

    /// IANA timezone for the title and file name date
    #[arg(long, default_value = DEFAULT_TIMEZONE)]
    pub timezone: String,

    /// Brand printed in every section title
    #[arg(long, default_value = DEFAULT_BRAND)]
    pub brand: String,

    /// Also write the merged, grouped table as CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Also write a JSON run summary
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Rows of the region summary to print
    #[arg(long, default_value = "10")]
    pub preview_rows: usize,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Default log directive for `RUST_LOG`-less runs.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let cli = Cli::try_parse_from(["dispatch-sheets", "a.xlsx", "b.csv"]).unwrap();
        assert_eq!(cli.inputs.len(), 2);
        assert_eq!(cli.timezone, "Africa/Cairo");
        assert_eq!(cli.brand, "ECOMERG");
        assert_eq!(cli.out_dir, PathBuf::from("."));
        assert_eq!(cli.log_level(), "info");
    }

    #[test]
    fn no_inputs_is_accepted() {
        let cli = Cli::try_parse_from(["dispatch-sheets", "-vv"]).unwrap();
        assert!(cli.inputs.is_empty());
        assert_eq!(cli.log_level(), "trace");
    }
}
