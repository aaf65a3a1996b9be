use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "agent_dashboard")]
#[command(about = "Field officer activity dashboard: filter agents and export chart data", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Spreadsheet (.xlsx/.xls/.ods) or CSV export of the agent sheet.
    #[arg(long, default_value = "Onafriq Agents info Sept - feb 25_pp.xlsx")]
    pub input: PathBuf,

    #[arg(long, default_value = "Data")]
    pub sheet: String,

    #[arg(long, default_value = "dashboard")]
    pub out_dir: PathBuf,

    /// Initial Gender filter; empty means every gender.
    #[arg(long, value_delimiter = ',')]
    pub gender: Vec<String>,

    /// Initial Region filter; empty means every region.
    #[arg(long, value_delimiter = ',')]
    pub region: Vec<String>,

    /// Bins per axis of the productivity heatmap.
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u16).range(1..))]
    pub bins: u16,

    /// Render once with the given filters and exit.
    #[arg(long)]
    pub batch: bool,

    #[arg(long, value_parser = ["error", "warn", "info", "debug", "trace"], default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_source_workbook() {
        let cli = Cli::try_parse_from(["agent_dashboard"]).unwrap();
        assert_eq!(cli.sheet, "Data");
        assert_eq!(cli.bins, 20);
        assert!(cli.gender.is_empty());
        assert!(!cli.batch);
        assert_eq!(cli.input, PathBuf::from("Onafriq Agents info Sept - feb 25_pp.xlsx"));
    }

    #[test]
    fn filters_split_on_commas_and_repeat() {
        let cli = Cli::try_parse_from([
            "agent_dashboard",
            "--gender",
            "Female",
            "--region",
            "North,South",
            "--region",
            "West",
            "--batch",
        ])
        .unwrap();
        assert_eq!(cli.gender, vec!["Female"]);
        assert_eq!(cli.region, vec!["North", "South", "West"]);
        assert!(cli.batch);
    }

    #[test]
    fn rejects_zero_bins_and_unknown_levels() {
        assert!(Cli::try_parse_from(["agent_dashboard", "--bins", "0"]).is_err());
        assert!(Cli::try_parse_from(["agent_dashboard", "--log-level", "loud"]).is_err());
    }
}
