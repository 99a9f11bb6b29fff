use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Team shot-attempt rates by score state versus league median
#[derive(Parser, Debug, Clone)]
#[command(name = "shotrate-chart", version, about)]
pub struct Config {
    /// SQLite database holding per-game score-state rows and team info
    #[arg(long, env = "SHOTRATE_DATABASE", default_value = "shotrates.db", global = true)]
    pub database: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Draw the score-state arrow chart for one team
    Chart(ChartArgs),
    /// Print the aggregated team and league-median rates as JSON
    Rates(SeasonArgs),
    /// Load rows from a CSV file into the database
    Import(ImportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SeasonArgs {
    /// Team ID, abbreviation (e.g. WSH) or full name
    pub team: String,

    /// First season, inclusive (2015 means 2015-16)
    #[arg(long)]
    pub start_season: i32,

    /// Last season, inclusive; defaults to the start season
    #[arg(long)]
    pub end_season: Option<i32>,
}

impl SeasonArgs {
    pub fn end_season(&self) -> i32 {
        self.end_season.unwrap_or(self.start_season)
    }
}

#[derive(Args, Debug, Clone)]
pub struct ChartArgs {
    #[command(flatten)]
    pub seasons: SeasonArgs,

    /// Image file to write (svg, png, bmp, jpg); prints SVG to stdout when omitted
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Chart width in pixels
    #[arg(long, env = "SHOTRATE_CHART_WIDTH", default_value = "1000")]
    pub width: u32,

    /// Chart height in pixels
    #[arg(long, env = "SHOTRATE_CHART_HEIGHT", default_value = "800")]
    pub height: u32,
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// CSV file to load
    pub csv: PathBuf,

    /// Treat the file as team info (Team,Abbreviation,Name) instead of game rows
    #[arg(long)]
    pub teams: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        let seasons = match &self.command {
            Command::Chart(args) => {
                if args.width == 0 || args.height == 0 {
                    anyhow::bail!("chart width and height must be positive");
                }
                Some(&args.seasons)
            }
            Command::Rates(seasons) => Some(seasons),
            Command::Import(_) => None,
        };
        if let Some(seasons) = seasons {
            if seasons.end_season() < seasons.start_season {
                anyhow::bail!(
                    "end season {} is before start season {}",
                    seasons.end_season(),
                    seasons.start_season
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_season_defaults_to_start() {
        let config = Config::parse_from(["shotrate-chart", "chart", "WSH", "--start-season", "2015"]);
        let Command::Chart(args) = &config.command else {
            panic!("expected chart command");
        };
        assert_eq!(args.seasons.end_season(), 2015);
        assert!(args.output.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reversed_seasons_rejected() {
        let config = Config::parse_from([
            "shotrate-chart",
            "rates",
            "WSH",
            "--start-season",
            "2016",
            "--end-season",
            "2015",
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_width_rejected() {
        let config = Config::parse_from([
            "shotrate-chart",
            "chart",
            "WSH",
            "--start-season",
            "2015",
            "--width",
            "0",
        ]);
        assert!(config.validate().is_err());
    }
}
