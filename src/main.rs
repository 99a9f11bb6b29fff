use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

mod chart;
mod config;
mod db;
mod import;
mod rates;
mod seasons;
mod teams;

use chart::{render_score_state_chart, Output, PlotCanvas};
use config::{Command, Config};
use db::Database;

fn main() -> Result<()> {
    // Initialise tracing / logging (stderr, so SVG on stdout stays clean)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let mut db = Database::open(&config.database)
        .with_context(|| format!("Failed to open database {}", config.database))?;
    info!("Database opened: {}", config.database);

    match config.command {
        Command::Chart(args) => {
            let mut canvas = PlotCanvas::new(args.width, args.height);
            run_chart(
                &db,
                &mut canvas,
                &args.seasons.team,
                args.seasons.start_season,
                args.seasons.end_season,
                args.output,
            )
        }
        Command::Rates(args) => {
            let team = teams::resolve(&db, &args.team)?;
            let rows = db.game_rows_for_seasons(args.start_season, args.end_season())?;
            let tables = rates::aggregate(&rows);
            let report = tables.team_report(team.id)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Import(args) => {
            import::import_file(&mut db, &args.csv, args.teams)?;
            Ok(())
        }
    }
}

/// Draw `team`'s score-state chart for the inclusive season range.
///
/// `end_season` defaults to `start_season`. With no `save_file` the chart is
/// shown, otherwise written to that path with the format taken from its
/// extension.
pub fn run_chart(
    db: &Database,
    canvas: &mut dyn chart::Canvas,
    team: &str,
    start_season: i32,
    end_season: Option<i32>,
    save_file: Option<PathBuf>,
) -> Result<()> {
    let end_season = end_season.unwrap_or(start_season);
    let team = teams::resolve(db, team)?;

    let rows = db.game_rows_for_seasons(start_season, end_season)?;
    if rows.is_empty() {
        warn!("No score-state rows for seasons {}-{}; run `import` first", start_season, end_season);
    }
    info!(
        "Loaded {} score-state rows for seasons {}-{}",
        rows.len(),
        start_season,
        end_season
    );

    let tables = rates::aggregate(&rows);
    let title = seasons::chart_title(&team.abbreviation, start_season, end_season)?;
    render_score_state_chart(canvas, &tables, team.id, &title, &Output::from(save_file))
        .with_context(|| format!("Failed to chart {}", team.abbreviation))
}
