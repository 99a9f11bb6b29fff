use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::db::models::{GameRow, Team};
use crate::db::Database;

fn read_records<T, R>(reader: R) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut out = Vec::new();
    for (i, record) in rdr.deserialize::<T>().enumerate() {
        // header is line 1
        out.push(record.with_context(|| format!("Bad CSV record on line {}", i + 2))?);
    }
    Ok(out)
}

/// Load `Season,Game,Team,ScoreState,CF,CA,Secs` rows. Returns rows written.
pub fn import_game_rows<R: Read>(db: &mut Database, reader: R) -> Result<usize> {
    let rows: Vec<GameRow> = read_records(reader)?;
    db.insert_game_rows(&rows)
}

/// Load `Team,Abbreviation,Name` rows. Returns teams written.
pub fn import_teams<R: Read>(db: &Database, reader: R) -> Result<usize> {
    let teams: Vec<Team> = read_records(reader)?;
    for team in &teams {
        db.upsert_team(team)?;
    }
    Ok(teams.len())
}

pub fn import_file(db: &mut Database, path: &Path, teams: bool) -> Result<usize> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let count = if teams {
        import_teams(db, file)?
    } else {
        import_game_rows(db, file)?
    };
    info!(
        "Imported {} {} from {}",
        count,
        if teams { "teams" } else { "score-state rows" },
        path.display()
    );
    Ok(count)
}
