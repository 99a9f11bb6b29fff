use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

pub mod models;
use models::*;

/// SQLite store for team info and per-game score-state rows
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let db = Database { conn };
        db.run_migrations()?;
        Ok(db)
    }

    /// Fresh database that lives only as long as the value
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let db = Database {
            conn: Connection::open_in_memory()?,
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    // ── Teams ────────────────────────────────────────────────────────────────

    /// Insert or replace a team record
    pub fn upsert_team(&self, team: &Team) -> Result<()> {
        self.conn.execute(
            "INSERT INTO teams (id, abbreviation, name) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                abbreviation=excluded.abbreviation,
                name=excluded.name",
            params![team.id, team.abbreviation, team.name],
        )?;
        Ok(())
    }

    pub fn team_by_id(&self, id: u32) -> Result<Option<Team>> {
        let team = self
            .conn
            .query_row(
                "SELECT id, abbreviation, name FROM teams WHERE id = ?1",
                params![id],
                map_team,
            )
            .optional()?;
        Ok(team)
    }

    /// Teams whose name or abbreviation equals `label`, ignoring ASCII case
    pub fn teams_by_label(&self, label: &str) -> Result<Vec<Team>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, abbreviation, name FROM teams
             WHERE name = ?1 COLLATE NOCASE OR abbreviation = ?1 COLLATE NOCASE
             ORDER BY id",
        )?;
        let teams = stmt
            .query_map(params![label], map_team)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(teams)
    }

    // ── Score-state rows ─────────────────────────────────────────────────────

    /// Insert rows in one transaction, replacing any with the same key.
    /// Returns the number of rows written.
    pub fn insert_game_rows(&mut self, rows: &[GameRow]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO score_state_rows (season, game, team, score_state, cf, ca, secs)
                 VALUES (?1,?2,?3,?4,?5,?6,?7)
                 ON CONFLICT(season, game, team, score_state) DO UPDATE SET
                    cf=excluded.cf,
                    ca=excluded.ca,
                    secs=excluded.secs",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.season,
                    row.game,
                    row.team,
                    row.score_state,
                    row.corsi_for,
                    row.corsi_against,
                    row.seconds,
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    /// All rows for one season, in game order
    pub fn game_rows(&self, season: i32) -> Result<Vec<GameRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT season, game, team, score_state, cf, ca, secs
             FROM score_state_rows WHERE season = ?1
             ORDER BY game, team, score_state",
        )?;
        let rows = stmt
            .query_map(params![season], map_game_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Concatenation of [`Database::game_rows`] for every season in the inclusive range
    pub fn game_rows_for_seasons(&self, start_season: i32, end_season: i32) -> Result<Vec<GameRow>> {
        let mut rows = Vec::new();
        for season in start_season..=end_season {
            rows.extend(self.game_rows(season)?);
        }
        Ok(rows)
    }
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

fn map_team(row: &rusqlite::Row) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(0)?,
        abbreviation: row.get(1)?,
        name: row.get(2)?,
    })
}

fn map_game_row(row: &rusqlite::Row) -> rusqlite::Result<GameRow> {
    Ok(GameRow {
        season: row.get(0)?,
        game: row.get(1)?,
        team: row.get(2)?,
        score_state: row.get(3)?,
        corsi_for: row.get(4)?,
        corsi_against: row.get(5)?,
        seconds: row.get(6)?,
    })
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS teams (
    id           INTEGER PRIMARY KEY,
    abbreviation TEXT    NOT NULL,
    name         TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS score_state_rows (
    season      INTEGER NOT NULL,
    game        INTEGER NOT NULL,
    team        INTEGER NOT NULL,
    score_state INTEGER NOT NULL,
    cf          INTEGER NOT NULL,
    ca          INTEGER NOT NULL,
    secs        INTEGER NOT NULL,
    PRIMARY KEY (season, game, team, score_state)
);

CREATE INDEX IF NOT EXISTS idx_score_state_rows_season ON score_state_rows(season);
"#;
