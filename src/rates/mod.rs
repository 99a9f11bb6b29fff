//! Shot-attempt rates per 60 minutes, by team and score state.
//!
//! Per-game rows are summed per (team, score state) before the rate is taken,
//! so a team's CF60 is weighted by time spent in each state rather than being
//! an average of per-game rates.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::db::models::GameRow;

pub mod score_state;
pub use score_state::ScoreState;

const SECONDS_PER_HOUR: f64 = 3600.0;

#[derive(Debug, Error, PartialEq)]
pub enum RateError {
    #[error("team {0} has no score-state rows in the requested seasons")]
    UnknownTeam(u32),
    #[error("team {team} has no rows at score state {state}")]
    MissingTeamState { team: u32, state: ScoreState },
    #[error("no league rows at score state {0}")]
    MissingLeagueState(ScoreState),
    #[error("team {team} logged zero seconds at score state {state}")]
    ZeroSeconds { team: u32, state: ScoreState },
}

/// Summed counts for one team at one clamped score state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateRow {
    pub team: u32,
    pub score_state: ScoreState,
    pub corsi_for: u64,
    pub corsi_against: u64,
    pub seconds: u64,
}

impl RateRow {
    /// CF60 / CA60 for this row; zero seconds is an error rather than infinity
    pub fn point(&self) -> Result<RatePoint, RateError> {
        if self.seconds == 0 {
            return Err(RateError::ZeroSeconds {
                team: self.team,
                state: self.score_state,
            });
        }
        let secs = self.seconds as f64;
        Ok(RatePoint {
            score_state: self.score_state,
            cf60: self.corsi_for as f64 * SECONDS_PER_HOUR / secs,
            ca60: self.corsi_against as f64 * SECONDS_PER_HOUR / secs,
        })
    }
}

/// A position on the chart: x = CF60, y = CA60
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatePoint {
    pub score_state: ScoreState,
    pub cf60: f64,
    pub ca60: f64,
}

impl RatePoint {
    pub fn xy(&self) -> (f64, f64) {
        (self.cf60, self.ca60)
    }
}

/// Median across teams at one score state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeagueMedian {
    #[serde(flatten)]
    pub point: RatePoint,
    /// Median time spent in this state, per team
    pub seconds: f64,
}

/// A team's summed row alongside its rates, for reporting
#[derive(Debug, Serialize)]
struct TeamRate {
    #[serde(flatten)]
    row: RateRow,
    cf60: f64,
    ca60: f64,
}

/// Output of [`aggregate`]: per-team rates and league medians, both keyed by score state
#[derive(Debug, Clone, Default)]
pub struct RateTables {
    teams: BTreeMap<(u32, ScoreState), RateRow>,
    league: BTreeMap<ScoreState, LeagueMedian>,
}

/// Clamp, sum and normalise per-game rows, then take per-state league medians.
///
/// Groups with zero seconds have no rate and stay out of the medians; asking
/// for that team and state later gives [`RateError::ZeroSeconds`].
pub fn aggregate(rows: &[GameRow]) -> RateTables {
    let mut sums: BTreeMap<(u32, ScoreState), RateRow> = BTreeMap::new();
    for r in rows {
        let state = ScoreState::clamp(r.score_state);
        let entry = sums.entry((r.team, state)).or_insert(RateRow {
            team: r.team,
            score_state: state,
            corsi_for: 0,
            corsi_against: 0,
            seconds: 0,
        });
        entry.corsi_for += u64::from(r.corsi_for);
        entry.corsi_against += u64::from(r.corsi_against);
        entry.seconds += u64::from(r.seconds);
    }

    let points: Vec<(u64, RatePoint)> = sums
        .values()
        .filter_map(|row| row.point().ok().map(|p| (row.seconds, p)))
        .collect();
    let skipped = sums.len() - points.len();
    if skipped > 0 {
        debug!("{} team/state groups with zero seconds left out of the medians", skipped);
    }

    let mut league = BTreeMap::new();
    for state in ScoreState::all() {
        let at_state: Vec<&(u64, RatePoint)> = points
            .iter()
            .filter(|(_, p)| p.score_state == state)
            .collect();
        let cf60 = median(at_state.iter().map(|(_, p)| p.cf60));
        let ca60 = median(at_state.iter().map(|(_, p)| p.ca60));
        let seconds = median(at_state.iter().map(|(secs, _)| *secs as f64));
        if let (Some(cf60), Some(ca60), Some(seconds)) = (cf60, ca60, seconds) {
            league.insert(
                state,
                LeagueMedian {
                    point: RatePoint {
                        score_state: state,
                        cf60,
                        ca60,
                    },
                    seconds,
                },
            );
        }
    }

    debug!(
        "Aggregated {} rows into {} team/state groups ({} league states)",
        rows.len(),
        sums.len(),
        league.len()
    );

    RateTables {
        teams: sums,
        league,
    }
}

/// Median of the values; the mean of the middle two for an even count
pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut v: Vec<f64> = values.into_iter().collect();
    if v.is_empty() {
        return None;
    }
    v.sort_by(|a, b| a.total_cmp(b));
    let mid = v.len() / 2;
    if v.len() % 2 == 0 {
        Some((v[mid - 1] + v[mid]) / 2.0)
    } else {
        Some(v[mid])
    }
}

impl RateTables {
    pub fn contains_team(&self, team: u32) -> bool {
        self.teams.keys().any(|(t, _)| *t == team)
    }

    /// Summed counts for a team at a state
    pub fn team_row(&self, team: u32, state: ScoreState) -> Result<RateRow, RateError> {
        match self.teams.get(&(team, state)) {
            Some(row) => Ok(*row),
            None if !self.contains_team(team) => Err(RateError::UnknownTeam(team)),
            None => Err(RateError::MissingTeamState { team, state }),
        }
    }

    pub fn team_point(&self, team: u32, state: ScoreState) -> Result<RatePoint, RateError> {
        self.team_row(team, state)?.point()
    }

    /// One point per score state, Trail 3 first
    pub fn team_points(&self, team: u32) -> Result<Vec<RatePoint>, RateError> {
        ScoreState::all()
            .map(|state| self.team_point(team, state))
            .collect()
    }

    pub fn league_median(&self, state: ScoreState) -> Result<LeagueMedian, RateError> {
        self.league
            .get(&state)
            .copied()
            .ok_or(RateError::MissingLeagueState(state))
    }

    pub fn league_medians(&self) -> Result<Vec<LeagueMedian>, RateError> {
        ScoreState::all().map(|state| self.league_median(state)).collect()
    }

    /// JSON view of one team's rows next to the league medians
    pub fn team_report(&self, team: u32) -> Result<serde_json::Value, RateError> {
        let rows = ScoreState::all()
            .map(|state| {
                let row = self.team_row(team, state)?;
                let point = row.point()?;
                Ok(TeamRate {
                    row,
                    cf60: point.cf60,
                    ca60: point.ca60,
                })
            })
            .collect::<Result<Vec<_>, RateError>>()?;
        let league = self.league_medians()?;
        Ok(serde_json::json!({
            "team": team,
            "rates": rows,
            "league_median": league,
        }))
    }
}
