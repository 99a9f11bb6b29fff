use serde::{Deserialize, Serialize};

/// An NHL franchise as stored in the `teams` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "Team")]
    pub id: u32,
    /// Three-letter code, e.g. "WSH"
    #[serde(rename = "Abbreviation")]
    pub abbreviation: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// 5v5 shot attempts for one team in one game while at one score state.
///
/// `score_state` is the raw goal differential from the team's point of view
/// and is not clamped here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRow {
    #[serde(rename = "Season")]
    pub season: i32,
    #[serde(rename = "Game")]
    pub game: i32,
    #[serde(rename = "Team")]
    pub team: u32,
    #[serde(rename = "ScoreState")]
    pub score_state: i32,
    /// Corsi for (shot attempts by this team)
    #[serde(rename = "CF")]
    pub corsi_for: u32,
    /// Corsi against
    #[serde(rename = "CA")]
    pub corsi_against: u32,
    #[serde(rename = "Secs")]
    pub seconds: u32,
}
