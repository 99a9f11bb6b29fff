use std::fmt;

use serde::Serialize;

/// Goal differential from a team's point of view, clamped to ±3.
///
/// Anything more lopsided than a three-goal game is reported as a three-goal
/// game, so the domain is exactly -3..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ScoreState(i8);

impl ScoreState {
    pub const MAX: i32 = 3;
    pub const TIED: ScoreState = ScoreState(0);

    /// Fold a raw goal differential into -3..=3
    pub fn clamp(raw: i32) -> Self {
        ScoreState(raw.clamp(-Self::MAX, Self::MAX) as i8)
    }

    /// Trail 3 through Lead 3, ascending
    pub fn all() -> impl Iterator<Item = ScoreState> {
        (-Self::MAX..=Self::MAX).map(ScoreState::clamp)
    }

    pub fn value(self) -> i32 {
        i32::from(self.0)
    }

    /// Chart label: "Trail 2", "Tied", "Lead 1"
    pub fn label(self) -> String {
        match self.value() {
            0 => "Tied".to_string(),
            n if n > 0 => format!("Lead {}", n),
            n => format!("Trail {}", -n),
        }
    }
}

impl fmt::Display for ScoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ScoreState::TIED => write!(f, "0"),
            state => write!(f, "{:+}", state.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_folds_extremes() {
        assert_eq!(ScoreState::clamp(-7).value(), -3);
        assert_eq!(ScoreState::clamp(-4).value(), -3);
        assert_eq!(ScoreState::clamp(4).value(), 3);
        assert_eq!(ScoreState::clamp(i32::MAX).value(), 3);
        assert_eq!(ScoreState::clamp(-2).value(), -2);
        assert_eq!(ScoreState::clamp(0), ScoreState::TIED);
    }

    #[test]
    fn test_all_covers_seven_states_in_order() {
        let values: Vec<i32> = ScoreState::all().map(ScoreState::value).collect();
        assert_eq!(values, vec![-3, -2, -1, 0, 1, 2, 3]);
    }

    #[test]
    fn test_labels() {
        assert_eq!(ScoreState::clamp(-3).label(), "Trail 3");
        assert_eq!(ScoreState::clamp(0).label(), "Tied");
        assert_eq!(ScoreState::clamp(2).label(), "Lead 2");
        assert_eq!(ScoreState::clamp(-1).to_string(), "-1");
        assert_eq!(ScoreState::clamp(1).to_string(), "+1");
        assert_eq!(ScoreState::TIED.to_string(), "0");
        assert_eq!(ScoreState::TIED.label(), "Tied");
    }
}
