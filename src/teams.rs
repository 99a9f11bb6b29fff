use anyhow::Result;
use thiserror::Error;
use tracing::debug;

use crate::db::models::Team;
use crate::db::Database;

/// Alternate codes seen in NHL feeds, mapped to the canonical abbreviation
const VARIANTS: &[(&str, &str)] = &[
    ("WAS", "WSH"),
    ("L.A", "LAK"),
    ("T.B", "TBL"),
    ("S.J", "SJS"),
    ("N.J", "NJD"),
    ("CAL", "CGY"),
    ("TB", "TBL"),
    ("LA", "LAK"),
    ("SJ", "SJS"),
    ("NJ", "NJD"),
    ("MON", "MTL"),
    ("LV", "VGK"),
    ("NAS", "NSH"),
];

#[derive(Debug, Error, PartialEq)]
pub enum TeamError {
    #[error("no team matches '{0}'")]
    NotFound(String),
    #[error("'{0}' matches several teams; use the full name")]
    Ambiguous(String),
}

/// Canonical abbreviation for a known variant, otherwise the input unchanged
pub fn fix_variant(code: &str) -> &str {
    VARIANTS
        .iter()
        .find(|(variant, _)| variant.eq_ignore_ascii_case(code))
        .map(|(_, canonical)| *canonical)
        .unwrap_or(code)
}

/// Parse numeric team references, accepting "15" and "15.0"
fn parse_team_id(query: &str) -> Option<u32> {
    if let Ok(id) = query.parse::<u32>() {
        return Some(id);
    }
    let f: f64 = query.parse().ok()?;
    if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) {
        Some(f as u32)
    } else {
        None
    }
}

/// Resolve a team ID, abbreviation or full name against the teams table.
pub fn resolve(db: &Database, query: &str) -> Result<Team> {
    let query = query.trim();
    if let Some(id) = parse_team_id(query) {
        return db
            .team_by_id(id)?
            .ok_or_else(|| TeamError::NotFound(query.to_string()).into());
    }

    let label = fix_variant(query);
    let mut matches = db.teams_by_label(label)?;
    debug!("Team query '{}' ({}) matched {} team(s)", query, label, matches.len());
    match matches.len() {
        0 => Err(TeamError::NotFound(query.to_string()).into()),
        1 => Ok(matches.remove(0)),
        _ => Err(TeamError::Ambiguous(query.to_string()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        for (id, abbr, name) in [
            (15, "WSH", "Washington Capitals"),
            (26, "LAK", "Los Angeles Kings"),
            (70, "LAK", "Los Angeles Kings (legacy)"),
            (5, "PIT", "Pittsburgh Penguins"),
        ] {
            db.upsert_team(&Team {
                id,
                abbreviation: abbr.into(),
                name: name.into(),
            })
            .unwrap();
        }
        db
    }

    #[test]
    fn test_resolve_by_id_and_float_id() {
        let db = seeded();
        assert_eq!(resolve(&db, "15").unwrap().abbreviation, "WSH");
        assert_eq!(resolve(&db, "15.0").unwrap().abbreviation, "WSH");
    }

    #[test]
    fn test_resolve_by_abbreviation_variant_and_name() {
        let db = seeded();
        assert_eq!(resolve(&db, "WSH").unwrap().id, 15);
        assert_eq!(resolve(&db, "WAS").unwrap().id, 15);
        assert_eq!(resolve(&db, "pittsburgh penguins").unwrap().id, 5);
    }

    #[test]
    fn test_resolve_not_found() {
        let db = seeded();
        let err = resolve(&db, "XYZ").unwrap_err();
        assert_eq!(
            err.downcast_ref::<TeamError>(),
            Some(&TeamError::NotFound("XYZ".into()))
        );
        let err = resolve(&db, "99").unwrap_err();
        assert!(err.downcast_ref::<TeamError>().is_some());
    }

    #[test]
    fn test_resolve_ambiguous_abbreviation() {
        let db = seeded();
        let err = resolve(&db, "L.A").unwrap_err();
        assert_eq!(
            err.downcast_ref::<TeamError>(),
            Some(&TeamError::Ambiguous("L.A".into()))
        );
        assert_eq!(resolve(&db, "Los Angeles Kings").unwrap().id, 26);
    }

    #[test]
    fn test_fix_variant_passthrough() {
        assert_eq!(fix_variant("NAS"), "NSH");
        assert_eq!(fix_variant("BOS"), "BOS");
    }
}
