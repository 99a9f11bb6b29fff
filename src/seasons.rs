use anyhow::{Context, Result};
use chrono::NaiveDate;

/// Calendar bounds of an inclusive season range.
///
/// Season 2015 is 2015-16; the window opens on 15 September of the start year
/// and closes on 21 June after the end season.
pub fn season_date_range(start_season: i32, end_season: i32) -> Result<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(start_season, 9, 15)
        .with_context(|| format!("season {} is out of range", start_season))?;
    let end = end_season
        .checked_add(1)
        .and_then(|year| NaiveDate::from_ymd_opt(year, 6, 21))
        .with_context(|| format!("season {} is out of range", end_season))?;
    Ok((start, end))
}

/// Two-line chart title, e.g. "WSH shot rate by score state\n2015-09-15 to 2017-06-21"
pub fn chart_title(team: &str, start_season: i32, end_season: i32) -> Result<String> {
    let (start, end) = season_date_range(start_season, end_season)?;
    Ok(format!(
        "{} shot rate by score state\n{} to {}",
        team,
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    ))
}
