//! Score-state arrow chart.
//!
//! Each arrow starts at the league-median (CF60, CA60) for a score state and
//! ends at the team's own rate in that state. Right is more offence, up is
//! more defence conceded, so the top-right corner is "Fast" hockey and the
//! bottom-right is "Good".

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::rates::RateTables;

pub mod plot;
pub use plot::PlotCanvas;

/// Corner notes in axes-fraction coordinates
pub const CORNER_NOTES: [(&str, (f64, f64)); 4] = [
    ("Fast", (0.95, 0.95)),
    ("Slow", (0.05, 0.05)),
    ("Good", (0.95, 0.05)),
    ("Bad", (0.05, 0.95)),
];

pub const X_LABEL: &str = "CF60";
pub const Y_LABEL: &str = "CA60";

/// Where a finished chart goes
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Display,
    File(PathBuf),
}

impl From<Option<PathBuf>> for Output {
    fn from(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) => Output::File(p),
            None => Output::Display,
        }
    }
}

/// Drawing surface the renderer writes into.
///
/// Points are in data coordinates unless the method says otherwise.
/// Exactly one of [`Canvas::show`] or [`Canvas::save`] ends a render.
pub trait Canvas {
    fn arrow(&mut self, from: (f64, f64), to: (f64, f64));

    /// Centred text, rotated counter-clockwise by `rotation` degrees
    fn label(&mut self, text: &str, at: (f64, f64), rotation: f64);

    fn scatter(&mut self, points: &[(f64, f64)]);

    /// Text placed by fraction of the plotting area, (0, 0) bottom-left
    fn annotate_fraction(&mut self, text: &str, at: (f64, f64));

    fn set_axis_labels(&mut self, x: &str, y: &str);

    fn set_title(&mut self, title: &str);

    fn show(&mut self) -> Result<()>;

    fn save(&mut self, path: &Path) -> Result<()>;
}

/// Angle in degrees of the segment `start -> end`, in [-90, 90].
///
/// Text rotated by this angle reads along the arrow. A vertical segment gives
/// ±90 following the sign of Δy; coincident points give 0.
pub fn label_rotation(start: (f64, f64), end: (f64, f64)) -> f64 {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    if dx == 0.0 {
        return if dy > 0.0 {
            90.0
        } else if dy < 0.0 {
            -90.0
        } else {
            0.0
        };
    }
    (dy / dx).atan().to_degrees()
}

fn midpoint(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}

/// Draw one team's score-state chart on `canvas`, then show or save it.
///
/// All seven team and league points are looked up before anything is drawn,
/// so a missing team or state fails without touching the canvas.
pub fn render_score_state_chart<C: Canvas + ?Sized>(
    canvas: &mut C,
    tables: &RateTables,
    team: u32,
    title: &str,
    output: &Output,
) -> Result<()> {
    let team_points = tables.team_points(team)?;
    let league_points = tables.league_medians()?;

    for (league, own) in league_points.iter().zip(&team_points) {
        let from = league.point.xy();
        let to = own.xy();
        canvas.arrow(from, to);
        canvas.label(
            &own.score_state.label(),
            midpoint(from, to),
            label_rotation(from, to),
        );
    }

    let medians: Vec<(f64, f64)> = league_points.iter().map(|m| m.point.xy()).collect();
    let own: Vec<(f64, f64)> = team_points.iter().map(|p| p.xy()).collect();
    canvas.scatter(&medians);
    canvas.scatter(&own);

    for (text, at) in CORNER_NOTES {
        canvas.annotate_fraction(text, at);
    }

    canvas.set_axis_labels(X_LABEL, Y_LABEL);
    canvas.set_title(title);

    match output {
        Output::Display => canvas.show(),
        Output::File(path) => {
            canvas.save(path)?;
            info!("Chart written to {}", path.display());
            Ok(())
        }
    }
}
