use std::io::Write;
use std::ops::Range;
use std::path::Path;

use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use tracing::debug;

use super::Canvas;

const PADDING_FRACTION: f64 = 0.1;
const HEAD_LENGTH: f64 = 0.025;
const HEAD_HALF_WIDTH: f64 = 0.01;
const LABEL_FONT_PX: u32 = 13;
const NOTE_FONT_PX: u32 = 16;
const GREY: RGBColor = RGBColor(128, 128, 128);

#[derive(Debug, Clone)]
struct Label {
    text: String,
    at: (f64, f64),
    rotation: f64,
}

#[derive(Debug, Clone)]
struct Note {
    text: String,
    at: (f64, f64),
}

/// [`Canvas`] that collects a scene and draws it with plotters when finished.
///
/// `save` picks SVG or bitmap output from the file extension; `show` writes
/// the SVG to stdout.
#[derive(Debug, Clone)]
pub struct PlotCanvas {
    size: (u32, u32),
    arrows: Vec<((f64, f64), (f64, f64))>,
    labels: Vec<Label>,
    points: Vec<(f64, f64)>,
    notes: Vec<Note>,
    x_label: String,
    y_label: String,
    title: String,
}

impl PlotCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        PlotCanvas {
            size: (width, height),
            arrows: Vec::new(),
            labels: Vec::new(),
            points: Vec::new(),
            notes: Vec::new(),
            x_label: String::new(),
            y_label: String::new(),
            title: String::new(),
        }
    }

    /// Render the scene as an SVG document
    pub fn to_svg_string(&self) -> Result<String> {
        let mut buf = String::new();
        {
            let root = SVGBackend::with_string(&mut buf, self.size).into_drawing_area();
            self.draw(root)?;
        }
        Ok(buf)
    }

    /// Padded x and y ranges covering every arrow end and marker
    fn bounds(&self) -> (Range<f64>, Range<f64>) {
        let coords = self
            .arrows
            .iter()
            .flat_map(|(a, b)| [*a, *b])
            .chain(self.points.iter().copied());
        let (mut x0, mut x1, mut y0, mut y1) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
        for (x, y) in coords {
            x0 = x0.min(x);
            x1 = x1.max(x);
            y0 = y0.min(y);
            y1 = y1.max(y);
        }
        (padded(x0, x1), padded(y0, y1))
    }

    fn draw<DB>(&self, root: DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;
        let (xr, yr) = self.bounds();
        let caption = self.title.lines().collect::<Vec<_>>().join(", ");

        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 22))
            .margin(25)
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 45)
            .build_cartesian_2d(xr.clone(), yr.clone())?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc(self.x_label.as_str())
            .y_desc(self.y_label.as_str())
            .x_label_formatter(&|v| format!("{:.0}", v))
            .y_label_formatter(&|v| format!("{:.0}", v))
            .draw()?;

        let frame = Frame { x: xr, y: yr };

        for &(from, to) in &self.arrows {
            chart.draw_series(std::iter::once(PathElement::new(
                vec![from, to],
                BLACK.stroke_width(1),
            )))?;
            if let Some(head) = frame.arrow_head(from, to) {
                chart.draw_series(std::iter::once(Polygon::new(head, BLACK.filled())))?;
            }
        }

        chart.draw_series(
            self.points
                .iter()
                .map(|&p| Circle::new(p, 7, WHITE.filled())),
        )?;
        chart.draw_series(
            self.points
                .iter()
                .map(|&p| Circle::new(p, 7, GREY.stroke_width(1))),
        )?;

        // Text sits on a white box so arrows and markers don't run through it
        for label in &self.labels {
            let transform = font_transform(label.rotation);
            let vertical = !matches!(transform, FontTransform::None);
            let style = TextStyle::from(("sans-serif", LABEL_FONT_PX).into_font())
                .pos(Pos::new(HPos::Center, VPos::Center))
                .transform(transform);
            let corners = text_box(&label.text, LABEL_FONT_PX, vertical);
            chart.draw_series(std::iter::once(
                EmptyElement::at(label.at)
                    + Rectangle::new(corners, WHITE.filled())
                    + Text::new(label.text.clone(), (0, 0), style),
            ))?;
        }

        for note in &self.notes {
            let style = TextStyle::from(("sans-serif", NOTE_FONT_PX).into_font())
                .pos(Pos::new(HPos::Center, VPos::Center));
            let corners = text_box(&note.text, NOTE_FONT_PX, false);
            chart.draw_series(std::iter::once(
                EmptyElement::at(frame.to_data(note.at))
                    + Rectangle::new(corners, WHITE.filled())
                    + Rectangle::new(corners, GREY.stroke_width(1))
                    + Text::new(note.text.clone(), (0, 0), style),
            ))?;
        }

        root.present()?;
        Ok(())
    }
}

impl PlotCanvas {
    #[cfg(feature = "ttf")]
    fn draw_bitmap(&self, path: &Path) -> Result<()> {
        self.draw(BitMapBackend::new(path, self.size).into_drawing_area())
    }

    /// Bitmap text needs a real font engine; without one plotters panics on the first label
    #[cfg(not(feature = "ttf"))]
    fn draw_bitmap(&self, path: &Path) -> Result<()> {
        anyhow::bail!(
            "bitmap output for {} needs the `ttf` feature; use an .svg path instead",
            path.display()
        )
    }
}

impl Canvas for PlotCanvas {
    fn arrow(&mut self, from: (f64, f64), to: (f64, f64)) {
        self.arrows.push((from, to));
    }

    fn label(&mut self, text: &str, at: (f64, f64), rotation: f64) {
        self.labels.push(Label {
            text: text.to_string(),
            at,
            rotation,
        });
    }

    fn scatter(&mut self, points: &[(f64, f64)]) {
        self.points.extend_from_slice(points);
    }

    fn annotate_fraction(&mut self, text: &str, at: (f64, f64)) {
        self.notes.push(Note {
            text: text.to_string(),
            at,
        });
    }

    fn set_axis_labels(&mut self, x: &str, y: &str) {
        self.x_label = x.to_string();
        self.y_label = y.to_string();
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn show(&mut self) -> Result<()> {
        let svg = self.to_svg_string()?;
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(svg.as_bytes())
            .context("Failed to write chart to stdout")?;
        stdout.flush()?;
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        debug!("Rendering {}x{} chart as '{}'", self.size.0, self.size.1, ext);
        let rendered = match ext.as_str() {
            "svg" => self.draw(SVGBackend::new(path, self.size).into_drawing_area()),
            "png" | "bmp" | "jpg" | "jpeg" => self.draw_bitmap(path),
            _ => anyhow::bail!(
                "unsupported chart format for {} (use svg, png, bmp or jpg)",
                path.display()
            ),
        };
        rendered.with_context(|| format!("Failed to render chart to {}", path.display()))
    }
}

/// Axis ranges, for converting axes-fraction coordinates to data coordinates
struct Frame {
    x: Range<f64>,
    y: Range<f64>,
}

impl Frame {
    fn to_data(&self, (fx, fy): (f64, f64)) -> (f64, f64) {
        (
            self.x.start + fx * (self.x.end - self.x.start),
            self.y.start + fy * (self.y.end - self.y.start),
        )
    }

    fn to_fraction(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (
            (x - self.x.start) / (self.x.end - self.x.start),
            (y - self.y.start) / (self.y.end - self.y.start),
        )
    }

    /// Triangle at `to`, sized in axes-fraction space so it looks the same
    /// whatever the axis scales
    fn arrow_head(&self, from: (f64, f64), to: (f64, f64)) -> Option<Vec<(f64, f64)>> {
        let a = self.to_fraction(from);
        let b = self.to_fraction(to);
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let len = dx.hypot(dy);
        if len == 0.0 || !len.is_finite() {
            return None;
        }
        let (ux, uy) = (dx / len, dy / len);
        let base = (b.0 - ux * HEAD_LENGTH, b.1 - uy * HEAD_LENGTH);
        let left = (base.0 - uy * HEAD_HALF_WIDTH, base.1 + ux * HEAD_HALF_WIDTH);
        let right = (base.0 + uy * HEAD_HALF_WIDTH, base.1 - ux * HEAD_HALF_WIDTH);
        Some(vec![to, self.to_data(left), self.to_data(right)])
    }
}

fn padded(lo: f64, hi: f64) -> Range<f64> {
    if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return 0.0..1.0;
    }
    let span = hi - lo;
    let pad = if span > 0.0 { span * PADDING_FRACTION } else { 1.0 };
    (lo - pad)..(hi + pad)
}

/// plotters only rotates text in quarter turns. Steep labels turn vertical in
/// the arrow's direction: upward for rising arrows, downward for falling ones.
fn font_transform(rotation: f64) -> FontTransform {
    if rotation > 45.0 {
        FontTransform::Rotate270
    } else if rotation < -45.0 {
        FontTransform::Rotate90
    } else {
        FontTransform::None
    }
}

/// Pixel corners, relative to the text anchor, of the box behind centred text
fn text_box(text: &str, font_px: u32, vertical: bool) -> [(i32, i32); 2] {
    let font_px = f64::from(font_px);
    let chars = text.chars().count() as f64;
    let along = (chars * font_px * 0.6).ceil() as i32 + 8;
    let across = (font_px * 1.2).ceil() as i32 + 4;
    let (w, h) = if vertical { (across, along) } else { (along, across) };
    [(-w / 2, -h / 2), (w / 2, h / 2)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::tests::two_team_rows;
    use crate::chart::{render_score_state_chart, Output};
    use crate::rates::aggregate;
    use approx::assert_relative_eq;

    fn scene() -> PlotCanvas {
        let mut canvas = PlotCanvas::new(800, 600);
        canvas.arrow((40.0, 50.0), (60.0, 70.0));
        canvas.label("Tied", (50.0, 60.0), 45.0);
        canvas.scatter(&[(40.0, 50.0), (60.0, 70.0)]);
        canvas.annotate_fraction("Fast", (0.95, 0.95));
        canvas.set_axis_labels("CF60", "CA60");
        canvas.set_title("WSH shot rate by score state\n2015-09-15 to 2016-06-21");
        canvas
    }

    #[test]
    fn test_bounds_pad_by_tenth_of_span() {
        let (x, y) = scene().bounds();
        assert_relative_eq!(x.start, 38.0, epsilon = 1e-9);
        assert_relative_eq!(x.end, 62.0, epsilon = 1e-9);
        assert_relative_eq!(y.start, 48.0, epsilon = 1e-9);
        assert_relative_eq!(y.end, 72.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_bounds() {
        assert_eq!(padded(5.0, 5.0), 4.0..6.0);
        assert_eq!(padded(f64::MAX, f64::MIN), 0.0..1.0);
    }

    #[test]
    fn test_fraction_maps_to_axis_range() {
        let frame = Frame {
            x: 0.0..200.0,
            y: 10.0..20.0,
        };
        let (x, y) = frame.to_data((0.95, 0.05));
        assert_relative_eq!(x, 190.0, epsilon = 1e-9);
        assert_relative_eq!(y, 10.5, epsilon = 1e-9);
    }

    #[test]
    fn test_arrow_head_tip_and_zero_length() {
        let frame = Frame {
            x: 0.0..1.0,
            y: 0.0..1.0,
        };
        let head = frame.arrow_head((0.0, 0.5), (1.0, 0.5)).unwrap();
        assert_eq!(head[0], (1.0, 0.5));
        assert_relative_eq!(head[1].0, 1.0 - HEAD_LENGTH, epsilon = 1e-12);
        assert_relative_eq!(head[1].1, 0.5 + HEAD_HALF_WIDTH, epsilon = 1e-12);
        assert!(frame.arrow_head((0.3, 0.3), (0.3, 0.3)).is_none());
    }

    #[test]
    fn test_font_transform_snaps_steep_labels() {
        assert!(matches!(font_transform(10.0), FontTransform::None));
        assert!(matches!(font_transform(-45.0), FontTransform::None));
        assert!(matches!(font_transform(80.0), FontTransform::Rotate270));
        assert!(matches!(font_transform(90.0), FontTransform::Rotate270));
        assert!(matches!(font_transform(-80.0), FontTransform::Rotate90));
        assert!(matches!(font_transform(-90.0), FontTransform::Rotate90));
    }

    #[test]
    fn test_text_box_fits_text_and_follows_orientation() {
        let [(x0, y0), (x1, y1)] = text_box("Trail 3", LABEL_FONT_PX, false);
        assert!(x0 < 0 && y0 < 0);
        assert_eq!((x0, y0), (-x1, -y1));
        assert!(x1 - x0 > y1 - y0);
        assert!(text_box("Lead 10", 13, false)[1].0 > text_box("Tied", 13, false)[1].0);

        let [(vx0, vy0), (vx1, vy1)] = text_box("Trail 3", LABEL_FONT_PX, true);
        assert_eq!((vx1 - vx0, vy1 - vy0), (y1 - y0, x1 - x0));
    }

    #[test]
    fn test_svg_draws_white_boxes_behind_text() {
        let svg = scene().to_svg_string().unwrap();
        let white_rects = svg
            .split('<')
            .filter(|el| el.starts_with("rect") && el.to_ascii_uppercase().contains("#FFFFFF"))
            .count();
        // background, one label box, one note box
        assert!(white_rects >= 3, "only {} white rects", white_rects);
    }

    #[test]
    fn test_svg_contains_labels_and_notes() {
        let svg = scene().to_svg_string().unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Tied"));
        assert!(svg.contains("Fast"));
        assert!(svg.contains("CF60"));
        assert!(svg.contains("WSH shot rate by score state, 2015-09-15 to 2016-06-21"));
    }

    #[test]
    fn test_save_svg_file() {
        let tables = aggregate(&two_team_rows());
        let path = std::env::temp_dir().join(format!(
            "shotrate-chart-test-{}.svg",
            std::process::id()
        ));
        let mut canvas = PlotCanvas::new(640, 480);
        render_score_state_chart(&mut canvas, &tables, 1, "Team 1", &Output::File(path.clone()))
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(written.contains("Lead 3"));
        assert!(written.contains("Trail 3"));
    }

    #[cfg(not(feature = "ttf"))]
    #[test]
    fn test_bitmap_without_fonts_is_an_error() {
        let mut canvas = scene();
        let err = canvas.save(Path::new("chart.png")).unwrap_err();
        assert!(format!("{:#}", err).contains("ttf"));
    }

    #[test]
    fn test_save_rejects_unknown_extension() {
        let mut canvas = scene();
        assert!(canvas.save(Path::new("chart.txt")).is_err());
    }
}
