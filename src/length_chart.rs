//! Line-and-marker chart of record lengths, longest first, drawn as SVG and
//! rasterized to PNG.

use crate::filter::ResultTable;
use crate::table_export::ensure_parent_dir;
use anyhow::{Context, Result, anyhow};
use resvg::{tiny_skia, usvg};
use std::fs;
use std::path::Path;
use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Line, Path as SvgPath, Rectangle, Text};

const W: f32 = 1200.0;
const H: f32 = 600.0;
const PAD: f32 = 12.0;
const TITLE: &str = "Filtered Sequence Lengths";
const X_AXIS_TITLE: &str = "GenBank Accession";
const Y_AXIS_TITLE: &str = "Sequence Length";
const FONT: &str = "Helvetica, Arial, sans-serif";
const TITLE_FONT_SIZE: f32 = 14.0;
const AXIS_TITLE_FONT_SIZE: f32 = 11.0;
const TICK_FONT_SIZE: f32 = 9.0;
const ACCESSION_FONT_SIZE: f32 = 6.0;
// Average glyph advance relative to font size, used to size margins.
const GLYPH_WIDTH: f32 = 0.6;
const TICK_LEN: f32 = 4.0;
const LINE_COLOR: &str = "#1f77b4";

#[derive(Clone, Debug)]
struct Frame {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl Frame {
    fn width(&self) -> f32 {
        self.right - self.left
    }

    fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// Tick values covering `[lo, hi]` with a 1/2/5 step.
fn nice_ticks(lo: f64, hi: f64) -> Vec<f64> {
    let span = (hi - lo).max(f64::EPSILON);
    let raw = span / 6.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = match raw / magnitude {
        r if r < 1.5 => 1.0,
        r if r < 3.0 => 2.0,
        r if r < 7.0 => 5.0,
        _ => 10.0,
    } * magnitude;
    let mut ticks = vec![];
    let mut value = (lo / step).ceil() * step;
    while value <= hi + step * 1e-9 {
        ticks.push(value);
        value += step;
    }
    ticks
}

/// Y range with a 5% margin on both sides; a single value gets a unit pad.
fn value_range(lengths: &[usize]) -> (f64, f64) {
    let (Some(min), Some(max)) = (lengths.iter().min(), lengths.iter().max()) else {
        return (0.0, 1.0);
    };
    let (min, max) = (*min as f64, *max as f64);
    let span = max - min;
    if span == 0.0 {
        let pad = (max * 0.05).max(1.0);
        (min - pad, max + pad)
    } else {
        (min - span * 0.05, max + span * 0.05)
    }
}

fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * GLYPH_WIDTH
}

fn format_tick(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{value:.1}")
    }
}

fn text(content: impl Into<String>, x: f32, y: f32, font_size: f32) -> Text {
    Text::new(content.into())
        .set("x", x)
        .set("y", y)
        .set("font-family", FONT)
        .set("font-size", font_size)
        .set("fill", "#202020")
}

/// Renders the chart for `table` as an SVG document string.
pub fn render_length_chart_svg(table: &ResultTable) -> String {
    let rows = table.sorted_by_length_desc();
    let lengths: Vec<usize> = rows.iter().map(|r| r.length).collect();
    let (lo, hi) = value_range(&lengths);
    let ticks = nice_ticks(lo, hi);
    let tick_labels: Vec<String> = ticks.iter().map(|t| format_tick(*t)).collect();

    // Margins follow the widest labels so nothing is clipped.
    let widest_tick = tick_labels
        .iter()
        .map(|label| text_width(label, TICK_FONT_SIZE))
        .fold(0.0, f32::max);
    let longest_accession = rows
        .iter()
        .map(|r| text_width(&r.accession, ACCESSION_FONT_SIZE))
        .fold(0.0, f32::max);
    let frame = Frame {
        left: PAD + AXIS_TITLE_FONT_SIZE + PAD + widest_tick + TICK_LEN + 4.0,
        top: PAD + TITLE_FONT_SIZE + PAD,
        right: W - PAD,
        bottom: (H - PAD - AXIS_TITLE_FONT_SIZE - PAD - longest_accession - TICK_LEN - 4.0)
            .max(H * 0.5),
    };
    let y_of = |value: f64| -> f32 {
        frame.bottom - ((value - lo) / (hi - lo)) as f32 * frame.height()
    };
    let slot = frame.width() / rows.len().max(1) as f32;
    let x_of = |idx: usize| -> f32 { frame.left + (idx as f32 + 0.5) * slot };

    let mut doc = Document::new()
        .set("viewBox", (0, 0, W, H))
        .set("width", W)
        .set("height", H)
        .add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", W)
                .set("height", H)
                .set("fill", "#ffffff"),
        )
        .add(
            text(TITLE, (frame.left + frame.right) * 0.5, PAD + TITLE_FONT_SIZE, TITLE_FONT_SIZE)
                .set("text-anchor", "middle"),
        );

    for (value, label) in ticks.iter().zip(&tick_labels) {
        let y = y_of(*value);
        doc = doc
            .add(
                Line::new()
                    .set("x1", frame.left - TICK_LEN)
                    .set("y1", y)
                    .set("x2", frame.left)
                    .set("y2", y)
                    .set("stroke", "#202020")
                    .set("stroke-width", 0.8),
            )
            .add(
                text(label.clone(), frame.left - TICK_LEN - 2.0, y, TICK_FONT_SIZE)
                    .set("text-anchor", "end")
                    .set("dominant-baseline", "middle"),
            );
    }

    let mut data = Data::new();
    for (idx, row) in rows.iter().enumerate() {
        let (x, y) = (x_of(idx), y_of(row.length as f64));
        data = if idx == 0 {
            data.move_to((x, y))
        } else {
            data.line_to((x, y))
        };
        let label_y = frame.bottom + TICK_LEN + 2.0;
        doc = doc
            .add(
                Line::new()
                    .set("x1", x)
                    .set("y1", frame.bottom)
                    .set("x2", x)
                    .set("y2", frame.bottom + TICK_LEN)
                    .set("stroke", "#202020")
                    .set("stroke-width", 0.8),
            )
            .add(
                text(row.accession.clone(), x, label_y, ACCESSION_FONT_SIZE)
                    .set("text-anchor", "end")
                    .set("dominant-baseline", "middle")
                    .set("transform", format!("rotate(-90 {x} {label_y})")),
            );
    }
    if rows.len() > 1 {
        doc = doc.add(
            SvgPath::new()
                .set("d", data)
                .set("fill", "none")
                .set("stroke", LINE_COLOR)
                .set("stroke-width", 1.5),
        );
    }
    for (idx, row) in rows.iter().enumerate() {
        doc = doc.add(
            Circle::new()
                .set("cx", x_of(idx))
                .set("cy", y_of(row.length as f64))
                .set("r", 3)
                .set("fill", LINE_COLOR),
        );
    }

    let y_title_x = PAD + AXIS_TITLE_FONT_SIZE;
    let y_title_y = (frame.top + frame.bottom) * 0.5;
    doc = doc
        .add(
            Rectangle::new()
                .set("x", frame.left)
                .set("y", frame.top)
                .set("width", frame.width())
                .set("height", frame.height())
                .set("fill", "none")
                .set("stroke", "#202020")
                .set("stroke-width", 0.8),
        )
        .add(
            text(
                X_AXIS_TITLE,
                (frame.left + frame.right) * 0.5,
                H - PAD,
                AXIS_TITLE_FONT_SIZE,
            )
            .set("text-anchor", "middle"),
        )
        .add(
            text(Y_AXIS_TITLE, y_title_x, y_title_y, AXIS_TITLE_FONT_SIZE)
                .set("text-anchor", "middle")
                .set("transform", format!("rotate(-90 {y_title_x} {y_title_y})")),
        );

    doc.to_string()
}

/// Rasterizes an SVG document to PNG bytes on a white background.
pub fn rasterize_svg_to_png(svg_text: &str) -> Result<Vec<u8>> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg_text, &options)
        .map_err(|e| anyhow!("Could not parse chart SVG: {e}"))?;
    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow!("Could not allocate {}x{} raster", size.width(), size.height()))?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    pixmap
        .encode_png()
        .map_err(|e| anyhow!("Could not encode chart PNG: {e}"))
}

/// Renders the chart and writes it as PNG, replacing any existing file.
pub fn write_plot_png(table: &ResultTable, path: &Path) -> Result<()> {
    let png = rasterize_svg_to_png(&render_length_chart_svg(table))?;
    ensure_parent_dir(path)?;
    fs::write(path, png)
        .with_context(|| format!("Could not write plot output '{}'", path.display()))
}
