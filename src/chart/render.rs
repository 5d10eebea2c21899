//! Draws a [`RadarGeometry`] with `plotters` and encodes it as PNG.
//!
//! The canvas is a plain RGB buffer owned by [`render_png`]; plotters draws
//! into it through its bitmap backend and `image` does the PNG encoding.
//! Labels use DejaVu Sans, embedded in the binary and registered once.

use std::io::Cursor;

use base64::Engine;
use image::{DynamicImage, ImageFormat, RgbImage};
use once_cell::sync::Lazy;
use plotters::coord::Shift;
use plotters::element::DashedPathElement;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{register_font, FontStyle};

use super::geometry::{polar_to_pixel, RadarGeometry, Series, RADIAL_MAX, RADIAL_TICKS};
use crate::error::ChartError;

/// Default edge length of the square canvas, in pixels.
pub const DEFAULT_CHART_SIZE: u32 = 800;

/// Chart title drawn above the plot.
pub const CHART_TITLE: &str = "Skills vs Interests Radar Chart";

const FONT_FAMILY: &str = "DejaVu Sans";
const FONT_REGULAR: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
const FONT_BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

const GRID: RGBColor = RGBColor(128, 128, 128);
const TICK_LABEL: RGBColor = RGBColor(64, 64, 64);
const SKILL_COLOR: RGBColor = RGBColor(255, 0, 0);
const INTEREST_COLOR: RGBColor = RGBColor(0, 128, 0);

const GRID_ALPHA: f64 = 0.3;
const LINE_ALPHA: f64 = 0.7;
const SKILL_FILL_ALPHA: f64 = 0.25;
const INTEREST_FILL_ALPHA: f64 = 0.15;

/// Radial tick labels sit along this bearing, between the first two spokes
/// of a typical five-category chart.
const TICK_LABEL_ANGLE: f64 = std::f64::consts::PI / 8.0;

static FONTS: Lazy<Result<(), ChartError>> = Lazy::new(|| {
    for (style, bytes, file) in [
        (FontStyle::Normal, FONT_REGULAR, "DejaVuSans.ttf"),
        (FontStyle::Bold, FONT_BOLD, "DejaVuSans-Bold.ttf"),
    ] {
        register_font(FONT_FAMILY, style, bytes)
            .map_err(|_| ChartError::Font(format!("cannot parse embedded {}", file)))?;
    }
    Ok(())
});

/// Rendering parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartOptions {
    /// Edge length of the square canvas, in pixels.
    pub size: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_CHART_SIZE,
        }
    }
}

/// How a series outline is stroked and its vertices marked.
#[derive(Debug, Clone, Copy)]
struct SeriesStyle {
    label: &'static str,
    color: RGBColor,
    fill_alpha: f64,
    dashed: bool,
    marker: Marker,
}

#[derive(Debug, Clone, Copy)]
enum Marker {
    Circle,
    Square,
}

impl SeriesStyle {
    fn for_series(series: Series) -> Self {
        match series {
            Series::Skills => Self {
                label: "Skills",
                color: SKILL_COLOR,
                fill_alpha: SKILL_FILL_ALPHA,
                dashed: false,
                marker: Marker::Circle,
            },
            Series::Interests => Self {
                label: "Interests",
                color: INTEREST_COLOR,
                fill_alpha: INTEREST_FILL_ALPHA,
                dashed: true,
                marker: Marker::Square,
            },
        }
    }
}

/// Pixel positions and sizes, all proportional to the canvas edge.
#[derive(Debug, Clone, Copy)]
struct Layout {
    size: f64,
    center: (f64, f64),
    radius: f64,
    line_width: u32,
    grid_width: u32,
    marker: i32,
}

impl Layout {
    fn new(size: u32) -> Self {
        let s = f64::from(size);
        let line_width = (s / 266.0).round().max(1.0) as u32;
        Self {
            size: s,
            center: (s / 2.0, s * 0.53),
            radius: s * 0.33,
            line_width,
            grid_width: (s / 800.0).round().max(1.0) as u32,
            marker: (f64::from(line_width) * 2.5).round() as i32,
        }
    }

    fn font_px(&self, fraction: f64) -> f64 {
        (self.size * fraction).max(8.0)
    }

    fn point(&self, theta: f64, r: f64) -> (i32, i32) {
        to_px(polar_to_pixel(theta, r, self.center, self.radius))
    }

    /// Anchor just past the spoke end, aligned so the text grows away from
    /// the plot.
    fn label_anchor(&self, theta: f64) -> ((i32, i32), Pos) {
        let reach = self.radius + self.size * 0.03;
        let (cos, sin) = (theta.cos(), theta.sin());
        let anchor = (
            (self.center.0 + reach * cos).round() as i32,
            (self.center.1 - reach * sin).round() as i32,
        );
        let h = if cos > 0.1 {
            HPos::Left
        } else if cos < -0.1 {
            HPos::Right
        } else {
            HPos::Center
        };
        let v = if sin > 0.1 {
            VPos::Bottom
        } else if sin < -0.1 {
            VPos::Top
        } else {
            VPos::Center
        };
        (anchor, Pos::new(h, v))
    }

    /// Bottom-left corner of a radial tick label, nudged off the ring.
    fn tick_anchor(&self, tick: f64) -> (i32, i32) {
        let (x, y) = self.point(TICK_LABEL_ANGLE, tick);
        (x + 2, y - 2)
    }

    fn title_anchor(&self) -> (i32, i32) {
        ((self.size / 2.0).round() as i32, (self.size * 0.05).round() as i32)
    }

    /// Corners of the legend swatch for `row` (0 = skills, 1 = interests).
    fn legend_swatch(&self, row: usize) -> [(i32, i32); 2] {
        let x0 = self.size * 0.74;
        let y0 = self.size * 0.08 + row as f64 * self.size * 0.04;
        [
            to_px((x0, y0)),
            to_px((x0 + self.size * 0.045, y0 + self.size * 0.025)),
        ]
    }

    fn legend_text(&self, row: usize) -> (i32, i32) {
        let [top_left, bottom_right] = self.legend_swatch(row);
        let gap = (self.size * 0.015).round() as i32;
        (bottom_right.0 + gap, (top_left.1 + bottom_right.1) / 2)
    }
}

fn to_px(point: (f64, f64)) -> (i32, i32) {
    (point.0.round() as i32, point.1.round() as i32)
}

fn draw_error(e: impl std::fmt::Display) -> ChartError {
    ChartError::Draw(e.to_string())
}

/// Render the chart and encode it as PNG bytes.
pub fn render_png(geometry: &RadarGeometry, options: ChartOptions) -> Result<Vec<u8>, ChartError> {
    if geometry.is_empty() {
        return Err(ChartError::NoCategories);
    }
    Lazy::force(&FONTS).clone()?;

    let size = options.size.max(1);
    let mut buffer = vec![255u8; size as usize * size as usize * 3];
    draw(&mut buffer, size, geometry)?;

    let image = RgbImage::from_raw(size, size, buffer)
        .ok_or_else(|| ChartError::Encode("pixel buffer does not match canvas size".into()))?;
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| ChartError::Encode(e.to_string()))?;
    tracing::debug!(
        categories = geometry.len(),
        size = options.size,
        bytes = bytes.len(),
        "rendered radar chart"
    );
    Ok(bytes)
}

/// Render the chart and return the PNG as standard base64.
pub fn render_base64(geometry: &RadarGeometry, options: ChartOptions) -> Result<String, ChartError> {
    render_png(geometry, options).map(|png| encode_base64(&png))
}

pub fn encode_base64(png: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(png)
}

/// Wrap a base64 PNG payload as a `data:` URL for direct use in `<img src>`.
pub fn to_data_url(base64_png: &str) -> String {
    format!("data:image/png;base64,{}", base64_png)
}

fn draw(buffer: &mut [u8], size: u32, geometry: &RadarGeometry) -> Result<(), ChartError> {
    let layout = Layout::new(size);
    let root = BitMapBackend::with_buffer(buffer, (size, size)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_error)?;

    let center = to_px(layout.center);
    let radius = layout.radius.round() as i32;
    let spokes = &geometry.angles[..geometry.len()];

    // Grid: one ring per tick and one spoke per category.
    let grid = GRID.mix(GRID_ALPHA).stroke_width(layout.grid_width);
    for tick in RADIAL_TICKS {
        let r = (tick / RADIAL_MAX * layout.radius).round() as i32;
        root.draw(&Circle::new(center, r, grid)).map_err(draw_error)?;
    }
    for theta in spokes {
        let end = layout.point(*theta, RADIAL_MAX);
        root.draw(&PathElement::new(vec![center, end], grid))
            .map_err(draw_error)?;
    }
    root.draw(&Circle::new(
        center,
        radius,
        BLACK.stroke_width(layout.grid_width),
    ))
    .map_err(draw_error)?;

    let tick_font = (FONT_FAMILY, layout.font_px(0.02)).into_font();
    for tick in RADIAL_TICKS {
        let style = tick_font
            .color(&TICK_LABEL)
            .pos(Pos::new(HPos::Left, VPos::Bottom));
        root.draw(&Text::new(
            format!("{}", tick as u8),
            layout.tick_anchor(tick),
            style,
        ))
        .map_err(draw_error)?;
    }

    let label_font = (FONT_FAMILY, layout.font_px(0.025)).into_font();
    for (category, theta) in geometry.categories.iter().zip(spokes) {
        let (at, pos) = layout.label_anchor(*theta);
        root.draw(&Text::new(
            category.as_str(),
            at,
            label_font.color(&BLACK).pos(pos),
        ))
        .map_err(draw_error)?;
    }

    for series in [Series::Skills, Series::Interests] {
        let style = SeriesStyle::for_series(series);
        let outline: Vec<(i32, i32)> = geometry
            .to_cartesian(series, layout.center, layout.radius)
            .into_iter()
            .map(to_px)
            .collect();
        let vertices = &outline[..geometry.len()];

        root.draw(&Polygon::new(
            vertices.to_vec(),
            style.color.mix(style.fill_alpha).filled(),
        ))
        .map_err(draw_error)?;

        let stroke = style.color.mix(LINE_ALPHA).stroke_width(layout.line_width);
        if style.dashed {
            let dash = layout.line_width * 4;
            let gap = layout.line_width * 2;
            root.draw(&DashedPathElement::new(outline.clone(), dash, gap, stroke))
                .map_err(draw_error)?;
        } else {
            root.draw(&PathElement::new(outline.clone(), stroke))
                .map_err(draw_error)?;
        }

        let mark = style.color.mix(LINE_ALPHA).filled();
        let m = layout.marker;
        for &(x, y) in vertices {
            let drawn = match style.marker {
                Marker::Circle => root.draw(&Circle::new((x, y), m, mark)),
                Marker::Square => root.draw(&Rectangle::new([(x - m, y - m), (x + m, y + m)], mark)),
            };
            drawn.map_err(draw_error)?;
        }
    }

    draw_legend(&root, &layout)?;

    let title_font = (FONT_FAMILY, layout.font_px(0.035), FontStyle::Bold).into_font();
    root.draw(&Text::new(
        CHART_TITLE,
        layout.title_anchor(),
        title_font.color(&BLACK).pos(Pos::new(HPos::Center, VPos::Center)),
    ))
    .map_err(draw_error)?;

    root.present().map_err(draw_error)
}

/// Colour swatch plus series name for each series, skills above interests.
fn draw_legend(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    layout: &Layout,
) -> Result<(), ChartError> {
    let font = (FONT_FAMILY, layout.font_px(0.022)).into_font();
    for (row, series) in [Series::Skills, Series::Interests].into_iter().enumerate() {
        let style = SeriesStyle::for_series(series);
        root.draw(&Rectangle::new(
            layout.legend_swatch(row),
            style.color.mix(LINE_ALPHA).filled(),
        ))
        .map_err(draw_error)?;
        root.draw(&Text::new(
            style.label,
            layout.legend_text(row),
            font.color(&BLACK).pos(Pos::new(HPos::Left, VPos::Center)),
        ))
        .map_err(draw_error)?;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
