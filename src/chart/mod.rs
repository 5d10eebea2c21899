//! Radar chart: polar geometry and PNG drawing.

pub mod geometry;
pub mod render;

pub use geometry::{
    angles, close_loop, scale_interest, Axis, RadarGeometry, Series, RADIAL_MAX, RADIAL_TICKS,
};
pub use render::{
    encode_base64, render_base64, render_png, to_data_url, ChartOptions, DEFAULT_CHART_SIZE,
};
