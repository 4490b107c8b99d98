//! Chart rendering: per-numeric-column histograms and one correlation
//! heatmap, produced as in-memory PNG buffers.
//!
//! Rendering is synchronous and deterministic for a given input. Text is
//! drawn with an embedded DejaVu Sans face registered against plotters'
//! `ab_glyph` backend, so output never depends on system font discovery.

use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::types::ChartImage;
use crate::utils::{collect_numeric_options, collect_numeric_values, numeric_column_names};
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use once_cell::sync::OnceCell;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{register_font, FontStyle};
use polars::prelude::DataFrame;
use tracing::debug;

/// Label used for the correlation heatmap image.
pub const HEATMAP_LABEL: &str = "correlation heatmap";

static FONT_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static FONT_REGISTRATION: OnceCell<std::result::Result<(), String>> = OnceCell::new();

/// Register the embedded chart font exactly once per process.
fn ensure_font_registered() -> Result<()> {
    FONT_REGISTRATION
        .get_or_init(|| {
            register_font("sans-serif", FontStyle::Normal, FONT_BYTES)
                .map_err(|_| "embedded chart font is not a valid TTF face".to_string())
        })
        .clone()
        .map_err(ReportError::Internal)
}

/// Render one histogram per numeric column, in original column order.
pub fn render_histograms(df: &DataFrame, config: &ReportConfig) -> Result<Vec<ChartImage>> {
    let mut charts = Vec::new();

    for name in numeric_column_names(df) {
        let series = df.column(&name)?.as_materialized_series();
        let values = collect_numeric_values(series)?;
        debug!(column = %name, observations = values.len(), "rendering histogram");
        let png = render_histogram_png(&name, &values, config)?;
        charts.push(ChartImage::new(name, png));
    }

    Ok(charts)
}

/// Render the correlation heatmap over all numeric columns.
///
/// Returns `None` when fewer than two numeric columns exist or when the
/// heatmap is disabled in the configuration; a single column's 1x1 matrix
/// carries no information.
pub fn render_corr_heatmap(df: &DataFrame, config: &ReportConfig) -> Result<Option<ChartImage>> {
    if !config.render_heatmap {
        return Ok(None);
    }

    let names = numeric_column_names(df);
    if names.len() < 2 {
        return Ok(None);
    }

    let mut columns = Vec::with_capacity(names.len());
    for name in &names {
        let series = df.column(name)?.as_materialized_series();
        columns.push(collect_numeric_options(series)?);
    }

    let matrix = correlation_matrix(&columns);
    let png = render_heatmap_png(&names, &matrix, config)?;
    Ok(Some(ChartImage::new(HEATMAP_LABEL, png)))
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Pearson correlation matrix over pairwise-complete observations.
///
/// Pairs involving a zero-variance column correlate as 0.0 off the
/// diagonal; the diagonal is always 1.0.
pub(crate) fn correlation_matrix(columns: &[Vec<Option<f64>>]) -> Vec<Vec<f64>> {
    let n = columns.len();
    let mut matrix = vec![vec![0.0; n]; n];

    for i in 0..n {
        matrix[i][i] = 1.0;
        for j in (i + 1)..n {
            let r = pearson_pairwise(&columns[i], &columns[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }

    matrix
}

fn pearson_pairwise(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b.iter())
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some((*x, *y)),
            _ => None,
        })
        .collect();

    if pairs.len() < 2 {
        return 0.0;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }

    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Histogram bin edges and counts for a value slice.
///
/// Automatic bin count is the larger of the Sturges and Freedman-Diaconis
/// estimates, clamped to [1, 50]. A fixed count from the configuration
/// overrides the estimate.
pub(crate) fn histogram_bins(values: &[f64], fixed_bins: Option<usize>) -> (f64, f64, Vec<usize>) {
    if values.is_empty() {
        return (0.0, 1.0, vec![0]);
    }

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        return (min, min + 1.0, vec![values.len()]);
    }

    let bin_count = fixed_bins.unwrap_or_else(|| auto_bin_count(values, min, max));
    let width = (max - min) / bin_count as f64;

    let mut counts = vec![0usize; bin_count];
    for v in values {
        let idx = (((v - min) / width) as usize).min(bin_count - 1);
        counts[idx] += 1;
    }

    (min, max, counts)
}

fn auto_bin_count(values: &[f64], min: f64, max: f64) -> usize {
    let n = values.len();
    let sturges = (n as f64).log2().ceil() as usize + 1;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let q1 = sorted[(n as f64 * 0.25) as usize];
    let q3 = sorted[((n as f64 * 0.75) as usize).min(n - 1)];
    let iqr = q3 - q1;

    let fd = if iqr > 0.0 {
        let width = 2.0 * iqr / (n as f64).cbrt();
        ((max - min) / width).ceil() as usize
    } else {
        0
    };

    sturges.max(fd).clamp(1, 50)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn chart_err(chart: &str, e: impl std::fmt::Display) -> ReportError {
    ReportError::ChartRenderFailed {
        chart: chart.to_string(),
        reason: e.to_string(),
    }
}

fn encode_png(buf: &[u8], width: u32, height: u32, chart: &str) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(buf, width, height, ColorType::Rgb8)
        .map_err(|e| chart_err(chart, e))?;
    Ok(png)
}

fn render_histogram_png(name: &str, values: &[f64], config: &ReportConfig) -> Result<Vec<u8>> {
    ensure_font_registered()?;

    let (width, height) = (config.chart_width, config.chart_height);
    let (min, max, counts) = histogram_bins(values, config.histogram_bins);
    let bin_width = (max - min) / counts.len() as f64;
    let y_max = counts.iter().copied().max().unwrap_or(0).max(1) as f64 * 1.1;

    let mut buf = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| chart_err(name, e))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Distribution of {}", name), ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(min..max, 0f64..y_max)
            .map_err(|e| chart_err(name, e))?;

        chart
            .configure_mesh()
            .x_desc(name)
            .y_desc("Count")
            .disable_x_mesh()
            .draw()
            .map_err(|e| chart_err(name, e))?;

        chart
            .draw_series(counts.iter().enumerate().map(|(i, &count)| {
                let x0 = min + i as f64 * bin_width;
                let x1 = x0 + bin_width;
                Rectangle::new(
                    [(x0, 0.0), (x1, count as f64)],
                    RGBColor(66, 133, 244).mix(0.7).filled(),
                )
            }))
            .map_err(|e| chart_err(name, e))?;

        root.present().map_err(|e| chart_err(name, e))?;
    }

    encode_png(&buf, width, height, name)
}

/// Sequential blue scale for a correlation value in [-1, 1].
fn heatmap_color(value: f64) -> RGBColor {
    let t = ((value + 1.0) / 2.0).clamp(0.0, 1.0);
    let lerp = |a: f64, b: f64| (a + (b - a) * t) as u8;
    RGBColor(lerp(247.0, 8.0), lerp(251.0, 48.0), lerp(255.0, 107.0))
}

fn render_heatmap_png(names: &[String], matrix: &[Vec<f64>], config: &ReportConfig) -> Result<Vec<u8>> {
    ensure_font_registered()?;

    let (width, height) = (config.chart_width, config.chart_height);
    let n = names.len() as i32;

    // Fixed label gutters; cells fill the remaining canvas.
    let left = 110i32;
    let top = 50i32;
    let right = 20i32;
    let bottom = 70i32;
    let grid_w = width as i32 - left - right;
    let grid_h = height as i32 - top - bottom;
    let cell_w = grid_w / n;
    let cell_h = grid_h / n;

    let mut buf = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| chart_err(HEATMAP_LABEL, e))?;

        let title_style = TextStyle::from(("sans-serif", 24).into_font())
            .pos(Pos::new(HPos::Center, VPos::Top));
        root.draw(&Text::new(
            "Correlation Heatmap",
            (width as i32 / 2, 12),
            title_style,
        ))
        .map_err(|e| chart_err(HEATMAP_LABEL, e))?;

        let center = Pos::new(HPos::Center, VPos::Center);
        let label_style = TextStyle::from(("sans-serif", 13).into_font()).pos(center);
        let right_align = TextStyle::from(("sans-serif", 13).into_font())
            .pos(Pos::new(HPos::Right, VPos::Center));

        for (row, row_values) in matrix.iter().enumerate() {
            for (col, &value) in row_values.iter().enumerate() {
                let x0 = left + col as i32 * cell_w;
                let y0 = top + row as i32 * cell_h;
                let color = heatmap_color(value);
                root.draw(&Rectangle::new(
                    [(x0, y0), (x0 + cell_w, y0 + cell_h)],
                    color.filled(),
                ))
                .map_err(|e| chart_err(HEATMAP_LABEL, e))?;
                root.draw(&Rectangle::new(
                    [(x0, y0), (x0 + cell_w, y0 + cell_h)],
                    WHITE.stroke_width(1),
                ))
                .map_err(|e| chart_err(HEATMAP_LABEL, e))?;

                // Dark cells get light annotations so values stay readable.
                let text_color = if (value + 1.0) / 2.0 > 0.6 { &WHITE } else { &BLACK };
                let value_style = TextStyle::from(("sans-serif", 14).into_font())
                    .color(text_color)
                    .pos(center);
                root.draw(&Text::new(
                    format!("{:.2}", value),
                    (x0 + cell_w / 2, y0 + cell_h / 2),
                    value_style,
                ))
                .map_err(|e| chart_err(HEATMAP_LABEL, e))?;
            }
        }

        for (idx, name) in names.iter().enumerate() {
            let i = idx as i32;
            // Row labels on the left, column labels under the grid.
            root.draw(&Text::new(
                truncate_label(name, 14),
                (left - 6, top + i * cell_h + cell_h / 2),
                right_align.clone(),
            ))
            .map_err(|e| chart_err(HEATMAP_LABEL, e))?;
            root.draw(&Text::new(
                truncate_label(name, 14),
                (left + i * cell_w + cell_w / 2, top + n * cell_h + 14),
                label_style.clone(),
            ))
            .map_err(|e| chart_err(HEATMAP_LABEL, e))?;
        }

        root.present().map_err(|e| chart_err(HEATMAP_LABEL, e))?;
    }

    encode_png(&buf, width, height, HEATMAP_LABEL)
}

fn truncate_label(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let prefix: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", prefix)
    }
}
