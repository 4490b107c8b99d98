//! Configuration types for the report pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which pair of output documents the pipeline produces.
///
/// The two layouts correspond to the two shapes a report can take: a
/// text-only summary document paired with a graphs-only deck, or a combined
/// document/deck pair where both carry every section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReportLayout {
    /// `<name>_summary.docx` (text only) + `<name>_graphs.pptx` (images only)
    #[default]
    Split,
    /// `<name>_report.docx` + `<name>_report.pptx`, each with all sections
    Combined,
}

/// Configuration for the report pipeline.
///
/// Use [`ReportConfig::builder()`] to create a new configuration with a
/// fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use autoreport::config::{ReportConfig, ReportLayout};
///
/// let config = ReportConfig::builder()
///     .output_dir("reports")
///     .layout(ReportLayout::Combined)
///     .histogram_bins(20)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Root directory for generated reports. A per-dataset subdirectory is
    /// created beneath it. Default: "output"
    pub output_dir: PathBuf,

    /// Which output layout to produce.
    /// Default: Split
    pub layout: ReportLayout,

    /// Fixed histogram bin count. When None, automatic binning
    /// (max of Sturges and Freedman-Diaconis) is used.
    /// Default: None
    pub histogram_bins: Option<usize>,

    /// Whether to render the correlation heatmap when at least two numeric
    /// columns exist.
    /// Default: true
    pub render_heatmap: bool,

    /// Chart canvas width in pixels.
    /// Default: 640
    pub chart_width: u32,

    /// Chart canvas height in pixels.
    /// Default: 480
    pub chart_height: u32,

    /// Maximum displayed image width on a slide, in inches.
    /// Default: 7.0
    pub slide_image_width_in: f64,

    /// Maximum displayed image width in the paper document, in inches.
    /// Default: 6.0
    pub doc_image_width_in: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            layout: ReportLayout::default(),
            histogram_bins: None,
            render_heatmap: true,
            chart_width: 640,
            chart_height: 480,
            slide_image_width_in: 7.0,
            doc_image_width_in: 6.0,
        }
    }
}

impl ReportConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if let Some(bins) = self.histogram_bins {
            if bins == 0 {
                return Err(ConfigValidationError::InvalidBinCount(bins));
            }
        }

        if self.chart_width == 0 || self.chart_height == 0 {
            return Err(ConfigValidationError::InvalidCanvas {
                width: self.chart_width,
                height: self.chart_height,
            });
        }

        if self.slide_image_width_in <= 0.0 || self.doc_image_width_in <= 0.0 {
            return Err(ConfigValidationError::InvalidImageWidth);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid histogram bin count: {0} (must be at least 1)")]
    InvalidBinCount(usize),

    #[error("Invalid chart canvas: {width}x{height} (both dimensions must be positive)")]
    InvalidCanvas { width: u32, height: u32 },

    #[error("Embedded image widths must be positive")]
    InvalidImageWidth,
}

/// Builder for [`ReportConfig`].
#[derive(Debug, Default)]
pub struct ReportConfigBuilder {
    output_dir: Option<PathBuf>,
    layout: Option<ReportLayout>,
    histogram_bins: Option<usize>,
    render_heatmap: Option<bool>,
    chart_width: Option<u32>,
    chart_height: Option<u32>,
    slide_image_width_in: Option<f64>,
    doc_image_width_in: Option<f64>,
}

impl ReportConfigBuilder {
    /// Set the root output directory.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set the output layout.
    pub fn layout(mut self, layout: ReportLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Pin the histogram bin count instead of automatic binning.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Enable or disable correlation heatmap rendering.
    pub fn render_heatmap(mut self, enabled: bool) -> Self {
        self.render_heatmap = Some(enabled);
        self
    }

    /// Set the chart canvas size in pixels.
    pub fn chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_width = Some(width);
        self.chart_height = Some(height);
        self
    }

    /// Set the maximum slide image width in inches.
    pub fn slide_image_width_in(mut self, inches: f64) -> Self {
        self.slide_image_width_in = Some(inches);
        self
    }

    /// Set the maximum document image width in inches.
    pub fn doc_image_width_in(mut self, inches: f64) -> Self {
        self.doc_image_width_in = Some(inches);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<ReportConfig, ConfigValidationError> {
        let defaults = ReportConfig::default();
        let config = ReportConfig {
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            layout: self.layout.unwrap_or(defaults.layout),
            histogram_bins: self.histogram_bins.or(defaults.histogram_bins),
            render_heatmap: self.render_heatmap.unwrap_or(defaults.render_heatmap),
            chart_width: self.chart_width.unwrap_or(defaults.chart_width),
            chart_height: self.chart_height.unwrap_or(defaults.chart_height),
            slide_image_width_in: self
                .slide_image_width_in
                .unwrap_or(defaults.slide_image_width_in),
            doc_image_width_in: self.doc_image_width_in.unwrap_or(defaults.doc_image_width_in),
        };
        config.validate()?;
        Ok(config)
    }
}
