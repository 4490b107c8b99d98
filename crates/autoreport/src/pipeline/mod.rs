//! The one-shot report pipeline.
//!
//! Runs the stages strictly in order: summarize, render charts, request the
//! narrative, compose sections, write documents. Nothing is retried and no
//! state survives a run; callers that want to retry a failed document write
//! can do so from the returned [`ReportArtifacts`] without recomputing.

use crate::charts::{render_corr_heatmap, render_histograms};
use crate::config::{ReportConfig, ReportLayout};
use crate::error::{ReportError, Result};
use crate::format::summary_prompt_text;
use crate::ingest::{self, DataSource};
use crate::insight::InsightProvider;
use crate::report::{compose_sections, image_sections, text_sections, write_docx, write_pptx};
use crate::summary::summarize;
use crate::types::ReportArtifacts;
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// End-to-end report generator.
///
/// # Example
///
/// ```rust,ignore
/// use autoreport::config::ReportConfig;
/// use autoreport::insight::SummaryNarrativeProvider;
/// use autoreport::pipeline::ReportPipeline;
///
/// let pipeline = ReportPipeline::builder()
///     .config(ReportConfig::default())
///     .provider(Arc::new(provider))
///     .build()?;
/// let artifacts = pipeline.run(&df, "sales")?;
/// ```
pub struct ReportPipeline {
    config: ReportConfig,
    provider: Arc<dyn InsightProvider>,
}

impl std::fmt::Debug for ReportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ReportPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> ReportPipelineBuilder {
        ReportPipelineBuilder::default()
    }

    /// Ingest a source, then generate the report from it.
    pub fn run_source(&self, source: &DataSource, dataset_name: &str) -> Result<ReportArtifacts> {
        info!(dataset = dataset_name, "ingesting source");
        let df = ingest::ingest(source)?;
        self.run(&df, dataset_name)
    }

    /// Generate the report for an already-ingested frame.
    ///
    /// Returns every computed artifact, including the paths written. On a
    /// document-write failure the earlier stages are not rolled back; any
    /// documents written before the failure remain on disk.
    pub fn run(&self, df: &DataFrame, dataset_name: &str) -> Result<ReportArtifacts> {
        info!(
            dataset = dataset_name,
            rows = df.height(),
            columns = df.width(),
            "starting report run"
        );

        let summary = summarize(df)?;
        debug!(columns = summary.column_count, "summary computed");

        // Heatmap first, then one histogram per numeric column.
        let mut charts = Vec::new();
        if let Some(heatmap) = render_corr_heatmap(df, &self.config)? {
            charts.push(heatmap);
        }
        charts.extend(render_histograms(df, &self.config)?);
        debug!(charts = charts.len(), "charts rendered");

        info!(
            provider = self.provider.name(),
            model = self.provider.model(),
            "requesting insights"
        );
        let narrative = self
            .provider
            .generate_insights(&summary_prompt_text(&summary))?;

        let mut artifacts = ReportArtifacts {
            generated_at: chrono::Utc::now().to_rfc3339(),
            dataset_name: dataset_name.to_string(),
            summary,
            narrative,
            charts,
            written: Vec::new(),
        };

        artifacts.written = self.write_documents(&artifacts)?;
        info!(written = ?artifacts.written, "report run complete");
        Ok(artifacts)
    }

    fn write_documents(&self, artifacts: &ReportArtifacts) -> Result<Vec<PathBuf>> {
        let dir = self.config.output_dir.join(&artifacts.dataset_name);
        std::fs::create_dir_all(&dir).map_err(|e| ReportError::OutputWrite {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let sections = compose_sections(artifacts);
        let name = &artifacts.dataset_name;

        let written = match self.config.layout {
            ReportLayout::Split => {
                let doc = self.write_doc(
                    &text_sections(&sections),
                    &dir.join(format!("{}_summary.docx", name)),
                )?;
                let deck = self.write_deck(
                    &image_sections(&sections),
                    &dir.join(format!("{}_graphs.pptx", name)),
                )?;
                vec![doc, deck]
            }
            ReportLayout::Combined => {
                let doc =
                    self.write_doc(&sections, &dir.join(format!("{}_report.docx", name)))?;
                let deck =
                    self.write_deck(&sections, &dir.join(format!("{}_report.pptx", name)))?;
                vec![doc, deck]
            }
        };
        Ok(written)
    }

    fn write_doc(&self, sections: &[crate::report::Section], path: &Path) -> Result<PathBuf> {
        debug!(path = %path.display(), "writing document");
        write_docx(sections, path, self.config.doc_image_width_in)
    }

    fn write_deck(&self, sections: &[crate::report::Section], path: &Path) -> Result<PathBuf> {
        debug!(path = %path.display(), "writing slide deck");
        write_pptx(sections, path, self.config.slide_image_width_in)
    }
}

/// Builder for [`ReportPipeline`].
#[derive(Default)]
pub struct ReportPipelineBuilder {
    config: Option<ReportConfig>,
    provider: Option<Arc<dyn InsightProvider>>,
}

impl ReportPipelineBuilder {
    /// Set the pipeline configuration. Defaults to [`ReportConfig::default`].
    pub fn config(mut self, config: ReportConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the insight provider. Required.
    pub fn provider(mut self, provider: Arc<dyn InsightProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Build the pipeline, validating the configuration.
    pub fn build(self) -> Result<ReportPipeline> {
        let config = self.config.unwrap_or_default();
        config
            .validate()
            .map_err(|e| ReportError::InvalidConfig(e.to_string()))?;
        let provider = self
            .provider
            .ok_or_else(|| ReportError::InvalidConfig("insight provider is required".into()))?;
        Ok(ReportPipeline { config, provider })
    }
}
