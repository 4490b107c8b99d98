//! Automated Data Analysis Report Generator
//!
//! A one-shot reporting library built with Rust and Polars: ingest a tabular
//! source, compute descriptive statistics, render charts, request an AI
//! narrative, and write a slide deck plus a paper document.
//!
//! # Overview
//!
//! The library is organized around a single synchronous pipeline:
//!
//! - **Ingestion**: CSV, JSON, and SQLite sources into a Polars `DataFrame`
//! - **Summary**: row/column counts, per-column missing values, describe stats
//! - **Charts**: one histogram per numeric column plus a correlation heatmap,
//!   rendered to PNG
//! - **Insights**: an AI narrative via the [`insight::InsightProvider`] trait,
//!   with an offline fallback
//! - **Documents**: a `.pptx` slide deck and a `.docx` paper document with
//!   matching content
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use autoreport::config::ReportConfig;
//! use autoreport::insight::GroqProvider;
//! use autoreport::ingest::DataSource;
//! use autoreport::pipeline::ReportPipeline;
//! use std::sync::Arc;
//!
//! let provider = Arc::new(GroqProvider::new(api_key)?);
//!
//! let pipeline = ReportPipeline::builder()
//!     .config(ReportConfig::builder().output_dir("reports").build()?)
//!     .provider(provider)
//!     .build()?;
//!
//! let source = DataSource::Csv { bytes: std::fs::read("sales.csv")? };
//! let artifacts = pipeline.run_source(&source, "sales")?;
//!
//! for path in &artifacts.written {
//!     println!("wrote {}", path.display());
//! }
//! ```
//!
//! # Insight Providers
//!
//! Narrative generation goes through the [`insight::InsightProvider`] trait.
//! Implemented providers:
//!
//! - [`insight::GroqProvider`] - Groq chat-completions API (needs the `ai`
//!   feature, enabled by default)
//! - [`insight::SummaryNarrativeProvider`] - deterministic offline narrative
//!   derived from the summary itself
//!
//! To implement your own provider, see the [`insight`] module documentation.

pub mod charts;
pub mod config;
pub mod error;
pub mod format;
pub mod ingest;
pub mod insight;
pub mod pipeline;
pub mod report;
pub mod summary;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{ConfigValidationError, ReportConfig, ReportConfigBuilder, ReportLayout};
pub use error::{ReportError, Result, ResultExt};
pub use ingest::DataSource;
pub use insight::{InsightProvider, StaticInsightProvider, SummaryNarrativeProvider};
pub use pipeline::{ReportPipeline, ReportPipelineBuilder};
pub use report::{compose_sections, Section};
pub use types::{ChartImage, ColumnStats, ColumnSummary, DatasetSummary, ReportArtifacts};
pub use utils::{get_dtype_category, is_numeric_dtype, DtypeCategory};

#[cfg(feature = "ai")]
pub use insight::{GroqConfig, GroqConfigBuilder, GroqProvider};
