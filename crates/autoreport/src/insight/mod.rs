//! Insight generation: the narrative service boundary.
//!
//! Built around the [`InsightProvider`] trait — prompt in, free text out.
//! The concrete network-backed provider ([`GroqProvider`]) requires the
//! `ai` feature; the offline providers are always available so the pipeline
//! (and its tests) never need a live service.
//!
//! # Adding a New Provider
//!
//! 1. Create a new file (e.g., `src/insight/openai.rs`)
//! 2. Implement the [`InsightProvider`] trait
//! 3. Export the new provider in this module

mod offline;
mod provider;

pub use offline::{StaticInsightProvider, SummaryNarrativeProvider};
pub use provider::InsightProvider;

#[cfg(feature = "ai")]
mod groq;

#[cfg(feature = "ai")]
pub use groq::{GroqConfig, GroqConfigBuilder, GroqProvider};
