//! Insight provider trait for abstracting the narrative-generation service.
//!
//! The pipeline only needs one capability: given a human-readable dataset
//! summary, return free-form narrative text. Keeping that behind a trait
//! lets tests substitute a deterministic stub for the live network call.

use crate::error::Result;

/// Trait for services that turn a dataset summary into narrative insights.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow usage across threads.
///
/// # Error Handling
///
/// Implementations surface failures (network, auth, quota) as
/// [`crate::ReportError::RemoteService`] with the underlying cause
/// preserved; the pipeline does not retry.
pub trait InsightProvider: Send + Sync {
    /// Generate narrative insights from a textual dataset summary.
    ///
    /// The response is a single free-text string with no guaranteed
    /// structure: it may be empty, contain markdown bullet or emphasis
    /// markers, blank lines, or arbitrarily long paragraphs. The text
    /// formatter downstream normalizes all of that.
    fn generate_insights(&self, summary_text: &str) -> Result<String>;

    /// Provider name for logging and debugging.
    fn name(&self) -> &str;

    /// Model used by this provider, if it exposes one.
    fn model(&self) -> Option<&str> {
        None
    }
}
