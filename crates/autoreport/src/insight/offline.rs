//! Offline insight providers: a deterministic summary-derived narrative for
//! runs without an API key, and a canned provider for tests.

use super::InsightProvider;
use crate::error::Result;
use crate::types::{ColumnStats, DatasetSummary};

/// Derives a plain-prose narrative directly from the dataset summary.
///
/// Used when no remote service is configured so the report still carries an
/// insights section. The output is deterministic for a given summary.
pub struct SummaryNarrativeProvider {
    summary: DatasetSummary,
}

impl SummaryNarrativeProvider {
    pub fn new(summary: DatasetSummary) -> Self {
        Self { summary }
    }

    fn narrate(&self) -> String {
        let s = &self.summary;
        let mut lines = Vec::new();

        lines.push(format!(
            "The dataset contains {} rows across {} columns.",
            s.row_count, s.column_count
        ));

        let missing_total: usize = s.missing_by_column.iter().map(|(_, c)| c).sum();
        if missing_total == 0 {
            lines.push("No missing values were detected in any column.".to_string());
        } else {
            let worst = s
                .missing_by_column
                .iter()
                .max_by_key(|(_, count)| *count)
                .expect("non-empty when missing_total > 0");
            lines.push(format!(
                "{} missing values were detected in total; the most affected column is '{}' with {} missing entries.",
                missing_total, worst.0, worst.1
            ));
        }

        for column in &s.columns {
            match &column.stats {
                ColumnStats::Numeric {
                    count,
                    mean: Some(mean),
                    std: Some(std),
                    min: Some(min),
                    max: Some(max),
                    ..
                } => {
                    lines.push(format!(
                        "Column '{}' spans {:.2} to {:.2} with a mean of {:.2} over {} observations.",
                        column.name, min, max, mean, count
                    ));
                    if *mean != 0.0 && (std / mean.abs()) > 1.0 {
                        lines.push(format!(
                            "The spread of '{}' is large relative to its mean, which may indicate outliers worth reviewing.",
                            column.name
                        ));
                    }
                }
                ColumnStats::Categorical {
                    unique,
                    top: Some(top),
                    freq,
                    count,
                    ..
                } if *count > 0 => {
                    lines.push(format!(
                        "Column '{}' has {} distinct values; the most frequent is '{}' ({} occurrences).",
                        column.name, unique, top, freq
                    ));
                }
                _ => {}
            }
        }

        lines.push(
            "Recommendation: review the most affected columns above before drawing conclusions from aggregate figures."
                .to_string(),
        );

        lines.join("\n")
    }
}

impl InsightProvider for SummaryNarrativeProvider {
    fn generate_insights(&self, _summary_text: &str) -> Result<String> {
        Ok(self.narrate())
    }

    fn name(&self) -> &str {
        "SummaryNarrative"
    }
}

/// Returns a fixed narrative. Intended for tests.
pub struct StaticInsightProvider {
    text: String,
}

impl StaticInsightProvider {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl InsightProvider for StaticInsightProvider {
    fn generate_insights(&self, _summary_text: &str) -> Result<String> {
        Ok(self.text.clone())
    }

    fn name(&self) -> &str {
        "Static"
    }
}
