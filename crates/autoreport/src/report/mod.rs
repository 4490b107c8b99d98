//! Report document assembly.
//!
//! A report is composed once into an ordered list of [`Section`]s, and each
//! output format renders that same list. Content parity between the slide
//! deck and the paper document falls out of sharing the composition step
//! rather than being re-derived per format.

mod docx;
mod ooxml;
mod pptx;

pub use docx::write_docx;
pub use pptx::write_pptx;

use crate::charts::HEATMAP_LABEL;
use crate::format::{format_insights, format_summary};
use crate::types::{ChartImage, ReportArtifacts};

/// Shown in the insights section when the narrative cleans down to nothing.
const NO_INSIGHTS_PLACEHOLDER: &str = "No insights available.";

/// One logical block of the report, format-agnostic.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    /// Opening title.
    Title { text: String },
    /// A heading followed by plain text lines.
    Text { heading: String, lines: Vec<String> },
    /// A titled chart.
    Image { title: String, chart: ChartImage },
}

impl Section {
    pub fn is_image(&self) -> bool {
        matches!(self, Section::Image { .. })
    }
}

/// Compose the full ordered section list for a report.
///
/// Order is fixed: title, dataset summary, insights, then every chart in
/// artifact order (heatmap first when rendered, then one histogram per
/// numeric column).
pub fn compose_sections(artifacts: &ReportArtifacts) -> Vec<Section> {
    let mut sections = vec![
        Section::Title {
            text: format!("Data Analysis Report: {}", artifacts.dataset_name),
        },
        Section::Text {
            heading: "Dataset Summary".to_string(),
            lines: format_summary(&artifacts.summary),
        },
    ];

    let mut insight_lines = format_insights(&artifacts.narrative);
    if insight_lines.is_empty() {
        insight_lines.push(NO_INSIGHTS_PLACEHOLDER.to_string());
    }
    sections.push(Section::Text {
        heading: "AI Insights".to_string(),
        lines: insight_lines,
    });

    for chart in &artifacts.charts {
        sections.push(Section::Image {
            title: chart_title(&chart.label),
            chart: chart.clone(),
        });
    }

    sections
}

fn chart_title(label: &str) -> String {
    if label == HEATMAP_LABEL {
        "Correlation Heatmap".to_string()
    } else {
        format!("Distribution of {}", label)
    }
}

/// The text-only view of a report: title plus every text section.
pub fn text_sections(sections: &[Section]) -> Vec<Section> {
    sections
        .iter()
        .filter(|s| !s.is_image())
        .cloned()
        .collect()
}

/// The graphs-only view of a report: title plus every image section.
pub fn image_sections(sections: &[Section]) -> Vec<Section> {
    sections
        .iter()
        .filter(|s| matches!(s, Section::Title { .. } | Section::Image { .. }))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DatasetSummary;
    use pretty_assertions::assert_eq;

    fn artifacts_fixture() -> ReportArtifacts {
        ReportArtifacts {
            generated_at: "2026-01-01T00:00:00Z".into(),
            dataset_name: "sales".into(),
            summary: DatasetSummary {
                row_count: 2,
                column_count: 1,
                missing_by_column: vec![("price".into(), 0)],
                columns: Vec::new(),
            },
            narrative: "• Trend: prices stable\n".into(),
            charts: vec![
                ChartImage::new(HEATMAP_LABEL, vec![1]),
                ChartImage::new("price", vec![2]),
            ],
            written: Vec::new(),
        }
    }

    #[test]
    fn test_compose_fixed_order() {
        let sections = compose_sections(&artifacts_fixture());

        assert_eq!(sections.len(), 5);
        assert!(matches!(&sections[0], Section::Title { text } if text.contains("sales")));
        assert!(matches!(&sections[1], Section::Text { heading, .. } if heading == "Dataset Summary"));
        assert!(matches!(&sections[2], Section::Text { heading, .. } if heading == "AI Insights"));
        assert!(matches!(&sections[3], Section::Image { title, .. } if title == "Correlation Heatmap"));
        assert!(matches!(&sections[4], Section::Image { title, .. } if title == "Distribution of price"));
    }

    #[test]
    fn test_compose_cleans_narrative() {
        let sections = compose_sections(&artifacts_fixture());
        let Section::Text { lines, .. } = &sections[2] else {
            panic!("expected insights text section");
        };
        assert_eq!(lines, &vec!["Trend: prices stable".to_string()]);
    }

    #[test]
    fn test_compose_empty_narrative_gets_placeholder() {
        let mut artifacts = artifacts_fixture();
        artifacts.narrative = "•\n**\n".into();
        let sections = compose_sections(&artifacts);
        let Section::Text { lines, .. } = &sections[2] else {
            panic!("expected insights text section");
        };
        assert_eq!(lines, &vec![NO_INSIGHTS_PLACEHOLDER.to_string()]);
    }

    #[test]
    fn test_split_views_partition_sections() {
        let sections = compose_sections(&artifacts_fixture());

        let text = text_sections(&sections);
        assert_eq!(text.len(), 3);
        assert!(text.iter().all(|s| !s.is_image()));

        let images = image_sections(&sections);
        assert_eq!(images.len(), 3);
        assert!(matches!(images[0], Section::Title { .. }));
        assert!(images[1..].iter().all(Section::is_image));
    }
}
