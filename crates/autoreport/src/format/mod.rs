//! Text formatting: turns the summary and the free-form narrative into
//! clean line sequences both document renderers can lay out.
//!
//! The narrative cleanup is a lossy heuristic, not a markdown parser: it
//! strips literal bullet and emphasis markers and drops emptied lines, and
//! nothing more.

use crate::types::{ColumnStats, DatasetSummary};

/// Render the summary into its fixed display-line sequence.
///
/// Order: total rows, total columns, the "Missing Values:" header, then one
/// `{name}: {count}` line per column in original column order.
pub fn format_summary(summary: &DatasetSummary) -> Vec<String> {
    let mut lines = vec![
        format!("Total Rows: {}", summary.row_count),
        format!("Total Columns: {}", summary.column_count),
        "Missing Values:".to_string(),
    ];
    for (name, count) in &summary.missing_by_column {
        lines.push(format!("{}: {}", name, count));
    }
    lines
}

/// Strip literal bullet/emphasis markers and surrounding whitespace.
///
/// Removes every `•` and `*` (which covers `**` emphasis runs); all other
/// characters, including `1.`-style numbering, pass through untouched.
pub fn clean_line(line: &str) -> String {
    line.replace(['•', '*'], "").trim().to_string()
}

/// Split narrative text into cleaned lines, dropping emptied ones.
///
/// Idempotent: a second pass over its own output changes nothing.
pub fn format_insights(text: &str) -> Vec<String> {
    text.lines()
        .map(clean_line)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Human-readable serialization of the summary for the insight request.
///
/// Extends the display lines with a per-column describe block so the
/// narrative service sees the same statistics the report prints.
pub fn summary_prompt_text(summary: &DatasetSummary) -> String {
    let mut out = format_summary(summary).join("\n");
    out.push_str("\nColumn statistics:\n");

    for column in &summary.columns {
        match &column.stats {
            ColumnStats::Numeric {
                count,
                mean,
                std,
                min,
                q25,
                median,
                q75,
                max,
            } => {
                out.push_str(&format!(
                    "{} ({}): count={} mean={} std={} min={} q25={} median={} q75={} max={}\n",
                    column.name,
                    column.dtype,
                    count,
                    fmt_opt(mean),
                    fmt_opt(std),
                    fmt_opt(min),
                    fmt_opt(q25),
                    fmt_opt(median),
                    fmt_opt(q75),
                    fmt_opt(max),
                ));
            }
            ColumnStats::Categorical {
                count,
                unique,
                top,
                freq,
            } => {
                out.push_str(&format!(
                    "{} ({}): count={} unique={} top={} freq={}\n",
                    column.name,
                    column.dtype,
                    count,
                    unique,
                    top.as_deref().unwrap_or("NaN"),
                    freq,
                ));
            }
        }
    }

    out
}

fn fmt_opt(value: &Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.4}", v),
        None => "NaN".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnSummary;
    use pretty_assertions::assert_eq;

    fn summary_fixture() -> DatasetSummary {
        DatasetSummary {
            row_count: 3,
            column_count: 2,
            missing_by_column: vec![("col_a".into(), 0), ("col_b".into(), 2)],
            columns: vec![ColumnSummary {
                name: "col_a".into(),
                dtype: "f64".into(),
                stats: ColumnStats::Numeric {
                    count: 3,
                    mean: Some(2.0),
                    std: Some(1.0),
                    min: Some(1.0),
                    q25: Some(1.5),
                    median: Some(2.0),
                    q75: Some(2.5),
                    max: Some(3.0),
                },
            }],
        }
    }

    #[test]
    fn test_format_summary_fixed_order() {
        let lines = format_summary(&summary_fixture());
        assert_eq!(
            lines,
            vec![
                "Total Rows: 3".to_string(),
                "Total Columns: 2".to_string(),
                "Missing Values:".to_string(),
                "col_a: 0".to_string(),
                "col_b: 2".to_string(),
            ]
        );
    }

    #[test]
    fn test_clean_line_strips_markers() {
        assert_eq!(clean_line("• Trend: sales up"), "Trend: sales up");
        assert_eq!(clean_line("**Risk:** churn"), "Risk: churn");
        assert_eq!(clean_line("   padded   "), "padded");
        assert_eq!(clean_line("1. numbered stays"), "1. numbered stays");
    }

    #[test]
    fn test_format_insights_scenario() {
        let lines = format_insights("• Trend: sales up\n**Risk:** churn\n\n");
        assert_eq!(
            lines,
            vec!["Trend: sales up".to_string(), "Risk: churn".to_string()]
        );
    }

    #[test]
    fn test_format_insights_idempotent() {
        let input = "• one\n * two *\n\n*** three\n";
        let once = format_insights(input);
        let twice = format_insights(&once.join("\n"));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_format_insights_never_emits_empty_lines() {
        let input = "\n  \n•\n**\n * \n";
        assert!(format_insights(input).is_empty());
    }

    #[test]
    fn test_format_insights_empty_input() {
        assert!(format_insights("").is_empty());
    }

    #[test]
    fn test_summary_prompt_text_includes_stats() {
        let text = summary_prompt_text(&summary_fixture());
        assert!(text.contains("Total Rows: 3"));
        assert!(text.contains("col_a (f64): count=3 mean=2.0000"));
    }

    #[test]
    fn test_summary_prompt_text_nan_for_missing_moments() {
        let mut summary = summary_fixture();
        summary.columns[0].stats = ColumnStats::Numeric {
            count: 0,
            mean: None,
            std: None,
            min: None,
            q25: None,
            median: None,
            q75: None,
            max: None,
        };
        let text = summary_prompt_text(&summary);
        assert!(text.contains("count=0 mean=NaN"));
    }
}
