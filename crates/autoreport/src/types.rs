use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Descriptive statistics for a single column.
///
/// Numeric columns carry the classic describe moments; everything else
/// (strings, booleans, datetimes) is described categorically. All numeric
/// moments are `None` when the column has zero valid observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnStats {
    Numeric {
        /// Number of non-missing values.
        count: usize,
        mean: Option<f64>,
        std: Option<f64>,
        min: Option<f64>,
        q25: Option<f64>,
        median: Option<f64>,
        q75: Option<f64>,
        max: Option<f64>,
    },
    Categorical {
        /// Number of non-missing values.
        count: usize,
        /// Number of distinct non-missing values.
        unique: usize,
        /// Most frequent value, if any non-missing value exists.
        top: Option<String>,
        /// Frequency of the most frequent value.
        freq: usize,
    },
}

/// Summary of a single column: name, physical dtype, and describe stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub dtype: String,
    pub stats: ColumnStats,
}

/// Immutable summary of a tabular structure.
///
/// Derived once per ingested dataset and never mutated. Column-keyed fields
/// are ordered sequences rather than maps so the original column order
/// survives formatting and serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub row_count: usize,
    pub column_count: usize,
    /// Missing-value count per column, in original column order.
    pub missing_by_column: Vec<(String, usize)>,
    /// Describe stats per column, in original column order.
    pub columns: Vec<ColumnSummary>,
}

impl DatasetSummary {
    /// Look up the missing-value count for a column by name.
    pub fn missing_for(&self, column: &str) -> Option<usize> {
        self.missing_by_column
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, count)| *count)
    }
}

/// An encoded raster chart plus its label.
///
/// The label is either a column name (histograms) or
/// `"correlation heatmap"`. The payload is always PNG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartImage {
    pub label: String,
    #[serde(with = "serde_bytes_base64")]
    pub png: Vec<u8>,
}

impl ChartImage {
    pub fn new(label: impl Into<String>, png: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            png,
        }
    }
}

/// Everything a pipeline run computed, returned to the caller.
///
/// The rendering helpers consume these by reference, so when document
/// writing fails the caller can retry the write from already-computed
/// artifacts instead of restarting the pipeline from ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportArtifacts {
    /// When the report was generated.
    pub generated_at: String,
    /// Dataset identifier the output paths were derived from.
    pub dataset_name: String,
    pub summary: DatasetSummary,
    /// Raw narrative text as returned by the insight provider.
    pub narrative: String,
    /// Heatmap first (if rendered), then one histogram per numeric column.
    pub charts: Vec<ChartImage>,
    /// Paths of the written documents.
    pub written: Vec<PathBuf>,
}

/// PNG bytes serialize as base64 so artifacts stay JSON-representable.
mod serde_bytes_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s.as_bytes()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_for_lookup() {
        let summary = DatasetSummary {
            row_count: 3,
            column_count: 2,
            missing_by_column: vec![("a".into(), 0), ("b".into(), 2)],
            columns: Vec::new(),
        };
        assert_eq!(summary.missing_for("b"), Some(2));
        assert_eq!(summary.missing_for("missing"), None);
    }

    #[test]
    fn test_chart_image_json_round_trip() {
        let chart = ChartImage::new("price", vec![0x89, b'P', b'N', b'G', 0, 255]);
        let json = serde_json::to_string(&chart).unwrap();
        let back: ChartImage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, chart);
    }

    #[test]
    fn test_column_stats_serialization_tags() {
        let stats = ColumnStats::Categorical {
            count: 5,
            unique: 2,
            top: Some("yes".into()),
            freq: 3,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"kind\":\"categorical\""));
    }
}
