//! Dataset summarization: shape, missing-value counts, per-column describe.
//!
//! [`summarize`] is a pure function over a DataFrame. Numeric columns get
//! count/mean/std/min/quartiles/max; everything else gets
//! count/unique/top/freq. Columns with zero valid observations produce
//! `None` moments instead of failing, and empty frames produce zero counts.

use crate::error::Result;
use crate::types::{ColumnStats, ColumnSummary, DatasetSummary};
use crate::utils::{collect_numeric_values, get_dtype_category, DtypeCategory};
use polars::prelude::*;

/// Compute the immutable summary of a tabular structure.
pub fn summarize(df: &DataFrame) -> Result<DatasetSummary> {
    let mut missing_by_column = Vec::with_capacity(df.width());
    let mut columns = Vec::with_capacity(df.width());

    for col in df.get_columns() {
        let series = col.as_materialized_series();
        let name = series.name().to_string();

        missing_by_column.push((name.clone(), series.null_count()));

        let stats = match get_dtype_category(series.dtype()) {
            DtypeCategory::Numeric => describe_numeric(series)?,
            _ => describe_categorical(series)?,
        };

        columns.push(ColumnSummary {
            name,
            dtype: series.dtype().to_string(),
            stats,
        });
    }

    Ok(DatasetSummary {
        row_count: df.height(),
        column_count: df.width(),
        missing_by_column,
        columns,
    })
}

fn describe_numeric(series: &Series) -> Result<ColumnStats> {
    let mut values = collect_numeric_values(series)?;
    let count = values.len();

    if count == 0 {
        return Ok(ColumnStats::Numeric {
            count: 0,
            mean: None,
            std: None,
            min: None,
            q25: None,
            median: None,
            q75: None,
            max: None,
        });
    }

    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mean = values.iter().sum::<f64>() / count as f64;
    let std = sample_std(&values, mean);

    Ok(ColumnStats::Numeric {
        count,
        mean: Some(mean),
        std: Some(std),
        min: values.first().copied(),
        q25: Some(quantile_sorted(&values, 0.25)),
        median: Some(quantile_sorted(&values, 0.5)),
        q75: Some(quantile_sorted(&values, 0.75)),
        max: values.last().copied(),
    })
}

fn describe_categorical(series: &Series) -> Result<ColumnStats> {
    let non_null = series.drop_nulls();
    let count = non_null.len();

    if count == 0 {
        return Ok(ColumnStats::Categorical {
            count: 0,
            unique: 0,
            top: None,
            freq: 0,
        });
    }

    let unique = non_null.n_unique()?;

    // value_counts sorts descending, so row 0 is the mode.
    let (top, freq) = match non_null.value_counts(true, false, "count".into(), false) {
        Ok(value_counts_df) if value_counts_df.height() > 0 => {
            let values_col = value_counts_df.column(non_null.name())?;
            let counts_col = value_counts_df.column("count")?;
            let top = format_any_value(values_col.get(0)?);
            let freq = counts_col
                .get(0)?
                .try_extract::<u32>()
                .map(|v| v as usize)
                .unwrap_or(0);
            (Some(top), freq)
        }
        _ => (None, 0),
    };

    Ok(ColumnStats::Categorical {
        count,
        unique,
        top,
        freq,
    })
}

/// Render an AnyValue without the quoting polars adds to string values.
fn format_any_value(value: AnyValue) -> String {
    match value {
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => format!("{}", other),
    }
}

/// Sample standard deviation (n-1 denominator).
fn sample_std(values: &[f64], mean: f64) -> f64 {
    let n = values.len() as f64;
    if n <= 1.0 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Linear-interpolated quantile over an ascending-sorted slice.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = pos - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_summary_shape_matches_frame() {
        let df = df![
            "price" => &[10.0f64, 20.0, 30.0],
            "city" => &["Oslo", "Bergen", "Oslo"],
        ]
        .unwrap();

        let summary = summarize(&df).unwrap();
        assert_eq!(summary.row_count, 3);
        assert_eq!(summary.column_count, 2);
        assert_eq!(
            summary.missing_by_column,
            vec![("price".to_string(), 0), ("city".to_string(), 0)]
        );
    }

    #[test]
    fn test_empty_frame_zero_counts() {
        let df = DataFrame::empty();
        let summary = summarize(&df).unwrap();
        assert_eq!(summary.row_count, 0);
        assert_eq!(summary.column_count, 0);
        assert!(summary.missing_by_column.is_empty());
        assert!(summary.columns.is_empty());
    }

    #[test]
    fn test_numeric_describe() {
        let df = df!["v" => &[1.0f64, 2.0, 3.0, 4.0, 5.0]].unwrap();
        let summary = summarize(&df).unwrap();

        match &summary.columns[0].stats {
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
                assert_eq!(*count, 5);
                assert_eq!(*mean, Some(3.0));
                assert!((std.unwrap() - 1.5811).abs() < 0.001);
                assert_eq!(*min, Some(1.0));
                assert_eq!(*q25, Some(2.0));
                assert_eq!(*median, Some(3.0));
                assert_eq!(*q75, Some(4.0));
                assert_eq!(*max, Some(5.0));
            }
            other => panic!("expected numeric stats, got {:?}", other),
        }
    }

    #[test]
    fn test_all_missing_numeric_column() {
        let df = df!["v" => &[None::<f64>, None, None]].unwrap();
        let summary = summarize(&df).unwrap();

        assert_eq!(summary.missing_for("v"), Some(3));
        match &summary.columns[0].stats {
            ColumnStats::Numeric {
                count, mean, max, ..
            } => {
                assert_eq!(*count, 0);
                assert_eq!(*mean, None);
                assert_eq!(*max, None);
            }
            other => panic!("expected numeric stats, got {:?}", other),
        }
    }

    #[test]
    fn test_categorical_describe() {
        let df = df!["city" => &[Some("Oslo"), Some("Bergen"), Some("Oslo"), None]].unwrap();
        let summary = summarize(&df).unwrap();

        assert_eq!(summary.missing_for("city"), Some(1));
        match &summary.columns[0].stats {
            ColumnStats::Categorical {
                count,
                unique,
                top,
                freq,
            } => {
                assert_eq!(*count, 3);
                assert_eq!(*unique, 2);
                assert_eq!(top.as_deref(), Some("Oslo"));
                assert_eq!(*freq, 2);
            }
            other => panic!("expected categorical stats, got {:?}", other),
        }
    }

    #[test]
    fn test_all_missing_categorical_column() {
        let df = df!["city" => &[None::<&str>, None]].unwrap();
        let summary = summarize(&df).unwrap();

        match &summary.columns[0].stats {
            ColumnStats::Categorical {
                count,
                unique,
                top,
                freq,
            } => {
                assert_eq!((*count, *unique, *freq), (0, 0, 0));
                assert!(top.is_none());
            }
            other => panic!("expected categorical stats, got {:?}", other),
        }
    }

    #[test]
    fn test_boolean_column_described_categorically() {
        let df = df!["flag" => &[true, true, false]].unwrap();
        let summary = summarize(&df).unwrap();

        match &summary.columns[0].stats {
            ColumnStats::Categorical { count, unique, .. } => {
                assert_eq!(*count, 3);
                assert_eq!(*unique, 2);
            }
            other => panic!("expected categorical stats, got {:?}", other),
        }
    }

    #[test]
    fn test_quantile_sorted_interpolation() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&values, 0.5), 2.5);
        assert_eq!(quantile_sorted(&values, 0.0), 1.0);
        assert_eq!(quantile_sorted(&values, 1.0), 4.0);
    }
}
