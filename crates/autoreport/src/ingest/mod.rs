//! Data ingestion: CSV, JSON, SQL-over-connection-string, and SQLite files.
//!
//! Each source kind is converted into a polars DataFrame in a single
//! attempt; failures carry the underlying parser or driver message and are
//! never retried here. The caller decides what to do with a failure.

use crate::error::{ReportError, Result};
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A descriptor for one of the four supported source kinds.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// Delimited-file bytes.
    Csv { bytes: Vec<u8> },
    /// Structured-record-file bytes (JSON array of objects, possibly nested).
    Json { bytes: Vec<u8> },
    /// SQL query against a connection string (`sqlite://<path>` forms).
    Sql {
        connection_string: String,
        query: String,
    },
    /// SQL query against an embedded database file.
    Sqlite { path: PathBuf, query: String },
}

/// Ingest a data source into a DataFrame.
pub fn ingest(source: &DataSource) -> Result<DataFrame> {
    match source {
        DataSource::Csv { bytes } => ingest_csv(bytes),
        DataSource::Json { bytes } => ingest_json(bytes),
        DataSource::Sql {
            connection_string,
            query,
        } => ingest_sql(connection_string, query),
        DataSource::Sqlite { path, query } => ingest_sqlite(path, query),
    }
}

/// Parse CSV bytes into a DataFrame.
///
/// Tries progressively more tolerant strategies: standard parse with quote
/// handling, parse without quote handling, then a pre-cleaned pass that
/// collapses doubled quotes and drops blank lines.
pub fn ingest_csv(bytes: &[u8]) -> Result<DataFrame> {
    match read_csv_cursor(bytes.to_vec(), Some(b'"')) {
        Ok(df) => return Ok(df),
        Err(e) => debug!("standard CSV parse failed: {}", e),
    }

    match read_csv_cursor(bytes.to_vec(), None) {
        Ok(df) => return Ok(df),
        Err(e) => debug!("quote-less CSV parse failed: {}", e),
    }

    let content = String::from_utf8_lossy(bytes);
    let cleaned = clean_csv_content(&content);
    read_csv_cursor(cleaned.into_bytes(), Some(b'"')).map_err(|e| ReportError::MalformedSource {
        format: "csv".into(),
        reason: e.to_string(),
    })
}

fn read_csv_cursor(bytes: Vec<u8>, quote_char: Option<u8>) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(quote_char))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
}

fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse JSON bytes (an array of records) into a DataFrame.
///
/// Nested objects arrive as struct columns and are flattened until no
/// struct column remains, so `{"user": {"id": 1}}` becomes a `user.id`-style
/// flat column the rest of the pipeline can describe and chart.
pub fn ingest_json(bytes: &[u8]) -> Result<DataFrame> {
    let mut df = JsonReader::new(Cursor::new(bytes.to_vec()))
        .finish()
        .map_err(|e| ReportError::MalformedSource {
            format: "json".into(),
            reason: e.to_string(),
        })?;

    loop {
        let struct_cols: Vec<String> = df
            .get_columns()
            .iter()
            .filter(|col| matches!(col.dtype(), DataType::Struct(_)))
            .map(|col| col.name().to_string())
            .collect();
        if struct_cols.is_empty() {
            break;
        }
        df = df.unnest(struct_cols)?;
    }

    Ok(df)
}

/// Run a SQL query against a connection string.
///
/// Only embedded SQLite targets are supported: `sqlite:///path`,
/// `sqlite://path`, `sqlite:path`, or a bare filesystem path.
pub fn ingest_sql(connection_string: &str, query: &str) -> Result<DataFrame> {
    let path = parse_sqlite_connection_string(connection_string)?;
    ingest_sqlite(&path, query)
}

fn parse_sqlite_connection_string(connection_string: &str) -> Result<PathBuf> {
    let trimmed = connection_string.trim();
    let path = trimmed
        .strip_prefix("sqlite:///")
        .or_else(|| trimmed.strip_prefix("sqlite://"))
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);

    if path.is_empty() || path.contains("://") {
        return Err(ReportError::ConnectionFailed {
            target: connection_string.to_string(),
            reason: "only sqlite connection strings are supported".into(),
        });
    }

    Ok(PathBuf::from(path))
}

/// Run a SQL query against an embedded SQLite database file.
pub fn ingest_sqlite(path: &Path, query: &str) -> Result<DataFrame> {
    if !path.exists() {
        return Err(ReportError::ConnectionFailed {
            target: path.display().to_string(),
            reason: "database file not found".into(),
        });
    }

    let conn = rusqlite::Connection::open(path).map_err(|e| ReportError::ConnectionFailed {
        target: path.display().to_string(),
        reason: e.to_string(),
    })?;

    query_to_dataframe(&conn, query)
}

/// A single cell as read from the driver, before column typing is decided.
#[derive(Debug, Clone)]
enum SqlCell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

/// Execute a query and convert the result set column-by-column.
///
/// Column affinity: all-integer columns become Int64, columns mixing
/// integers and reals widen to Float64, anything else reads as strings.
fn query_to_dataframe(conn: &rusqlite::Connection, query: &str) -> Result<DataFrame> {
    let mut stmt = conn
        .prepare(query)
        .map_err(|e| ReportError::QueryFailed(e.to_string()))?;

    let column_names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
    let column_count = column_names.len();

    let mut cells: Vec<Vec<SqlCell>> = vec![Vec::new(); column_count];
    let mut rows = stmt
        .query([])
        .map_err(|e| ReportError::QueryFailed(e.to_string()))?;

    while let Some(row) = rows
        .next()
        .map_err(|e| ReportError::QueryFailed(e.to_string()))?
    {
        for (idx, column) in cells.iter_mut().enumerate() {
            let cell = match row.get_ref(idx)? {
                rusqlite::types::ValueRef::Null => SqlCell::Null,
                rusqlite::types::ValueRef::Integer(v) => SqlCell::Integer(v),
                rusqlite::types::ValueRef::Real(v) => SqlCell::Real(v),
                rusqlite::types::ValueRef::Text(v) => {
                    SqlCell::Text(String::from_utf8_lossy(v).into_owned())
                }
                rusqlite::types::ValueRef::Blob(v) => {
                    SqlCell::Text(format!("<blob {} bytes>", v.len()))
                }
            };
            column.push(cell);
        }
    }

    let columns: Vec<Column> = column_names
        .into_iter()
        .zip(cells)
        .map(|(name, values)| build_series(&name, &values).into_column())
        .collect();

    Ok(DataFrame::new(columns)?)
}

fn build_series(name: &str, values: &[SqlCell]) -> Series {
    let all_integer = values
        .iter()
        .all(|c| matches!(c, SqlCell::Integer(_) | SqlCell::Null));
    if all_integer {
        let ints: Vec<Option<i64>> = values
            .iter()
            .map(|c| match c {
                SqlCell::Integer(v) => Some(*v),
                _ => None,
            })
            .collect();
        return Series::new(name.into(), ints);
    }

    let all_numeric = values
        .iter()
        .all(|c| matches!(c, SqlCell::Integer(_) | SqlCell::Real(_) | SqlCell::Null));
    if all_numeric {
        let floats: Vec<Option<f64>> = values
            .iter()
            .map(|c| match c {
                SqlCell::Integer(v) => Some(*v as f64),
                SqlCell::Real(v) => Some(*v),
                _ => None,
            })
            .collect();
        return Series::new(name.into(), floats);
    }

    let strings: Vec<Option<String>> = values
        .iter()
        .map(|c| match c {
            SqlCell::Null => None,
            SqlCell::Integer(v) => Some(v.to_string()),
            SqlCell::Real(v) => Some(v.to_string()),
            SqlCell::Text(v) => Some(v.clone()),
        })
        .collect();
    Series::new(name.into(), strings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_csv_basic() {
        let csv = b"name,price\nwidget,9.5\ngadget,12.0\n";
        let df = ingest_csv(csv).unwrap();
        assert_eq!(df.shape(), (2, 2));
        assert!(crate::utils::is_numeric_dtype(
            df.column("price").unwrap().dtype()
        ));
    }

    #[test]
    fn test_ingest_csv_ragged_rows_fail() {
        // Second data row carries more fields than the header defines
        let csv = b"a,b\n1,2\n1,2,3,4,5\n";
        let result = ingest_csv(csv);
        assert!(result.is_err());
    }

    #[test]
    fn test_ingest_json_flat_records() {
        let json = br#"[{"name": "a", "score": 1.5}, {"name": "b", "score": 2.5}]"#;
        let df = ingest_json(json).unwrap();
        assert_eq!(df.shape(), (2, 2));
    }

    #[test]
    fn test_ingest_json_nested_records_flattened() {
        let json = br#"[{"id": 1, "meta": {"score": 0.5}}, {"id": 2, "meta": {"score": 0.7}}]"#;
        let df = ingest_json(json).unwrap();
        assert_eq!(df.height(), 2);
        // No struct columns remain after flattening
        assert!(df
            .get_columns()
            .iter()
            .all(|c| !matches!(c.dtype(), DataType::Struct(_))));
    }

    #[test]
    fn test_ingest_json_malformed_fails() {
        let result = ingest_json(b"{not json");
        assert!(matches!(
            result,
            Err(ReportError::MalformedSource { .. })
        ));
    }

    #[test]
    fn test_parse_sqlite_connection_string_forms() {
        assert_eq!(
            parse_sqlite_connection_string("sqlite:///tmp/db.sqlite").unwrap(),
            PathBuf::from("tmp/db.sqlite")
        );
        assert_eq!(
            parse_sqlite_connection_string("sqlite:mydb.db").unwrap(),
            PathBuf::from("mydb.db")
        );
        assert_eq!(
            parse_sqlite_connection_string("data/mydb.db").unwrap(),
            PathBuf::from("data/mydb.db")
        );
    }

    #[test]
    fn test_parse_connection_string_rejects_other_schemes() {
        let result = parse_sqlite_connection_string("postgres://localhost/db");
        assert!(matches!(result, Err(ReportError::ConnectionFailed { .. })));
    }

    #[test]
    fn test_ingest_sqlite_missing_file() {
        let result = ingest_sqlite(Path::new("/definitely/not/here.db"), "SELECT 1");
        assert!(matches!(result, Err(ReportError::ConnectionFailed { .. })));
    }

    #[test]
    fn test_sqlite_query_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("t.db");
        let conn = rusqlite::Connection::open(&db_path).unwrap();
        conn.execute_batch(
            "CREATE TABLE sales (region TEXT, amount REAL, units INTEGER);
             INSERT INTO sales VALUES ('north', 10.5, 3), ('south', 20.0, NULL);",
        )
        .unwrap();
        drop(conn);

        let df = ingest_sqlite(&db_path, "SELECT * FROM sales").unwrap();
        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.column("units").unwrap().null_count(), 1);
        assert!(crate::utils::is_numeric_dtype(
            df.column("amount").unwrap().dtype()
        ));
    }

    #[test]
    fn test_sqlite_bad_query_surfaces_driver_message() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("t.db");
        rusqlite::Connection::open(&db_path).unwrap();

        let err = ingest_sqlite(&db_path, "SELECT * FROM missing_table").unwrap_err();
        match err {
            ReportError::QueryFailed(msg) => assert!(msg.contains("missing_table")),
            other => panic!("expected QueryFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_sqlite_mixed_numeric_column_widens_to_float() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("t.db");
        let conn = rusqlite::Connection::open(&db_path).unwrap();
        conn.execute_batch(
            "CREATE TABLE m (v NUMERIC);
             INSERT INTO m VALUES (1), (2.5);",
        )
        .unwrap();
        drop(conn);

        let df = ingest_sqlite(&db_path, "SELECT * FROM m").unwrap();
        assert_eq!(df.column("v").unwrap().dtype(), &DataType::Float64);
    }
}
