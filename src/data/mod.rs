use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{ScoutError, ScoutResult};

/// Placeholder stored in place of missing cells.
pub const SENTINEL: &str = "Unknown";

/// One row of the loaded table. Cells are kept as raw strings; numeric
/// interpretation happens at access time because upstream data is noisy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    values: HashMap<String, String>,
}

impl Record {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Cell value with the sentinel substituted for absent columns.
    pub fn get_or_unknown(&self, key: &str) -> &str {
        self.get(key).unwrap_or(SENTINEL)
    }

    /// Numeric view of a cell. Empty, sentinel, and unparsable values
    /// all read as `None`.
    pub fn numeric(&self, key: &str) -> Option<f64> {
        let raw = self.get(key)?.trim();
        if raw.is_empty() || raw == SENTINEL {
            return None;
        }
        raw.parse::<f64>().ok()
    }

    /// Numeric view with a caller-supplied default for anything unparsable.
    pub fn numeric_or(&self, key: &str, default: f64) -> f64 {
        self.numeric(key).unwrap_or(default)
    }
}

/// Immutable in-memory table built from one or more CSV sources.
#[derive(Debug, Clone)]
pub struct Table {
    key_column: String,
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Table {
    pub fn new(key_column: String, columns: Vec<String>, rows: Vec<Record>) -> Self {
        Self {
            key_column,
            columns,
            rows,
        }
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// Column names in first-seen source order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Key-column values in table order.
    pub fn key_values(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.get_or_unknown(&self.key_column))
    }
}

/// Load one or more CSV sources into a single deduplicated table.
///
/// Rows are concatenated in source order. A row whose key-column value
/// duplicates an earlier row is dropped (first occurrence wins). Missing
/// and empty cells become the `"Unknown"` sentinel. A missing or
/// malformed source fails the whole load with `DataUnavailable`.
pub fn load<P: AsRef<Path>>(sources: &[P], key_column: &str) -> ScoutResult<Table> {
    if sources.is_empty() {
        return Err(ScoutError::DataUnavailable(
            "no data sources configured".to_string(),
        ));
    }

    let mut columns: Vec<String> = Vec::new();
    let mut seen_keys: HashSet<String> = HashSet::new();
    let mut rows: Vec<Record> = Vec::new();

    for source in sources {
        let path = source.as_ref();
        let mut reader = csv::Reader::from_path(path).map_err(|e| {
            ScoutError::DataUnavailable(format!("{}: {}", path.display(), e))
        })?;

        let headers = reader
            .headers()
            .map_err(|e| ScoutError::DataUnavailable(format!("{}: {}", path.display(), e)))?
            .clone();

        // Union of columns across sources, preserving first-seen order.
        for header in headers.iter() {
            if !columns.iter().any(|c| c == header) {
                columns.push(header.to_string());
            }
        }

        for result in reader.records() {
            let record = result.map_err(|e| {
                ScoutError::DataUnavailable(format!("{}: {}", path.display(), e))
            })?;

            let mut values = HashMap::with_capacity(headers.len());
            for (header, cell) in headers.iter().zip(record.iter()) {
                let cell = cell.trim();
                let value = if cell.is_empty() { SENTINEL } else { cell };
                values.insert(header.to_string(), value.to_string());
            }

            let key = values
                .get(key_column)
                .cloned()
                .unwrap_or_else(|| SENTINEL.to_string());
            if !seen_keys.insert(key) {
                continue;
            }

            rows.push(Record::new(values));
        }
    }

    log::info!(
        "Loaded {} unique rows across {} source(s)",
        rows.len(),
        sources.len()
    );

    Ok(Table::new(key_column.to_string(), columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn deduplicates_by_key_column_first_source_wins() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_csv(
            &dir,
            "a.csv",
            "Player,Gls\nLeo Messi,30\nKylian Mbappe,28\n",
        );
        let b = write_csv(&dir, "b.csv", "Player,Gls\nLeo Messi,5\nErling Haaland,35\n");

        let table = load(&[a, b], "Player").unwrap();
        assert_eq!(table.len(), 3);

        let messi = table
            .rows()
            .iter()
            .find(|r| r.get("Player") == Some("Leo Messi"))
            .unwrap();
        assert_eq!(messi.get("Gls"), Some("30"));
    }

    #[test]
    fn missing_cells_become_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "a.csv", "Player,Gls,Ast\nLeo Messi,30,\n");

        let table = load(&[path], "Player").unwrap();
        let row = &table.rows()[0];
        assert_eq!(row.get("Ast"), Some(SENTINEL));
        assert_eq!(row.numeric("Ast"), None);
    }

    #[test]
    fn missing_source_is_data_unavailable() {
        let err = load(&["/nonexistent/players.csv"], "Player").unwrap_err();
        assert!(matches!(err, ScoutError::DataUnavailable(_)));
    }

    #[test]
    fn column_union_preserves_first_seen_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_csv(&dir, "a.csv", "Player,Gls\nLeo Messi,30\n");
        let b = write_csv(&dir, "b.csv", "Player,Ast\nErling Haaland,8\n");

        let table = load(&[a, b], "Player").unwrap();
        assert_eq!(table.columns(), &["Player", "Gls", "Ast"]);

        // Row from the second source has no Gls cell at all.
        let haaland = table
            .rows()
            .iter()
            .find(|r| r.get("Player") == Some("Erling Haaland"))
            .unwrap();
        assert_eq!(haaland.get("Gls"), None);
        assert_eq!(haaland.get_or_unknown("Gls"), SENTINEL);
    }

    #[test]
    fn numeric_coercion_handles_noise() {
        let mut values = HashMap::new();
        values.insert("Gls".to_string(), " 12 ".to_string());
        values.insert("Ast".to_string(), "abc".to_string());
        let record = Record::new(values);

        assert_eq!(record.numeric("Gls"), Some(12.0));
        assert_eq!(record.numeric("Ast"), None);
        assert_eq!(record.numeric_or("Ast", 0.0), 0.0);
        assert_eq!(record.numeric_or("Missing", 25.0), 25.0);
    }
}
