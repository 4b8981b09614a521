use crate::utils::error::{Result, SmashError};
use serde::{Deserialize, Serialize};

/// Search target, exactly one variant per run. Built from the settings
/// file at load time so "both set" / "neither set" cannot reach the
/// resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// SMASH field number, 1-247.
    Field(u32),
    /// Cluster name as listed in the Bica catalogues (e.g. "HW 77").
    Cluster(String),
}

/// A target resolved to sky coordinates.
///
/// `label` is a filesystem-safe identifier for the target ("f79",
/// "HW77") used in log lines and the output filename.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    pub ra_deg: f64,
    pub dec_deg: f64,
    pub label: String,
}

/// Cone-search parameters for one TAP query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Cone center right ascension, in degrees.
    pub ra_deg: f64,
    /// Cone center declination, in degrees.
    pub dec_deg: f64,
    /// Search radius, in arcminutes.
    pub radius_arcmin: f64,
    /// Fully qualified table name ("smash_dr2.object").
    pub table: String,
}

impl SearchRequest {
    pub fn radius_deg(&self) -> f64 {
        self.radius_arcmin / 60.0
    }
}

/// Tabular response from the service: a column header plus rows of
/// string cells, exactly as the CSV response carries them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Parse a CSV body into a table. An entirely empty body is a valid
    /// empty result; a header-only body is an empty table with columns.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Self::default());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(bytes);

        let columns: Vec<String> = reader
            .headers()
            .map_err(SmashError::Csv)?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(SmashError::Csv)?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        Ok(Self { columns, rows })
    }

    /// Encode the table as CSV, header first. A table with no columns
    /// encodes to an empty body.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        if self.columns.is_empty() {
            return Ok(Vec::new());
        }
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| SmashError::MalformedResponse {
                message: format!("CSV buffer flush failed: {}", e),
            })
    }

    /// Index of a named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of a named column.
    pub fn column_values(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_conversion() {
        let request = SearchRequest {
            ra_deg: 21.625,
            dec_deg: -74.221,
            radius_arcmin: 5.0,
            table: "smash_dr2.object".to_string(),
        };
        assert!((request.radius_deg() - 0.0833333).abs() < 1e-6);
    }

    #[test]
    fn test_csv_round_trip_preserves_shape() {
        let table = ResultTable {
            columns: vec!["id".to_string(), "ra".to_string(), "dec".to_string()],
            rows: vec![
                vec!["1".to_string(), "21.62".to_string(), "-74.22".to_string()],
                vec!["2".to_string(), "21.63".to_string(), "-74.21".to_string()],
            ],
        };

        let bytes = table.to_csv_bytes().unwrap();
        let reread = ResultTable::from_csv_bytes(&bytes).unwrap();

        assert_eq!(reread.columns, table.columns);
        assert_eq!(reread.len(), table.len());
        assert_eq!(reread, table);
    }

    #[test]
    fn test_columnless_table_encodes_to_empty_body() {
        let table = ResultTable::default();
        let bytes = table.to_csv_bytes().unwrap();
        assert!(bytes.is_empty());
        assert_eq!(ResultTable::from_csv_bytes(&bytes).unwrap(), table);
    }

    #[test]
    fn test_empty_body_is_empty_table() {
        let table = ResultTable::from_csv_bytes(b"").unwrap();
        assert!(table.is_empty());
        assert!(table.columns.is_empty());

        let table = ResultTable::from_csv_bytes(b"  \n").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_header_only_body() {
        let table = ResultTable::from_csv_bytes(b"id,ra,dec\n").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns, vec!["id", "ra", "dec"]);
    }

    #[test]
    fn test_column_values() {
        let table = ResultTable::from_csv_bytes(b"id,ra\n1,21.62\n2,21.63\n").unwrap();
        assert_eq!(table.column_values("ra").unwrap(), vec!["21.62", "21.63"]);
        assert!(table.column_values("gmag").is_none());
    }

    #[test]
    fn test_quoted_cells_survive_round_trip() {
        let table = ResultTable {
            columns: vec!["names".to_string(), "ra".to_string()],
            rows: vec![vec!["NGC 419,Kron 58".to_string(), "17.074".to_string()]],
        };
        let bytes = table.to_csv_bytes().unwrap();
        let reread = ResultTable::from_csv_bytes(&bytes).unwrap();
        assert_eq!(reread.rows[0][0], "NGC 419,Kron 58");
    }
}
