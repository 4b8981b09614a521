use crate::domain::model::{ResultTable, SearchRequest};
use crate::domain::ports::SearchService;
use crate::utils::error::{Result, SmashError};
use async_trait::async_trait;
use reqwest::Client;

/// Data Lab schemas known to carry queryable tables. Mirrors the
/// service's published survey list; checked before the remote
/// `tap_schema` lookup so obvious typos fail without a round trip.
const AVAILABLE_SURVEYS: &str = include_str!("../../data/available_surveys.txt");

/// Client for a TAP `sync` endpoint. One request per call, no retries;
/// the call blocks until the service responds or the transport gives
/// up.
#[derive(Debug, Clone)]
pub struct TapClient {
    base_url: String,
    client: Client,
    max_records: usize,
}

impl TapClient {
    pub fn new(base_url: String, max_records: usize) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            max_records,
        }
    }

    fn sync_url(&self) -> String {
        format!("{}/sync", self.base_url)
    }

    /// Submit one ADQL query and return the CSV response as a table.
    async fn run_query(&self, adql: &str) -> Result<ResultTable> {
        tracing::debug!("Submitting ADQL to {}: {}", self.sync_url(), adql);

        let maxrec = self.max_records.to_string();
        let response = self
            .client
            .post(self.sync_url())
            .form(&[
                ("REQUEST", "doQuery"),
                ("LANG", "ADQL"),
                ("FORMAT", "csv"),
                ("MAXREC", maxrec.as_str()),
                ("QUERY", adql),
            ])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Service response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SmashError::ServiceRejected {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        let bytes = response.bytes().await?;
        ResultTable::from_csv_bytes(&bytes)
    }
}

#[async_trait]
impl SearchService for TapClient {
    async fn search(&self, request: &SearchRequest) -> Result<ResultTable> {
        let adql = cone_search_adql(request);
        self.run_query(&adql).await
    }

    async fn table_exists(&self, schema: &str, table: &str) -> Result<bool> {
        let adql = format!(
            "SELECT table_name FROM tap_schema.tables WHERE schema_name = '{}'",
            escape_adql_literal(schema)
        );
        let result = self.run_query(&adql).await?;

        let wanted = format!("{}.{}", schema, table);
        let found = result
            .column_values("table_name")
            .map(|names| names.iter().any(|n| *n == wanted))
            .unwrap_or(false);
        Ok(found)
    }
}

/// ADQL cone search using the q3c radial-query extension, as the Data
/// Lab tables index by it.
pub fn cone_search_adql(request: &SearchRequest) -> String {
    format!(
        "SELECT * FROM {} WHERE 't' = Q3C_RADIAL_QUERY(ra, dec, {:.5}, {:.5}, {:.3})",
        request.table,
        request.ra_deg,
        request.dec_deg,
        request.radius_deg()
    )
}

/// Whether a schema name appears in the bundled survey list.
pub fn is_known_survey(schema: &str) -> bool {
    AVAILABLE_SURVEYS
        .lines()
        .map(str::trim)
        .any(|line| !line.is_empty() && line == schema)
}

fn escape_adql_literal(value: &str) -> String {
    value.replace('\'', "''")
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn request() -> SearchRequest {
        SearchRequest {
            ra_deg: 21.625,
            dec_deg: -74.221,
            radius_arcmin: 5.0,
            table: "smash_dr2.object".to_string(),
        }
    }

    #[test]
    fn test_cone_search_adql_text() {
        let adql = cone_search_adql(&request());
        assert_eq!(
            adql,
            "SELECT * FROM smash_dr2.object WHERE 't' = Q3C_RADIAL_QUERY(ra, dec, 21.62500, -74.22100, 0.083)"
        );
    }

    #[test]
    fn test_known_surveys() {
        assert!(is_known_survey("smash_dr2"));
        assert!(is_known_survey("smash_dr1"));
        assert!(!is_known_survey("smash_dr9"));
        assert!(!is_known_survey(""));
    }

    #[tokio::test]
    async fn test_search_sends_one_cone_query_and_parses_csv() {
        let server = MockServer::start();
        let tap_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/sync")
                .body_contains("REQUEST=doQuery")
                .body_contains("FORMAT=csv")
                .body_contains("MAXREC=100000")
                .body_contains("Q3C_RADIAL_QUERY")
                .body_contains("21.62500")
                .body_contains("-74.22100")
                .body_contains("0.083");
            then.status(200)
                .header("Content-Type", "text/csv")
                .body("id,ra,dec,gmag\n1,21.62,-74.22,19.1\n2,21.63,-74.21,20.4\n");
        });

        let client = TapClient::new(server.url(""), 100_000);
        let table = client.search(&request()).await.unwrap();

        tap_mock.assert();
        assert_eq!(table.columns, vec!["id", "ra", "dec", "gmag"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][3], "19.1");
    }

    #[tokio::test]
    async fn test_empty_result_is_success() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/sync");
            then.status(200)
                .header("Content-Type", "text/csv")
                .body("id,ra,dec\n");
        });

        let client = TapClient::new(server.url(""), 100_000);
        let table = client.search(&request()).await.unwrap();

        assert!(table.is_empty());
        assert_eq!(table.columns, vec!["id", "ra", "dec"]);
    }

    #[tokio::test]
    async fn test_rejected_query_is_query_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/sync");
            then.status(400).body("ERROR: relation does not exist");
        });

        let client = TapClient::new(server.url(""), 100_000);
        let err = client.search(&request()).await.unwrap_err();

        assert!(matches!(err, SmashError::ServiceRejected { status: 400, .. }));
        assert_eq!(err.category(), crate::utils::error::ErrorCategory::Query);
    }

    #[tokio::test]
    async fn test_table_exists_true_and_false() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/sync")
                .body_contains("tap_schema.tables");
            then.status(200)
                .header("Content-Type", "text/csv")
                .body("table_name\nsmash_dr2.object\nsmash_dr2.exposure\n");
        });

        let client = TapClient::new(server.url(""), 100_000);
        assert!(client.table_exists("smash_dr2", "object").await.unwrap());
        assert!(!client.table_exists("smash_dr2", "chip").await.unwrap());
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let server = MockServer::start();
        let tap_mock = server.mock(|when, then| {
            when.method(POST).path("/sync");
            then.status(200).body("id\n");
        });

        let client = TapClient::new(format!("{}/", server.url("")), 10);
        client.search(&request()).await.unwrap();
        tap_mock.assert();
    }
}
