use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmashError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing configuration key: {field}")]
    MissingConfig { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("Field {id} not available (valid SMASH fields are 1-247)")]
    UnknownField { id: u32 },

    #[error("Cluster {name:?} not found in the Bica catalogues")]
    UnknownCluster { name: String },

    #[error("Table {table} not available at the service")]
    TableNotAvailable { table: String },

    #[error("TAP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Query rejected by service (HTTP {status}): {body}")]
    ServiceRejected { status: u16, body: String },

    #[error("Malformed service response: {message}")]
    MalformedResponse { message: String },

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Resolution,
    Query,
    Io,
}

impl SmashError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SmashError::Config { .. }
            | SmashError::MissingConfig { .. }
            | SmashError::InvalidConfigValue { .. }
            | SmashError::Yaml(_) => ErrorCategory::Config,
            SmashError::UnknownField { .. } | SmashError::UnknownCluster { .. } => {
                ErrorCategory::Resolution
            }
            SmashError::TableNotAvailable { .. }
            | SmashError::Http(_)
            | SmashError::ServiceRejected { .. }
            | SmashError::MalformedResponse { .. } => ErrorCategory::Query,
            SmashError::Csv(_) | SmashError::Io(_) => ErrorCategory::Io,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Config => 2,
            ErrorCategory::Resolution => 3,
            ErrorCategory::Query => 4,
            ErrorCategory::Io => 5,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Config => "Check the YAML settings file against the documented keys",
            ErrorCategory::Resolution => {
                "Check the field number (1-247) or cluster name against the bundled catalogues"
            }
            ErrorCategory::Query => "Check network connectivity and the schema/table names",
            ErrorCategory::Io => "Check that the output path exists and is writable",
        }
    }
}

pub type Result<T> = std::result::Result<T, SmashError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err = SmashError::UnknownField { id: 300 };
        assert_eq!(err.category(), ErrorCategory::Resolution);
        assert_eq!(err.exit_code(), 3);

        let err = SmashError::MissingConfig {
            field: "radius_arcmin".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Config);
        assert_eq!(err.exit_code(), 2);

        let err = SmashError::ServiceRejected {
            status: 400,
            body: "bad ADQL".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Query);
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_unknown_cluster_message() {
        let err = SmashError::UnknownCluster {
            name: "HW 999".to_string(),
        };
        assert!(err.to_string().contains("HW 999"));
    }
}
