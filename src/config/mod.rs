pub mod cli;

use crate::domain::model::Target;
use crate::utils::error::{Result, SmashError};
use crate::utils::validation::{
    self, validate_non_empty_string, validate_path, validate_range, validate_required_field,
    validate_url,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SERVICE_URL: &str = "https://datalab.noirlab.edu/tap";
pub const DEFAULT_MAX_RECORDS: usize = 100_000;

/// Largest accepted search radius (1.5 degrees, as the archive-side
/// query planner degrades badly beyond that).
pub const MAX_RADIUS_ARCMIN: f64 = 90.0;

/// Raw shape of the YAML settings file. Both target keys are optional
/// here; `QueryConfig::try_from` enforces that exactly one is present.
/// Unrecognized keys are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSettings {
    pub service_url: Option<String>,
    pub schema_name: Option<String>,
    pub table_name: Option<String>,
    pub field: Option<u32>,
    pub cluster: Option<String>,
    pub radius_arcmin: Option<f64>,
    pub output_path: Option<String>,
    pub max_records: Option<usize>,
    pub verify_table: Option<bool>,
}

/// Validated, immutable per-run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    pub service_url: String,
    pub schema_name: String,
    pub table_name: String,
    pub target: Target,
    pub radius_arcmin: f64,
    pub output_path: String,
    pub max_records: usize,
    pub verify_table: bool,
}

impl QueryConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| SmashError::Config {
            message: format!(
                "Cannot read settings file {}: {}",
                path.as_ref().display(),
                e
            ),
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        let raw: RawSettings = serde_yml::from_str(&processed)?;
        Self::try_from_raw(raw)
    }

    fn try_from_raw(raw: RawSettings) -> Result<Self> {
        let schema_name = validate_required_field("schema_name", &raw.schema_name)?.clone();
        let table_name = validate_required_field("table_name", &raw.table_name)?.clone();
        let radius_arcmin = *validate_required_field("radius_arcmin", &raw.radius_arcmin)?;
        let output_path = validate_required_field("output_path", &raw.output_path)?.clone();

        let target = match (raw.field, raw.cluster) {
            (Some(id), None) => Target::Field(id),
            (None, Some(name)) => {
                validate_non_empty_string("cluster", &name)?;
                Target::Cluster(name)
            }
            (Some(_), Some(_)) => {
                return Err(SmashError::Config {
                    message: "Exactly one of 'field' or 'cluster' must be set, found both"
                        .to_string(),
                })
            }
            (None, None) => {
                return Err(SmashError::Config {
                    message: "Exactly one of 'field' or 'cluster' must be set, found neither"
                        .to_string(),
                })
            }
        };

        let config = Self {
            service_url: raw
                .service_url
                .unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string()),
            schema_name,
            table_name,
            target,
            radius_arcmin,
            output_path,
            max_records: raw.max_records.unwrap_or(DEFAULT_MAX_RECORDS),
            verify_table: raw.verify_table.unwrap_or(false),
        };
        config.validate_config()?;
        Ok(config)
    }

    fn validate_config(&self) -> Result<()> {
        validate_url("service_url", &self.service_url)?;
        validate_non_empty_string("schema_name", &self.schema_name)?;
        validate_non_empty_string("table_name", &self.table_name)?;
        validate_path("output_path", &self.output_path)?;
        validate_range(
            "radius_arcmin",
            self.radius_arcmin,
            f64::MIN_POSITIVE,
            MAX_RADIUS_ARCMIN,
        )?;
        if self.max_records == 0 {
            return Err(SmashError::InvalidConfigValue {
                field: "max_records".to_string(),
                value: "0".to_string(),
                reason: "Row cap must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Fully qualified table name as the service expects it.
    pub fn data_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.table_name)
    }
}

impl validation::Validate for QueryConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

/// Replace `${VAR}` forms with values from the process environment.
/// Unset variables are left as-is so validation reports them in place.
fn substitute_env_vars(content: &str) -> String {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();
    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .to_string()
}
