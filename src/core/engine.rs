use crate::config::QueryConfig;
use crate::core::resolver::TargetResolver;
use crate::core::tap::is_known_survey;
use crate::domain::model::{ResolvedTarget, SearchRequest, Target};
use crate::domain::ports::{SearchService, Storage};
use crate::utils::error::{Result, SmashError};
use std::time::Instant;

/// Runs one query end to end: resolve the target, optionally verify
/// the table, run the cone search, write the catalog to disk.
pub struct QueryEngine<S: Storage, Q: SearchService> {
    storage: S,
    service: Q,
    resolver: TargetResolver,
    config: QueryConfig,
}

impl<S: Storage, Q: SearchService> QueryEngine<S, Q> {
    pub fn new(storage: S, service: Q, config: QueryConfig) -> Result<Self> {
        Ok(Self {
            storage,
            service,
            resolver: TargetResolver::bundled()?,
            config,
        })
    }

    /// Returns the path of the written catalog file.
    pub async fn run(&self) -> Result<String> {
        let resolved = self.resolver.resolve(&self.config.target)?;
        match &self.config.target {
            Target::Field(id) => tracing::info!(
                "Field {} (RA {:.5}, Dec {:.5}), rad = {:.3} arcmin",
                id,
                resolved.ra_deg,
                resolved.dec_deg,
                self.config.radius_arcmin
            ),
            Target::Cluster(name) => tracing::info!(
                "{} (RA {:.5}, Dec {:.5}), rad = {:.3} arcmin",
                name,
                resolved.ra_deg,
                resolved.dec_deg,
                self.config.radius_arcmin
            ),
        }

        if self.config.verify_table {
            self.verify_table().await?;
        }

        let request = SearchRequest {
            ra_deg: resolved.ra_deg,
            dec_deg: resolved.dec_deg,
            radius_arcmin: self.config.radius_arcmin,
            table: self.config.data_name(),
        };

        let started = Instant::now();
        let table = self.service.search(&request).await?;
        tracing::info!(
            "Query returned {} rows in {:.1}s",
            table.len(),
            started.elapsed().as_secs_f64()
        );
        if table.is_empty() {
            tracing::warn!("No rows matched the search cone");
        }

        let filename = self.output_filename(&resolved);
        self.storage
            .write_file(&filename, &table.to_csv_bytes()?)
            .await?;

        Ok(format!("{}/{}", self.config.output_path, filename))
    }

    async fn verify_table(&self) -> Result<()> {
        let data_name = self.config.data_name();
        if !is_known_survey(&self.config.schema_name) {
            return Err(SmashError::TableNotAvailable { table: data_name });
        }
        if !self
            .service
            .table_exists(&self.config.schema_name, &self.config.table_name)
            .await?
        {
            return Err(SmashError::TableNotAvailable { table: data_name });
        }
        Ok(())
    }

    /// Catalog filename: schema, target label, radius with the decimal
    /// point spelled as 'p' ("smash_dr2_f79_5arcmin.csv").
    fn output_filename(&self, resolved: &ResolvedTarget) -> String {
        let radius = format!("{}", self.config.radius_arcmin).replace('.', "p");
        format!(
            "{}_{}_{}arcmin.csv",
            self.config.schema_name, resolved.label, radius
        )
    }
}
