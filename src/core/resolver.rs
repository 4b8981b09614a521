use crate::domain::model::{ResolvedTarget, Target};
use crate::utils::error::{Result, SmashError};
use std::collections::HashMap;

/// Bundled list of the 247 SMASH field centers (field id, RA, Dec in
/// degrees). Compiled in so resolution never depends on a data path.
const SMASH_FIELDS_CSV: &str = include_str!("../../data/smash_fields.csv");

/// Bundled cluster positions from the Bica catalogues (Bica+2008 LMC,
/// Bica+2020 table 2). The `names` column holds comma-separated
/// aliases, as the source catalogues do.
const BICA_CLUSTERS_CSV: &str = include_str!("../../data/bica_clusters.csv");

pub const FIELD_ID_MIN: u32 = 1;
pub const FIELD_ID_MAX: u32 = 247;

/// Field id -> (RA, Dec) lookup for the SMASH survey fields.
#[derive(Debug, Clone)]
pub struct FieldTable {
    fields: HashMap<u32, (f64, f64)>,
}

impl FieldTable {
    pub fn bundled() -> Result<Self> {
        let mut reader = csv::Reader::from_reader(SMASH_FIELDS_CSV.as_bytes());
        let mut fields = HashMap::new();
        for record in reader.records() {
            let record = record?;
            let id: u32 = parse_cell(&record, 0, "fieldid")?;
            let ra: f64 = parse_cell(&record, 1, "ra")?;
            let dec: f64 = parse_cell(&record, 2, "dec")?;
            fields.insert(id, (ra, dec));
        }
        Ok(Self { fields })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn lookup(&self, id: u32) -> Result<(f64, f64)> {
        if !(FIELD_ID_MIN..=FIELD_ID_MAX).contains(&id) {
            return Err(SmashError::UnknownField { id });
        }
        self.fields
            .get(&id)
            .copied()
            .ok_or(SmashError::UnknownField { id })
    }
}

/// Cluster name -> (RA, Dec) lookup over the Bica catalogues.
///
/// Matching is exact on any alias after internal whitespace removal,
/// so "HW77" finds the catalogue's "HW 77" entry. No partial or fuzzy
/// matching.
#[derive(Debug, Clone)]
pub struct ClusterCatalog {
    entries: Vec<ClusterEntry>,
}

#[derive(Debug, Clone)]
struct ClusterEntry {
    aliases: Vec<String>,
    ra_deg: f64,
    dec_deg: f64,
}

impl ClusterCatalog {
    pub fn bundled() -> Result<Self> {
        let mut reader = csv::Reader::from_reader(BICA_CLUSTERS_CSV.as_bytes());
        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record?;
            let names = record.get(0).unwrap_or_default();
            let ra_deg: f64 = parse_cell(&record, 1, "ra")?;
            let dec_deg: f64 = parse_cell(&record, 2, "dec")?;
            entries.push(ClusterEntry {
                aliases: names
                    .split(',')
                    .map(|n| normalize_name(n))
                    .filter(|n| !n.is_empty())
                    .collect(),
                ra_deg,
                dec_deg,
            });
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Result<(f64, f64)> {
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return Err(SmashError::UnknownCluster {
                name: name.to_string(),
            });
        }
        self.entries
            .iter()
            .find(|e| e.aliases.iter().any(|a| *a == wanted))
            .map(|e| (e.ra_deg, e.dec_deg))
            .ok_or_else(|| SmashError::UnknownCluster {
                name: name.to_string(),
            })
    }
}

/// Maps a configured target to sky coordinates using the bundled
/// reference tables. Purely local, no network access.
#[derive(Debug, Clone)]
pub struct TargetResolver {
    fields: FieldTable,
    clusters: ClusterCatalog,
}

impl TargetResolver {
    pub fn bundled() -> Result<Self> {
        Ok(Self {
            fields: FieldTable::bundled()?,
            clusters: ClusterCatalog::bundled()?,
        })
    }

    pub fn resolve(&self, target: &Target) -> Result<ResolvedTarget> {
        match target {
            Target::Field(id) => {
                let (ra_deg, dec_deg) = self.fields.lookup(*id)?;
                Ok(ResolvedTarget {
                    ra_deg,
                    dec_deg,
                    label: format!("f{}", id),
                })
            }
            Target::Cluster(name) => {
                let (ra_deg, dec_deg) = self.clusters.lookup(name)?;
                Ok(ResolvedTarget {
                    ra_deg,
                    dec_deg,
                    label: normalize_name(name),
                })
            }
        }
    }
}

/// Strip all whitespace from a catalogue name ("HW 77" -> "HW77").
fn normalize_name(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

fn parse_cell<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    column: &str,
) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    let cell = record
        .get(index)
        .ok_or_else(|| SmashError::MalformedResponse {
            message: format!("Bundled table row is missing column '{}'", column),
        })?;
    cell.trim()
        .parse()
        .map_err(|e| SmashError::MalformedResponse {
            message: format!("Bundled table cell '{}' ({}): {}", cell, column, e),
        })
}
