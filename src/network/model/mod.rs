pub mod beta;
pub mod dataset;
pub mod error;
pub mod evidence;
pub mod params;
pub mod topology;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;

use params::{ParameterRecord, ParameterSet, ParameterStore};
use topology::Topology;

/// JSON export of a parameter store, readable without the SQLite database.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ParameterFile {
    /// Version for format compatibility
    pub version: u32,
    /// When the file was written
    pub timestamp: DateTime<Utc>,
    /// Number of cases behind the posteriors
    pub cases_observed: usize,
    /// Cases already folded into the priors
    #[serde(default)]
    pub prior_cases: usize,
    pub priors: Vec<ParameterRecord>,
    pub posteriors: Vec<ParameterRecord>,
}

impl ParameterFile {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn from_store(topology: &Topology, store: &ParameterStore) -> Self {
        ParameterFile {
            version: Self::CURRENT_VERSION,
            timestamp: Utc::now(),
            cases_observed: store.cases_observed(),
            prior_cases: store.prior_cases(),
            priors: store.priors().to_records(topology),
            posteriors: store.posteriors().to_records(topology),
        }
    }

    pub fn to_store(
        &self,
        topology: &Topology,
    ) -> Result<ParameterStore, Box<dyn Error + Send + Sync>> {
        let priors = ParameterSet::from_records(topology, &self.priors)?;
        let posteriors = ParameterSet::from_records(topology, &self.posteriors)?;
        Ok(ParameterStore::from_parts(
            topology,
            priors,
            posteriors,
            self.prior_cases,
            self.cases_observed,
        )?)
    }

    pub fn save_to_file(&self, path: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let json = fs::read_to_string(path)?;
        let file: ParameterFile = serde_json::from_str(&json)?;

        if file.version > Self::CURRENT_VERSION {
            return Err(format!(
                "Parameter file version {} is newer than supported version {}",
                file.version,
                Self::CURRENT_VERSION
            )
            .into());
        }

        Ok(file)
    }
}
