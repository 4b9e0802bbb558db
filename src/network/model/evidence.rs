use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::{NetworkError, NetworkResult};
use super::topology::{NodeId, Topology};

/// Observed symptom values for one diagnostic query. A symptom that is not
/// present is unknown and gets marginalized out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Evidence {
    observations: BTreeMap<String, bool>,
}

impl Evidence {
    pub fn new() -> Self {
        Evidence::default()
    }

    pub fn observe(mut self, symptom: &str, value: bool) -> Self {
        self.observations.insert(symptom.to_string(), value);
        self
    }

    /// Sets or clears (`None`) an observation.
    pub fn set(&mut self, symptom: &str, value: Option<bool>) {
        match value {
            Some(value) => {
                self.observations.insert(symptom.to_string(), value);
            }
            None => {
                self.observations.remove(symptom);
            }
        }
    }

    pub fn get(&self, symptom: &str) -> Option<bool> {
        self.observations.get(symptom).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.observations
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
    }

    /// Maps the observations onto symptom node ids.
    pub fn resolve(&self, topology: &Topology) -> NetworkResult<Vec<(NodeId, bool)>> {
        let mut resolved = Vec::with_capacity(self.observations.len());
        for (name, &value) in &self.observations {
            let id = topology.id_of(name).ok_or_else(|| {
                NetworkError::InvalidEvidence(format!("'{}' is not a node of the network", name))
            })?;
            if topology.is_root(id) {
                return Err(NetworkError::InvalidEvidence(format!(
                    "'{}' is a root cause and cannot be observed in a query",
                    name
                )));
            }
            resolved.push((id, value));
        }
        Ok(resolved)
    }
}
