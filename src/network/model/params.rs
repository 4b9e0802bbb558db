use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::beta::Beta;
use super::dataset::Dataset;
use super::error::{NetworkError, NetworkResult};
use super::topology::{NodeId, Topology};
use crate::network::inference::learner;

/// One `(node, row) -> (α, β)` entry, the unit of persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub node: String,
    pub row: usize,
    pub alpha: f64,
    pub beta: f64,
}

fn check_shape<T>(topology: &Topology, rows: &[Vec<T>], what: &str) -> NetworkResult<()> {
    if rows.len() != topology.len() {
        return Err(NetworkError::ShapeMismatch(format!(
            "{} cover {} nodes, network has {}",
            what,
            rows.len(),
            topology.len()
        )));
    }
    for (id, node_rows) in rows.iter().enumerate() {
        let expected = topology.row_count(id);
        if node_rows.len() != expected {
            return Err(NetworkError::ShapeMismatch(format!(
                "{} for '{}' have {} rows, expected {}",
                what,
                topology.name(id),
                node_rows.len(),
                expected
            )));
        }
    }
    Ok(())
}

/// One Beta per `(node, row)`, indexed `[node][row]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    rows: Vec<Vec<Beta>>,
}

impl ParameterSet {
    pub fn uniform(topology: &Topology) -> ParameterSet {
        ParameterSet {
            rows: topology
                .nodes()
                .iter()
                .map(|node| vec![Beta::uniform(); node.row_count()])
                .collect(),
        }
    }

    pub fn from_rows(topology: &Topology, rows: Vec<Vec<Beta>>) -> NetworkResult<ParameterSet> {
        check_shape(topology, &rows, "Beta rows")?;
        Ok(ParameterSet { rows })
    }

    /// Same shape as `topology`?
    pub fn check(&self, topology: &Topology) -> NetworkResult<()> {
        check_shape(topology, &self.rows, "Beta rows")
    }

    pub fn get(&self, node: NodeId, row: usize) -> Beta {
        self.rows[node][row]
    }

    pub fn rows(&self, node: NodeId) -> &[Beta] {
        &self.rows[node]
    }

    /// Plug-in table of posterior means.
    pub fn point_estimates(&self) -> PointParams {
        PointParams {
            rows: self
                .rows
                .iter()
                .map(|node_rows| node_rows.iter().map(Beta::mean).collect())
                .collect(),
        }
    }

    /// One CPT table drawn from these Betas.
    pub fn sample_point<R: Rng + ?Sized>(&self, rng: &mut R) -> NetworkResult<PointParams> {
        let mut rows = Vec::with_capacity(self.rows.len());
        for node_rows in &self.rows {
            let mut sampled = Vec::with_capacity(node_rows.len());
            for beta in node_rows {
                sampled.push(beta.sample(rng)?);
            }
            rows.push(sampled);
        }
        Ok(PointParams { rows })
    }

    pub fn to_records(&self, topology: &Topology) -> Vec<ParameterRecord> {
        let mut records = Vec::new();
        for (id, node_rows) in self.rows.iter().enumerate() {
            for (row, beta) in node_rows.iter().enumerate() {
                records.push(ParameterRecord {
                    node: topology.name(id).to_string(),
                    row,
                    alpha: beta.alpha(),
                    beta: beta.beta(),
                });
            }
        }
        records
    }

    /// Rebuilds a set from records; every `(node, row)` must appear exactly once.
    pub fn from_records(
        topology: &Topology,
        records: &[ParameterRecord],
    ) -> NetworkResult<ParameterSet> {
        let mut slots: Vec<Vec<Option<Beta>>> = topology
            .nodes()
            .iter()
            .map(|node| vec![None; node.row_count()])
            .collect();

        for record in records {
            let id = topology.id_of(&record.node).ok_or_else(|| {
                NetworkError::ShapeMismatch(format!(
                    "record names unknown node '{}'",
                    record.node
                ))
            })?;
            let slot = slots[id].get_mut(record.row).ok_or_else(|| {
                NetworkError::ShapeMismatch(format!(
                    "'{}' has no row {}",
                    record.node, record.row
                ))
            })?;
            if slot.is_some() {
                return Err(NetworkError::ShapeMismatch(format!(
                    "duplicate record for '{}' row {}",
                    record.node, record.row
                )));
            }
            *slot = Some(Beta::new(record.alpha, record.beta)?);
        }

        let mut rows = Vec::with_capacity(slots.len());
        for (id, node_slots) in slots.into_iter().enumerate() {
            let mut node_rows = Vec::with_capacity(node_slots.len());
            for (row, slot) in node_slots.into_iter().enumerate() {
                node_rows.push(slot.ok_or_else(|| {
                    NetworkError::ShapeMismatch(format!(
                        "missing record for '{}' row {}",
                        topology.name(id),
                        row
                    ))
                })?);
            }
            rows.push(node_rows);
        }
        Ok(ParameterSet { rows })
    }
}

/// Deterministic probability table: P(node = true | row), indexed `[node][row]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointParams {
    rows: Vec<Vec<f64>>,
}

impl PointParams {
    pub fn from_rows(topology: &Topology, rows: Vec<Vec<f64>>) -> NetworkResult<PointParams> {
        check_shape(topology, &rows, "probability rows")?;
        for (id, node_rows) in rows.iter().enumerate() {
            for (row, &p) in node_rows.iter().enumerate() {
                if !(0.0..=1.0).contains(&p) {
                    return Err(NetworkError::InvalidParameter(format!(
                        "P({} | row {}) = {} is outside [0, 1]",
                        topology.name(id),
                        row,
                        p
                    )));
                }
            }
        }
        Ok(PointParams { rows })
    }

    pub fn check(&self, topology: &Topology) -> NetworkResult<()> {
        check_shape(topology, &self.rows, "probability rows")
    }

    pub fn probability(&self, node: NodeId, row: usize) -> f64 {
        self.rows[node][row]
    }

    /// P(node = value | row).
    pub fn likelihood(&self, node: NodeId, row: usize, value: bool) -> f64 {
        let p = self.rows[node][row];
        if value { p } else { 1.0 - p }
    }
}

/// Priors and posteriors for every `(node, row)` of one network.
///
/// A store is an immutable snapshot: learning builds a new store instead of
/// touching this one, so readers always see a complete row set.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStore {
    priors: ParameterSet,
    posteriors: ParameterSet,
    /// Cases already folded into `priors` by earlier learning.
    prior_cases: usize,
    cases_observed: usize,
}

impl ParameterStore {
    /// A store that has not seen data yet; posteriors equal the priors.
    pub fn new(topology: &Topology, priors: ParameterSet) -> NetworkResult<ParameterStore> {
        priors.check(topology)?;
        Ok(ParameterStore {
            posteriors: priors.clone(),
            priors,
            prior_cases: 0,
            cases_observed: 0,
        })
    }

    pub fn uniform(topology: &Topology) -> ParameterStore {
        let priors = ParameterSet::uniform(topology);
        ParameterStore {
            posteriors: priors.clone(),
            priors,
            prior_cases: 0,
            cases_observed: 0,
        }
    }

    /// Reassembles a persisted store.
    pub fn from_parts(
        topology: &Topology,
        priors: ParameterSet,
        posteriors: ParameterSet,
        prior_cases: usize,
        cases_observed: usize,
    ) -> NetworkResult<ParameterStore> {
        priors.check(topology)?;
        posteriors.check(topology)?;
        if prior_cases > cases_observed {
            return Err(NetworkError::InvalidParameter(format!(
                "priors absorbed {} cases but only {} were observed",
                prior_cases, cases_observed
            )));
        }
        Ok(ParameterStore {
            priors,
            posteriors,
            prior_cases,
            cases_observed,
        })
    }

    pub fn priors(&self) -> &ParameterSet {
        &self.priors
    }

    pub fn posteriors(&self) -> &ParameterSet {
        &self.posteriors
    }

    pub fn prior_cases(&self) -> usize {
        self.prior_cases
    }

    /// Every case behind the posteriors, including those in the priors.
    pub fn cases_observed(&self) -> usize {
        self.cases_observed
    }

    /// Posterior snapshot for `dataset`, counted against this store's priors.
    pub fn learn(&self, topology: &Topology, dataset: &Dataset) -> NetworkResult<ParameterStore> {
        let posteriors = learner::learn(topology, dataset, Some(&self.priors))?;
        let cases = dataset.case_count(topology)?;
        debug!(
            "learned posteriors from {} cases on top of {}",
            cases, self.prior_cases
        );
        Ok(ParameterStore {
            priors: self.priors.clone(),
            posteriors,
            prior_cases: self.prior_cases,
            cases_observed: self.prior_cases + cases,
        })
    }

    /// A fresh store whose priors are this store's posteriors, ready for a
    /// logically distinct next dataset.
    pub fn promote_posteriors(&self) -> ParameterStore {
        ParameterStore {
            priors: self.posteriors.clone(),
            posteriors: self.posteriors.clone(),
            prior_cases: self.cases_observed,
            cases_observed: self.cases_observed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_cover_every_row() {
        let topology = Topology::printer();
        let set = ParameterSet::uniform(&topology);
        let records = set.to_records(&topology);
        // 5 roots + 2 + 8 + 4 + 4 + 4
        assert_eq!(records.len(), 27);
        assert_eq!(ParameterSet::from_records(&topology, &records).unwrap(), set);
    }

    #[test]
    fn test_from_records_rejects_gaps_and_duplicates() {
        let topology = Topology::printer();
        let mut records = ParameterSet::uniform(&topology).to_records(&topology);
        let last = records.pop().unwrap();
        assert!(matches!(
            ParameterSet::from_records(&topology, &records),
            Err(NetworkError::ShapeMismatch(_))
        ));

        records.push(last.clone());
        records.push(last);
        assert!(matches!(
            ParameterSet::from_records(&topology, &records),
            Err(NetworkError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_point_params_validation() {
        let topology = Topology::new(vec![("A", vec![]), ("B", vec!["A"])]).unwrap();
        assert!(PointParams::from_rows(&topology, vec![vec![0.2], vec![0.1, 0.9]]).is_ok());
        assert!(matches!(
            PointParams::from_rows(&topology, vec![vec![0.2], vec![0.1]]),
            Err(NetworkError::ShapeMismatch(_))
        ));
        assert!(matches!(
            PointParams::from_rows(&topology, vec![vec![1.2], vec![0.1, 0.9]]),
            Err(NetworkError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_store_starts_at_priors() {
        let topology = Topology::printer();
        let store = ParameterStore::uniform(&topology);
        assert_eq!(store.priors(), store.posteriors());
        assert_eq!(store.cases_observed(), 0);
        assert!(ParameterStore::new(&topology, ParameterSet { rows: vec![] }).is_err());
    }

    #[test]
    fn test_promoted_store_keeps_counting_cases() {
        let topology = Topology::new(vec![("A", vec![]), ("B", vec!["A"])]).unwrap();
        let dataset = Dataset::new()
            .with_column("A", vec![true, false, true])
            .with_column("B", vec![true, false, false]);

        let first = ParameterStore::uniform(&topology).learn(&topology, &dataset).unwrap();
        assert_eq!(first.cases_observed(), 3);

        let second = first.promote_posteriors().learn(&topology, &dataset).unwrap();
        assert_eq!(second.prior_cases(), 3);
        assert_eq!(second.cases_observed(), 6);
        let root = second.posteriors().get(0, 0);
        assert_eq!(root.pseudo_count() - 2.0, second.cases_observed() as f64);

        // re-learning from the same priors replaces, never adds
        let again = second.promote_posteriors().promote_posteriors();
        assert_eq!(again.cases_observed(), 6);
        let relearned = first.learn(&topology, &dataset).unwrap();
        assert_eq!(relearned.cases_observed(), 3);
    }

    #[test]
    fn test_from_parts_rejects_inconsistent_counts() {
        let topology = Topology::printer();
        let set = ParameterSet::uniform(&topology);
        assert!(matches!(
            ParameterStore::from_parts(&topology, set.clone(), set, 10, 4),
            Err(NetworkError::InvalidParameter(_))
        ));
    }
}
