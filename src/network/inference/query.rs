use log::{debug, trace};
use serde::Serialize;

use crate::network::model::{
    error::{NetworkError, NetworkResult},
    evidence::Evidence,
    params::PointParams,
    topology::{NodeId, Topology},
};

/// Posterior probability that one root cause is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootMarginal {
    pub root: String,
    pub probability: f64,
}

/// Unnormalized `(sum_true, sum_false)` for every root, from one pass over
/// all root assignments.
fn enumerate_roots(
    topology: &Topology,
    params: &PointParams,
    observed: &[(NodeId, bool)],
) -> Vec<(f64, f64)> {
    let roots = topology.roots();
    let mut sums = vec![(0.0, 0.0); roots.len()];
    let mut values = vec![false; topology.len()];

    for assignment in 0u32..(1u32 << roots.len()) {
        let mut weight = 1.0;
        for (bit, &root) in roots.iter().enumerate() {
            let value = assignment & (1 << bit) != 0;
            values[root] = value;
            weight *= params.likelihood(root, 0, value);
        }
        // unobserved symptoms sum to one and drop out
        for &(symptom, value) in observed {
            let row = topology.row_index(symptom, |parent| values[parent]);
            weight *= params.likelihood(symptom, row, value);
        }
        trace!("assignment {:#07b}: weight {}", assignment, weight);

        for (bit, sum) in sums.iter_mut().enumerate() {
            if assignment & (1 << bit) != 0 {
                sum.0 += weight;
            } else {
                sum.1 += weight;
            }
        }
    }
    sums
}

fn normalize(target: &str, (sum_true, sum_false): (f64, f64)) -> NetworkResult<f64> {
    let total = sum_true + sum_false;
    // zero, or NaN from an unusable table
    if !total.is_finite() || total <= 0.0 {
        return Err(NetworkError::DegenerateQuery {
            target: target.to_string(),
        });
    }
    Ok(sum_true / total)
}

/// P(`target` = true | `evidence`) by exact enumeration over the roots.
pub fn query_root_marginal(
    topology: &Topology,
    params: &PointParams,
    evidence: &Evidence,
    target: &str,
) -> NetworkResult<f64> {
    params.check(topology)?;
    let observed = evidence.resolve(topology)?;
    let target_id = topology
        .id_of(target)
        .filter(|&id| topology.is_root(id))
        .ok_or_else(|| {
            NetworkError::InvalidEvidence(format!("query target '{}' is not a root cause", target))
        })?;
    let position = topology
        .roots()
        .iter()
        .position(|&root| root == target_id)
        .ok_or_else(|| NetworkError::InvalidEvidence(format!("'{}' is not a root", target)))?;

    let sums = enumerate_roots(topology, params, &observed);
    let probability = normalize(target, sums[position])?;
    debug!(
        "P({} | {} observed symptoms) = {}",
        target,
        observed.len(),
        probability
    );
    Ok(probability)
}

/// Marginals of every root cause, most probable first.
pub fn diagnose(
    topology: &Topology,
    params: &PointParams,
    evidence: &Evidence,
) -> NetworkResult<Vec<RootMarginal>> {
    params.check(topology)?;
    let observed = evidence.resolve(topology)?;
    let sums = enumerate_roots(topology, params, &observed);

    let mut marginals = Vec::with_capacity(sums.len());
    for (&root, &root_sums) in topology.roots().iter().zip(&sums) {
        let name = topology.name(root);
        marginals.push(RootMarginal {
            root: name.to_string(),
            probability: normalize(name, root_sums)?,
        });
    }
    marginals.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    Ok(marginals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> (Topology, PointParams) {
        let topology = Topology::new(vec![("A", vec![]), ("S", vec!["A"])]).unwrap();
        let params = PointParams::from_rows(&topology, vec![vec![0.1], vec![0.2, 0.9]]).unwrap();
        (topology, params)
    }

    #[test]
    fn test_single_parent_bayes_rule() {
        let (topology, params) = tiny();
        let evidence = Evidence::new().observe("S", true);
        let p = query_root_marginal(&topology, &params, &evidence, "A").unwrap();
        let expected = 0.1 * 0.9 / (0.1 * 0.9 + 0.9 * 0.2);
        assert!((p - expected).abs() < 1e-12);
    }

    #[test]
    fn test_no_evidence_returns_prior() {
        let (topology, params) = tiny();
        let p = query_root_marginal(&topology, &params, &Evidence::new(), "A").unwrap();
        assert!((p - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_target_must_be_root() {
        let (topology, params) = tiny();
        for target in ["S", "Nope"] {
            assert!(matches!(
                query_root_marginal(&topology, &params, &Evidence::new(), target),
                Err(NetworkError::InvalidEvidence(_))
            ));
        }
    }

    #[test]
    fn test_degenerate_evidence() {
        let topology = Topology::new(vec![("A", vec![]), ("S", vec!["A"])]).unwrap();
        let params = PointParams::from_rows(&topology, vec![vec![0.5], vec![0.0, 0.0]]).unwrap();
        let evidence = Evidence::new().observe("S", true);
        assert_eq!(
            query_root_marginal(&topology, &params, &evidence, "A"),
            Err(NetworkError::DegenerateQuery {
                target: "A".to_string()
            })
        );
    }
}
