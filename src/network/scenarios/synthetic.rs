use log::debug;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::error::Error;

use crate::network::common::interface::ScenarioMaker;
use crate::network::model::{
    dataset::Dataset,
    error::{NetworkError, NetworkResult},
    params::PointParams,
    topology::Topology,
};

/// Forward-samples `cases` incidents from a known probability table.
pub fn sample_cases(
    topology: &Topology,
    params: &PointParams,
    cases: usize,
    seed: u64,
) -> NetworkResult<Dataset> {
    if cases == 0 {
        return Err(NetworkError::InvalidParameter(
            "synthetic dataset needs at least one case".to_string(),
        ));
    }
    params.check(topology)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut columns = vec![Vec::with_capacity(cases); topology.len()];
    let mut values = vec![false; topology.len()];
    for _ in 0..cases {
        // roots first, then symptoms conditioned on them
        for &root in topology.roots() {
            values[root] = rng.gen_bool(params.probability(root, 0));
        }
        for &symptom in topology.symptoms() {
            let row = topology.row_index(symptom, |parent| values[parent]);
            values[symptom] = rng.gen_bool(params.probability(symptom, row));
        }
        for (column, &value) in columns.iter_mut().zip(&values) {
            column.push(value);
        }
    }
    debug!("sampled {} synthetic cases with seed {}", cases, seed);

    let mut dataset = Dataset::new();
    for (id, column) in columns.into_iter().enumerate() {
        dataset.insert(topology.name(id), column);
    }
    Ok(dataset)
}

/// Synthetic incidents generated from `params`, reproducible through `seed`.
pub struct SyntheticPrinter {
    pub cases: usize,
    pub seed: u64,
    pub params: Option<PointParams>,
}

impl SyntheticPrinter {
    /// Probabilities used when no table is supplied: a ten percent fault rate
    /// for every root, and symptoms that fire at 0.9 whenever any parent is
    /// faulty and at 0.05 otherwise.
    pub fn default_params(topology: &Topology) -> NetworkResult<PointParams> {
        let rows = topology
            .nodes()
            .iter()
            .map(|node| {
                if node.is_root() {
                    vec![0.1]
                } else {
                    (0..node.row_count())
                        .map(|row| if row == 0 { 0.05 } else { 0.9 })
                        .collect()
                }
            })
            .collect();
        PointParams::from_rows(topology, rows)
    }
}

impl ScenarioMaker for SyntheticPrinter {
    fn make_dataset(
        &self,
        topology: &Topology,
    ) -> Result<Dataset, Box<dyn Error + Send + Sync>> {
        let params = match &self.params {
            Some(params) => params.clone(),
            None => SyntheticPrinter::default_params(topology)?,
        };
        Ok(sample_cases(topology, &params, self.cases, self.seed)?)
    }
}
