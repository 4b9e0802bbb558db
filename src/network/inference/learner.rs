use log::{debug, info, trace};

use crate::network::model::{
    dataset::Dataset,
    error::NetworkResult,
    params::ParameterSet,
    topology::Topology,
};

/// `(true, false)` outcome counts for one CPT row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub true_count: u64,
    pub false_count: u64,
}

impl RowCounts {
    pub fn total(&self) -> u64 {
        self.true_count + self.false_count
    }
}

/// Sufficient statistics of a fully observed dataset, indexed `[node][row]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountTable {
    rows: Vec<Vec<RowCounts>>,
    cases: usize,
}

impl CountTable {
    pub fn get(&self, node: usize, row: usize) -> RowCounts {
        self.rows[node][row]
    }

    pub fn rows(&self, node: usize) -> &[RowCounts] {
        &self.rows[node]
    }

    pub fn cases(&self) -> usize {
        self.cases
    }
}

/// Counts child outcomes per CPT row. Roots only have row 0.
pub fn count_cases(topology: &Topology, dataset: &Dataset) -> NetworkResult<CountTable> {
    let columns = dataset.aligned(topology)?;
    let cases = columns[0].len();

    let mut rows: Vec<Vec<RowCounts>> = topology
        .nodes()
        .iter()
        .map(|node| vec![RowCounts::default(); node.row_count()])
        .collect();

    for case in 0..cases {
        for (node, node_rows) in rows.iter_mut().enumerate() {
            let row = topology.row_index(node, |parent| columns[parent][case]);
            let counts = &mut node_rows[row];
            if columns[node][case] {
                counts.true_count += 1;
            } else {
                counts.false_count += 1;
            }
        }
    }

    Ok(CountTable { rows, cases })
}

/// Exact Beta posteriors for every root probability and CPT row.
///
/// Under full observability each row's posterior is the conjugate update of
/// its prior by the row's counts. Missing `priors` means Beta(1, 1) everywhere.
pub fn learn(
    topology: &Topology,
    dataset: &Dataset,
    priors: Option<&ParameterSet>,
) -> NetworkResult<ParameterSet> {
    let uniform;
    let priors = match priors {
        Some(priors) => {
            priors.check(topology)?;
            priors
        }
        None => {
            uniform = ParameterSet::uniform(topology);
            &uniform
        }
    };

    let counts = count_cases(topology, dataset)?;
    info!(
        "learning {} nodes from {} cases",
        topology.len(),
        counts.cases()
    );

    let mut posteriors = Vec::with_capacity(topology.len());
    for node in 0..topology.len() {
        let node_rows: Vec<_> = priors
            .rows(node)
            .iter()
            .zip(counts.rows(node))
            .enumerate()
            .map(|(row, (prior, observed))| {
                trace!(
                    "{} row {}: {} true, {} false",
                    topology.name(node),
                    row,
                    observed.true_count,
                    observed.false_count
                );
                prior.update_with_counts(observed.true_count, observed.false_count)
            })
            .collect();
        debug!(
            "{}: posterior means {:?}",
            topology.name(node),
            node_rows.iter().map(|beta| beta.mean()).collect::<Vec<_>>()
        );
        posteriors.push(node_rows);
    }

    ParameterSet::from_rows(topology, posteriors)
}
