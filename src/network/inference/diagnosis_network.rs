use log::info;
use std::sync::Arc;

use super::{
    monte_carlo::{SampledMarginal, SamplingConfig, query_root_marginal_sampled},
    query::{RootMarginal, diagnose, query_root_marginal},
};
use crate::network::model::{
    dataset::Dataset,
    error::NetworkResult,
    evidence::Evidence,
    params::{ParameterSet, ParameterStore, PointParams},
    topology::Topology,
};

/// DiagnosisNetwork ties a topology to its current parameter snapshot.
///
/// Learning swaps in a new `Arc<ParameterStore>`; a snapshot handed out
/// earlier keeps seeing the parameters it was taken with.
pub struct DiagnosisNetwork {
    topology: Arc<Topology>,
    store: Arc<ParameterStore>,
}

impl DiagnosisNetwork {
    /// Network with Beta(1, 1) priors on every row.
    pub fn new(topology: Arc<Topology>) -> Self {
        let store = Arc::new(ParameterStore::uniform(&topology));
        DiagnosisNetwork { topology, store }
    }

    pub fn with_priors(topology: Arc<Topology>, priors: ParameterSet) -> NetworkResult<Self> {
        let store = Arc::new(ParameterStore::new(&topology, priors)?);
        Ok(DiagnosisNetwork { topology, store })
    }

    pub fn from_store(topology: Arc<Topology>, store: ParameterStore) -> NetworkResult<Self> {
        store.priors().check(&topology)?;
        store.posteriors().check(&topology)?;
        Ok(DiagnosisNetwork {
            topology,
            store: Arc::new(store),
        })
    }

    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    pub fn snapshot(&self) -> Arc<ParameterStore> {
        Arc::clone(&self.store)
    }

    /// Posteriors for `dataset` from the configured priors. Calling this again
    /// with the same dataset yields the same posteriors.
    pub fn learn(&mut self, dataset: &Dataset) -> NetworkResult<()> {
        let next = self.store.learn(&self.topology, dataset)?;
        info!("learned from {} cases", next.cases_observed());
        self.store = Arc::new(next);
        Ok(())
    }

    /// Treats the current posteriors as priors and learns from a new dataset.
    pub fn learn_incremental(&mut self, dataset: &Dataset) -> NetworkResult<()> {
        let next = self.store.promote_posteriors().learn(&self.topology, dataset)?;
        info!(
            "absorbed {} more cases ({} in total)",
            next.cases_observed() - next.prior_cases(),
            next.cases_observed()
        );
        self.store = Arc::new(next);
        Ok(())
    }

    /// Plug-in table of posterior means.
    pub fn point_estimates(&self) -> PointParams {
        self.store.posteriors().point_estimates()
    }

    pub fn query(&self, evidence: &Evidence, target: &str) -> NetworkResult<f64> {
        query_root_marginal(&self.topology, &self.point_estimates(), evidence, target)
    }

    pub fn diagnose(&self, evidence: &Evidence) -> NetworkResult<Vec<RootMarginal>> {
        diagnose(&self.topology, &self.point_estimates(), evidence)
    }

    pub fn query_sampled(
        &self,
        evidence: &Evidence,
        target: &str,
        config: &SamplingConfig,
    ) -> NetworkResult<SampledMarginal> {
        query_root_marginal_sampled(
            &self.topology,
            self.store.posteriors(),
            evidence,
            target,
            config,
        )
    }
}
