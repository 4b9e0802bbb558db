use std::error::Error;

use crate::network::model::{
    dataset::Dataset,
    params::ParameterStore,
    topology::Topology,
};
use crate::storage::database::SnapshotInfo;

/// ScenarioMaker supplies the cases a network learns from.
pub trait ScenarioMaker {
    fn make_dataset(
        &self,
        topology: &Topology,
    ) -> Result<Dataset, Box<dyn Error + Send + Sync>>;
}

/// ParameterRepository persists parameter store snapshots across runs.
pub trait ParameterRepository {
    /// Stores a snapshot under `label` and returns its id.
    fn save_snapshot(
        &self,
        label: &str,
        topology: &Topology,
        store: &ParameterStore,
    ) -> anyhow::Result<String>;

    fn load_snapshot(&self, id: &str, topology: &Topology) -> anyhow::Result<ParameterStore>;

    /// Most recently saved snapshot for `label`, if any.
    fn latest_snapshot(&self, label: &str) -> anyhow::Result<Option<SnapshotInfo>>;

    fn list_snapshots(&self) -> anyhow::Result<Vec<SnapshotInfo>>;
}
