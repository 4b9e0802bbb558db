use anyhow::{Result, anyhow};
use colored::Colorize;

use bayesdiag::network::common::{
    ParameterRepository, ResourceContext, setup::parse_configuration_options,
};
use bayesdiag::{DiagnosisNetwork, Topology};
use std::sync::Arc;

/// Answers a query from the most recent stored snapshot, without relearning.
fn main() -> Result<()> {
    let config = parse_configuration_options()?;
    let resources = ResourceContext::new(&config)?;
    let topology = Arc::new(Topology::printer());

    let info = resources
        .database
        .latest_snapshot(&config.snapshot_label)?
        .ok_or_else(|| anyhow!("No stored snapshot labelled '{}'", config.snapshot_label))?;
    println!(
        "Using snapshot {} from {} ({} cases)",
        info.id.cyan(),
        info.created_at,
        info.cases_observed
    );

    let store = resources.database.load_snapshot(&info.id, &topology)?;
    let network = DiagnosisNetwork::from_store(topology, store)?;
    let probability = network.query(&config.evidence, &config.target)?;
    println!(
        "P({} = True | evidence) = {}",
        config.target,
        format!("{:.4}", probability).green().bold()
    );
    Ok(())
}
