use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use log::info;
use std::sync::Arc;

use bayesdiag::network::common::{
    ParameterRepository, ResourceContext, setup::parse_configuration_options,
};
use bayesdiag::network::inference::monte_carlo::SamplingConfig;
use bayesdiag::network::model::{ParameterFile, dataset::Dataset};
use bayesdiag::network::scenarios::factory::ScenarioMakerFactory;
use bayesdiag::{DiagnosisNetwork, Evidence, Topology};

fn describe(evidence: &Evidence) -> String {
    if evidence.is_empty() {
        return "no symptoms observed".to_string();
    }
    evidence
        .iter()
        .map(|(symptom, value)| format!("{}={}", symptom, value))
        .collect::<Vec<_>>()
        .join(", ")
}

fn main() -> Result<()> {
    let config = parse_configuration_options()?;
    let resources = ResourceContext::new(&config)?;
    let topology = Arc::new(Topology::printer());

    let dataset = match &config.dataset_file {
        Some(path) => Dataset::load_from_file(path)
            .map_err(|e| anyhow!(e))
            .with_context(|| format!("Failed to read dataset {}", path))?,
        None => {
            let scenario = ScenarioMakerFactory::new_shared(&config.scenario_name, config.seed)
                .map_err(|e| anyhow!(e))?;
            scenario
                .make_dataset(&topology)
                .map_err(|e| anyhow!(e))
                .with_context(|| format!("Failed to build scenario {}", config.scenario_name))?
        }
    };

    println!("{}", "Step 1: learning parameters from data (uniform priors)".blue().bold());
    let mut network = DiagnosisNetwork::new(Arc::clone(&topology));
    network.learn(&dataset)?;
    let snapshot = network.snapshot();
    for (id, node) in topology.nodes().iter().enumerate() {
        let means: Vec<String> = snapshot
            .posteriors()
            .rows(id)
            .iter()
            .map(|beta| format!("{:.3}", beta.mean()))
            .collect();
        println!("  {:<10} [{}]", node.name, means.join(", "));
    }

    let snapshot_id = resources
        .database
        .save_snapshot(&config.snapshot_label, &topology, &snapshot)
        .context("Failed to save parameter snapshot")?;
    info!("stored parameters as snapshot {}", snapshot_id);

    if let Some(path) = &config.export_file {
        ParameterFile::from_store(&topology, &snapshot)
            .save_to_file(path)
            .map_err(|e| anyhow!(e))
            .with_context(|| format!("Failed to export parameters to {}", path))?;
        println!("Exported parameters to {}", path.green());
    }

    println!(
        "{}",
        format!("Step 2: P({} | {})", config.target, describe(&config.evidence))
            .blue()
            .bold()
    );
    let probability = network.query(&config.evidence, &config.target)?;
    println!(
        "P({} = True | evidence) = {}",
        config.target,
        format!("{:.2}", probability).green().bold()
    );

    if config.samples > 0 {
        let sampling = SamplingConfig {
            samples: config.samples,
            seed: config.seed,
        };
        let sampled = network.query_sampled(&config.evidence, &config.target, &sampling)?;
        println!(
            "Sampled over {} parameter draws: {} (std dev {:.3})",
            sampled.samples,
            format!("{:.2}", sampled.mean).yellow(),
            sampled.std_dev
        );
    }

    println!("{}", "Ranking of root causes".blue().bold());
    for marginal in network.diagnose(&config.evidence)? {
        println!("  {:<8} {:.3}", marginal.root, marginal.probability);
    }

    Ok(())
}
