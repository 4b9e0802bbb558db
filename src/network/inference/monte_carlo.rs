use log::{info, warn};
use rand::{SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::query::query_root_marginal;
use crate::network::model::{
    error::{NetworkError, NetworkResult},
    evidence::Evidence,
    params::ParameterSet,
    topology::Topology,
};

/// Settings for the approximate, parameter-uncertainty-aware query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub samples: usize,
    pub seed: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            samples: 1000,
            seed: 2017,
        }
    }
}

/// Average of exact marginals over CPT tables drawn from the posteriors.
///
/// `samples` counts the draws that entered the average. Draws under which the
/// evidence has zero probability are left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampledMarginal {
    pub mean: f64,
    pub std_dev: f64,
    pub samples: usize,
}

fn summarize(target: &str, draws: &[f64]) -> NetworkResult<SampledMarginal> {
    if draws.is_empty() {
        return Err(NetworkError::DegenerateQuery {
            target: target.to_string(),
        });
    }
    let n = draws.len() as f64;
    let mean = draws.iter().sum::<f64>() / n;
    let variance = draws.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
    Ok(SampledMarginal {
        mean,
        std_dev: variance.sqrt(),
        samples: draws.len(),
    })
}

/// Monte Carlo estimate of P(`target` | `evidence`) that integrates over the
/// Beta uncertainty in `posteriors` instead of plugging in their means.
///
/// This is an approximation. Sample `i` is drawn from a generator seeded with
/// `seed + i`, so the result does not depend on thread scheduling. Only when
/// every draw is degenerate does the query fail with `DegenerateQuery`.
pub fn query_root_marginal_sampled(
    topology: &Topology,
    posteriors: &ParameterSet,
    evidence: &Evidence,
    target: &str,
    config: &SamplingConfig,
) -> NetworkResult<SampledMarginal> {
    if config.samples == 0 {
        return Err(NetworkError::InvalidParameter(
            "sampled query needs at least one sample".to_string(),
        ));
    }
    posteriors.check(topology)?;
    // surface evidence problems once instead of from every worker
    evidence.resolve(topology)?;

    let draws: Vec<Option<f64>> = (0..config.samples)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(i as u64));
            let table = posteriors.sample_point(&mut rng)?;
            match query_root_marginal(topology, &table, evidence, target) {
                Ok(probability) => Ok(Some(probability)),
                Err(NetworkError::DegenerateQuery { .. }) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .collect::<NetworkResult<Vec<Option<f64>>>>()?;

    let usable: Vec<f64> = draws.into_iter().flatten().collect();
    let skipped = config.samples - usable.len();
    if skipped > 0 {
        warn!("skipped {} degenerate draws for P({})", skipped, target);
    }

    let marginal = summarize(target, &usable)?;
    info!(
        "sampled P({}) over {} tables: mean {:.4}, std dev {:.4}",
        target, marginal.samples, marginal.mean, marginal.std_dev
    );
    Ok(marginal)
}
