use rand::Rng;
use rand_distr::{Beta as BetaDistribution, Distribution};
use serde::{Deserialize, Serialize};

use super::error::{NetworkError, NetworkResult};

/// Beta(α, β) belief over a single Bernoulli probability.
///
/// α and β are pseudo-counts of "true" and "false" outcomes. Both are kept
/// strictly positive and finite, so `mean` never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beta {
    alpha: f64,
    beta: f64,
}

impl Beta {
    pub fn new(alpha: f64, beta: f64) -> NetworkResult<Self> {
        if !alpha.is_finite() || !beta.is_finite() || alpha <= 0.0 || beta <= 0.0 {
            return Err(NetworkError::InvalidParameter(format!(
                "Beta parameters must be finite and positive, got alpha={}, beta={}",
                alpha, beta
            )));
        }
        Ok(Beta { alpha, beta })
    }

    /// Uninformative Beta(1, 1).
    pub fn uniform() -> Self {
        Beta {
            alpha: 1.0,
            beta: 1.0,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// E[p] = α / (α + β).
    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    /// Var[p] = αβ / ((α+β)²(α+β+1)).
    pub fn variance(&self) -> f64 {
        let sum = self.alpha + self.beta;
        (self.alpha * self.beta) / (sum * sum * (sum + 1.0))
    }

    /// Total pseudo-count α + β.
    pub fn pseudo_count(&self) -> f64 {
        self.alpha + self.beta
    }

    /// Conjugate posterior after observing `successes` trues and `failures` falses.
    pub fn update_with_counts(&self, successes: u64, failures: u64) -> Beta {
        Beta {
            alpha: self.alpha + successes as f64,
            beta: self.beta + failures as f64,
        }
    }

    /// Draws one probability from this distribution.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> NetworkResult<f64> {
        let distribution = BetaDistribution::new(self.alpha, self.beta).map_err(|e| {
            NetworkError::InvalidParameter(format!("cannot sample {:?}: {}", self, e))
        })?;
        Ok(distribution.sample(rng))
    }
}

impl Default for Beta {
    fn default() -> Self {
        Beta::uniform()
    }
}
