//! Probability vectors over a dimension's sample box and their scalar
//! reductions: entropy, selected log-probability and KL divergence.
//!
//! All reductions follow the convention `0 * ln(0) = 0`. Singular results
//! (the log of a zero probability, an infinite divergence term) are reported
//! as errors instead of being returned as `-inf`/`inf`.
//!
//! # Example
//!
//! ```
//! use dse::probability::Distribution;
//!
//! let uniform = Distribution::new(vec![0.25; 4]).unwrap();
//! assert!((uniform.entropy() - 4f64.ln()).abs() < 1e-12);
//! assert!((uniform.log_prob(1).unwrap() - 0.25f64.ln()).abs() < 1e-12);
//! assert!(uniform.kl_divergence_from(&uniform).unwrap().abs() < 1e-12);
//! ```

use crate::error::{Error, Result};
use crate::features::one_hot;

/// A non-negative probability vector over the candidates of one dimension.
///
/// Entries are validated to be finite and non-negative. They are expected
/// to sum to one but are never renormalized here: a policy emitting an
/// unnormalized vector is a bug in the policy.
#[derive(Clone, Debug, PartialEq)]
pub struct Distribution {
    probs: Vec<f64>,
}

impl Distribution {
    /// Wraps a probability vector.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyDistribution` for an empty vector, or
    /// `Error::InvalidProbability` for the first negative or non-finite entry.
    pub fn new(probs: Vec<f64>) -> Result<Self> {
        if probs.is_empty() {
            return Err(Error::EmptyDistribution);
        }
        if let Some((index, &value)) = probs
            .iter()
            .enumerate()
            .find(|&(_, &p)| !(p.is_finite() && p >= 0.0))
        {
            return Err(Error::InvalidProbability { index, value });
        }
        Ok(Self { probs })
    }

    /// A uniform distribution over `cardinality` candidates.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyDistribution` if `cardinality` is zero.
    #[allow(clippy::cast_precision_loss)]
    pub fn uniform(cardinality: usize) -> Result<Self> {
        Self::new(vec![1.0 / cardinality as f64; cardinality])
    }

    /// Returns the probabilities.
    #[must_use]
    pub fn probs(&self) -> &[f64] {
        &self.probs
    }

    /// Consumes the distribution, returning the probabilities.
    #[must_use]
    pub fn into_probs(self) -> Vec<f64> {
        self.probs
    }

    /// Returns the number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.probs.len()
    }

    /// Always `false`: construction rejects empty vectors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    /// Shannon entropy in nats, `-sum(p * ln p)`, skipping zero entries.
    #[must_use]
    pub fn entropy(&self) -> f64 {
        -self
            .probs
            .iter()
            .filter(|&&p| p > 0.0)
            .map(|&p| p * p.ln())
            .sum::<f64>()
    }

    /// Probability of candidate `index`, isolated through the inner product
    /// with a one-hot mask.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfRange` if `index >= self.len()`.
    pub fn prob(&self, index: usize) -> Result<f64> {
        let mask = one_hot(self.probs.len(), index)?;
        Ok(self.probs.iter().zip(&mask).map(|(p, m)| p * m).sum())
    }

    /// Natural log of the probability of candidate `index`.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfRange` if `index >= self.len()`, or
    /// `Error::ZeroProbability` if the candidate has zero probability.
    pub fn log_prob(&self, index: usize) -> Result<f64> {
        let p = self.prob(index)?;
        if p <= 0.0 {
            return Err(Error::ZeroProbability { index });
        }
        Ok(p.ln())
    }

    /// KL divergence of this distribution from `target`,
    /// `sum(target * ln(target / self))`.
    ///
    /// Terms where the target is zero contribute nothing. Each term is taken
    /// as a difference of logs so a subnormal probability stays finite.
    ///
    /// # Errors
    ///
    /// Returns `Error::ShapeMismatch` if the lengths differ, or
    /// `Error::InfiniteDivergence` at the first index where the target has
    /// mass and this distribution has none, or where the sum stops being
    /// finite.
    pub fn kl_divergence_from(&self, target: &Distribution) -> Result<f64> {
        if target.len() != self.len() {
            return Err(Error::ShapeMismatch {
                expected: self.len(),
                got: target.len(),
            });
        }

        let mut kl = 0.0;
        for (index, (&t, &p)) in target.probs.iter().zip(&self.probs).enumerate() {
            if t == 0.0 {
                continue;
            }
            if p == 0.0 {
                return Err(Error::InfiniteDivergence { index });
            }
            kl += t * (t.ln() - p.ln());
            if !kl.is_finite() {
                return Err(Error::InfiniteDivergence { index });
            }
        }
        Ok(kl)
    }

    /// Index of the most probable candidate; the first one on ties.
    #[must_use]
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, &p) in self.probs.iter().enumerate().skip(1) {
            if p > self.probs[best] {
                best = i;
            }
        }
        best
    }

    /// Draws a candidate index by inverse-CDF sampling.
    ///
    /// The draw is scaled by the total mass, so a vector that is slightly off
    /// from summing to one still samples proportionally. Zero-probability
    /// candidates are never returned unless every entry is zero, in which
    /// case the last index is returned.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> usize {
        let total: f64 = self.probs.iter().sum();
        let threshold = rng.f64() * total;

        let mut cumulative = 0.0;
        for (i, &p) in self.probs.iter().enumerate() {
            cumulative += p;
            if p > 0.0 && threshold < cumulative {
                return i;
            }
        }
        // Rounding can leave the threshold just above the final cumulative sum.
        self.probs
            .iter()
            .rposition(|&p| p > 0.0)
            .unwrap_or(self.probs.len() - 1)
    }
}

impl TryFrom<Vec<f64>> for Distribution {
    type Error = Error;

    fn try_from(probs: Vec<f64>) -> Result<Self> {
        Self::new(probs)
    }
}

/// Summed log density of `x` under a diagonal Gaussian with means `mu` and
/// standard deviations `std`.
///
/// Used by continuous-action policies; each term is
/// `-(x - mu)^2 / (2 std^2) - ln(2 pi) / 2 - ln(std)`.
///
/// # Errors
///
/// Returns `Error::ShapeMismatch` if the three slices differ in length, or
/// `Error::InvalidSigma` for a non-positive or non-finite standard deviation.
pub fn gaussian_log_density(x: &[f64], mu: &[f64], std: &[f64]) -> Result<f64> {
    for other in [mu.len(), std.len()] {
        if other != x.len() {
            return Err(Error::ShapeMismatch {
                expected: x.len(),
                got: other,
            });
        }
    }

    let half_log_two_pi = 0.5 * (2.0 * core::f64::consts::PI).ln();
    let mut total = 0.0;
    for ((&x, &mu), &std) in x.iter().zip(mu).zip(std) {
        if !(std.is_finite() && std > 0.0) {
            return Err(Error::InvalidSigma(std));
        }
        total += -(x - mu).powi(2) / (2.0 * std * std) - half_log_two_pi - std.ln();
    }
    Ok(total)
}
