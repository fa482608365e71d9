//! Target distributions synthesized from a dimension's generative model.
//!
//! Ordinal dimensions use a bell-shaped target: a Gaussian density sampled at
//! every candidate position and renormalized so the discretized values sum to
//! one. Categorical dimensions use a one-hot target at the reference index.

use crate::error::{Error, Result};
use crate::features::one_hot;
use crate::probability::Distribution;
use crate::space::GenerativeModel;

/// Gaussian probability density at `x`.
#[must_use]
pub fn normal_density(x: f64, mean: f64, sigma: f64) -> f64 {
    let normalization = 1.0 / (sigma * (2.0 * core::f64::consts::PI).sqrt());
    let z = (x - mean) / sigma;
    normalization * (-0.5 * z * z).exp()
}

/// Discretized, renormalized Gaussian over `0..cardinality` centered at
/// `center`.
///
/// Renormalization cancels the `1 / (sigma sqrt(2 pi))` factor of
/// [`normal_density`], so only the kernel `exp(-z^2 / 2)` is summed. The
/// center term is always one, which keeps the total in `[1, cardinality]`
/// for every valid `sigma`: huge spreads approach uniform, tiny ones approach
/// one-hot.
///
/// # Errors
///
/// Returns `Error::IndexOutOfRange` if `center >= cardinality`, or
/// `Error::InvalidSigma` if `sigma` is not positive and finite.
#[allow(clippy::cast_precision_loss)]
pub fn bell_target(cardinality: usize, center: usize, sigma: f64) -> Result<Distribution> {
    GenerativeModel::bell(sigma).validate()?;
    check_center(cardinality, center)?;

    let mean = center as f64;
    // z is computed before squaring so neither sigma^2 under- nor overflows.
    let kernel: Vec<f64> = (0..cardinality)
        .map(|k| {
            let z = (k as f64 - mean) / sigma;
            (-0.5 * z * z).exp()
        })
        .collect();

    let total: f64 = kernel.iter().sum();
    Distribution::new(kernel.into_iter().map(|w| w / total).collect())
}

/// Synthesizes the target distribution of `model` for reference index
/// `index`.
///
/// # Errors
///
/// Returns `Error::IndexOutOfRange` if `index >= cardinality`, or
/// `Error::InvalidSigma` for a bell model with an invalid spread.
pub fn target_distribution(
    model: GenerativeModel,
    cardinality: usize,
    index: usize,
) -> Result<Distribution> {
    match model {
        GenerativeModel::Bell { sigma } => bell_target(cardinality, index, sigma),
        GenerativeModel::OneHot => Distribution::new(one_hot(cardinality, index)?),
    }
}

fn check_center(cardinality: usize, center: usize) -> Result<()> {
    if center >= cardinality {
        return Err(Error::IndexOutOfRange {
            index: center,
            len: cardinality,
        });
    }
    Ok(())
}
