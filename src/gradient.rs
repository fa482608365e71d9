//! Analytic gradients of the engine's scalar outputs with respect to the
//! logits of a softmax policy.
//!
//! With `p = softmax(z)`:
//!
//! | Quantity | Gradient w.r.t. `z_k` |
//! |----------|-----------------------|
//! | `ln p[a]` | `[k == a] - p_k` |
//! | `H(p)` | `-p_k (ln p_k + H)` |
//! | `KL(t ‖ p)` | `p_k sum(t) - t_k` |
//!
//! These pair with [`SoftmaxPolicy::apply_logit_gradient`](crate::policy::SoftmaxPolicy::apply_logit_gradient).

use crate::error::{Error, Result};
use crate::features::one_hot;
use crate::probability::Distribution;

/// Gradient of `ln p[index]`.
///
/// # Errors
///
/// Returns `Error::IndexOutOfRange` if `index >= probs.len()`.
pub fn log_prob_logit_grad(probs: &Distribution, index: usize) -> Result<Vec<f64>> {
    let mask = one_hot(probs.len(), index)?;
    Ok(mask.iter().zip(probs.probs()).map(|(m, p)| m - p).collect())
}

/// Gradient of the entropy. Zero-probability candidates contribute zero.
#[must_use]
pub fn entropy_logit_grad(probs: &Distribution) -> Vec<f64> {
    let h = probs.entropy();
    probs
        .probs()
        .iter()
        .map(|&p| if p > 0.0 { -p * (p.ln() + h) } else { 0.0 })
        .collect()
}

/// Gradient of `KL(target ‖ probs)`, the divergence computed by
/// [`Distribution::kl_divergence_from`].
///
/// # Errors
///
/// Returns `Error::ShapeMismatch` if the lengths differ.
pub fn kl_logit_grad(probs: &Distribution, target: &Distribution) -> Result<Vec<f64>> {
    if target.len() != probs.len() {
        return Err(Error::ShapeMismatch {
            expected: probs.len(),
            got: target.len(),
        });
    }
    let mass: f64 = target.probs().iter().sum();
    Ok(probs
        .probs()
        .iter()
        .zip(target.probs())
        .map(|(p, t)| p * mass - t)
        .collect())
}
