//! The action probability and divergence engine.
//!
//! Each call normalizes the status, lays it out in design-space order,
//! queries the policy for one dimension and reduces the resulting
//! distribution to the scalars a policy-gradient update needs: the entropy,
//! the log-probability of the realized action and, optionally, the KL
//! divergence from the target synthesized by the dimension's generative
//! model.
//!
//! # Example
//!
//! ```
//! use dse::engine::ProbabilityEngine;
//! use dse::policy::UniformPolicy;
//! use dse::space::{DesignSpace, Dimension};
//! use dse::status::Status;
//!
//! let space = DesignSpace::builder()
//!     .dimension(Dimension::new("width", 10.0, vec![1.0, 2.0, 3.0, 4.0, 5.0]))
//!     .build()
//!     .unwrap();
//! let policy = UniformPolicy::new(&space);
//! let engine = ProbabilityEngine::new(&policy, &space);
//!
//! let status: Status = [("width", 4.0)].into_iter().collect();
//! let eval = engine.log_prob(&status, 2, 0).unwrap();
//!
//! assert!((eval.entropy - 5f64.ln()).abs() < 1e-12);
//! assert!((eval.log_prob - 0.2f64.ln()).abs() < 1e-12);
//! ```

use crate::error::{Error, Result};
use crate::features::status_to_vector;
use crate::normalize::normalize_status;
use crate::policy::PolicyFunction;
use crate::probability::Distribution;
use crate::space::DesignSpace;
use crate::status::{Action, Status};
use crate::target::target_distribution;

/// Entropy of the policy distribution and log-probability of the selected
/// candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolicyEvaluation {
    /// Entropy of the policy distribution, in nats.
    pub entropy: f64,
    /// Natural log of the probability of the selected candidate.
    pub log_prob: f64,
}

/// [`PolicyEvaluation`] extended with the divergence from the synthesized
/// target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DivergenceEvaluation {
    /// Entropy of the policy distribution, in nats.
    pub entropy: f64,
    /// `sum(target * ln(target / probs))`.
    pub kl_divergence: f64,
    /// Natural log of the probability of the selected candidate.
    pub log_prob: f64,
}

/// Per-dimension evaluations of a complete action.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionEvaluation {
    /// One evaluation per dimension, in design-space order.
    pub dimensions: Vec<PolicyEvaluation>,
}

impl ActionEvaluation {
    /// Joint log-probability of the action, the sum over dimensions.
    #[must_use]
    pub fn log_prob(&self) -> f64 {
        self.dimensions.iter().map(|e| e.log_prob).sum()
    }

    /// Sum of the per-dimension entropies.
    #[must_use]
    pub fn entropy(&self) -> f64 {
        self.dimensions.iter().map(|e| e.entropy).sum()
    }
}

/// Evaluates a policy against a design space.
///
/// Holds only shared references; every method is pure apart from calling the
/// policy, so one engine can serve concurrent callers.
#[derive(Debug)]
pub struct ProbabilityEngine<'a, P: ?Sized> {
    policy: &'a P,
    space: &'a DesignSpace,
}

impl<P: ?Sized> Clone for ProbabilityEngine<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: ?Sized> Copy for ProbabilityEngine<'_, P> {}

impl<'a, P: PolicyFunction + ?Sized> ProbabilityEngine<'a, P> {
    /// Creates an engine for `policy` over `space`.
    #[must_use]
    pub fn new(policy: &'a P, space: &'a DesignSpace) -> Self {
        Self { policy, space }
    }

    /// Returns the design space.
    #[must_use]
    pub fn space(&self) -> &'a DesignSpace {
        self.space
    }

    /// Normalizes `status` and lays it out as the policy input.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingStatus` or `Error::NonFiniteStatus`.
    pub fn features(&self, status: &Status) -> Result<Vec<f64>> {
        let normalized = normalize_status(status, self.space)?;
        status_to_vector(&normalized, self.space)
    }

    /// Queries the policy for `dimension` given precomputed features.
    ///
    /// # Errors
    ///
    /// Returns `Error::DimensionOutOfRange`, any error from the policy,
    /// `Error::DistributionLengthMismatch` if the policy output does not have
    /// one entry per candidate, or `Error::InvalidProbability`.
    pub fn distribution_for(&self, features: &[f64], dimension: usize) -> Result<Distribution> {
        let cardinality = self.space.cardinality(dimension)?;
        let probs = self.policy.distribution(features, dimension)?;
        if probs.len() != cardinality {
            return Err(Error::DistributionLengthMismatch {
                dimension,
                expected: cardinality,
                got: probs.len(),
            });
        }
        Distribution::new(probs)
    }

    /// Normalizes `status` and queries the policy for `dimension`.
    ///
    /// # Errors
    ///
    /// See [`features`](Self::features) and
    /// [`distribution_for`](Self::distribution_for).
    pub fn policy_distribution(&self, status: &Status, dimension: usize) -> Result<Distribution> {
        let features = self.features(status)?;
        self.distribution_for(&features, dimension)
    }

    /// Entropy of the policy distribution for `dimension` and the
    /// log-probability of `action_index`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ZeroProbability` if the policy assigns no mass to
    /// `action_index`, `Error::IndexOutOfRange` if the index is outside the
    /// sample box, or any error from
    /// [`policy_distribution`](Self::policy_distribution).
    pub fn log_prob(
        &self,
        status: &Status,
        action_index: usize,
        dimension: usize,
    ) -> Result<PolicyEvaluation> {
        let probs = self.policy_distribution(status, dimension)?;
        evaluate(&probs, action_index)
    }

    /// Like [`log_prob`](Self::log_prob), and also the KL divergence from the
    /// target distribution the dimension's generative model synthesizes
    /// around `action_index`.
    ///
    /// # Errors
    ///
    /// Additionally returns `Error::InfiniteDivergence` if the target has
    /// mass where the policy has none.
    pub fn kl_div_and_log_prob(
        &self,
        status: &Status,
        action_index: usize,
        dimension: usize,
    ) -> Result<DivergenceEvaluation> {
        let probs = self.policy_distribution(status, dimension)?;
        let model = self.space.model(dimension)?;
        let target = target_distribution(model, probs.len(), action_index)?;
        let kl_divergence = probs.kl_divergence_from(&target)?;

        trace_debug!(
            dimension,
            action_index,
            model = model.kind(),
            target_probs = ?target.probs(),
            kl_divergence,
            "target distribution synthesized"
        );

        let PolicyEvaluation { entropy, log_prob } = evaluate(&probs, action_index)?;
        Ok(DivergenceEvaluation {
            entropy,
            kl_divergence,
            log_prob,
        })
    }

    /// Evaluates every dimension of `action` against one status.
    ///
    /// The status is normalized once and shared by all dimensions.
    ///
    /// # Errors
    ///
    /// Returns `Error::ActionLengthMismatch` or `Error::IndexOutOfRange` for
    /// a malformed action, then the first error of any per-dimension
    /// evaluation.
    pub fn evaluate_action(&self, status: &Status, action: &Action) -> Result<ActionEvaluation> {
        action.validate(self.space)?;
        let features = self.features(status)?;

        let dimensions = action
            .indices()
            .iter()
            .enumerate()
            .map(|(dimension, &index)| {
                let probs = self.distribution_for(&features, dimension)?;
                evaluate(&probs, index)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ActionEvaluation { dimensions })
    }
}

fn evaluate(probs: &Distribution, action_index: usize) -> Result<PolicyEvaluation> {
    Ok(PolicyEvaluation {
        entropy: probs.entropy(),
        log_prob: probs.log_prob(action_index)?,
    })
}

/// Entropy and selected log-probability for one dimension.
///
/// Shorthand for [`ProbabilityEngine::log_prob`].
///
/// # Errors
///
/// See [`ProbabilityEngine::log_prob`].
pub fn get_log_prob<P: PolicyFunction + ?Sized>(
    policy: &P,
    space: &DesignSpace,
    status: &Status,
    action_index: usize,
    dimension: usize,
) -> Result<PolicyEvaluation> {
    ProbabilityEngine::new(policy, space).log_prob(status, action_index, dimension)
}

/// Entropy, KL divergence from the synthesized target, and selected
/// log-probability for one dimension.
///
/// Shorthand for [`ProbabilityEngine::kl_div_and_log_prob`].
///
/// # Errors
///
/// See [`ProbabilityEngine::kl_div_and_log_prob`].
pub fn get_kl_div_and_log_prob<P: PolicyFunction + ?Sized>(
    policy: &P,
    space: &DesignSpace,
    status: &Status,
    action_index: usize,
    dimension: usize,
) -> Result<DivergenceEvaluation> {
    ProbabilityEngine::new(policy, space).kl_div_and_log_prob(status, action_index, dimension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::TabularPolicy;
    use crate::space::{Dimension, GenerativeModel};

    fn space() -> DesignSpace {
        DesignSpace::builder()
            .dimension(
                Dimension::new("depth", 8.0, vec![1.0, 2.0, 4.0, 8.0])
                    .model(GenerativeModel::bell(1.0)),
            )
            .dimension(Dimension::new("kind", 2.0, vec![0.0, 1.0, 2.0]))
            .build()
            .unwrap()
    }

    fn status() -> Status {
        [("kind", 1.0), ("depth", 4.0)].into_iter().collect()
    }

    #[test]
    fn features_are_normalized_in_space_order() {
        let policy = TabularPolicy::new(vec![]);
        let space = space();
        let engine = ProbabilityEngine::new(&policy, &space);
        assert_eq!(engine.features(&status()).unwrap(), vec![0.5, 0.5]);
    }

    #[test]
    fn policy_sees_normalized_features() {
        let space = space();
        let policy = |features: &[f64], _: usize| {
            assert_eq!(features, &[0.5, 0.5]);
            vec![0.25; 4]
        };
        let eval = get_log_prob(&policy, &space, &status(), 0, 0).unwrap();
        assert!((eval.log_prob - 0.25f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn wrong_length_policy_output_is_rejected() {
        let space = space();
        let policy = TabularPolicy::new(vec![vec![0.5, 0.5]]);
        assert!(matches!(
            get_log_prob(&policy, &space, &status(), 0, 0),
            Err(Error::DistributionLengthMismatch {
                dimension: 0,
                expected: 4,
                got: 2
            })
        ));
    }

    #[test]
    fn dimension_out_of_range() {
        let space = space();
        let policy = TabularPolicy::new(vec![]);
        assert!(matches!(
            get_log_prob(&policy, &space, &status(), 0, 5),
            Err(Error::DimensionOutOfRange { index: 5, len: 2 })
        ));
    }

    #[test]
    fn bell_target_divergence_matches_manual_computation() {
        let space = space();
        let probs = vec![0.1, 0.2, 0.3, 0.4];
        let policy = TabularPolicy::new(vec![probs.clone()]);

        let eval = get_kl_div_and_log_prob(&policy, &space, &status(), 1, 0).unwrap();

        let target = crate::target::bell_target(4, 1, 1.0).unwrap();
        let expected: f64 = target
            .probs()
            .iter()
            .zip(&probs)
            .map(|(t, p)| t * (t / p).ln())
            .sum();
        assert!((eval.kl_divergence - expected).abs() < 1e-12);
        assert!((eval.log_prob - 0.2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn zero_selected_probability_is_reported() {
        let space = space();
        let policy = TabularPolicy::new(vec![vec![0.0, 0.5, 0.5, 0.0]]);
        assert!(matches!(
            get_log_prob(&policy, &space, &status(), 3, 0),
            Err(Error::ZeroProbability { index: 3 })
        ));
    }

    #[test]
    fn evaluate_action_sums_log_probs() {
        let space = space();
        let policy = TabularPolicy::new(vec![vec![0.1, 0.2, 0.3, 0.4], vec![0.5, 0.25, 0.25]]);
        let engine = ProbabilityEngine::new(&policy, &space);

        let eval = engine
            .evaluate_action(&status(), &Action::new(vec![3, 0]))
            .unwrap();
        assert_eq!(eval.dimensions.len(), 2);
        assert!((eval.log_prob() - (0.4f64 * 0.5).ln()).abs() < 1e-12);

        assert!(matches!(
            engine.evaluate_action(&status(), &Action::new(vec![3])),
            Err(Error::ActionLengthMismatch { .. })
        ));
    }
}
