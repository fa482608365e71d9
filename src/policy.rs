//! The policy-function capability and built-in policies.
//!
//! A policy maps a feature vector (the normalized status in design-space
//! order) and a dimension index to a probability vector over that
//! dimension's sample box. The engine only depends on [`PolicyFunction`];
//! closures implement it directly.
//!
//! # Example
//!
//! ```
//! use dse::policy::{PolicyFunction, SoftmaxPolicy};
//! use dse::space::{DesignSpace, Dimension};
//!
//! let space = DesignSpace::builder()
//!     .dimension(Dimension::new("a", 4.0, vec![1.0, 2.0, 3.0]))
//!     .build()
//!     .unwrap();
//!
//! // Zero-initialized heads produce a uniform distribution.
//! let policy = SoftmaxPolicy::builder(&space).init_scale(0.0).build();
//! let probs = policy.distribution(&[0.5], 0).unwrap();
//! assert!(probs.iter().all(|p| (p - 1.0 / 3.0).abs() < 1e-12));
//! ```

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::space::DesignSpace;

/// A function producing a distribution over one dimension's candidates.
///
/// Implementations must be reentrant: the engine may be called concurrently
/// from several threads with the same policy.
pub trait PolicyFunction: Send + Sync {
    /// Returns the probabilities of every candidate of `dimension`.
    ///
    /// The result must have one entry per candidate, be non-negative and
    /// sum to one. The engine checks the length and sign but does not
    /// renormalize.
    ///
    /// # Errors
    ///
    /// Returns an error if `dimension` or `features` do not fit the policy.
    fn distribution(&self, features: &[f64], dimension: usize) -> Result<Vec<f64>>;
}

impl<F> PolicyFunction for F
where
    F: Fn(&[f64], usize) -> Vec<f64> + Send + Sync,
{
    fn distribution(&self, features: &[f64], dimension: usize) -> Result<Vec<f64>> {
        Ok(self(features, dimension))
    }
}

/// Numerically stable softmax.
#[must_use]
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&z| (z - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// Assigns equal probability to every candidate, ignoring the features.
#[derive(Clone, Debug)]
pub struct UniformPolicy {
    cardinalities: Vec<usize>,
}

impl UniformPolicy {
    /// Creates a uniform policy over the dimensions of `space`.
    #[must_use]
    pub fn new(space: &DesignSpace) -> Self {
        Self {
            cardinalities: space.dimensions().iter().map(|d| d.cardinality()).collect(),
        }
    }
}

impl PolicyFunction for UniformPolicy {
    #[allow(clippy::cast_precision_loss)]
    fn distribution(&self, _features: &[f64], dimension: usize) -> Result<Vec<f64>> {
        let n = *self
            .cardinalities
            .get(dimension)
            .ok_or(Error::DimensionOutOfRange {
                index: dimension,
                len: self.cardinalities.len(),
            })?;
        Ok(vec![1.0 / n as f64; n])
    }
}

/// A fixed table of probabilities per dimension, ignoring the features.
#[derive(Clone, Debug)]
pub struct TabularPolicy {
    tables: Vec<Vec<f64>>,
}

impl TabularPolicy {
    /// Creates a policy returning `tables[d]` for dimension `d`.
    #[must_use]
    pub fn new(tables: Vec<Vec<f64>>) -> Self {
        Self { tables }
    }
}

impl PolicyFunction for TabularPolicy {
    fn distribution(&self, _features: &[f64], dimension: usize) -> Result<Vec<f64>> {
        self.tables
            .get(dimension)
            .cloned()
            .ok_or(Error::DimensionOutOfRange {
                index: dimension,
                len: self.tables.len(),
            })
    }
}

/// Linear logits for one dimension: `weights` is row-major
/// `cardinality x n_features`.
#[derive(Clone, Debug)]
struct LinearHead {
    weights: Vec<f64>,
    bias: Vec<f64>,
}

impl LinearHead {
    fn logits(&self, features: &[f64]) -> Vec<f64> {
        let n = features.len();
        self.bias
            .iter()
            .enumerate()
            .map(|(k, b)| {
                let row = &self.weights[k * n..(k + 1) * n];
                b + row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>()
            })
            .collect()
    }
}

/// One linear softmax head per dimension.
///
/// Parameters sit behind a [`RwLock`] so evaluation takes shared access and
/// stays reentrant while a trainer applies updates through
/// [`apply_logit_gradient`](SoftmaxPolicy::apply_logit_gradient).
#[derive(Debug)]
pub struct SoftmaxPolicy {
    n_features: usize,
    heads: RwLock<Vec<LinearHead>>,
}

impl SoftmaxPolicy {
    /// Returns a builder sized for `space`: one head per dimension and one
    /// input feature per dimension.
    #[must_use]
    pub fn builder(space: &DesignSpace) -> SoftmaxPolicyBuilder {
        SoftmaxPolicyBuilder {
            cardinalities: space.dimensions().iter().map(|d| d.cardinality()).collect(),
            n_features: space.len(),
            init_scale: 0.01,
            seed: None,
        }
    }

    /// Returns the expected feature vector length.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Returns the raw logits of `dimension`.
    ///
    /// # Errors
    ///
    /// Returns `Error::FeatureLengthMismatch` or `Error::DimensionOutOfRange`.
    pub fn logits(&self, features: &[f64], dimension: usize) -> Result<Vec<f64>> {
        self.check_features(features)?;
        let heads = self.heads.read();
        let head = heads.get(dimension).ok_or(Error::DimensionOutOfRange {
            index: dimension,
            len: heads.len(),
        })?;
        Ok(head.logits(features))
    }

    /// Moves the logits of `dimension` along `grad` for the given input.
    ///
    /// `grad` is the gradient of the objective with respect to the logits
    /// (see [`crate::gradient`]); the step is an ascent step of size
    /// `learning_rate`, negate it to descend.
    ///
    /// # Errors
    ///
    /// Returns `Error::FeatureLengthMismatch`, `Error::DimensionOutOfRange`,
    /// or `Error::ShapeMismatch` if `grad` does not have one entry per
    /// candidate.
    pub fn apply_logit_gradient(
        &self,
        dimension: usize,
        features: &[f64],
        grad: &[f64],
        learning_rate: f64,
    ) -> Result<()> {
        self.check_features(features)?;
        let mut heads = self.heads.write();
        let len = heads.len();
        let head = heads.get_mut(dimension).ok_or(Error::DimensionOutOfRange {
            index: dimension,
            len,
        })?;
        if grad.len() != head.bias.len() {
            return Err(Error::ShapeMismatch {
                expected: head.bias.len(),
                got: grad.len(),
            });
        }

        for (k, &g) in grad.iter().enumerate() {
            head.bias[k] += learning_rate * g;
            let row = &mut head.weights[k * self.n_features..(k + 1) * self.n_features];
            for (w, &x) in row.iter_mut().zip(features) {
                *w += learning_rate * g * x;
            }
        }
        Ok(())
    }

    fn check_features(&self, features: &[f64]) -> Result<()> {
        if features.len() != self.n_features {
            return Err(Error::FeatureLengthMismatch {
                expected: self.n_features,
                got: features.len(),
            });
        }
        Ok(())
    }
}

impl PolicyFunction for SoftmaxPolicy {
    fn distribution(&self, features: &[f64], dimension: usize) -> Result<Vec<f64>> {
        Ok(softmax(&self.logits(features, dimension)?))
    }
}

/// Builder for [`SoftmaxPolicy`].
#[derive(Clone, Debug)]
pub struct SoftmaxPolicyBuilder {
    cardinalities: Vec<usize>,
    n_features: usize,
    init_scale: f64,
    seed: Option<u64>,
}

impl SoftmaxPolicyBuilder {
    /// Overrides the input width (defaults to the number of dimensions).
    #[must_use]
    pub fn n_features(mut self, n_features: usize) -> Self {
        self.n_features = n_features;
        self
    }

    /// Weights are drawn uniformly from `[-scale, scale)`; `0.0` gives a
    /// uniform initial policy. Defaults to `0.01`.
    #[must_use]
    pub fn init_scale(mut self, scale: f64) -> Self {
        self.init_scale = scale;
        self
    }

    /// Fixes the initialization seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds the policy. Biases start at zero.
    #[must_use]
    pub fn build(self) -> SoftmaxPolicy {
        let mut rng = self
            .seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        let scale = self.init_scale;

        let heads = self
            .cardinalities
            .iter()
            .map(|&n| LinearHead {
                weights: (0..n * self.n_features)
                    .map(|_| scale * (2.0 * rng.f64() - 1.0))
                    .collect(),
                bias: vec![0.0; n],
            })
            .collect();

        SoftmaxPolicy {
            n_features: self.n_features,
            heads: RwLock::new(heads),
        }
    }
}
