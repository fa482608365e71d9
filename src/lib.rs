#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Action probability and divergence engine for reinforcement-learning
//! exploration of discrete design spaces.
//!
//! An agent searching a hardware or architecture design space picks one
//! candidate per dimension. Its policy emits a probability vector over each
//! dimension's sample box; this crate turns those vectors into the scalars a
//! policy-gradient update consumes: entropy, the log-probability of the
//! realized action, and the KL divergence from a target synthesized by the
//! dimension's generative model (a bell curve for ordinal dimensions, a
//! one-hot indicator for categorical ones).
//!
//! # Getting Started
//!
//! ```
//! use dse::prelude::*;
//!
//! let space = DesignSpace::builder()
//!     .dimension(Dimension::new("l2_kb", 1024.0, vec![128.0, 256.0, 512.0, 1024.0]).model(GenerativeModel::bell(1.0)))
//!     .dimension(Dimension::new("issue", 8.0, vec![1.0, 2.0, 4.0, 8.0]))
//!     .build()
//!     .unwrap();
//!
//! let policy = SoftmaxPolicy::builder(&space).seed(7).build();
//! let engine = ProbabilityEngine::new(&policy, &space);
//!
//! let status: Status = [("l2_kb", 256.0), ("issue", 2.0)].into_iter().collect();
//! let eval = engine.kl_div_and_log_prob(&status, 1, 0).unwrap();
//!
//! assert!(eval.entropy > 0.0);
//! assert!(eval.kl_divergence >= 0.0);
//! assert!(eval.log_prob < 0.0);
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`DesignSpace`](space::DesignSpace) | Ordered, validated dimensions; defines the layout of every vector. |
//! | [`Status`](status::Status) | Raw per-dimension values observed from the environment. |
//! | [`Action`](status::Action) | One candidate index per dimension. |
//! | [`PolicyFunction`](policy::PolicyFunction) | Maps features and a dimension index to a probability vector. |
//! | [`Distribution`](probability::Distribution) | Validated probability vector with entropy, log-prob and KL. |
//! | [`ProbabilityEngine`](engine::ProbabilityEngine) | Normalize, vectorize, query the policy, reduce. |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on design-space and status types | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

pub mod distance;
pub mod engine;
mod error;
pub mod features;
pub mod gradient;
pub mod normalize;
pub mod policy;
pub mod probability;
pub mod space;
pub mod status;
pub mod target;

pub use engine::{
    ActionEvaluation, DivergenceEvaluation, PolicyEvaluation, ProbabilityEngine,
    get_kl_div_and_log_prob, get_log_prob,
};
pub use error::{Error, Result};
pub use policy::PolicyFunction;
pub use probability::Distribution;
pub use space::{DesignSpace, Dimension, GenerativeModel};
pub use status::{Action, Status};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use dse::prelude::*;
/// ```
pub mod prelude {
    pub use crate::distance::action_distance;
    pub use crate::engine::{
        ActionEvaluation, DivergenceEvaluation, PolicyEvaluation, ProbabilityEngine,
        get_kl_div_and_log_prob, get_log_prob,
    };
    pub use crate::error::{Error, Result};
    pub use crate::features::{one_hot, status_to_vector};
    pub use crate::normalize::{
        normalize_action_component, normalize_action_values, normalize_status,
    };
    pub use crate::policy::{PolicyFunction, SoftmaxPolicy, TabularPolicy, UniformPolicy};
    pub use crate::probability::Distribution;
    pub use crate::space::{DesignSpace, DesignSpaceBuilder, Dimension, GenerativeModel};
    pub use crate::status::{Action, Status};
    pub use crate::target::target_distribution;
}
