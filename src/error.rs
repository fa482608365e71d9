/// Errors returned by design-space construction, normalization and the
/// probability engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a design space is built without any dimension.
    #[error("design space must contain at least one dimension")]
    EmptyDesignSpace,

    /// Returned when two dimensions share the same name.
    #[error("duplicate dimension name '{0}'")]
    DuplicateDimension(String),

    /// Returned when a dimension has fewer than two candidate values.
    #[error("dimension '{name}' has cardinality {cardinality}, at least 2 candidates are required")]
    DegenerateDimension {
        /// The name of the offending dimension.
        name: String,
        /// The number of candidates in its sample box.
        cardinality: usize,
    },

    /// Returned when a range upper bound is not a positive finite number.
    #[error("invalid range upper bound for '{name}': {value} must be positive and finite")]
    InvalidRangeUpperbound {
        /// The name of the offending dimension.
        name: String,
        /// The rejected upper bound.
        value: f64,
    },

    /// Returned when a bell model spread is not a positive finite number.
    #[error("invalid sigma: {0} must be positive and finite")]
    InvalidSigma(f64),

    /// Returned when a generative-model descriptor names an unknown kind.
    #[error("unknown generative model kind '{0}'")]
    UnknownGenerativeModel(String),

    /// Returned when a status has no entry for a dimension.
    #[error("status has no value for dimension '{0}'")]
    MissingStatus(String),

    /// Returned when a status value is NaN or infinite.
    #[error("status value for '{name}' is not finite: {value}")]
    NonFiniteStatus {
        /// The name of the dimension.
        name: String,
        /// The rejected value.
        value: f64,
    },

    /// Returned when an action does not have one index per dimension.
    #[error("action length mismatch: expected {expected} indices, got {got}")]
    ActionLengthMismatch {
        /// The number of dimensions in the design space.
        expected: usize,
        /// The length of the action.
        got: usize,
    },

    /// Returned when a feature vector does not match the policy input width.
    #[error("feature length mismatch: expected {expected} features, got {got}")]
    FeatureLengthMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features.
        got: usize,
    },

    /// Returned when a policy emits a distribution of the wrong length.
    #[error(
        "distribution length mismatch for dimension {dimension}: expected {expected}, got {got}"
    )]
    DistributionLengthMismatch {
        /// The dimension the policy was queried for.
        dimension: usize,
        /// The cardinality of that dimension.
        expected: usize,
        /// The length of the emitted distribution.
        got: usize,
    },

    /// Returned when two vectors that must align element-wise differ in length.
    #[error("shape mismatch: expected {expected} entries, got {got}")]
    ShapeMismatch {
        /// The expected length.
        expected: usize,
        /// The actual length.
        got: usize,
    },

    /// Returned when a candidate index falls outside its sample box.
    #[error("index {index} out of range for cardinality {len}")]
    IndexOutOfRange {
        /// The rejected index.
        index: usize,
        /// The number of candidates.
        len: usize,
    },

    /// Returned when a dimension index falls outside the design space.
    #[error("dimension index {index} out of range for a design space of {len} dimensions")]
    DimensionOutOfRange {
        /// The rejected dimension index.
        index: usize,
        /// The number of dimensions.
        len: usize,
    },

    /// Returned when a probability entry is negative or not finite.
    #[error("invalid probability {value} at index {index}")]
    InvalidProbability {
        /// The index of the entry.
        index: usize,
        /// The rejected value.
        value: f64,
    },

    /// Returned when a distribution has no entries.
    #[error("distribution must contain at least one entry")]
    EmptyDistribution,

    /// Returned when the selected action has zero probability, so its
    /// log-probability is negative infinity.
    #[error("selected action {index} has zero probability")]
    ZeroProbability {
        /// The selected candidate index.
        index: usize,
    },

    /// Returned when the target puts mass on a candidate the policy assigns
    /// zero probability to.
    #[error("KL divergence is infinite: target has mass at index {index} where the policy has none")]
    InfiniteDivergence {
        /// The first candidate index producing an infinite term.
        index: usize,
    },
}

/// A specialized `Result` type for design-space exploration operations.
pub type Result<T> = core::result::Result<T, Error>;
