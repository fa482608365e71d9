//! Design-space definition: dimensions, their candidate values and the
//! generative model used to synthesize target distributions.
//!
//! A [`DesignSpace`] is an ordered list of [`Dimension`]s. The order is fixed
//! once the space is built and defines the layout of every status vector,
//! action and feature vector in the crate.
//!
//! # Example
//!
//! ```
//! use dse::space::{DesignSpace, Dimension, GenerativeModel};
//!
//! let space = DesignSpace::builder()
//!     .dimension(Dimension::new("core", 8.0, vec![1.0, 2.0, 4.0, 8.0]).model(GenerativeModel::bell(1.0)))
//!     .dimension(Dimension::new("isa", 2.0, vec![0.0, 1.0, 2.0]))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(space.len(), 2);
//! assert_eq!(space.cardinality(0).unwrap(), 4);
//! assert_eq!(space.index_of("isa"), Some(1));
//! ```

use std::collections::HashMap;

use crate::error::{Error, Result};

/// The rule used to synthesize a target distribution for a dimension.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "ModelDescriptor", into = "ModelDescriptor")
)]
pub enum GenerativeModel {
    /// A discretized Gaussian centered at the reference index, for ordinal
    /// dimensions where neighbouring candidates are similar.
    Bell {
        /// Spread of the curve, measured in candidate positions.
        sigma: f64,
    },
    /// A one-hot indicator at the reference index, for categorical
    /// dimensions.
    #[default]
    OneHot,
}

impl GenerativeModel {
    /// Creates a bell-shaped model with the given spread.
    #[must_use]
    pub fn bell(sigma: f64) -> Self {
        Self::Bell { sigma }
    }

    /// Parses a raw `{kind, param}` descriptor as found in configuration
    /// files.
    ///
    /// `"bell"` and `"normal"` both select [`GenerativeModel::Bell`] and
    /// require `param`; `"one_hot"` selects [`GenerativeModel::OneHot`] and
    /// ignores it.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownGenerativeModel` for any other kind, and
    /// `Error::InvalidSigma` if a bell model has a missing or invalid spread.
    pub fn from_descriptor(kind: &str, param: Option<f64>) -> Result<Self> {
        match kind {
            "bell" | "normal" => {
                let sigma = param.ok_or(Error::InvalidSigma(f64::NAN))?;
                let model = Self::Bell { sigma };
                model.validate()?;
                Ok(model)
            }
            "one_hot" => Ok(Self::OneHot),
            other => Err(Error::UnknownGenerativeModel(other.to_owned())),
        }
    }

    /// Returns the descriptor kind of this model.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bell { .. } => "bell",
            Self::OneHot => "one_hot",
        }
    }

    /// Validates the model parameters.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSigma` if a bell spread is not positive and finite.
    pub fn validate(&self) -> Result<()> {
        if let Self::Bell { sigma } = *self
            && !(sigma.is_finite() && sigma > 0.0)
        {
            return Err(Error::InvalidSigma(sigma));
        }
        Ok(())
    }
}

/// Raw generative-model descriptor, `{ "name": "normal", "param": 2.0 }`.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct ModelDescriptor {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    param: Option<f64>,
}

#[cfg(feature = "serde")]
impl TryFrom<ModelDescriptor> for GenerativeModel {
    type Error = Error;

    fn try_from(descriptor: ModelDescriptor) -> Result<Self> {
        Self::from_descriptor(&descriptor.name, descriptor.param)
    }
}

#[cfg(feature = "serde")]
impl From<GenerativeModel> for ModelDescriptor {
    fn from(model: GenerativeModel) -> Self {
        let param = match model {
            GenerativeModel::Bell { sigma } => Some(sigma),
            GenerativeModel::OneHot => None,
        };
        Self {
            name: model.kind().to_owned(),
            param,
        }
    }
}

/// One configurable axis of the design space.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimension {
    name: String,
    range_upperbound: f64,
    sample_box: Vec<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    generative_model: GenerativeModel,
}

impl Dimension {
    /// Creates a dimension with a one-hot generative model.
    ///
    /// `range_upperbound` bounds the raw status values observed along this
    /// axis; `sample_box` lists the candidate values in index order.
    #[must_use]
    pub fn new(name: impl Into<String>, range_upperbound: f64, sample_box: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            range_upperbound,
            sample_box,
            generative_model: GenerativeModel::OneHot,
        }
    }

    /// Sets the generative model used for target synthesis.
    #[must_use]
    pub fn model(mut self, model: GenerativeModel) -> Self {
        self.generative_model = model;
        self
    }

    /// Returns the dimension name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the upper bound of raw status values along this axis.
    #[must_use]
    pub fn range_upperbound(&self) -> f64 {
        self.range_upperbound
    }

    /// Returns the ordered candidate values.
    #[must_use]
    pub fn sample_box(&self) -> &[f64] {
        &self.sample_box
    }

    /// Returns the number of candidate values.
    #[must_use]
    pub fn cardinality(&self) -> usize {
        self.sample_box.len()
    }

    /// Returns the generative model.
    #[must_use]
    pub fn generative_model(&self) -> GenerativeModel {
        self.generative_model
    }

    /// Checks that the dimension can be used by normalization and target
    /// synthesis.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRangeUpperbound`, `Error::DegenerateDimension`
    /// or `Error::InvalidSigma` for the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if !(self.range_upperbound.is_finite() && self.range_upperbound > 0.0) {
            return Err(Error::InvalidRangeUpperbound {
                name: self.name.clone(),
                value: self.range_upperbound,
            });
        }
        // normalize_action_component divides by cardinality - 1
        if self.cardinality() < 2 {
            return Err(Error::DegenerateDimension {
                name: self.name.clone(),
                cardinality: self.cardinality(),
            });
        }
        self.generative_model.validate()
    }
}

/// An ordered, validated collection of dimensions.
///
/// Immutable after construction, so a single instance can be shared across
/// threads and concurrent engine calls.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "SpaceDescriptor", into = "SpaceDescriptor")
)]
pub struct DesignSpace {
    dimensions: Vec<Dimension>,
    by_name: HashMap<String, usize>,
}

impl DesignSpace {
    /// Creates a validated design space from dimensions in layout order.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyDesignSpace` for an empty list,
    /// `Error::DuplicateDimension` when two dimensions share a name, or the
    /// first error reported by [`Dimension::validate`].
    pub fn new(dimensions: Vec<Dimension>) -> Result<Self> {
        if dimensions.is_empty() {
            return Err(Error::EmptyDesignSpace);
        }

        let mut by_name = HashMap::with_capacity(dimensions.len());
        for (index, dimension) in dimensions.iter().enumerate() {
            dimension.validate()?;
            if by_name.insert(dimension.name.clone(), index).is_some() {
                return Err(Error::DuplicateDimension(dimension.name.clone()));
            }
        }

        trace_info!(n_dimensions = dimensions.len(), "design space built");

        Ok(Self {
            dimensions,
            by_name,
        })
    }

    /// Returns a builder for adding dimensions one at a time.
    #[must_use]
    pub fn builder() -> DesignSpaceBuilder {
        DesignSpaceBuilder::default()
    }

    /// Returns the number of dimensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    /// Always `false`: a built design space has at least one dimension.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Returns the dimensions in layout order.
    #[must_use]
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Iterates dimension names in layout order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.dimensions.iter().map(Dimension::name)
    }

    /// Returns the dimension at `index`.
    ///
    /// # Errors
    ///
    /// Returns `Error::DimensionOutOfRange` if `index >= self.len()`.
    pub fn dimension(&self, index: usize) -> Result<&Dimension> {
        self.dimensions
            .get(index)
            .ok_or(Error::DimensionOutOfRange {
                index,
                len: self.dimensions.len(),
            })
    }

    /// Returns the number of candidates of the dimension at `index`.
    ///
    /// # Errors
    ///
    /// Returns `Error::DimensionOutOfRange` if `index >= self.len()`.
    pub fn cardinality(&self, index: usize) -> Result<usize> {
        self.dimension(index).map(Dimension::cardinality)
    }

    /// Returns the sample box of the dimension at `index`.
    ///
    /// # Errors
    ///
    /// Returns `Error::DimensionOutOfRange` if `index >= self.len()`.
    pub fn sample_box(&self, index: usize) -> Result<&[f64]> {
        self.dimension(index).map(Dimension::sample_box)
    }

    /// Returns the generative model of the dimension at `index`.
    ///
    /// # Errors
    ///
    /// Returns `Error::DimensionOutOfRange` if `index >= self.len()`.
    pub fn model(&self, index: usize) -> Result<GenerativeModel> {
        self.dimension(index).map(Dimension::generative_model)
    }

    /// Returns the layout index of the dimension called `name`.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Returns the dimension called `name`.
    #[must_use]
    pub fn dimension_by_name(&self, name: &str) -> Option<&Dimension> {
        self.index_of(name).map(|i| &self.dimensions[i])
    }
}

/// Builder for [`DesignSpace`].
#[derive(Clone, Debug, Default)]
pub struct DesignSpaceBuilder {
    dimensions: Vec<Dimension>,
}

impl DesignSpaceBuilder {
    /// Appends a dimension; layout order follows call order.
    #[must_use]
    pub fn dimension(mut self, dimension: Dimension) -> Self {
        self.dimensions.push(dimension);
        self
    }

    /// Validates and builds the design space.
    ///
    /// # Errors
    ///
    /// See [`DesignSpace::new`].
    pub fn build(self) -> Result<DesignSpace> {
        DesignSpace::new(self.dimensions)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct SpaceDescriptor {
    dimensions: Vec<Dimension>,
}

#[cfg(feature = "serde")]
impl TryFrom<SpaceDescriptor> for DesignSpace {
    type Error = Error;

    fn try_from(descriptor: SpaceDescriptor) -> Result<Self> {
        Self::new(descriptor.dimensions)
    }
}

#[cfg(feature = "serde")]
impl From<DesignSpace> for SpaceDescriptor {
    fn from(space: DesignSpace) -> Self {
        Self {
            dimensions: space.dimensions,
        }
    }
}
