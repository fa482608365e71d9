//! Scale-invariant views of raw status and action values.

use crate::error::{Error, Result};
use crate::space::DesignSpace;
use crate::status::{Action, Status};

/// Divides every status value by its dimension's range upper bound.
///
/// The result is laid out in design-space order regardless of the order of
/// `status`, and carries exactly one entry per dimension.
///
/// # Errors
///
/// Returns `Error::MissingStatus` if a dimension has no entry in `status`,
/// or `Error::NonFiniteStatus` if a raw value is NaN or infinite.
pub fn normalize_status(status: &Status, space: &DesignSpace) -> Result<Status> {
    space
        .dimensions()
        .iter()
        .map(|dimension| {
            let value = status.require(dimension.name())?;
            if !value.is_finite() {
                return Err(Error::NonFiniteStatus {
                    name: dimension.name().to_owned(),
                    value,
                });
            }
            Ok((dimension.name(), value / dimension.range_upperbound()))
        })
        .collect()
}

/// Divides the i-th action index by the size of the i-th sample box.
///
/// # Errors
///
/// Returns `Error::ActionLengthMismatch` if `action` does not have one index
/// per dimension.
#[allow(clippy::cast_precision_loss)]
pub fn normalize_action_values(action: &Action, space: &DesignSpace) -> Result<Vec<f64>> {
    if action.len() != space.len() {
        return Err(Error::ActionLengthMismatch {
            expected: space.len(),
            got: action.len(),
        });
    }

    Ok(action
        .indices()
        .iter()
        .zip(space.dimensions())
        .map(|(&index, dimension)| index as f64 / dimension.cardinality() as f64)
        .collect())
}

/// Maps a raw action value of dimension `dim_index` onto `[0, 1]` by
/// dividing by `cardinality - 1`.
///
/// Design spaces reject dimensions with fewer than two candidates, so the
/// denominator is never zero.
///
/// # Errors
///
/// Returns `Error::DimensionOutOfRange` if `dim_index` is not a dimension of
/// `space`.
#[allow(clippy::cast_precision_loss)]
pub fn normalize_action_component(
    raw_action_value: f64,
    space: &DesignSpace,
    dim_index: usize,
) -> Result<f64> {
    let cardinality = space.cardinality(dim_index)?;
    Ok(raw_action_value / (cardinality - 1) as f64)
}
