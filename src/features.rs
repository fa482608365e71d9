//! Policy input vectors and one-hot indicators.

use crate::error::{Error, Result};
use crate::space::DesignSpace;
use crate::status::Status;

/// Projects `status` to a numeric vector in design-space order.
///
/// The order of `status` itself is ignored; values are looked up by
/// dimension name so the feature layout never depends on how the status was
/// assembled. No scaling is applied, normalize first when the policy expects
/// it.
///
/// # Errors
///
/// Returns `Error::MissingStatus` if a dimension has no entry.
pub fn status_to_vector(status: &Status, space: &DesignSpace) -> Result<Vec<f64>> {
    space.names().map(|name| status.require(name)).collect()
}

/// A vector of length `cardinality` that is zero except for a one at `index`.
///
/// # Errors
///
/// Returns `Error::IndexOutOfRange` if `index >= cardinality`.
pub fn one_hot(cardinality: usize, index: usize) -> Result<Vec<f64>> {
    if index >= cardinality {
        return Err(Error::IndexOutOfRange {
            index,
            len: cardinality,
        });
    }
    let mut v = vec![0.0; cardinality];
    v[index] = 1.0;
    Ok(v)
}
