//! Dissimilarity between actions in normalized action space.

use crate::error::Result;
use crate::normalize::normalize_action_values;
use crate::space::DesignSpace;
use crate::status::Action;

/// Squared Euclidean distance between two actions after normalizing both
/// with [`normalize_action_values`].
///
/// Symmetric, and zero iff the normalized actions coincide.
///
/// # Errors
///
/// Returns `Error::ActionLengthMismatch` if either action does not have one
/// index per dimension.
pub fn action_distance(a: &Action, b: &Action, space: &DesignSpace) -> Result<f64> {
    let a = normalize_action_values(a, space)?;
    let b = normalize_action_values(b, space)?;
    Ok(a.iter().zip(&b).map(|(x, y)| (x - y).powi(2)).sum())
}
