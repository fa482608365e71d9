//! Observed status and chosen action value types.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::space::DesignSpace;

/// The raw value of every dimension as observed from the environment.
///
/// Entries keep their insertion order. Lookups are by dimension name, so a
/// status built in any order can be read against a [`DesignSpace`]; the
/// normalization functions always emit a status in design-space order.
///
/// With the `serde` feature a status is a map of names to values. A name
/// repeated on the wire keeps its first position and its last value, the
/// same as repeated [`Status::insert`] calls.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Status {
    entries: Vec<(String, f64)>,
    by_name: HashMap<String, usize>,
}

impl Status {
    /// Creates an empty status.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of `name`, replacing an earlier value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        if let Some(&index) = self.by_name.get(&name) {
            self.entries[index].1 = value;
            return;
        }
        self.by_name.insert(name.clone(), self.entries.len());
        self.entries.push((name, value));
    }

    /// Returns the value recorded for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.by_name.get(name).map(|&index| self.entries[index].1)
    }

    /// Returns the value recorded for `name`.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingStatus` if there is no entry for `name`.
    pub fn require(&self, name: &str) -> Result<f64> {
        self.get(name)
            .ok_or_else(|| Error::MissingStatus(name.to_owned()))
    }

    /// Iterates `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Returns the values in insertion order.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|&(_, v)| v).collect()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the status has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Status {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut status = Self::new();
        for (name, value) in iter {
            status.insert(name, value);
        }
        status
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Status {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> core::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Status {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> core::result::Result<Self, D::Error> {
        struct StatusVisitor;

        impl<'de> serde::de::Visitor<'de> for StatusVisitor {
            type Value = Status;

            fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str("a map of dimension names to values")
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(
                self,
                mut access: A,
            ) -> core::result::Result<Status, A::Error> {
                let mut status = Status::new();
                while let Some((name, value)) = access.next_entry::<String, f64>()? {
                    status.insert(name, value);
                }
                Ok(status)
            }
        }

        deserializer.deserialize_map(StatusVisitor)
    }
}

/// One candidate index per dimension, in design-space order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action(Vec<usize>);

impl Action {
    /// Wraps a list of candidate indices.
    #[must_use]
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// Returns the candidate indices.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Returns the number of indices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the action has no indices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks that the action has one in-range index per dimension.
    ///
    /// # Errors
    ///
    /// Returns `Error::ActionLengthMismatch` if the arity differs from the
    /// design space, or `Error::IndexOutOfRange` for the first index outside
    /// its sample box.
    pub fn validate(&self, space: &DesignSpace) -> Result<()> {
        if self.0.len() != space.len() {
            return Err(Error::ActionLengthMismatch {
                expected: space.len(),
                got: self.0.len(),
            });
        }
        for (&index, dimension) in self.0.iter().zip(space.dimensions()) {
            if index >= dimension.cardinality() {
                return Err(Error::IndexOutOfRange {
                    index,
                    len: dimension.cardinality(),
                });
            }
        }
        Ok(())
    }
}

impl From<Vec<usize>> for Action {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}
