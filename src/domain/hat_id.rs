//! Type-safe hard hat identifier.
//!
//! [`HatId`] wraps the `hard_hats.id` primary key so that hat identifiers
//! cannot be confused with event row IDs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a physical hard hat device.
///
/// Every deployment observed so far drives a single device, so the
/// service targets [`HatId::DEFAULT`] unless configured otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HatId(i64);

impl HatId {
    /// The hat seeded by the initial migration.
    pub const DEFAULT: Self = Self(1);

    /// Creates a `HatId` from a raw database key.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw database key.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl Default for HatId {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for HatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for HatId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<HatId> for i64 {
    fn from(id: HatId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_hat_one() {
        assert_eq!(HatId::default().get(), 1);
        assert_eq!(HatId::default(), HatId::DEFAULT);
    }

    #[test]
    fn display_is_plain_integer() {
        assert_eq!(HatId::new(42).to_string(), "42");
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&HatId::new(7)).ok();
        assert_eq!(json.as_deref(), Some("7"));
    }
}
