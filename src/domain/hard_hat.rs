//! Hard hat profile.

use serde::Serialize;

use super::HatId;

/// A row from the `hard_hats` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HardHat {
    /// Primary key.
    pub id: HatId,
    /// Display label, e.g. `"Site A - Blue"`.
    pub nickname: Option<String>,
    /// Person the hat is assigned to.
    pub owner_name: Option<String>,
}

impl HardHat {
    /// Creates a hat profile.
    #[must_use]
    pub fn new(id: HatId, nickname: Option<String>, owner_name: Option<String>) -> Self {
        Self {
            id,
            nickname,
            owner_name,
        }
    }

    /// Applies a profile update. Fields left as `None` keep their value.
    pub fn apply(&mut self, update: &HatProfileUpdate) {
        if let Some(nickname) = &update.nickname {
            self.nickname = Some(nickname.clone());
        }
        if let Some(owner_name) = &update.owner_name {
            self.owner_name = Some(owner_name.clone());
        }
    }
}

/// Mutable display fields of a hat. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HatProfileUpdate {
    /// New display label.
    pub nickname: Option<String>,
    /// New owner name.
    pub owner_name: Option<String>,
}

impl HatProfileUpdate {
    /// Returns `true` when neither field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nickname.is_none() && self.owner_name.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_overwrites_only_provided_fields() {
        let mut hat = HardHat::new(
            HatId::DEFAULT,
            Some("Blue".to_string()),
            Some("Ana".to_string()),
        );
        hat.apply(&HatProfileUpdate {
            nickname: None,
            owner_name: Some("Ben".to_string()),
        });
        assert_eq!(hat.nickname.as_deref(), Some("Blue"));
        assert_eq!(hat.owner_name.as_deref(), Some("Ben"));
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(HatProfileUpdate::default().is_empty());
        let update = HatProfileUpdate {
            nickname: Some(String::new()),
            owner_name: None,
        };
        assert!(!update.is_empty());
    }
}
