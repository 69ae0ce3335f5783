//! User credential table.

use opendoor_core::{Error, Result, constants::FIELD_NOT_PRESENT};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One enrolled credential.
///
/// Serialized field names match the `users.json` layout of the original
/// reader firmware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Display name shown on access grant.
    #[serde(rename = "Name")]
    pub name: String,

    /// Facility code this credential is enrolled under. Absent for
    /// credentials matched on card number alone.
    #[serde(rename = "FC", default, skip_serializing_if = "Option::is_none")]
    pub facility_code: Option<i64>,

    /// Card number.
    #[serde(rename = "CN")]
    pub card_number: i64,

    /// Disabled credentials stay in the table but are denied.
    #[serde(default)]
    pub active: bool,

    /// Free-form marker surfaced on grant (used by exercise deployments).
    #[serde(rename = "Flag", default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
}

/// In-memory user lookup table, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct UserTable {
    users: Vec<User>,
}

impl UserTable {
    /// Build a table from already-parsed users.
    #[must_use]
    pub fn new(users: Vec<User>) -> Self {
        UserTable { users }
    }

    /// Load the table from a JSON file.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read and `Error::Config`
    /// if it does not parse as a user list.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let users: Vec<User> = serde_json::from_str(&raw).map_err(|e| {
            Error::Config(format!("invalid user table {}: {e}", path.as_ref().display()))
        })?;
        Ok(UserTable { users })
    }

    /// Find the credential matching a decoded card.
    ///
    /// A facility code of -1 (formats that define none) matches on card
    /// number alone. Otherwise both fields must match, and a user enrolled
    /// without a facility code never matches a read that carries one.
    #[must_use]
    pub fn find(&self, facility_code: i64, card_number: i64) -> Option<&User> {
        self.users.iter().find(|user| {
            if facility_code == FIELD_NOT_PRESENT {
                user.card_number == card_number
            } else {
                user.facility_code == Some(facility_code) && user.card_number == card_number
            }
        })
    }

    /// Number of enrolled credentials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Iterate enrolled credentials in table order.
    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.iter()
    }
}
