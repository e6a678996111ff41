//! Session data models.

use serde::{Deserialize, Serialize};

use crate::checkout::DeliveryAddress;

/// The authenticated user's profile as served by `GET /users/profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Server-assigned user identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Account email, also the login identifier.
    pub email: String,

    /// Contact phone number, if one is on file.
    #[serde(default)]
    pub phone: Option<String>,

    /// Saved delivery addresses; checkout picks from these.
    #[serde(default)]
    pub addresses: Vec<DeliveryAddress>,
}
