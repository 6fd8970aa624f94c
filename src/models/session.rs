//! Session model
//!
//! The client-held record of the authenticated user. It is the only value ever
//! written under the storage key and the only source of the bearer token.

use serde::{Deserialize, Serialize};

/// Role granted to shop administrators
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// Role assumed for any signed-in user without an explicit role claim
pub const ROLE_USER: &str = "ROLE_USER";

/// Session record for the currently authenticated user
///
/// Serialized to JSON under the `"user"` storage key. Older records and some
/// server responses carry a single `role` string instead of a `roles` list;
/// both are accepted, and the list form is always written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSessionRecord")]
pub struct SessionRecord {
    /// User ID
    pub id: i64,
    /// Login / display name
    pub username: String,
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Roles granted to the user
    pub roles: Vec<String>,
    /// Signed bearer token (JWT)
    pub token: String,
}

/// Wire shape of [`SessionRecord`], role fields kept apart
#[derive(Deserialize)]
struct RawSessionRecord {
    id: i64,
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    role: Option<OneOrMany>,
    #[serde(default)]
    roles: Option<OneOrMany>,
    token: String,
}

impl From<RawSessionRecord> for SessionRecord {
    fn from(raw: RawSessionRecord) -> Self {
        Self {
            id: raw.id,
            username: raw.username,
            email: raw.email,
            roles: merge_roles(raw.role, raw.roles),
            token: raw.token,
        }
    }
}

impl SessionRecord {
    /// Check if the record carries the given role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Check if the user is a shop administrator
    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }
}

pub(crate) fn default_roles() -> Vec<String> {
    vec![ROLE_USER.to_string()]
}

/// Either `"ROLE_X"` or `["ROLE_X", ...]`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(role) => vec![role],
            OneOrMany::Many(roles) => roles,
        }
    }
}

/// Merge a `role` and a `roles` field into one list
///
/// List entries come first, duplicates are dropped. With neither field present
/// the user gets [`ROLE_USER`].
pub(crate) fn merge_roles(role: Option<OneOrMany>, roles: Option<OneOrMany>) -> Vec<String> {
    if role.is_none() && roles.is_none() {
        return default_roles();
    }

    let mut merged: Vec<String> = Vec::new();
    for name in roles
        .into_iter()
        .chain(role)
        .flat_map(OneOrMany::into_vec)
    {
        if !merged.contains(&name) {
            merged.push(name);
        }
    }
    merged
}
