use std::fmt;

use sha2::{Digest, Sha256};

use crate::wire::{FlatObject, WireValue};

/// A registered user. Only the password hash is ever kept.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl User {
    pub fn to_flat(&self) -> FlatObject {
        FlatObject::new()
            .with("id", WireValue::int(self.id))
            .with("username", WireValue::text(&self.username))
            .with("email", WireValue::text(&self.email))
            .with("password", WireValue::text(&self.password_hash))
    }
}

/// Lower-case hex SHA-256 of `raw`.
pub fn hash_password(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Payload for creating a new user.
#[derive(Clone)]
pub struct UserDraft {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Payload for updating an existing user. `None` fields are left as they are.
#[derive(Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Fields that must match the stored user before it can be deleted.
#[derive(Clone)]
pub struct UserProof {
    pub username: String,
    pub email: String,
    pub password: String,
}

const REDACTED: &str = "<redacted>";

impl fmt::Debug for UserDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserDraft")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &REDACTED)
            .finish()
    }
}

impl fmt::Debug for UserPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPatch")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| REDACTED))
            .finish()
    }
}

impl fmt::Debug for UserProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserProof")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &REDACTED)
            .finish()
    }
}
