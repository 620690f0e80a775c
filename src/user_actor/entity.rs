use crate::actor_framework::Entity;
use crate::domain::{hash_password, User, UserDraft, UserPatch, UserProof};
use crate::error::{ResourceKind, StoreError};

impl Entity for User {
    type Id = i32;
    type Draft = UserDraft;
    type Patch = UserPatch;
    type Proof = UserProof;
    type Action = ();
    type ActionResult = ();

    const KIND: ResourceKind = ResourceKind::User;

    fn id(&self) -> i32 {
        self.id
    }

    /// The plaintext password is hashed here and then dropped.
    fn from_draft(id: i32, draft: UserDraft) -> Result<Self, StoreError> {
        Ok(Self {
            id,
            username: draft.username,
            email: draft.email,
            password_hash: hash_password(&draft.password),
        })
    }

    fn on_update(&mut self, patch: UserPatch) -> Result<(), StoreError> {
        if let Some(username) = patch.username {
            self.username = username;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(password) = patch.password {
            self.password_hash = hash_password(&password);
        }
        Ok(())
    }

    fn verify(&self, proof: &UserProof) -> bool {
        self.username == proof.username
            && self.email == proof.email
            && self.password_hash == hash_password(&proof.password)
    }

    /// Users have no custom actions.
    fn handle_action(&mut self, _action: ()) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User::from_draft(
            1,
            UserDraft {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "hunter2".to_string(),
            },
        )
        .unwrap()
    }

    #[test]
    fn stores_only_the_hash() {
        let user = alice();
        assert_eq!(user.password_hash, hash_password("hunter2"));
        assert!(!user.to_flat().encode().contains("hunter2"));
    }

    #[test]
    fn update_rehashes_password() {
        let mut user = alice();
        user.on_update(UserPatch {
            password: Some("hunter3".to_string()),
            ..UserPatch::default()
        })
        .unwrap();
        assert_eq!(user.password_hash, hash_password("hunter3"));
        assert_eq!(user.username, "alice");
    }

    #[test]
    fn verify_needs_every_field() {
        let user = alice();
        let proof = |username: &str, email: &str, password: &str| UserProof {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        assert!(user.verify(&proof("alice", "alice@example.com", "hunter2")));
        assert!(!user.verify(&proof("alice", "alice@example.com", "hunter3")));
        assert!(!user.verify(&proof("bob", "alice@example.com", "hunter2")));
        assert!(!user.verify(&proof("alice", "bob@example.com", "hunter2")));
    }
}
