use crate::domain::{UserDraft, UserPatch, UserProof};
use crate::error::ServiceError;
use crate::validation::{email, non_empty, optional_text, record_id, required, required_text};
use crate::wire::FlatObject;

/// A structurally valid `POST /user` body.
#[derive(Debug)]
pub enum UserCommand {
    Create { id: i32, draft: UserDraft },
    Update { id: i32, patch: UserPatch },
    Delete { id: i32, proof: UserProof },
}

impl UserCommand {
    pub fn id(&self) -> i32 {
        match self {
            UserCommand::Create { id, .. }
            | UserCommand::Update { id, .. }
            | UserCommand::Delete { id, .. } => *id,
        }
    }
}

pub fn validate_user_command(body: &FlatObject) -> Result<UserCommand, ServiceError> {
    let command = required(body, "command")?;
    let id = record_id(body)?;

    match command {
        "create" => Ok(UserCommand::Create {
            id,
            draft: UserDraft {
                username: non_empty("username", required_text(body, "username")?)?,
                email: email(required_text(body, "email")?)?,
                password: non_empty("password", required_text(body, "password")?)?,
            },
        }),
        "update" => Ok(UserCommand::Update {
            id,
            patch: UserPatch {
                username: optional_text(body, "username")
                    .map(|value| non_empty("username", value))
                    .transpose()?,
                email: optional_text(body, "email").map(email).transpose()?,
                password: optional_text(body, "password")
                    .map(|value| non_empty("password", value))
                    .transpose()?,
            },
        }),
        "delete" => Ok(UserCommand::Delete {
            id,
            proof: UserProof {
                username: required_text(body, "username")?,
                email: required_text(body, "email")?,
                password: required_text(body, "password")?,
            },
        }),
        other => Err(ServiceError::malformed(format!("unknown user command {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(raw: &str) -> Result<UserCommand, ServiceError> {
        validate_user_command(&FlatObject::decode(raw).unwrap())
    }

    #[test]
    fn create_requires_every_field() {
        let command = validate(
            r#"{"command":"create","id":1,"username":" alice ","email":"a@x.com","password":"pw"}"#,
        )
        .unwrap();
        match command {
            UserCommand::Create { id, draft } => {
                assert_eq!(id, 1);
                assert_eq!(draft.username, " alice ");
            }
            other => panic!("unexpected command {other:?}"),
        }

        assert!(validate(r#"{"command":"create","id":1,"username":"alice","email":"a@x.com"}"#).is_err());
        assert!(validate(r#"{"command":"create","id":1,"username":"alice","email":"ax.com","password":"pw"}"#).is_err());
    }

    #[test]
    fn update_treats_null_as_absent() {
        let command =
            validate(r#"{"command":"update","id":2,"username":null,"email":"b@x.com","password":null}"#)
                .unwrap();
        match command {
            UserCommand::Update { id, patch } => {
                assert_eq!(id, 2);
                assert!(patch.username.is_none());
                assert_eq!(patch.email.as_deref(), Some("b@x.com"));
                assert!(patch.password.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(validate(r#"{"command":"update","id":2,"email":"nope"}"#).is_err());
    }

    #[test]
    fn delete_without_verification_fields_is_malformed() {
        let err = validate(r#"{"command":"delete","id":3,"username":"alice"}"#).unwrap_err();
        assert!(matches!(err, ServiceError::MalformedInput(_)));
    }

    #[test]
    fn id_and_command_are_mandatory() {
        assert!(validate(r#"{"command":"create","username":"a","email":"a@x","password":"p"}"#).is_err());
        assert!(validate(r#"{"command":"create","id":"one","username":"a","email":"a@x","password":"p"}"#).is_err());
        assert!(validate(r#"{"id":1}"#).is_err());
        assert!(validate(r#"{"command":"rename","id":1}"#).is_err());
    }
}
