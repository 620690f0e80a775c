use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Router;
use tracing::{info, instrument};

use super::{check_body_id, invalid_path, method_not_allowed, parse_path_id, FlatReply};
use crate::clients::UserClient;
use crate::error::{ResourceKind, ServiceError, StoreError};
use crate::user_actor::{validate_user_command, UserCommand};
use crate::wire::FlatObject;

pub fn user_router(users: UserClient) -> Router {
    Router::new()
        .route("/user/{id}", get(get_user).fallback(method_not_allowed))
        .route("/user", post(post_user).fallback(method_not_allowed))
        .fallback(invalid_path)
        .with_state(users)
}

fn store_error(error: StoreError) -> ServiceError {
    ServiceError::from_store(ResourceKind::User, error)
}

#[instrument(skip(users, body))]
async fn get_user(
    State(users): State<UserClient>,
    Path(id): Path<String>,
    body: String,
) -> Result<FlatReply, ServiceError> {
    let id = parse_path_id(&id)?;
    check_body_id(id, &body)?;
    let user = users.get_user(id).await.map_err(store_error)?;
    Ok(FlatReply::ok(user.to_flat()))
}

#[instrument(skip_all)]
async fn post_user(
    State(users): State<UserClient>,
    body: String,
) -> Result<FlatReply, ServiceError> {
    let command = validate_user_command(&FlatObject::decode(&body)?)?;
    let id = command.id();

    let reply = match command {
        UserCommand::Create { id, draft } => {
            FlatReply::ok(users.create_user(id, draft).await.map_err(store_error)?.to_flat())
        }
        UserCommand::Update { id, patch } => {
            FlatReply::ok(users.update_user(id, patch).await.map_err(store_error)?.to_flat())
        }
        UserCommand::Delete { id, proof } => {
            users.delete_user(id, proof).await.map_err(store_error)?;
            FlatReply::ok(FlatObject::new())
        }
    };

    info!(id, "User command applied");
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;

    use super::*;
    use crate::actor_framework::StoreActor;
    use crate::domain::{hash_password, User};
    use crate::mock_framework::{create_mock_client, expect_get};

    fn router() -> Router {
        let (actor, inner) = StoreActor::<User>::new(16);
        tokio::spawn(actor.run());
        user_router(UserClient::new(inner))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, String) {
        let response: Response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    const CREATE_ALICE: &str =
        r#"{"command":"create","id":1,"username":"alice","email":"alice@example.com","password":"hunter2"}"#;

    #[tokio::test]
    async fn create_then_get_returns_hashed_record() {
        let app = router();

        let (status, body) = send(&app, "POST", "/user", CREATE_ALICE).await;
        assert_eq!(status, StatusCode::OK);
        let expected = format!(
            r#"{{"id":1,"username":"alice","email":"alice@example.com","password":"{}"}}"#,
            hash_password("hunter2")
        );
        assert_eq!(body, expected);

        let (status, body) = send(&app, "GET", "/user/1", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, expected);

        let (status, body) = send(&app, "POST", "/user", CREATE_ALICE).await;
        assert_eq!((status, body.as_str()), (StatusCode::CONFLICT, "{}"));
    }

    #[tokio::test]
    async fn delete_mismatch_is_not_found() {
        let app = router();
        send(&app, "POST", "/user", CREATE_ALICE).await;

        let wrong = r#"{"command":"delete","id":1,"username":"alice","email":"alice@example.com","password":"nope"}"#;
        let (status, body) = send(&app, "POST", "/user", wrong).await;
        assert_eq!((status, body.as_str()), (StatusCode::NOT_FOUND, "{}"));

        let partial = r#"{"command":"delete","id":1,"username":"alice"}"#;
        let (status, _) = send(&app, "POST", "/user", partial).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let right = r#"{"command":"delete","id":1,"username":"alice","email":"alice@example.com","password":"hunter2"}"#;
        let (status, body) = send(&app, "POST", "/user", right).await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "{}"));

        let (status, _) = send(&app, "GET", "/user/1", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_changes_only_supplied_fields() {
        let app = router();
        send(&app, "POST", "/user", CREATE_ALICE).await;

        let update = r#"{"command":"update","id":1,"email":"new@example.com","username":null}"#;
        let (status, body) = send(&app, "POST", "/user", update).await;
        assert_eq!(status, StatusCode::OK);
        let record = FlatObject::decode(&body).unwrap();
        assert_eq!(record.get("username"), Some("alice"));
        assert_eq!(record.get("email"), Some("new@example.com"));

        let missing = r#"{"command":"update","id":2,"email":"x@example.com"}"#;
        let (status, _) = send(&app, "POST", "/user", missing).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_requests_are_rejected() {
        let app = router();

        for (method, uri, body) in [
            ("GET", "/user/abc", ""),
            ("GET", "/user/1", r#"{"id":2}"#),
            ("POST", "/user", ""),
            ("POST", "/user", "not an object"),
            ("POST", "/user", "{}"),
            ("POST", "/user", r#"{"command":"create","id":1,"username":"a","email":"no-at","password":"p"}"#),
            ("GET", "/users", ""),
        ] {
            let (status, body) = send(&app, method, uri, body).await;
            assert_eq!((status, body.as_str()), (StatusCode::BAD_REQUEST, "{}"), "{method} {uri}");
        }

        let (status, _) = send(&app, "PUT", "/user", "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        let (status, _) = send(&app, "POST", "/user/1", "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn padded_text_round_trips_unchanged() {
        let app = router();
        let create = r#"{"command":"create","id":5,"username":" alice ","email":" a@x.com","password":"pw"}"#;
        let (status, body) = send(&app, "POST", "/user", create).await;
        assert_eq!(status, StatusCode::OK);

        let (status, fetched) = send(&app, "GET", "/user/5", "").await;
        assert_eq!((status, &fetched), (StatusCode::OK, &body));
        let record = FlatObject::decode(&fetched).unwrap();
        assert_eq!(record.get("username"), Some(" alice "));
        assert_eq!(record.get("email"), Some(" a@x.com"));
    }

    #[tokio::test]
    async fn unparseable_get_body_is_ignored() {
        let app = router();
        send(&app, "POST", "/user", CREATE_ALICE).await;

        for body in ["id=1", "garbage", "[1]"] {
            let (status, record) = send(&app, "GET", "/user/1", body).await;
            assert_eq!(status, StatusCode::OK, "{body}");
            assert_eq!(FlatObject::decode(&record).unwrap().get("username"), Some("alice"));
        }

        let (status, _) = send(&app, "GET", "/user/1", r#"{"name":"x"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn closed_store_is_unavailable() {
        let (inner, mut receiver) = create_mock_client::<User>(4);
        let app = user_router(UserClient::new(inner));

        let store = tokio::spawn(async move {
            let (id, respond_to) = expect_get(&mut receiver).await.unwrap();
            assert_eq!(id, 4);
            drop(respond_to);
        });

        let (status, body) = send(&app, "GET", "/user/4", "").await;
        assert_eq!((status, body.as_str()), (StatusCode::SERVICE_UNAVAILABLE, "{}"));
        store.await.unwrap();
    }
}
