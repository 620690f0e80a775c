//! # Mock Framework
//!
//! Utilities for testing store-backed handlers without a running actor.
//!
//! Use [`create_mock_client`] to get a client and the receiving end of its
//! channel, then answer the requests with helpers like [`expect_get`] or
//! [`expect_action`].

use tokio::sync::{mpsc, oneshot};

use crate::actor_framework::{Entity, StoreClient, StoreRequest};
use crate::error::StoreError;

type Responder<R> = oneshot::Sender<Result<R, StoreError>>;

/// Creates a client whose requests land on a receiver the test controls,
/// so a test can script the store's answers (success, failure, silence).
pub fn create_mock_client<T: Entity>(
    buffer_size: usize,
) -> (StoreClient<T>, mpsc::Receiver<StoreRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(T::Id, T::Draft, Responder<T>)> {
    match receiver.recv().await {
        Some(StoreRequest::Create { id, draft, respond_to }) => Some((id, draft, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(T::Id, Responder<Option<T>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Update request
pub async fn expect_update<T: Entity>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(T::Id, T::Patch, Responder<T>)> {
    match receiver.recv().await {
        Some(StoreRequest::Update { id, patch, respond_to }) => Some((id, patch, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Delete request
pub async fn expect_delete<T: Entity>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(T::Id, T::Proof, Responder<()>)> {
    match receiver.recv().await {
        Some(StoreRequest::Delete { id, proof, respond_to }) => Some((id, proof, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(T::Id, T::Action, Responder<T::ActionResult>)> {
    match receiver.recv().await {
        Some(StoreRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::{Product, ProductAction, User, UserDraft, UserPatch, UserProof};

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<User>(10);

        let create_task = tokio::spawn(async move {
            let draft = UserDraft {
                username: "Test".to_string(),
                email: "test@example.com".to_string(),
                password: "pw".to_string(),
            };
            client.create(5, draft).await
        });

        let (id, draft, responder) = expect_create(&mut receiver)
            .await
            .expect("Expected Create request");
        assert_eq!(id, 5);
        assert_eq!(draft.username, "Test");
        responder
            .send(Err(StoreError::AlreadyExists("user 5".to_string())))
            .unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Err(StoreError::AlreadyExists("user 5".to_string())));
    }

    #[tokio::test]
    async fn test_mock_action() {
        let (client, mut receiver) = create_mock_client::<Product>(10);

        let reserve_task =
            tokio::spawn(async move { client.perform_action(1, ProductAction::Reserve(2)).await });

        let (id, action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        assert_eq!((id, action), (1, ProductAction::Reserve(2)));
        let snapshot = Product {
            id: 1,
            name: "Widget".to_string(),
            description: "a widget".to_string(),
            price: Decimal::new(950, 2),
            quantity: 8,
        };
        responder.send(Ok(snapshot.clone())).unwrap();

        assert_eq!(reserve_task.await.unwrap(), Ok(snapshot));
    }

    #[tokio::test]
    async fn test_mock_update_and_delete() {
        let (client, mut receiver) = create_mock_client::<User>(10);

        let task = tokio::spawn(async move {
            let missing = client.get(2).await;
            let patch = UserPatch {
                email: Some("new@example.com".to_string()),
                ..UserPatch::default()
            };
            let updated = client.update(2, patch).await;
            let proof = UserProof {
                username: "bob".to_string(),
                email: "new@example.com".to_string(),
                password: "pw".to_string(),
            };
            let deleted = client.delete(2, proof).await;
            (missing, updated, deleted)
        });

        let (id, responder) = expect_get(&mut receiver).await.expect("Expected Get request");
        assert_eq!(id, 2);
        responder.send(Ok(None)).unwrap();

        let (_, patch, responder) = expect_update(&mut receiver)
            .await
            .expect("Expected Update request");
        assert_eq!(patch.email.as_deref(), Some("new@example.com"));
        responder
            .send(Err(StoreError::NotFound("user 2".to_string())))
            .unwrap();

        let (_, proof, responder) = expect_delete(&mut receiver)
            .await
            .expect("Expected Delete request");
        assert_eq!(proof.username, "bob");
        responder.send(Ok(())).unwrap();

        let (missing, updated, deleted) = task.await.unwrap();
        assert_eq!(missing, Ok(None));
        assert!(matches!(updated, Err(StoreError::NotFound(_))));
        assert_eq!(deleted, Ok(()));
    }
}
