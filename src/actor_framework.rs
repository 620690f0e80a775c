use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument};

use crate::error::{ResourceKind, StoreError};

// =============================================================================
// 1. THE ABSTRACTION (Entity trait with lifecycle hooks and actions)
// =============================================================================

/// Trait that any record must implement to be kept by a [`StoreActor`].
///
/// Ids are chosen by the caller, so a store never allocates them.
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Copy + Send + Sync + Display + Debug;
    type Draft: Send + Debug;
    type Patch: Send + Debug;
    /// Fields a caller must echo back to prove it may delete the record.
    type Proof: Send + Debug;
    type Action: Send + Debug;
    type ActionResult: Send + Debug;

    const KIND: ResourceKind;

    fn id(&self) -> Self::Id;

    fn from_draft(id: Self::Id, draft: Self::Draft) -> Result<Self, StoreError>;

    // --- Lifecycle Hooks ---

    fn on_update(&mut self, patch: Self::Patch) -> Result<(), StoreError>;

    fn verify(&self, proof: &Self::Proof) -> bool;

    /// Handle a custom domain-specific action
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, StoreError>;
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

#[derive(Debug)]
pub enum StoreRequest<T: Entity> {
    Create {
        id: T::Id,
        draft: T::Draft,
        respond_to: Response<T>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        proof: T::Proof,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
    Shutdown,
    #[cfg(test)]
    Count {
        respond_to: Response<usize>,
    },
}

// =============================================================================
// 3. THE GENERIC STORE ACTOR
// =============================================================================

/// Single writer for one keyed store. Requests are applied one at a time,
/// so every create/read/update/delete/action is linearizable.
pub struct StoreActor<T: Entity> {
    receiver: mpsc::Receiver<StoreRequest<T>>,
    records: HashMap<T::Id, T>,
}

impl<T: Entity> StoreActor<T> {
    pub fn new(buffer_size: usize) -> (Self, StoreClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            records: HashMap::new(),
        };
        (actor, StoreClient::new(sender))
    }

    #[instrument(name = "store", fields(resource = %T::KIND), skip(self))]
    pub async fn run(mut self) {
        info!("Store starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Create { id, draft, respond_to } => {
                    let _ = respond_to.send(self.handle_create(id, draft));
                }
                StoreRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.records.get(&id).cloned()));
                }
                StoreRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch));
                }
                StoreRequest::Delete { id, proof, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id, proof));
                }
                StoreRequest::Action { id, action, respond_to } => {
                    let _ = respond_to.send(self.handle_action(id, action));
                }
                StoreRequest::Shutdown => {
                    info!("Store shutting down");
                    break;
                }
                #[cfg(test)]
                StoreRequest::Count { respond_to } => {
                    let _ = respond_to.send(Ok(self.records.len()));
                }
            }
        }

        info!(records = self.records.len(), "Store stopped");
    }

    #[instrument(skip(self, draft))]
    fn handle_create(&mut self, id: T::Id, draft: T::Draft) -> Result<T, StoreError> {
        if self.records.contains_key(&id) {
            debug!("Duplicate id");
            return Err(StoreError::AlreadyExists(format!("{} {}", T::KIND, id)));
        }
        let record = T::from_draft(id, draft)?;
        self.records.insert(record.id(), record.clone());
        info!("Record created");
        Ok(record)
    }

    /// The patch is applied to a copy so a failing hook leaves the record untouched.
    #[instrument(skip(self, patch))]
    fn handle_update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, StoreError> {
        let record = self.records.get_mut(&id).ok_or_else(|| not_found::<T>(id))?;
        let mut updated = record.clone();
        updated.on_update(patch)?;
        *record = updated.clone();
        info!("Record updated");
        Ok(updated)
    }

    #[instrument(skip(self, proof))]
    fn handle_delete(&mut self, id: T::Id, proof: T::Proof) -> Result<(), StoreError> {
        let record = self.records.get(&id).ok_or_else(|| not_found::<T>(id))?;
        if !record.verify(&proof) {
            debug!("Verification fields do not match");
            return Err(StoreError::VerificationFailed(format!("{} {}", T::KIND, id)));
        }
        self.records.remove(&id);
        info!("Record deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    fn handle_action(&mut self, id: T::Id, action: T::Action) -> Result<T::ActionResult, StoreError> {
        let record = self.records.get_mut(&id).ok_or_else(|| not_found::<T>(id))?;
        record.handle_action(action)
    }
}

fn not_found<T: Entity>(id: T::Id) -> StoreError {
    StoreError::NotFound(format!("{} {}", T::KIND, id))
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct StoreClient<T: Entity> {
    sender: mpsc::Sender<StoreRequest<T>>,
}

impl<T: Entity> StoreClient<T> {
    pub fn new(sender: mpsc::Sender<StoreRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> StoreRequest<T>,
    ) -> Result<R, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::ActorCommunication("Actor closed".to_string()))?;
        response
            .await
            .map_err(|_| StoreError::ActorCommunication("Actor dropped".to_string()))?
    }

    pub async fn create(&self, id: T::Id, draft: T::Draft) -> Result<T, StoreError> {
        self.request(|respond_to| StoreRequest::Create { id, draft, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        self.request(|respond_to| StoreRequest::Get { id, respond_to }).await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, StoreError> {
        self.request(|respond_to| StoreRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id, proof: T::Proof) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::Delete { id, proof, respond_to }).await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, StoreError> {
        self.request(|respond_to| StoreRequest::Action { id, action, respond_to }).await
    }

    pub async fn shutdown(&self) -> Result<(), StoreError> {
        self.sender
            .send(StoreRequest::Shutdown)
            .await
            .map_err(|_| StoreError::ActorCommunication("Actor closed".to_string()))
    }

    #[cfg(test)]
    pub async fn count(&self) -> Result<usize, StoreError> {
        self.request(|respond_to| StoreRequest::Count { respond_to }).await
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================
