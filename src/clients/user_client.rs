use crate::actor_framework::StoreClient;
use crate::domain::User;

/// Client for interacting with the User store actor.
#[derive(Clone)]
pub struct UserClient {
    inner: StoreClient<User>,
}

impl_store_client!(UserClient, User, user);
