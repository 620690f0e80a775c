use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::actor_framework::StoreActor;
use crate::clients::{DownstreamError, DownstreamProxy, ProductClient, UserClient};
use crate::config::{
    ConfigError, Endpoint, ServiceConfig, GATEWAY_SERVICE, ORDER_SERVICE, PRODUCT_SERVICE,
    USER_SERVICE,
};
use crate::domain::{Product, User};
use crate::error::StoreError;
use crate::orchestrator::Orchestrator;
use crate::server::relay::RelayRoutes;
use crate::server::{gateway_router, order_router, product_router, user_router, RelayState};

const STORE_BUFFER: usize = 64;

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("unknown role {0:?} (expected user, product, order or gateway)")]
    UnknownRole(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot build downstream client: {0}")]
    Downstream(#[from] DownstreamError),
    #[error("server i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("store shutdown: {0}")]
    Store(#[from] StoreError),
    #[error("actor task failed: {0}")]
    Task(String),
}

/// The server roles one binary can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Product,
    Order,
    Gateway,
}

impl Role {
    /// Key of this role's entry in the config file.
    pub fn config_key(self) -> &'static str {
        match self {
            Role::User => USER_SERVICE,
            Role::Product => PRODUCT_SERVICE,
            Role::Order => ORDER_SERVICE,
            Role::Gateway => GATEWAY_SERVICE,
        }
    }
}

impl FromStr for Role {
    type Err = SystemError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "product" => Ok(Role::Product),
            "order" => Ok(Role::Order),
            "gateway" | "iscs" => Ok(Role::Gateway),
            _ => Err(SystemError::UnknownRole(raw.to_string())),
        }
    }
}

/// One running service: its router plus whatever store actors back it.
///
/// Responsible for starting up actors, wiring them to the HTTP surface, and
/// handling shutdown.
pub struct ServiceSystem {
    pub role: Role,
    router: Router,
    users: Option<UserClient>,
    products: Option<ProductClient>,
    handles: Vec<JoinHandle<()>>,
}

impl ServiceSystem {
    pub fn for_role(role: Role, config: &ServiceConfig) -> Result<Self, SystemError> {
        match role {
            Role::User => Ok(Self::user_service()),
            Role::Product => Ok(Self::product_service()),
            Role::Gateway => Self::gateway(config),
            Role::Order => Self::order_service(config),
        }
    }

    pub fn user_service() -> Self {
        let (actor, inner) = StoreActor::<User>::new(STORE_BUFFER);
        let handle = tokio::spawn(actor.run());
        let users = UserClient::new(inner);

        Self {
            role: Role::User,
            router: user_router(users.clone()),
            users: Some(users),
            products: None,
            handles: vec![handle],
        }
    }

    pub fn product_service() -> Self {
        let (actor, inner) = StoreActor::<Product>::new(STORE_BUFFER);
        let handle = tokio::spawn(actor.run());
        let products = ProductClient::new(inner);

        Self {
            role: Role::Product,
            router: product_router(products.clone()),
            users: None,
            products: Some(products),
            handles: vec![handle],
        }
    }

    pub fn gateway(config: &ServiceConfig) -> Result<Self, SystemError> {
        let proxy = DownstreamProxy::new(config.downstream_timeout(GATEWAY_SERVICE))?;
        let state = RelayState {
            proxy: Arc::new(proxy),
            routes: RelayRoutes {
                users: config.endpoint(USER_SERVICE)?,
                products: config.endpoint(PRODUCT_SERVICE)?,
            },
        };
        Ok(Self::stateless(Role::Gateway, gateway_router(state)))
    }

    pub fn order_service(config: &ServiceConfig) -> Result<Self, SystemError> {
        let gateway = config.endpoint(GATEWAY_SERVICE)?;
        let proxy = Arc::new(DownstreamProxy::new(
            config.downstream_timeout(ORDER_SERVICE),
        )?);
        let commit = config.commit_strategy();
        info!(?commit, %gateway, "Order service wired to gateway");

        let orchestrator = Arc::new(Orchestrator::new(proxy.clone(), gateway.clone(), commit));
        let relay = RelayState {
            proxy,
            routes: RelayRoutes::single(gateway),
        };
        Ok(Self::stateless(Role::Order, order_router(orchestrator, relay)))
    }

    fn stateless(role: Role, router: Router) -> Self {
        Self {
            role,
            router,
            users: None,
            products: None,
            handles: Vec::new(),
        }
    }

    /// Binds the configured endpoint and serves until ctrl-c.
    pub async fn serve(self, endpoint: &Endpoint) -> Result<(), SystemError> {
        let listener = TcpListener::bind(endpoint.to_string()).await?;
        self.serve_on(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Cannot listen for ctrl-c");
            }
        })
        .await
    }

    /// Serves on an already bound listener until `shutdown` resolves, then
    /// stops the store actors.
    pub async fn serve_on(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), SystemError> {
        info!(role = ?self.role, addr = %listener.local_addr()?, "Listening");
        axum::serve(listener, self.router.clone())
            .with_graceful_shutdown(shutdown)
            .await?;
        self.shutdown().await
    }

    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");

        if let Some(users) = &self.users {
            users.shutdown().await?;
        }
        if let Some(products) = &self.products {
            products.shutdown().await?;
        }

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(SystemError::Task(e.to_string()));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
