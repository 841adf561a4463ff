//! HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::file::ContentStore;
use crate::{Database, Result, ShelfError};

use super::handlers::AppState;
use super::middleware::JwtState;
use super::router::{
    create_health_router, create_openapi_router, create_router, create_static_router,
};

/// Web server for the API.
pub struct WebServer {
    addr: SocketAddr,
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server over an open database.
    ///
    /// The content store is rooted at `storage.root`, which is created if
    /// missing.
    pub fn new(config: &Config, db: Database) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| ShelfError::Config(format!("invalid server address: {}", e)))?;

        let store = ContentStore::new(&config.storage.root, &config.storage.uploads_path)?;
        tracing::info!("Content store initialized at: {}", store.base_path().display());

        let app_state = AppState::new(
            db,
            store,
            config.storage.delete_mode,
            config.storage.max_upload_bytes(),
        );

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            jwt_state: Arc::new(JwtState::new(&config.auth.jwt_secret)),
            cors_origins: config.server.cors_origins.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Assemble every router the server exposes.
    pub fn router(&self) -> Router {
        let static_router = create_static_router(&self.app_state.store);

        create_router(
            self.app_state.clone(),
            self.jwt_state.clone(),
            &self.cors_origins,
        )
        .merge(create_health_router())
        .merge(create_openapi_router())
        .merge(static_router)
    }

    /// Run the web server.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let router = self.router();

        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!("Web server listening on http://{}", listener.local_addr()?);

        axum::serve(listener, router).await
    }

    /// Run the server in the background and return the bound address.
    ///
    /// Binding to port 0 picks a free port.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let router = self.router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
