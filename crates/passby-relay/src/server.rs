//! HTTP relay server bootstrap

use std::any::Any;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use axum::response::Response;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any as AnyHeader, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use passby_core::{ErrorCode, RelayConfig, ServerConfig, SERVER_ERROR_MESSAGE};

use crate::api::{self, error_response, AppState};
use crate::store::TokenStore;

/// Relay server state
pub struct RelayServer {
    config: RelayConfig,
    store: Arc<TokenStore>,
}

impl RelayServer {
    /// Create a server with a fresh store using the configured TTL
    pub fn new(config: RelayConfig) -> Self {
        let store = Arc::new(TokenStore::new(config.token_ttl()));
        Self { config, store }
    }

    /// Create a server around an existing store
    pub fn with_store(config: RelayConfig, store: Arc<TokenStore>) -> Self {
        Self { config, store }
    }

    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    /// Full application router with middleware
    pub fn router(&self) -> Router {
        let app = api::router(AppState::new(self.store.clone()));
        with_layers(app, &self.config.server)
    }

    /// Bind the configured address and serve until `shutdown` resolves
    pub async fn serve<F>(&self, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = self.config.socket_addr();
        let listener = TcpListener::bind(addr).await?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve_on<F>(
        &self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Relay server listening on {}", listener.local_addr()?);
        info!(
            "Token TTL {}s, background sweep {}",
            self.store.ttl().num_seconds(),
            match self.config.tokens.sweep_interval_secs {
                0 => "disabled".to_string(),
                secs => format!("every {}s", secs),
            }
        );

        let reaper = self.spawn_reaper();

        let result = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await;

        if let Some(handle) = reaper {
            handle.abort();
        }

        info!("Relay server stopped");
        result
    }

    /// Serve until Ctrl-C or SIGTERM
    pub async fn run(&self) -> Result<(), std::io::Error> {
        self.serve(shutdown_signal()).await
    }

    /// Periodic sweep of expired tokens. Reads still sweep on their own;
    /// this only keeps memory bounded when nobody is reading.
    fn spawn_reaper(&self) -> Option<JoinHandle<()>> {
        let secs = self.config.tokens.sweep_interval_secs;
        if secs == 0 {
            return None;
        }

        let store = self.store.clone();
        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(secs));
            // First tick fires immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let removed = store.sweep_expired();
                debug!("Reaper pass removed {} tokens", removed);
            }
        }))
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

fn with_layers(router: Router, config: &ServerConfig) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&config.cors_origins)),
    )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(AnyHeader)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    error!("Handler panicked: {}", detail);
    error_response(ErrorCode::ServerError, SERVER_ERROR_MESSAGE)
}
