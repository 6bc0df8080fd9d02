use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use std::{net::SocketAddr, sync::Arc};

use crate::{expenses, health, options};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    /// Prefix of the Total column in exported workbooks.
    pub currency_symbol: Arc<str>,
}

impl ServerState {
    pub fn new(engine: Engine, currency_symbol: &str) -> Self {
        Self {
            engine: Arc::new(engine),
            currency_symbol: Arc::from(currency_symbol),
        }
    }
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route("/expenses/export", get(expenses::export))
        .route(
            "/expenses/{id}",
            get(expenses::get)
                .put(expenses::update)
                .delete(expenses::delete),
        )
        .route("/options", get(options::list))
        .route("/health", get(health::check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
