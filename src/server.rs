//! HTTP transport: GraphQL over `POST <path>`, GraphiQL over `GET <path>`.

use std::future::Future;
use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::Router;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use axum::routing::{MethodRouter, post};
use tower_http::trace::TraceLayer;

use crate::config::ServerSettings;
use crate::graphql::{BlogSchema, RequestContext, execute};
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub schema: BlogSchema,
    pub store: Arc<Store>,
}

impl AppState {
    pub fn new(schema: BlogSchema, store: Arc<Store>) -> Self {
        Self { schema, store }
    }
}

/// Builds the HTTP router for the configured path.
pub fn router(state: AppState, settings: &ServerSettings) -> Router {
    let mut route: MethodRouter<AppState> = post(graphql_handler);

    if settings.playground {
        let endpoint = settings.path.clone();
        route = route.get(move || {
            let page = GraphiQLSource::build().endpoint(&endpoint).finish();
            async move { Html(page) }
        });
    }

    Router::new()
        .route(&settings.path, route)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let ctx = RequestContext::from_headers(state.store.clone(), &headers);
    execute(&state.schema, ctx, req.into_inner()).await.into()
}

/// Serve the router on the given listener until `shutdown` resolves.
pub async fn serve(
    listener: tokio::net::TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    tracing::info!(addr = %listener.local_addr()?, "GraphQL server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
