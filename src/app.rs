use axum::{routing::get, Json, Router};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{auth, state::AppState, thoughts};

#[derive(Debug, Serialize)]
pub struct Endpoint {
    pub path: &'static str,
    pub methods: &'static [&'static str],
}

pub const ENDPOINTS: &[Endpoint] = &[
    Endpoint { path: "/", methods: &["GET"] },
    Endpoint { path: "/health", methods: &["GET"] },
    Endpoint { path: "/users", methods: &["POST"] },
    Endpoint { path: "/users/register", methods: &["POST"] },
    Endpoint { path: "/users/login", methods: &["POST"] },
    Endpoint { path: "/users/me", methods: &["GET"] },
    Endpoint { path: "/users/my-thoughts", methods: &["GET"] },
    Endpoint { path: "/thoughts", methods: &["GET", "POST"] },
    Endpoint { path: "/thoughts/:id", methods: &["PATCH", "DELETE"] },
    Endpoint { path: "/thoughts/:id/like", methods: &["POST"] },
];

#[derive(Debug, Serialize)]
struct Index {
    message: &'static str,
    endpoints: &'static [Endpoint],
}

async fn index() -> Json<Index> {
    Json(Index {
        message: "Hello Happy Thoughts API",
        endpoints: ENDPOINTS,
    })
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(|| async { "ok" }))
        .merge(auth::router())
        .merge(thoughts::router())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
