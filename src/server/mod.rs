//! JSON API server for the rendering layer

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::error::BlogError;
use crate::listing::PostPage;
use crate::preview::PreviewContext;
use crate::views::{HomeView, PathsView, PostView};
use crate::Blog;

/// Server state
struct ServerState {
    blog: Blog,
}

/// Optional preview ref on any page request
#[derive(Debug, Default, Deserialize)]
struct PreviewParams {
    #[serde(rename = "ref")]
    version_ref: Option<String>,
}

/// Cursor for the "load more" request
#[derive(Debug, Deserialize)]
struct MoreParams {
    cursor: String,
}

/// Error response with a status derived from the failure kind
struct ApiError(BlogError);

impl From<BlogError> for ApiError {
    fn from(err: BlogError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BlogError::NotFound(_) => StatusCode::NOT_FOUND,
            BlogError::NoMorePages | BlogError::ForeignCursor(_) => StatusCode::BAD_REQUEST,
            BlogError::FetchFailed(_) | BlogError::InvalidDocument { .. } => {
                tracing::error!("Content source error: {}", self.0);
                StatusCode::BAD_GATEWAY
            }
        };
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

/// Build the API router
pub fn router(blog: Blog) -> Router {
    let state = Arc::new(ServerState { blog });

    Router::new()
        .route("/api/posts", get(list_posts))
        .route("/api/posts/more", get(load_more))
        .route("/api/posts/:uid", get(show_post))
        .route("/api/paths", get(list_paths))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the API server
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    let app = router(blog.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn preview_context(
    state: &ServerState,
    params: PreviewParams,
    headers: &HeaderMap,
) -> PreviewContext {
    let cookies = headers.get(header::COOKIE).and_then(|v| v.to_str().ok());
    PreviewContext::from_request(
        params.version_ref,
        cookies,
        &state.blog.config.preview.cookie_name,
    )
}

async fn list_posts(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<PreviewParams>,
    headers: HeaderMap,
) -> Result<Json<HomeView>, ApiError> {
    let preview = preview_context(&state, params, &headers);
    Ok(Json(state.blog.home(&preview).await?))
}

async fn load_more(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<MoreParams>,
) -> Result<Json<PostPage>, ApiError> {
    Ok(Json(state.blog.load_more(&params.cursor).await?))
}

async fn show_post(
    State(state): State<Arc<ServerState>>,
    Path(uid): Path<String>,
    Query(params): Query<PreviewParams>,
    headers: HeaderMap,
) -> Result<Json<PostView>, ApiError> {
    let preview = preview_context(&state, params, &headers);
    Ok(Json(state.blog.post(&uid, &preview).await?))
}

async fn list_paths(State(state): State<Arc<ServerState>>) -> Result<Json<PathsView>, ApiError> {
    Ok(Json(state.blog.static_paths().await?))
}
