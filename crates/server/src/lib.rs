//! # Server - HTTP front end for the todo list
//!
//! ```text
//! GET       /                  index page
//! POST      /add               form field `title`, then 302 -> /
//! GET|POST  /done/:id          toggle done, then 302 -> /
//! GET|POST  /clear/:id         delete, then 302 -> /
//! GET       /css/:file         embedded stylesheet
//! GET       /color-theme.css   configured color theme
//! GET       /health            liveness
//! ```
//!
//! Store calls are synchronous and may touch the disk, so every one of them
//! runs on tokio's blocking pool.
pub mod assets;
mod error;
pub mod render;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;
use std::sync::Arc;
use todo::{KvBackend, TodoError, TodoStore};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub use error::AppError;

/// Shared handler state.
pub struct AppState<B> {
    store: Arc<TodoStore<B>>,
    theme_css: &'static str,
}

impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            theme_css: self.theme_css,
        }
    }
}

impl<B: KvBackend + Send + 'static> AppState<B> {
    /// Fails if `theme` is not one of [`assets::THEMES`].
    pub fn new(store: TodoStore<B>, theme: &str) -> anyhow::Result<Self> {
        let Some(theme_css) = assets::theme(theme) else {
            anyhow::bail!(
                "unknown color theme {theme:?} (available: {})",
                assets::theme_names().collect::<Vec<_>>().join(", ")
            );
        };
        Ok(Self {
            store: Arc::new(store),
            theme_css,
        })
    }

    pub fn store(&self) -> &Arc<TodoStore<B>> {
        &self.store
    }

    /// Runs `f` against the store on the blocking pool.
    async fn with_store<T, F>(&self, f: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&TodoStore<B>) -> todo::Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| AppError::internal(anyhow::anyhow!(e).context("store task failed")))?;
        result.map_err(AppError::from)
    }
}

/// Builds the router with compression and request tracing applied.
pub fn app<B: KvBackend + Send + 'static>(state: AppState<B>) -> Router {
    Router::new()
        .route("/", get(index::<B>))
        .route("/add", axum::routing::post(add::<B>))
        .route("/done/:id", get(done::<B>).post(done::<B>))
        .route("/clear/:id", get(clear::<B>).post(clear::<B>))
        .route("/css/:file", get(stylesheet))
        .route("/color-theme.css", get(color_theme::<B>))
        .route("/health", get(health))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn back_to_index() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
}

fn parse_id(raw: &str) -> Result<u64, AppError> {
    raw.parse().map_err(|_| {
        tracing::warn!(id = raw, "invalid todo id");
        AppError::bad_request("Bad Request")
    })
}

async fn index<B: KvBackend + Send + 'static>(
    State(state): State<AppState<B>>,
) -> Result<Html<String>, AppError> {
    let max_title_length = state.store.limits().max_title_length;
    let items = state.with_store(|store| store.list()).await?;
    Ok(Html(render::index_page(&items, max_title_length)))
}

#[derive(Debug, Deserialize)]
struct AddForm {
    #[serde(default)]
    title: String,
}

async fn add<B: KvBackend + Send + 'static>(
    State(state): State<AppState<B>>,
    Form(form): Form<AddForm>,
) -> Result<Response, AppError> {
    let result = state
        .with_store(move |store| match store.create(&form.title) {
            Ok(item) => Ok(Some(item)),
            Err(TodoError::Capacity { .. }) => Ok(None),
            Err(e) => Err(e),
        })
        .await?;

    match result {
        Some(item) => tracing::info!(id = item.id, "todo added"),
        None => tracing::error!("error adding item, max number of items reached"),
    }
    Ok(back_to_index())
}

async fn done<B: KvBackend + Send + 'static>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    state.with_store(move |store| store.toggle(id)).await?;
    Ok(back_to_index())
}

async fn clear<B: KvBackend + Send + 'static>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    state.with_store(move |store| store.delete(id)).await?;
    Ok(back_to_index())
}

async fn stylesheet(Path(file): Path<String>) -> Result<Response, AppError> {
    let css = assets::stylesheet(&file).ok_or_else(AppError::not_found)?;
    Ok(css_response(css))
}

async fn color_theme<B: KvBackend + Send + 'static>(State(state): State<AppState<B>>) -> Response {
    css_response(state.theme_css)
}

async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

fn css_response(css: &'static str) -> Response {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], css).into_response()
}
