use std::sync::Arc;

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::app::book_store::BookStore;
use crate::app::error::StoreError;
use crate::app::filter::BookFilter;
use crate::app::model::{Book, BookInput, BookSummary, ListQuery};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BookStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok\n" }))
        .route(
            "/books",
            get(list_books).post(add_book).fallback(method_not_allowed),
        )
        .route(
            "/books/:book_id",
            get(get_book)
                .put(update_book)
                .delete(delete_book)
                .fallback(method_not_allowed),
        )
        .fallback(|| async { ApiError::new(StatusCode::NOT_FOUND, "Not found") })
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Permissive when `origins` is empty, otherwise restricted to the listed origins.
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin.trim())
                .map_err(|err| anyhow::anyhow!("invalid cors origin {origin:?}: {err}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Fail,
}

/// JSON body shared by every `/books` response.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    fn success(message: Option<&str>, data: Option<T>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: message.map(str::to_string),
            data,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedBook {
    pub book_id: String,
}

#[derive(Debug, Serialize)]
pub struct BookList {
    pub books: Vec<BookSummary>,
}

#[derive(Debug, Serialize)]
pub struct BookDetail {
    pub book: Book,
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Add,
    Update,
    Delete,
}

impl Operation {
    fn failure_prefix(self) -> &'static str {
        match self {
            Self::Add => "Failed to add book.",
            Self::Update => "Failed to update book.",
            Self::Delete => "Failed to delete book.",
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn from_store(op: Operation, err: StoreError) -> Self {
        match err {
            StoreError::Validation(reason) => {
                tracing::debug!(?op, %reason, "rejected book payload");
                Self::new(
                    StatusCode::BAD_REQUEST,
                    format!("{} {reason}", op.failure_prefix()),
                )
            }
            StoreError::NotFound => Self::new(
                StatusCode::NOT_FOUND,
                format!("{} Id not found", op.failure_prefix()),
            ),
            StoreError::Internal(detail) => {
                tracing::error!(?op, %detail, "book store consistency failure");
                let prefix = op.failure_prefix();
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    prefix.strip_suffix('.').unwrap_or(prefix),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope::<()> {
            status: ResponseStatus::Fail,
            message: Some(self.message),
            data: None,
        };
        (self.status, Json(body)).into_response()
    }
}

async fn add_book(
    State(state): State<AppState>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<AddedBook>>), ApiError> {
    let Json(input) = payload.map_err(invalid_body)?;
    let book_id = state
        .store
        .add(input)
        .await
        .map_err(|err| ApiError::from_store(Operation::Add, err))?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::success(
            Some("Book added successfully"),
            Some(AddedBook { book_id }),
        )),
    ))
}

async fn list_books(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<Envelope<BookList>> {
    let filter = BookFilter::from_query(&ListQuery::from_pairs(pairs));
    tracing::debug!(?filter, "listing books");

    let books = state.store.list(&filter).await;
    Json(Envelope::success(None, Some(BookList { books })))
}

async fn get_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> Result<Json<Envelope<BookDetail>>, ApiError> {
    let book = state.store.get(&book_id).await.map_err(|err| match err {
        StoreError::NotFound => ApiError::new(StatusCode::NOT_FOUND, "Book not found"),
        err => {
            tracing::error!(%book_id, %err, "unexpected error reading book");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read book")
        }
    })?;
    Ok(Json(Envelope::success(None, Some(BookDetail { book }))))
}

async fn update_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let Json(input) = payload.map_err(invalid_body)?;
    state
        .store
        .update(&book_id, input)
        .await
        .map_err(|err| ApiError::from_store(Operation::Update, err))?;
    Ok(Json(Envelope::success(
        Some("Book updated successfully"),
        None,
    )))
}

async fn delete_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    state
        .store
        .delete(&book_id)
        .await
        .map_err(|err| ApiError::from_store(Operation::Delete, err))?;
    Ok(Json(Envelope::success(
        Some("Book deleted successfully"),
        None,
    )))
}

async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
    ApiError::new(
        StatusCode::BAD_REQUEST,
        format!("Invalid request body: {}", rejection.body_text()),
    )
}
