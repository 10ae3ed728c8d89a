//! Book endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookPayload, BookQuery, BookSummary},
    AppState,
};

use super::{ApiResponse, MessageResponse};

/// `data` of a create response
#[derive(Debug, Serialize, ToSchema)]
pub struct BookIdData {
    #[serde(rename = "bookId")]
    pub book_id: String,
}

/// `data` of a list response
#[derive(Debug, Serialize, ToSchema)]
pub struct BookListData {
    pub books: Vec<BookSummary>,
}

/// `data` of a get response
#[derive(Debug, Serialize, ToSchema)]
pub struct BookData {
    pub book: Book,
}

/// Unwrap a JSON body, turning framework rejections into a `fail` envelope
fn payload(body: Result<Json<BookPayload>, JsonRejection>) -> AppResult<BookPayload> {
    body.map(|Json(payload)| payload).map_err(|rejection| {
        tracing::debug!("Rejected book payload: {}", rejection.body_text());
        AppError::BadRequest(format!("Invalid request payload: {}", rejection.body_text()))
    })
}

/// Add a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book added; `data` holds BookIdData", body = BookIdData),
        (
            status = 400,
            description = "Missing name, readPage over pageCount or malformed body",
            body = MessageResponse
        ),
        (status = 500, description = "Book could not be stored", body = MessageResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    body: Result<Json<BookPayload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<BookIdData>>)> {
    let data = payload(body)?;
    let book_id = state.services.books.create(&data).await?;

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success(BookIdData { book_id }).with_message("Book added successfully"),
        ),
    ))
}

/// List books, optionally filtered
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (
            status = 200,
            description = "Matching books; `data` holds BookListData",
            body = BookListData
        )
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<ApiResponse<BookListData>> {
    let query = BookQuery::from_pairs(pairs);
    let books = state.services.books.list(&query).await;
    Json(ApiResponse::success(BookListData { books }))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details; `data` holds BookData", body = BookData),
        (status = 404, description = "Book not found", body = MessageResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<BookData>>> {
    let book = state.services.books.get_by_id(&id).await?;
    Ok(Json(ApiResponse::success(BookData { book })))
}

/// Replace a book's editable fields
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = MessageResponse),
        (
            status = 400,
            description = "Missing name, readPage over pageCount or malformed body",
            body = MessageResponse
        ),
        (status = 404, description = "Book not found", body = MessageResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<BookPayload>, JsonRejection>,
) -> AppResult<Json<ApiResponse<()>>> {
    let data = payload(body)?;
    state.services.books.update(&id, &data).await?;
    Ok(Json(ApiResponse::acknowledged("Book updated successfully")))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 404, description = "Book not found", body = MessageResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.books.delete(&id).await?;
    Ok(Json(ApiResponse::acknowledged("Book deleted successfully")))
}
