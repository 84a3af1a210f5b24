//! Book endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{Book, BookPayload, BookQuery, BookShort},
    AppState,
};

use super::{AppJson, AppQuery};

const SUCCESS: &str = "success";

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookIdData {
    pub book_id: String,
}

#[derive(Serialize, ToSchema)]
pub struct BookListData {
    pub books: Vec<BookShort>,
}

#[derive(Serialize, ToSchema)]
pub struct BookData {
    pub book: Book,
}

/// Response to a successful create
#[derive(Serialize, ToSchema)]
pub struct BookCreatedResponse {
    pub status: String,
    pub message: String,
    pub data: BookIdData,
}

#[derive(Serialize, ToSchema)]
pub struct BookListResponse {
    pub status: String,
    pub data: BookListData,
}

#[derive(Serialize, ToSchema)]
pub struct BookResponse {
    pub status: String,
    pub data: BookData,
}

/// Status and message only, for update and delete
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub status: String,
    pub message: String,
}

impl MessageResponse {
    fn success(message: &str) -> Self {
        Self {
            status: SUCCESS.to_string(),
            message: message.to_string(),
        }
    }
}

/// List books, optionally filtered
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(
        ("name" = Option<String>, Query, description = "Case-insensitive substring of the name"),
        ("reading" = Option<String>, Query, description = "1/true or 0/false, other values are ignored"),
        ("finished" = Option<String>, Query, description = "1/true or 0/false, other values are ignored")
    ),
    responses(
        (status = 200, description = "List of books", body = BookListResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    AppQuery(pairs): AppQuery<Vec<(String, String)>>,
) -> AppResult<Json<BookListResponse>> {
    let query = BookQuery::from_pairs(pairs);
    let books = state.services.books.list(&query)?;

    Ok(Json(BookListResponse {
        status: SUCCESS.to_string(),
        data: BookListData { books },
    }))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BookResponse>> {
    let book = state.services.books.get_by_id(&id)?;

    Ok(Json(BookResponse {
        status: SUCCESS.to_string(),
        data: BookData { book },
    }))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = BookCreatedResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 500, description = "Book could not be stored", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AppJson(payload): AppJson<BookPayload>,
) -> AppResult<(StatusCode, Json<BookCreatedResponse>)> {
    let book_id = state.services.books.create(payload)?;

    Ok((
        StatusCode::CREATED,
        Json(BookCreatedResponse {
            status: SUCCESS.to_string(),
            message: "Book added successfully".to_string(),
            data: BookIdData { book_id },
        }),
    ))
}

/// Update an existing book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = MessageResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<BookPayload>,
) -> AppResult<Json<MessageResponse>> {
    state.services.books.update(&id, payload)?;
    Ok(Json(MessageResponse::success("Book updated successfully")))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.services.books.delete(&id)?;
    Ok(Json(MessageResponse::success("Book deleted successfully")))
}
