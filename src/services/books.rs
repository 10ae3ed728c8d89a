//! Book catalog service
//!
//! Validation always runs before the store is touched, so a rejected
//! request never leaves a partial mutation behind.

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilter, BookPayload, BookQuery, BookSummary},
    repository::Repository,
};

use super::{clock::Clock, ids::IdGenerator};

/// Id generation attempts before giving up on a collision streak
const MAX_ID_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl BooksService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            repository,
            clock,
            ids,
        }
    }

    /// Store a new book and return its generated id
    pub async fn create(&self, payload: &BookPayload) -> AppResult<String> {
        let name = validate(payload, "add")?;
        let now = self.clock.now();

        for attempt in 1..=MAX_ID_ATTEMPTS {
            let id = self.ids.generate();
            let book = Book::from_payload(id.clone(), name.clone(), payload, now);
            if self.repository.books.insert(book).await {
                tracing::info!(book_id = %id, "Book added");
                return Ok(id);
            }
            tracing::warn!(book_id = %id, attempt, "Book id already in use, regenerating");
        }

        tracing::error!("No free book id after {} attempts", MAX_ID_ATTEMPTS);
        Err(AppError::Internal("Failed to add book".to_string()))
    }

    /// Summaries of the books matching every supplied filter
    pub async fn list(&self, query: &BookQuery) -> Vec<BookSummary> {
        let filter = BookFilter::from(query);
        self.repository
            .books
            .list(&filter)
            .await
            .iter()
            .map(Book::to_summary)
            .collect()
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await.ok_or_else(|| {
            tracing::debug!(book_id = %id, "Book not found");
            AppError::NotFound("Book not found".to_string())
        })
    }

    /// Replace every editable field of an existing book
    pub async fn update(&self, id: &str, payload: &BookPayload) -> AppResult<Book> {
        let name = validate(payload, "update")?;
        let now = self.clock.now();

        let book = self
            .repository
            .books
            .update(id, |book| book.apply(name, payload, now))
            .await
            .ok_or_else(|| {
                tracing::debug!(book_id = %id, "Update target not found");
                AppError::NotFound("Failed to update book. Id not found".to_string())
            })?;

        tracing::info!(book_id = %id, "Book updated");
        Ok(book)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.repository.books.delete(id).await.ok_or_else(|| {
            tracing::debug!(book_id = %id, "Delete target not found");
            AppError::NotFound("Failed to delete book. Id not found".to_string())
        })?;

        tracing::info!(book_id = %id, "Book deleted");
        Ok(())
    }
}

/// Check a payload and hand back the required name. `action` names the
/// operation in the error message ("add" / "update").
fn validate(payload: &BookPayload, action: &str) -> AppResult<String> {
    let Some(name) = payload.name.clone() else {
        tracing::debug!("Rejected book {}: missing name", action);
        return Err(AppError::Validation(format!(
            "Failed to {} book. Please provide the book name",
            action
        )));
    };

    if payload.read_page_exceeds_page_count() {
        tracing::debug!("Rejected book {}: readPage exceeds pageCount", action);
        return Err(AppError::Validation(format!(
            "Failed to {} book. readPage must not exceed pageCount",
            action
        )));
    }

    Ok(name)
}
