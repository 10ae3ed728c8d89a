//! In-memory book collection

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::book::{Book, BookFilter};

/// Ordered book collection shared by all handlers.
///
/// Clones share the same underlying collection. Each method takes the lock
/// once, so no two operations interleave their reads and writes.
#[derive(Clone, Default)]
pub struct BookStore {
    books: Arc<RwLock<Vec<Book>>>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Books matching `filter`, in insertion order
    pub async fn list(&self, filter: &BookFilter) -> Vec<Book> {
        self.books
            .read()
            .await
            .iter()
            .filter(|book| filter.matches(book))
            .cloned()
            .collect()
    }

    pub async fn get_by_id(&self, id: &str) -> Option<Book> {
        self.books.read().await.iter().find(|b| b.id == id).cloned()
    }

    /// Append a book. Returns `false` and stores nothing if its id is taken.
    pub async fn insert(&self, book: Book) -> bool {
        let mut books = self.books.write().await;
        if books.iter().any(|b| b.id == book.id) {
            return false;
        }
        books.push(book);
        true
    }

    /// Mutate the book with `id` in place. Returns `None` if it does not exist.
    pub async fn update<F>(&self, id: &str, f: F) -> Option<Book>
    where
        F: FnOnce(&mut Book),
    {
        let mut books = self.books.write().await;
        let book = books.iter_mut().find(|b| b.id == id)?;
        f(book);
        Some(book.clone())
    }

    /// Remove the book with `id`, keeping the relative order of the rest.
    pub async fn delete(&self, id: &str) -> Option<Book> {
        let mut books = self.books.write().await;
        let index = books.iter().position(|b| b.id == id)?;
        Some(books.remove(index))
    }

    pub async fn len(&self) -> usize {
        self.books.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.books.read().await.is_empty()
    }
}
