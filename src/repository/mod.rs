//! Repository layer for book storage

pub mod books;

/// Main repository struct holding every store
#[derive(Clone, Default)]
pub struct Repository {
    pub books: books::BookStore,
}

impl Repository {
    /// Create a repository backed by empty in-memory collections
    pub fn in_memory() -> Self {
        Self {
            books: books::BookStore::new(),
        }
    }
}
