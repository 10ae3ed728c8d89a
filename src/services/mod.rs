//! Business logic services

pub mod books;
pub mod clock;
pub mod ids;

use std::sync::Arc;

use crate::repository::Repository;

pub use clock::{Clock, SystemClock};
pub use ids::{IdGenerator, RandomIdGenerator};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
}

impl Services {
    /// Create all services with the given repository, clock and id source
    pub fn new(
        repository: Repository,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            books: books::BooksService::new(repository, clock, ids),
        }
    }

    /// Services wired to the wall clock and random ids
    pub fn with_defaults(repository: Repository) -> Self {
        Self::new(
            repository,
            Arc::new(SystemClock),
            Arc::new(RandomIdGenerator::default()),
        )
    }
}
