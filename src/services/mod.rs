//! Business logic services

pub mod books;
pub mod clock;
pub mod ids;

use std::sync::Arc;

use crate::{config::BooksConfig, repository::Repository};

use clock::{Clock, SystemClock};
use ids::{IdGenerator, RandomIdGenerator};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BookStore,
}

impl Services {
    /// Create all services with the system clock and random ids
    pub fn new(config: &BooksConfig) -> Self {
        Self::with_collaborators(
            Repository::new(),
            Arc::new(SystemClock),
            Arc::new(RandomIdGenerator::new(config.id_length)),
        )
    }

    pub fn with_collaborators(
        repository: Repository,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            books: books::BookStore::new(repository, clock, ids),
        }
    }
}
