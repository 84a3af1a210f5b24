//! Book shelf service
//!
//! Validation, storage and filtered listing of book records. Every mutation
//! holds the shelf's write lock from its existence check to its last write,
//! so id uniqueness and read-after-write hold under concurrent requests.

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult, BookAction},
    models::book::{Book, BookPayload, BookQuery, BookShort},
    repository::{books::Shelf, Repository},
};

use super::{clock::Clock, ids::IdGenerator};

/// Ids asked from the generator before giving up on a create
const MAX_ID_ATTEMPTS: usize = 8;

#[derive(Clone)]
pub struct BookStore {
    repository: Repository,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl BookStore {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            repository,
            clock,
            ids,
        }
    }

    /// Validate and store a new book, returning its id
    pub fn create(&self, payload: BookPayload) -> AppResult<String> {
        let name = validated_name(&payload, BookAction::Add)?;

        let mut shelf = self.repository.books.write()?;
        let id = self.fresh_id(&shelf)?;
        let now = self.clock.now();
        shelf.push(Book::new(id.clone(), name, payload, now));

        if shelf.get(&id).is_none() {
            return Err(AppError::Persistence(format!(
                "book {} missing right after insert",
                id
            )));
        }

        tracing::info!(book_id = %id, "Book created");
        Ok(id)
    }

    /// List books as `{id, name, publisher}`.
    ///
    /// Without filters every book is returned in insertion order. With
    /// filters the result is the union of the per-filter matches, in the
    /// order name, reading, finished. A book matching several filters shows
    /// up once per filter it matches.
    pub fn list(&self, query: &BookQuery) -> AppResult<Vec<BookShort>> {
        let shelf = self.repository.books.read()?;

        if query.is_empty() {
            return Ok(shelf.iter().map(BookShort::from).collect());
        }

        tracing::debug!(?query, "Listing books with filters");

        let mut books = Vec::new();
        if let Some(needle) = query.name_needle() {
            books.extend(
                shelf
                    .iter()
                    .filter(|book| book.name_contains(&needle))
                    .map(BookShort::from),
            );
        }
        if let Some(reading) = query.reading {
            books.extend(
                shelf
                    .iter()
                    .filter(|book| book.reading == reading)
                    .map(BookShort::from),
            );
        }
        if let Some(finished) = query.finished {
            books.extend(
                shelf
                    .iter()
                    .filter(|book| book.finished == finished)
                    .map(BookShort::from),
            );
        }

        Ok(books)
    }

    pub fn get_by_id(&self, id: &str) -> AppResult<Book> {
        self.repository
            .books
            .read()?
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Replace every mutable field of a book.
    ///
    /// Validation runs before the lookup, so an invalid payload on an unknown
    /// id is reported as a validation error.
    pub fn update(&self, id: &str, payload: BookPayload) -> AppResult<()> {
        let name = validated_name(&payload, BookAction::Update)?;

        let mut shelf = self.repository.books.write()?;
        let book = shelf.get_mut(id).ok_or_else(|| not_found(BookAction::Update))?;
        book.apply(name, payload, self.clock.now());

        tracing::info!(book_id = %id, "Book updated");
        Ok(())
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        self.repository
            .books
            .write()?
            .remove(id)
            .ok_or_else(|| not_found(BookAction::Delete))?;

        tracing::info!(book_id = %id, "Book deleted");
        Ok(())
    }

    /// Ask the generator for an id never handed out before
    fn fresh_id(&self, shelf: &Shelf) -> AppResult<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.generate();
            if !shelf.was_issued(&id) {
                return Ok(id);
            }
            tracing::warn!(book_id = %id, "Generated book id already issued, retrying");
        }

        Err(AppError::Persistence(format!(
            "no unused book id after {} attempts",
            MAX_ID_ATTEMPTS
        )))
    }
}

fn validated_name(payload: &BookPayload, action: BookAction) -> AppResult<String> {
    payload
        .validate()
        .map(str::to_string)
        .map_err(|violation| AppError::Validation { action, violation })
}

fn not_found(action: BookAction) -> AppError {
    AppError::NotFound(format!("Failed to {} book. Id not found", action))
}
