//! Book storage

use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    error::{AppError, AppResult},
    models::book::Book,
};

/// Books in insertion order, plus every id ever handed out
#[derive(Debug, Default)]
pub struct Shelf {
    books: Vec<Book>,
    issued_ids: HashSet<String>,
}

impl Shelf {
    pub fn iter(&self) -> impl Iterator<Item = &Book> {
        self.books.iter()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Book> {
        self.books.iter_mut().find(|book| book.id == id)
    }

    /// Whether `id` was ever stored, including deleted books
    pub fn was_issued(&self, id: &str) -> bool {
        self.issued_ids.contains(id)
    }

    pub fn push(&mut self, book: Book) {
        self.issued_ids.insert(book.id.clone());
        self.books.push(book);
    }

    /// Remove the book with `id`, returning it. The id stays reserved.
    pub fn remove(&mut self, id: &str) -> Option<Book> {
        let index = self.books.iter().position(|book| book.id == id)?;
        Some(self.books.remove(index))
    }
}

/// Shared handle on the shelf. Reads run concurrently, mutations are exclusive.
#[derive(Clone, Default)]
pub struct BooksRepository {
    shelf: Arc<RwLock<Shelf>>,
}

impl BooksRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> AppResult<RwLockReadGuard<'_, Shelf>> {
        self.shelf
            .read()
            .map_err(|_| AppError::Internal("book shelf lock poisoned (read)".to_string()))
    }

    pub fn write(&self) -> AppResult<RwLockWriteGuard<'_, Shelf>> {
        self.shelf
            .write()
            .map_err(|_| AppError::Internal("book shelf lock poisoned (write)".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::book::BookPayload;
    use chrono::Utc;

    fn book(id: &str, name: &str) -> Book {
        let payload = BookPayload {
            name: Some(name.to_string()),
            ..Default::default()
        };
        Book::new(id.to_string(), name.to_string(), payload, Utc::now())
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let repo = BooksRepository::new();
        {
            let mut shelf = repo.write().unwrap();
            shelf.push(book("b", "Second"));
            shelf.push(book("a", "First"));
        }

        let shelf = repo.read().unwrap();
        let ids: Vec<&str> = shelf.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(shelf.get("a").map(|b| b.name.as_str()), Some("First"));
    }

    #[test]
    fn test_removed_ids_stay_reserved() {
        let repo = BooksRepository::new();
        let mut shelf = repo.write().unwrap();
        shelf.push(book("a", "First"));

        assert!(shelf.remove("a").is_some());
        assert!(shelf.remove("a").is_none());
        assert!(shelf.is_empty());
        assert!(shelf.was_issued("a"));
        assert!(!shelf.was_issued("b"));
    }

    #[test]
    fn test_clones_share_storage() {
        let repo = BooksRepository::new();
        let other = repo.clone();
        repo.write().unwrap().push(book("a", "First"));

        assert_eq!(other.read().unwrap().len(), 1);
    }
}
