use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::app::error::{StoreError, StoreResult, ValidationError};
use crate::app::filter::BookFilter;
use crate::app::model::{Book, BookInput, BookSummary};

pub const BOOK_ID_LEN: usize = 16;

#[async_trait]
pub trait BookStore: Send + Sync {
    /// Validates and appends a new book, returning its generated id.
    async fn add(&self, input: BookInput) -> StoreResult<String>;
    /// Projects the books selected by `filter`, in insertion order.
    async fn list(&self, filter: &BookFilter) -> Vec<BookSummary>;
    async fn get(&self, id: &str) -> StoreResult<Book>;
    /// Validates before looking up `id`, so an invalid payload wins over a missing book.
    async fn update(&self, id: &str, input: BookInput) -> StoreResult<()>;
    async fn delete(&self, id: &str) -> StoreResult<()>;
    async fn len(&self) -> usize;
}

/// Process-local store. Every operation holds the lock for its whole linear scan.
#[derive(Debug, Default)]
pub struct InMemoryBookStore {
    books: Mutex<Vec<Book>>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn add(&self, input: BookInput) -> StoreResult<String> {
        let name = validate(&input)?;
        let now = Utc::now();

        let mut books = self.books.lock().await;
        let mut id = new_book_id();
        while books.iter().any(|book| book.id == id) {
            id = new_book_id();
        }

        books.push(Book {
            id: id.clone(),
            name,
            year: input.year,
            author: input.author,
            summary: input.summary,
            publisher: input.publisher,
            page_count: input.page_count,
            read_page: input.read_page,
            reading: input.reading,
            finished: input.page_count == input.read_page,
            inserted_at: now,
            updated_at: now,
        });

        if !books.iter().any(|book| book.id == id) {
            return Err(StoreError::Internal(format!(
                "book {id} missing after insert"
            )));
        }

        tracing::info!(book_id = %id, total = books.len(), "book added");
        Ok(id)
    }

    async fn list(&self, filter: &BookFilter) -> Vec<BookSummary> {
        let books = self.books.lock().await;
        books
            .iter()
            .filter(|book| filter.matches(book))
            .map(Book::to_summary)
            .collect()
    }

    async fn get(&self, id: &str) -> StoreResult<Book> {
        let books = self.books.lock().await;
        books
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: &str, input: BookInput) -> StoreResult<()> {
        let name = validate(&input)?;
        let now = Utc::now();

        let mut books = self.books.lock().await;
        let book = books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or(StoreError::NotFound)?;
        book.apply(input, name, now);

        tracing::info!(book_id = %id, "book updated");
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut books = self.books.lock().await;
        let index = books
            .iter()
            .position(|book| book.id == id)
            .ok_or(StoreError::NotFound)?;
        books.remove(index);

        tracing::info!(book_id = %id, total = books.len(), "book deleted");
        Ok(())
    }

    async fn len(&self) -> usize {
        self.books.lock().await.len()
    }
}

fn validate(input: &BookInput) -> Result<String, ValidationError> {
    let name = match input.name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(ValidationError::NameRequired),
    };
    if input.read_page > input.page_count {
        return Err(ValidationError::ReadPageExceedsPageCount);
    }
    Ok(name)
}

fn new_book_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(BOOK_ID_LEN);
    id
}

#[cfg(test)]
mod tests {
    use crate::app::model::ListQuery;

    use super::*;

    fn input(name: &str, page_count: u32, read_page: u32) -> BookInput {
        BookInput {
            name: Some(name.to_string()),
            year: 2020,
            author: "X".to_string(),
            summary: "s".to_string(),
            publisher: "P".to_string(),
            page_count,
            read_page,
            reading: false,
        }
    }

    #[tokio::test]
    async fn add_derives_finished_and_stamps_timestamps() -> anyhow::Result<()> {
        let store = InMemoryBookStore::new();

        let done = store.add(input("A", 100, 100)).await?;
        let wip = store.add(input("B", 100, 10)).await?;

        let done = store.get(&done).await?;
        assert!(done.finished);
        assert_eq!(done.inserted_at, done.updated_at);
        assert_eq!(done.id.len(), BOOK_ID_LEN);
        assert!(!store.get(&wip).await?.finished);
        Ok(())
    }

    #[tokio::test]
    async fn add_rejects_missing_or_empty_name_before_page_check() {
        let store = InMemoryBookStore::new();

        let mut missing = input("", 1, 5);
        missing.name = None;
        assert_eq!(
            store.add(missing).await,
            Err(StoreError::Validation(ValidationError::NameRequired))
        );
        assert_eq!(
            store.add(input("", 1, 5)).await,
            Err(StoreError::Validation(ValidationError::NameRequired))
        );
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn add_rejects_read_page_beyond_page_count() {
        let store = InMemoryBookStore::new();
        assert_eq!(
            store.add(input("A", 100, 150)).await,
            Err(StoreError::Validation(
                ValidationError::ReadPageExceedsPageCount
            ))
        );
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn ids_are_unique() -> anyhow::Result<()> {
        let store = InMemoryBookStore::new();
        let mut ids = std::collections::HashSet::new();
        for i in 0..200 {
            ids.insert(store.add(input(&format!("book {i}"), 1, 0)).await?);
        }
        assert_eq!(ids.len(), 200);
        Ok(())
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() -> anyhow::Result<()> {
        let store = InMemoryBookStore::new();
        let a = store.add(input("A", 1, 0)).await?;
        let b = store.add(input("B", 1, 0)).await?;
        let c = store.add(input("C", 1, 0)).await?;

        let listed = store
            .list(&BookFilter::from_query(&ListQuery::default()))
            .await;
        let ids: Vec<_> = listed.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, [a.as_str(), b.as_str(), c.as_str()]);
        assert_eq!(listed[1].publisher, "P");
        Ok(())
    }

    #[tokio::test]
    async fn update_replaces_mutable_fields_only() -> anyhow::Result<()> {
        let store = InMemoryBookStore::new();
        let id = store.add(input("A", 100, 10)).await?;
        let before = store.get(&id).await?;

        let mut next = input("A2", 200, 200);
        next.reading = true;
        store.update(&id, next).await?;

        let after = store.get(&id).await?;
        assert_eq!(after.id, before.id);
        assert_eq!(after.inserted_at, before.inserted_at);
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(after.name, "A2");
        assert_eq!(after.page_count, 200);
        assert!(after.reading);
        assert!(after.finished);
        Ok(())
    }

    #[tokio::test]
    async fn update_validates_before_lookup() {
        let store = InMemoryBookStore::new();
        assert_eq!(
            store.update("missing", input("", 1, 0)).await,
            Err(StoreError::Validation(ValidationError::NameRequired))
        );
        assert_eq!(
            store.update("missing", input("A", 1, 2)).await,
            Err(StoreError::Validation(
                ValidationError::ReadPageExceedsPageCount
            ))
        );
        assert_eq!(
            store.update("missing", input("A", 1, 0)).await,
            Err(StoreError::NotFound)
        );
    }

    #[tokio::test]
    async fn delete_removes_and_then_reports_not_found() -> anyhow::Result<()> {
        let store = InMemoryBookStore::new();
        let id = store.add(input("A", 1, 0)).await?;

        store.delete(&id).await?;
        assert_eq!(store.get(&id).await, Err(StoreError::NotFound));
        assert_eq!(store.delete(&id).await, Err(StoreError::NotFound));
        assert_eq!(store.len().await, 0);
        Ok(())
    }
}
