//! Book catalog service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, BookSummary, CreateBook, UpdateBook},
    repository::Repository,
    services::redis::RedisService,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    redis: RedisService,
}

impl CatalogService {
    pub fn new(repository: Repository, redis: RedisService) -> Self {
        Self { repository, redis }
    }

    /// Search books with filters
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<BookSummary>, i64)> {
        self.repository.books.search(query).await
    }

    /// Get book by ID with its author, read through the cache.
    /// Cache trouble never fails the request, it only costs the shortcut.
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        match self.redis.get_cached_book(id).await {
            Ok(Some(book)) => return Ok(book),
            Ok(None) => {}
            Err(e) => tracing::warn!("Book cache read failed, falling back to database: {}", e),
        }

        let mut book = self.repository.books.get_by_id(id).await?;
        book.author = Some(self.repository.authors.get_by_id(book.author_id).await?);

        if let Err(e) = self.redis.cache_book(&book).await {
            tracing::warn!("Book cache write failed: {}", e);
        }

        Ok(book)
    }

    /// Create a new book
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.repository.authors.get_by_id(book.author_id).await?;

        if let Some(ref isbn) = book.isbn {
            if self.repository.books.isbn_exists(isbn, None).await? {
                return Err(AppError::Conflict("ISBN already exists".to_string()));
            }
        }

        self.repository.books.create(&book).await
    }

    /// Update an existing book
    pub async fn update_book(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(author_id) = book.author_id {
            self.repository.authors.get_by_id(author_id).await?;
        }

        if let Some(ref isbn) = book.isbn {
            if self.repository.books.isbn_exists(isbn, Some(id)).await? {
                return Err(AppError::Conflict("ISBN already exists".to_string()));
            }
        }

        let updated = self.repository.books.update(id, &book).await?;
        self.invalidate_cache(id).await;
        Ok(updated)
    }

    /// Delete a book
    pub async fn delete_book(&self, id: i32, force: bool) -> AppResult<()> {
        self.repository.books.delete(id, force).await?;
        self.invalidate_cache(id).await;
        Ok(())
    }

    async fn invalidate_cache(&self, id: i32) {
        if let Err(e) = self.redis.invalidate_book(id).await {
            tracing::warn!("Book cache invalidation failed for id {}: {}", id, e);
        }
    }
}
