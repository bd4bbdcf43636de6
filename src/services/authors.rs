//! Author management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::author::{Author, AuthorQuery, AuthorSummary, CreateAuthor, UpdateAuthor},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search authors
    pub async fn search(&self, query: &AuthorQuery) -> AppResult<(Vec<AuthorSummary>, i64)> {
        self.repository.authors.search(query).await
    }

    /// Get author by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    /// Create a new author
    pub async fn create(&self, author: CreateAuthor) -> AppResult<Author> {
        author
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.repository.authors.create(&author).await
    }

    /// Update an existing author
    pub async fn update(&self, id: i32, author: UpdateAuthor) -> AppResult<Author> {
        author
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.repository.authors.update(id, &author).await
    }

    /// Delete an author
    pub async fn delete(&self, id: i32, force: bool) -> AppResult<()> {
        self.repository.authors.delete(id, force).await
    }
}
