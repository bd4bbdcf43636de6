//! Authors repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::author::{Author, AuthorQuery, AuthorSummary, CreateAuthor, UpdateAuthor},
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get author by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        let author = sqlx::query_as::<_, Author>("SELECT id, name, bio FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))?;

        Ok(author)
    }

    /// Search authors with pagination
    pub async fn search(&self, query: &AuthorQuery) -> AppResult<(Vec<AuthorSummary>, i64)> {
        let (per_page, offset) = super::pagination(query.page, query.per_page);

        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref name) = query.name {
            params.push(format!("%{}%", name.to_lowercase()));
            conditions.push(format!("LOWER(name) LIKE ${}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_query = format!("SELECT COUNT(*) FROM authors {}", where_clause);

        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_builder = count_builder.bind(param);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_query = format!(
            r#"
            SELECT a.id, a.name,
                   (SELECT COUNT(*) FROM books b WHERE b.author_id = a.id) as nb_books
            FROM authors a
            {}
            ORDER BY a.name, a.id
            LIMIT {} OFFSET {}
            "#,
            where_clause, per_page, offset
        );

        let mut select_builder = sqlx::query_as::<_, AuthorSummary>(&select_query);
        for param in &params {
            select_builder = select_builder.bind(param);
        }
        let authors = select_builder.fetch_all(&self.pool).await?;

        Ok((authors, total))
    }

    /// Create a new author
    pub async fn create(&self, author: &CreateAuthor) -> AppResult<Author> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO authors (name, bio) VALUES ($1, $2) RETURNING id",
        )
        .bind(&author.name)
        .bind(&author.bio)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Update an existing author
    pub async fn update(&self, id: i32, author: &UpdateAuthor) -> AppResult<Author> {
        let mut sets = Vec::new();

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, sets.len() + 1));
                }
            };
        }

        add_field!(author.name, "name");
        add_field!(author.bio, "bio");

        if !sets.is_empty() {
            let query = format!("UPDATE authors SET {} WHERE id = {}", sets.join(", "), id);

            let mut builder = sqlx::query(&query);

            macro_rules! bind_field {
                ($field:expr) => {
                    if let Some(ref val) = $field {
                        builder = builder.bind(val);
                    }
                };
            }

            bind_field!(author.name);
            bind_field!(author.bio);

            builder.execute(&self.pool).await?;
        }

        self.get_by_id(id).await
    }

    /// Delete an author. Refuses while books still reference the author
    /// unless force is set, in which case those books go too.
    pub async fn delete(&self, id: i32, force: bool) -> AppResult<()> {
        self.get_by_id(id).await?;

        let nb_books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        if nb_books > 0 && !force {
            return Err(AppError::BusinessRule(
                "Author still has books in the catalog. Use force=true to delete them as well."
                    .to_string(),
            ));
        }

        if nb_books > 0 {
            sqlx::query("DELETE FROM books WHERE author_id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
        }

        sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
