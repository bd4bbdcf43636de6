//! Repository layer for database operations

pub mod authors;
pub mod books;
pub mod lending;
pub mod notifications;
pub mod users;

use sqlx::{Pool, Postgres};

pub use lending::LendingStore;

/// Normalize pagination query values before they reach SQL: pages start
/// at 1 and per_page is clamped to 1..=100, so out-of-range client input
/// can never produce a negative LIMIT or OFFSET. Returns (per_page, offset).
pub(crate) fn pagination(page: Option<i64>, per_page: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(20).clamp(1, 100);
    (per_page, (page - 1) * per_page)
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub authors: authors::AuthorsRepository,
    pub books: books::BooksRepository,
    pub users: users::UsersRepository,
    pub notifications: notifications::NotificationsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: authors::AuthorsRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            notifications: notifications::NotificationsRepository::new(pool.clone()),
            pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::pagination;

    #[test]
    fn pagination_defaults_to_first_page_of_twenty() {
        assert_eq!(pagination(None, None), (20, 0));
        assert_eq!(pagination(Some(3), Some(10)), (10, 20));
    }

    #[test]
    fn pagination_never_goes_negative() {
        // page=0 and negative values would otherwise reach SQL as a
        // negative OFFSET/LIMIT
        assert_eq!(pagination(Some(0), None), (20, 0));
        assert_eq!(pagination(Some(-5), Some(-1)), (1, 0));
    }

    #[test]
    fn pagination_caps_page_size() {
        assert_eq!(pagination(Some(1), Some(10_000)), (100, 0));
        assert_eq!(pagination(Some(2), Some(10_000)), (100, 100));
    }
}
