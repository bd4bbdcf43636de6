//! Statistics service

use crate::{
    api::stats::{BookStats, NotificationStats, StatsResponse, UserStats},
    error::AppResult,
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Database connectivity probe for the readiness endpoint
    pub async fn ping_database(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.repository.pool)
            .await?;
        Ok(())
    }

    /// Get library statistics
    pub async fn get_stats(&self) -> AppResult<StatsResponse> {
        let pool = &self.repository.pool;

        let total_books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(pool)
            .await?;

        let on_loan: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE is_available = FALSE")
                .fetch_one(pool)
                .await?;

        let overdue: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM books WHERE is_available = FALSE AND return_by < NOW()",
        )
        .fetch_one(pool)
        .await?;

        let total_authors: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(pool)
            .await?;

        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        let active_borrowers: i64 =
            sqlx::query_scalar("SELECT COUNT(DISTINCT borrowed_by) FROM books WHERE borrowed_by IS NOT NULL")
                .fetch_one(pool)
                .await?;

        let total_notifications: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications")
            .fetch_one(pool)
            .await?;

        let unread_notifications: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE is_read = FALSE")
                .fetch_one(pool)
                .await?;

        Ok(StatsResponse {
            books: BookStats {
                total: total_books,
                available: total_books - on_loan,
                on_loan,
                overdue,
            },
            authors: total_authors,
            users: UserStats {
                total: total_users,
                active_borrowers,
            },
            notifications: NotificationStats {
                total: total_notifications,
                unread: unread_notifications,
            },
        })
    }
}
