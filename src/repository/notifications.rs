//! Notifications repository for database operations

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::notification::{Notification, NotificationQuery},
};

#[derive(Clone)]
pub struct NotificationsRepository {
    pool: Pool<Postgres>,
}

impl NotificationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get notification by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Notification> {
        let notification =
            sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Notification with id {} not found", id))
                })?;

        Ok(notification)
    }

    /// Persist a notification built by the caller (the id is assigned
    /// application-side, before insertion)
    pub async fn insert(&self, notification: &Notification) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, message, created_at, is_read)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(&notification.message)
        .bind(notification.created_at)
        .bind(notification.is_read)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// List notifications addressed to a user (broadcasts included), newest first
    pub async fn list_for_user(
        &self,
        user_id: i32,
        query: &NotificationQuery,
    ) -> AppResult<(Vec<Notification>, i64)> {
        let (per_page, offset) = super::pagination(query.page, query.per_page);

        let read_filter = if query.unread_only.unwrap_or(false) {
            " AND is_read = FALSE"
        } else {
            ""
        };

        let count_query = format!(
            "SELECT COUNT(*) FROM notifications WHERE (user_id = $1 OR user_id IS NULL){}",
            read_filter
        );
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let select_query = format!(
            r#"
            SELECT * FROM notifications
            WHERE (user_id = $1 OR user_id IS NULL){}
            ORDER BY created_at DESC
            LIMIT {} OFFSET {}
            "#,
            read_filter, per_page, offset
        );
        let notifications = sqlx::query_as::<_, Notification>(&select_query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok((notifications, total))
    }

    /// Count unread notifications for a user (broadcasts included)
    pub async fn unread_count(&self, user_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM notifications
            WHERE (user_id = $1 OR user_id IS NULL) AND is_read = FALSE
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Flip the read flag
    pub async fn mark_read(&self, id: Uuid) -> AppResult<Notification> {
        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.get_by_id(id).await
    }

    /// Delete a notification
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Notification with id {} not found",
                id
            )));
        }

        Ok(())
    }
}
