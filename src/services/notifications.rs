//! Notification management service

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::notification::{CreateNotification, Notification, NotificationQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct NotificationsService {
    repository: Repository,
}

impl NotificationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get notification by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Notification> {
        self.repository.notifications.get_by_id(id).await
    }

    /// List notifications addressed to a user, broadcasts included
    pub async fn list_for_user(
        &self,
        user_id: i32,
        query: &NotificationQuery,
    ) -> AppResult<(Vec<Notification>, i64)> {
        self.repository
            .notifications
            .list_for_user(user_id, query)
            .await
    }

    /// Count unread notifications for a user
    pub async fn unread_count(&self, user_id: i32) -> AppResult<i64> {
        self.repository.notifications.unread_count(user_id).await
    }

    /// Create a notification by hand (outside the overdue scanner)
    pub async fn create(&self, req: CreateNotification) -> AppResult<Notification> {
        req.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(user_id) = req.user_id {
            if !self.repository.users.exists(user_id).await? {
                return Err(AppError::NotFound(format!(
                    "User with id {} not found",
                    user_id
                )));
            }
        }

        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: req.user_id,
            message: req.message,
            created_at: Utc::now(),
            is_read: false,
        };

        self.repository.notifications.insert(&notification).await?;

        Ok(notification)
    }

    /// Flip the read flag
    pub async fn mark_read(&self, id: Uuid) -> AppResult<Notification> {
        self.repository.notifications.mark_read(id).await
    }

    /// Delete a notification
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.notifications.delete(id).await
    }
}
