//! Notification model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::book::Book;

/// Notification delivery record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    /// Target user, None for broadcast notifications
    pub user_id: Option<i32>,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

impl Notification {
    /// Build the overdue notice for a borrowed book, addressed to its borrower.
    pub fn overdue(book: &Book, borrower: i32, borrowed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: Some(borrower),
            message: format!(
                "Book \"{}\" borrowed on {} is overdue. Please return it to the library.",
                book.title,
                borrowed_at.format("%Y-%m-%d"),
            ),
            created_at: Utc::now(),
            is_read: false,
        }
    }
}

/// Notification query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct NotificationQuery {
    pub unread_only: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create notification request (librarian or admin)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateNotification {
    pub user_id: Option<i32>,
    #[validate(length(min = 1, message = "Message must not be empty"))]
    pub message: String,
}

/// Unread counter response
#[derive(Debug, Serialize, ToSchema)]
pub struct UnreadCount {
    pub unread: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn borrowed_book() -> Book {
        Book {
            id: 42,
            title: "Pale Fire".to_string(),
            isbn: Some("9780679723424".to_string()),
            description: None,
            author_id: 3,
            is_available: false,
            borrowed_by: Some(9),
            borrowed_at: Some(Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()),
            return_by: Some(Utc.with_ymd_and_hms(2025, 3, 15, 10, 0, 0).unwrap()),
            created_at: None,
            updated_at: None,
            author: None,
        }
    }

    #[test]
    fn overdue_notice_targets_borrower_and_is_unread() {
        let book = borrowed_book();
        let notice = Notification::overdue(&book, 9, book.borrowed_at.unwrap());
        assert_eq!(notice.user_id, Some(9));
        assert!(!notice.is_read);
        assert!(!notice.message.is_empty());
    }

    #[test]
    fn overdue_notice_embeds_title_and_borrow_date() {
        let book = borrowed_book();
        let notice = Notification::overdue(&book, 9, book.borrowed_at.unwrap());
        assert!(notice.message.contains("Pale Fire"));
        assert!(notice.message.contains("2025-03-01"));
    }

    #[test]
    fn overdue_notices_get_distinct_identities() {
        let book = borrowed_book();
        let a = Notification::overdue(&book, 9, book.borrowed_at.unwrap());
        let b = Notification::overdue(&book, 9, book.borrowed_at.unwrap());
        assert_ne!(a.id, b.id);
    }
}
