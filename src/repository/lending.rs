//! Store abstraction for the lending lifecycle.
//!
//! The lending service and the overdue scanner both go through this trait
//! rather than the concrete repositories, so their logic can be exercised
//! against a mock without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::AppResult,
    models::{book::Book, notification::Notification},
};

use super::Repository;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LendingStore: Send + Sync {
    /// Fresh read of a book, None when it no longer exists
    async fn book_by_id(&self, id: i32) -> AppResult<Option<Book>>;

    /// Whether a user exists
    async fn user_exists(&self, id: i32) -> AppResult<bool>;

    /// Atomically claim an available book for a user. None when the book
    /// is missing or already on loan.
    async fn borrow_book(
        &self,
        book_id: i32,
        user_id: i32,
        now: DateTime<Utc>,
        return_by: DateTime<Utc>,
    ) -> AppResult<Option<Book>>;

    /// Atomically clear a loan held by the given user. None when the book
    /// is missing or not held by that user.
    async fn return_book(&self, book_id: i32, user_id: i32) -> AppResult<Option<Book>>;

    /// Books on loan past their return date
    async fn overdue_books(&self, as_of: DateTime<Utc>) -> AppResult<Vec<Book>>;

    /// Books currently held by a user
    async fn borrowed_by_user(&self, user_id: i32) -> AppResult<Vec<Book>>;

    /// Persist a notification
    async fn add_notification(&self, notification: &Notification) -> AppResult<()>;
}

#[async_trait]
impl LendingStore for Repository {
    async fn book_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        self.books.find_by_id(id).await
    }

    async fn user_exists(&self, id: i32) -> AppResult<bool> {
        self.users.exists(id).await
    }

    async fn borrow_book(
        &self,
        book_id: i32,
        user_id: i32,
        now: DateTime<Utc>,
        return_by: DateTime<Utc>,
    ) -> AppResult<Option<Book>> {
        self.books.borrow(book_id, user_id, now, return_by).await
    }

    async fn return_book(&self, book_id: i32, user_id: i32) -> AppResult<Option<Book>> {
        self.books.return_book(book_id, user_id).await
    }

    async fn overdue_books(&self, as_of: DateTime<Utc>) -> AppResult<Vec<Book>> {
        self.books.find_overdue(as_of).await
    }

    async fn borrowed_by_user(&self, user_id: i32) -> AppResult<Vec<Book>> {
        self.books.find_borrowed_by(user_id).await
    }

    async fn add_notification(&self, notification: &Notification) -> AppResult<()> {
        self.notifications.insert(notification).await
    }
}
