//! Borrow and return lifecycle service.
//!
//! Concurrency control happens in the store: borrow and return are
//! conditional updates that only apply while the book is in the expected
//! state, so two racing borrowers resolve to exactly one winner. When the
//! update does not apply, this service re-reads the book to tell a missing
//! row from an invalid loan state.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    error::{AppError, AppResult},
    models::book::Book,
    repository::LendingStore,
    services::redis::RedisService,
};

#[derive(Clone)]
pub struct LendingService {
    store: Arc<dyn LendingStore>,
    redis: RedisService,
    loan_period_days: i64,
}

impl LendingService {
    pub fn new(store: Arc<dyn LendingStore>, redis: RedisService, loan_period_days: i64) -> Self {
        Self {
            store,
            redis,
            loan_period_days,
        }
    }

    /// Borrow a book for a user. The due date is the loan period from now.
    pub async fn borrow(&self, book_id: i32, user_id: i32) -> AppResult<Book> {
        if !self.store.user_exists(user_id).await? {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                user_id
            )));
        }

        let now = Utc::now();
        let return_by = now + Duration::days(self.loan_period_days);

        match self
            .store
            .borrow_book(book_id, user_id, now, return_by)
            .await?
        {
            Some(book) => {
                tracing::info!(
                    "Book {} borrowed by user {} until {}",
                    book_id,
                    user_id,
                    return_by
                );
                self.invalidate_cache(book_id).await;
                Ok(book)
            }
            None => match self.store.book_by_id(book_id).await? {
                Some(_) => Err(AppError::BusinessRule(
                    "Book is not available for borrowing".to_string(),
                )),
                None => Err(AppError::NotFound(format!(
                    "Book with id {} not found",
                    book_id
                ))),
            },
        }
    }

    /// Return a book held by the given user, clearing its loan state.
    pub async fn return_book(&self, book_id: i32, user_id: i32) -> AppResult<Book> {
        match self.store.return_book(book_id, user_id).await? {
            Some(book) => {
                tracing::info!("Book {} returned by user {}", book_id, user_id);
                self.invalidate_cache(book_id).await;
                Ok(book)
            }
            None => match self.store.book_by_id(book_id).await? {
                Some(book) if book.is_available => Err(AppError::BusinessRule(
                    "Book is not currently borrowed".to_string(),
                )),
                Some(_) => Err(AppError::BusinessRule(
                    "Book is borrowed by another user".to_string(),
                )),
                None => Err(AppError::NotFound(format!(
                    "Book with id {} not found",
                    book_id
                ))),
            },
        }
    }

    /// Books currently held by a user
    pub async fn user_loans(&self, user_id: i32) -> AppResult<Vec<Book>> {
        if !self.store.user_exists(user_id).await? {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                user_id
            )));
        }

        self.store.borrowed_by_user(user_id).await
    }

    /// Books on loan past their return date
    pub async fn overdue(&self) -> AppResult<Vec<Book>> {
        self.store.overdue_books(Utc::now()).await
    }

    async fn invalidate_cache(&self, id: i32) {
        if let Err(e) = self.redis.invalidate_book(id).await {
            tracing::warn!("Book cache invalidation failed for id {}: {}", id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::lending::MockLendingStore;
    use chrono::{DateTime, Utc};
    use mockall::predicate::eq;

    fn service(store: MockLendingStore) -> LendingService {
        LendingService::new(Arc::new(store), RedisService::disconnected(), 14)
    }

    fn available_book(id: i32) -> Book {
        Book {
            id,
            title: format!("Book {}", id),
            isbn: None,
            description: None,
            author_id: 1,
            is_available: true,
            borrowed_by: None,
            borrowed_at: None,
            return_by: None,
            created_at: None,
            updated_at: None,
            author: None,
        }
    }

    fn borrowed_book(id: i32, user_id: i32, now: DateTime<Utc>, due: DateTime<Utc>) -> Book {
        Book {
            is_available: false,
            borrowed_by: Some(user_id),
            borrowed_at: Some(now),
            return_by: Some(due),
            ..available_book(id)
        }
    }

    #[tokio::test]
    async fn borrow_sets_due_date_one_loan_period_ahead() {
        let mut store = MockLendingStore::new();
        store
            .expect_user_exists()
            .with(eq(7))
            .returning(|_| Ok(true));
        store
            .expect_borrow_book()
            .withf(|book_id, user_id, now, return_by| {
                *book_id == 1 && *user_id == 7 && *return_by - *now == Duration::days(14)
            })
            .returning(|id, user, now, due| Ok(Some(borrowed_book(id, user, now, due))));

        let book = service(store).borrow(1, 7).await.unwrap();
        assert!(!book.is_available);
        assert_eq!(book.borrowed_by, Some(7));
        assert!(book.borrowed_at.is_some());
        assert!(book.return_by.is_some());
    }

    #[tokio::test]
    async fn borrow_rejects_unknown_user_without_touching_the_book() {
        let mut store = MockLendingStore::new();
        store
            .expect_user_exists()
            .with(eq(99))
            .returning(|_| Ok(false));
        store.expect_borrow_book().never();

        let err = service(store).borrow(1, 99).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn borrow_of_missing_book_is_not_found() {
        let mut store = MockLendingStore::new();
        store.expect_user_exists().returning(|_| Ok(true));
        store
            .expect_borrow_book()
            .returning(|_, _, _, _| Ok(None));
        store.expect_book_by_id().with(eq(1)).returning(|_| Ok(None));

        let err = service(store).borrow(1, 7).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn borrow_of_book_already_on_loan_is_a_business_rule_failure() {
        let mut store = MockLendingStore::new();
        store.expect_user_exists().returning(|_| Ok(true));
        store
            .expect_borrow_book()
            .returning(|_, _, _, _| Ok(None));
        store.expect_book_by_id().with(eq(1)).returning(|_| {
            let now = Utc::now();
            Ok(Some(borrowed_book(1, 3, now, now + Duration::days(14))))
        });

        let err = service(store).borrow(1, 7).await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn return_by_borrower_restores_availability() {
        let mut store = MockLendingStore::new();
        store
            .expect_return_book()
            .with(eq(1), eq(7))
            .returning(|id, _| Ok(Some(available_book(id))));

        let book = service(store).return_book(1, 7).await.unwrap();
        assert!(book.is_available);
        assert_eq!(book.borrowed_by, None);
        assert_eq!(book.borrowed_at, None);
        assert_eq!(book.return_by, None);
    }

    #[tokio::test]
    async fn return_by_non_borrower_fails_and_leaves_the_loan_in_place() {
        let mut store = MockLendingStore::new();
        store
            .expect_return_book()
            .with(eq(1), eq(8))
            .returning(|_, _| Ok(None));
        store.expect_book_by_id().with(eq(1)).returning(|_| {
            let now = Utc::now();
            Ok(Some(borrowed_book(1, 7, now, now + Duration::days(14))))
        });

        let err = service(store).return_book(1, 8).await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn return_of_book_not_on_loan_is_a_business_rule_failure() {
        let mut store = MockLendingStore::new();
        store
            .expect_return_book()
            .returning(|_, _| Ok(None));
        store
            .expect_book_by_id()
            .with(eq(1))
            .returning(|id| Ok(Some(available_book(id))));

        let err = service(store).return_book(1, 7).await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn return_of_missing_book_is_not_found() {
        let mut store = MockLendingStore::new();
        store
            .expect_return_book()
            .returning(|_, _| Ok(None));
        store.expect_book_by_id().returning(|_| Ok(None));

        let err = service(store).return_book(1, 7).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn user_loans_requires_an_existing_user() {
        let mut store = MockLendingStore::new();
        store
            .expect_user_exists()
            .with(eq(99))
            .returning(|_| Ok(false));
        store.expect_borrowed_by_user().never();

        let err = service(store).user_loans(99).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
