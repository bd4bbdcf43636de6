//! Overdue loan scanner.
//!
//! A single background loop that wakes on a fixed interval, queries for
//! books on loan past their return date, and records one notification per
//! overdue book addressed to its borrower. Errors never stop the loop:
//! a failed cycle is logged and the next tick tries again. There is no
//! deduplication — a book that stays overdue gets a fresh notification
//! every cycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time;

use crate::{
    error::AppResult,
    models::notification::Notification,
    repository::LendingStore,
};

pub struct OverdueScanner {
    store: Arc<dyn LendingStore>,
    interval: Duration,
}

impl OverdueScanner {
    pub fn new(store: Arc<dyn LendingStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Run the scan loop until the shutdown channel flips to `true`.
    ///
    /// Shutdown is observed between cycles, not mid-cycle: a scan that is
    /// already underway finishes before the loop exits.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = time::interval(self.interval);

        tracing::info!(
            "Overdue scanner started (interval: {}s)",
            self.interval.as_secs()
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.scan_once().await {
                        Ok(0) => tracing::debug!("Overdue scan: nothing due"),
                        Ok(n) => tracing::info!("Overdue scan: {} notification(s) created", n),
                        Err(e) => tracing::error!("Overdue scan failed, will retry next cycle: {}", e),
                    }
                }

                changed = shutdown.changed() => {
                    // A dropped sender counts as shutdown too
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Overdue scanner stopped");
    }

    /// One scan cycle. Returns the number of notifications created.
    pub async fn scan_once(&self) -> AppResult<usize> {
        let now = Utc::now();
        let overdue = self.store.overdue_books(now).await?;

        let mut created = 0;
        for stale in overdue {
            // Fresh read: the book may have been returned or removed
            // between the overdue query and this point. Skip it then.
            let book = match self.store.book_by_id(stale.id).await? {
                Some(book) => book,
                None => continue,
            };

            let (borrower, borrowed_at) = match (book.borrowed_by, book.borrowed_at) {
                (Some(user_id), Some(at)) if !book.is_available => (user_id, at),
                _ => continue,
            };

            let notification = Notification::overdue(&book, borrower, borrowed_at);
            self.store.add_notification(&notification).await?;
            created += 1;

            tracing::debug!(
                "Overdue notice for book {} sent to user {}",
                book.id,
                borrower
            );
        }

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::book::Book;
    use crate::repository::lending::MockLendingStore;
    use chrono::Duration as ChronoDuration;
    use mockall::predicate::eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn overdue_book(id: i32, user_id: i32) -> Book {
        let now = Utc::now();
        Book {
            id,
            title: format!("Book {}", id),
            isbn: None,
            description: None,
            author_id: 1,
            is_available: false,
            borrowed_by: Some(user_id),
            borrowed_at: Some(now - ChronoDuration::days(20)),
            return_by: Some(now - ChronoDuration::days(6)),
            created_at: None,
            updated_at: None,
            author: None,
        }
    }

    fn scanner(store: MockLendingStore) -> OverdueScanner {
        OverdueScanner::new(Arc::new(store), Duration::from_millis(10))
    }

    #[tokio::test]
    async fn cycle_creates_one_notification_per_overdue_book() {
        let mut store = MockLendingStore::new();
        store
            .expect_overdue_books()
            .returning(|_| Ok(vec![overdue_book(1, 7)]));
        store
            .expect_book_by_id()
            .with(eq(1))
            .returning(|id| Ok(Some(overdue_book(id, 7))));
        store
            .expect_add_notification()
            .withf(|n| n.user_id == Some(7) && !n.message.is_empty() && !n.is_read)
            .times(1)
            .returning(|_| Ok(()));

        let created = scanner(store).scan_once().await.unwrap();
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn repeated_cycles_repeat_the_notification() {
        // No suppression: a book that stays overdue is reported every cycle.
        let mut store = MockLendingStore::new();
        store
            .expect_overdue_books()
            .returning(|_| Ok(vec![overdue_book(1, 7)]));
        store
            .expect_book_by_id()
            .returning(|id| Ok(Some(overdue_book(id, 7))));
        store
            .expect_add_notification()
            .times(2)
            .returning(|_| Ok(()));

        let scanner = scanner(store);
        assert_eq!(scanner.scan_once().await.unwrap(), 1);
        assert_eq!(scanner.scan_once().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn cycle_skips_books_gone_by_the_time_of_the_detail_read() {
        let mut store = MockLendingStore::new();
        store
            .expect_overdue_books()
            .returning(|_| Ok(vec![overdue_book(1, 7), overdue_book(2, 8)]));
        store
            .expect_book_by_id()
            .with(eq(1))
            .returning(|_| Ok(None));
        store
            .expect_book_by_id()
            .with(eq(2))
            .returning(|id| Ok(Some(overdue_book(id, 8))));
        store
            .expect_add_notification()
            .withf(|n| n.user_id == Some(8))
            .times(1)
            .returning(|_| Ok(()));

        let created = scanner(store).scan_once().await.unwrap();
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn cycle_skips_books_returned_since_the_overdue_query() {
        let mut store = MockLendingStore::new();
        store
            .expect_overdue_books()
            .returning(|_| Ok(vec![overdue_book(1, 7)]));
        store.expect_book_by_id().with(eq(1)).returning(|id| {
            let mut book = overdue_book(id, 7);
            book.is_available = true;
            book.borrowed_by = None;
            book.borrowed_at = None;
            book.return_by = None;
            Ok(Some(book))
        });
        store.expect_add_notification().never();

        let created = scanner(store).scan_once().await.unwrap();
        assert_eq!(created, 0);
    }

    #[tokio::test]
    async fn loop_survives_a_failing_cycle() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();

        let mut store = MockLendingStore::new();
        store.expect_overdue_books().returning(move |_| {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::Internal("store offline".to_string()))
            } else {
                Ok(vec![])
            }
        });

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(scanner(store).run(shutdown_rx));

        tokio::time::sleep(Duration::from_millis(80)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        // The first cycle failed; the loop kept ticking afterwards.
        assert!(calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn shutdown_signal_stops_the_loop() {
        let mut store = MockLendingStore::new();
        store.expect_overdue_books().returning(|_| Ok(vec![]));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(scanner(store).run(shutdown_rx));

        tokio::time::sleep(Duration::from_millis(30)).await;
        shutdown_tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("scanner did not stop after shutdown signal")
            .unwrap();
    }
}
