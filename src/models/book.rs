//! Book (catalog entry) model and related types.
//!
//! A book carries its own loan state: `is_available` plus the three loan
//! columns (`borrowed_by`, `borrowed_at`, `return_by`), which are all set
//! on borrow and all cleared on return.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use super::author::Author;

/// ISBN-10 (final check digit may be X) or ISBN-13, separators already stripped.
static ISBN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d{9}[\dX]|\d{13})$").expect("invalid ISBN regex"));

/// Validate an ISBN, ignoring hyphens and spaces.
pub fn validate_isbn(isbn: &str) -> Result<(), ValidationError> {
    let cleaned: String = isbn
        .chars()
        .filter(|c| *c != '-' && *c != ' ')
        .collect::<String>()
        .to_uppercase();
    if ISBN_RE.is_match(&cleaned) {
        Ok(())
    } else {
        Err(ValidationError::new("isbn"))
    }
}

/// Full book model (DB + API)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub author_id: i32,
    /// False while the book is out on loan
    pub is_available: bool,
    /// User currently holding the book, None when available
    pub borrowed_by: Option<i32>,
    pub borrowed_at: Option<DateTime<Utc>>,
    pub return_by: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    // Relation (loaded separately)
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

impl Book {
    /// True when the book is on loan past its return date.
    pub fn is_overdue(&self, as_of: DateTime<Utc>) -> bool {
        match self.return_by {
            Some(due) => !self.is_available && due < as_of,
            None => false,
        }
    }
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub isbn: Option<String>,
    pub author_id: i32,
    pub author_name: Option<String>,
    pub is_available: bool,
    pub return_by: Option<DateTime<Utc>>,
}

/// Book query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    /// Filter on availability when set
    pub available: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(custom(function = "validate_isbn", message = "Invalid ISBN"))]
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub author_id: i32,
}

/// Update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    #[validate(custom(function = "validate_isbn", message = "Invalid ISBN"))]
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub author_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn isbn_accepts_ten_and_thirteen_digit_forms() {
        assert!(validate_isbn("2070612759").is_ok());
        assert!(validate_isbn("080442957X").is_ok());
        assert!(validate_isbn("9782070612758").is_ok());
        assert!(validate_isbn("978-2-07-061275-8").is_ok());
        assert!(validate_isbn("2 07 061275 9").is_ok());
    }

    #[test]
    fn isbn_rejects_malformed_values() {
        assert!(validate_isbn("").is_err());
        assert!(validate_isbn("12345").is_err());
        assert!(validate_isbn("97820706127581").is_err());
        assert!(validate_isbn("978207061275X").is_err());
        assert!(validate_isbn("not-an-isbn").is_err());
    }

    #[test]
    fn overdue_requires_active_loan_past_due_date() {
        let now = Utc::now();
        let mut book = Book {
            id: 1,
            title: "The Master and Margarita".to_string(),
            isbn: None,
            description: None,
            author_id: 1,
            is_available: false,
            borrowed_by: Some(7),
            borrowed_at: Some(now - Duration::days(20)),
            return_by: Some(now - Duration::days(6)),
            created_at: None,
            updated_at: None,
            author: None,
        };
        assert!(book.is_overdue(now));

        book.return_by = Some(now + Duration::days(1));
        assert!(!book.is_overdue(now));

        book.is_available = true;
        book.borrowed_by = None;
        book.borrowed_at = None;
        book.return_by = None;
        assert!(!book.is_overdue(now));
    }
}
