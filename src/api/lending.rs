//! Borrow and return endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::book::Book};

use super::AuthenticatedUser;

/// Borrow/return request body. When `user_id` is omitted the operation
/// applies to the authenticated user; acting on behalf of another user
/// requires librarian privileges.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoanRequest {
    pub user_id: Option<i32>,
}

fn resolve_user(
    claims: &crate::models::UserClaims,
    requested: Option<i32>,
) -> AppResult<i32> {
    match requested {
        Some(user_id) if user_id != claims.user_id => {
            claims.require_librarian()?;
            Ok(user_id)
        }
        Some(user_id) => Ok(user_id),
        None => Ok(claims.user_id),
    }
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/books/{id}/borrow",
    tag = "lending",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = LoanRequest,
    responses(
        (status = 200, description = "Book borrowed", body = Book),
        (status = 404, description = "Book or user not found"),
        (status = 422, description = "Book is not available")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
    Json(request): Json<LoanRequest>,
) -> AppResult<Json<Book>> {
    let user_id = resolve_user(&claims, request.user_id)?;

    let book = state.services.lending.borrow(book_id, user_id).await?;
    Ok(Json(book))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/books/{id}/return",
    tag = "lending",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = LoanRequest,
    responses(
        (status = 200, description = "Book returned", body = Book),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Book is not borrowed by this user")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
    Json(request): Json<LoanRequest>,
) -> AppResult<Json<Book>> {
    let user_id = resolve_user(&claims, request.user_id)?;

    let book = state.services.lending.return_book(book_id, user_id).await?;
    Ok(Json(book))
}

/// Get books currently borrowed by a user
#[utoipa::path(
    get,
    path = "/users/{id}/loans",
    tag = "lending",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's active loans", body = Vec<Book>),
        (status = 403, description = "Librarian privileges required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<Book>>> {
    if user_id != claims.user_id {
        claims.require_librarian()?;
    }

    let loans = state.services.lending.user_loans(user_id).await?;
    Ok(Json(loans))
}

/// List books on loan past their return date
#[utoipa::path(
    get,
    path = "/loans/overdue",
    tag = "lending",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overdue loans", body = Vec<Book>),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn list_overdue(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    claims.require_librarian()?;

    let overdue = state.services.lending.overdue().await?;
    Ok(Json(overdue))
}
