//! Statistics endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedUser;

/// Statistics response
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    /// Book statistics
    pub books: BookStats,
    /// Total number of authors
    pub authors: i64,
    /// User statistics
    pub users: UserStats,
    /// Notification statistics
    pub notifications: NotificationStats,
}

#[derive(Serialize, ToSchema)]
pub struct BookStats {
    /// Total number of books
    pub total: i64,
    /// Books currently on the shelf
    pub available: i64,
    /// Books currently out on loan
    pub on_loan: i64,
    /// Books on loan past their return date
    pub overdue: i64,
}

#[derive(Serialize, ToSchema)]
pub struct UserStats {
    /// Total number of users
    pub total: i64,
    /// Users with at least one active loan
    pub active_borrowers: i64,
}

#[derive(Serialize, ToSchema)]
pub struct NotificationStats {
    /// Total number of notifications
    pub total: i64,
    /// Notifications not yet marked read
    pub unread: i64,
}

/// Get library statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Library statistics", body = StatsResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<StatsResponse>> {
    claims.require_librarian()?;

    let stats = state.services.stats.get_stats().await?;
    Ok(Json(stats))
}
