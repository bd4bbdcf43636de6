//! Notification endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::notification::{CreateNotification, Notification, NotificationQuery, UnreadCount},
    models::UserClaims,
};

use super::books::PaginatedResponse;
use super::AuthenticatedUser;

/// Members may only act on notifications addressed to them (or broadcasts);
/// librarians may act on any.
fn require_recipient(claims: &UserClaims, notification: &Notification) -> AppResult<()> {
    match notification.user_id {
        Some(user_id) if user_id == claims.user_id => Ok(()),
        None => Ok(()),
        Some(_) => claims.require_librarian(),
    }
}

/// List notifications for the authenticated user, broadcasts included
#[utoipa::path(
    get,
    path = "/notifications",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(
        ("unread_only" = Option<bool>, Query, description = "Only unread notifications"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Notifications", body = PaginatedResponse<Notification>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_notifications(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<NotificationQuery>,
) -> AppResult<Json<PaginatedResponse<Notification>>> {
    let (notifications, total) = state
        .services
        .notifications
        .list_for_user(claims.user_id, &query)
        .await?;

    Ok(Json(PaginatedResponse {
        items: notifications,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Count unread notifications for the authenticated user
#[utoipa::path(
    get,
    path = "/notifications/unread-count",
    tag = "notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Unread notification count", body = UnreadCount),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn unread_count(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UnreadCount>> {
    let unread = state
        .services
        .notifications
        .unread_count(claims.user_id)
        .await?;
    Ok(Json(UnreadCount { unread }))
}

/// Create a notification by hand
#[utoipa::path(
    post,
    path = "/notifications",
    tag = "notifications",
    security(("bearer_auth" = [])),
    request_body = CreateNotification,
    responses(
        (status = 201, description = "Notification created", body = Notification),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Librarian privileges required"),
        (status = 404, description = "Target user not found")
    )
)]
pub async fn create_notification(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateNotification>,
) -> AppResult<(StatusCode, Json<Notification>)> {
    claims.require_librarian()?;

    let created = state.services.notifications.create(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Mark a notification as read
#[utoipa::path(
    put,
    path = "/notifications/{id}/read",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked read", body = Notification),
        (status = 403, description = "Not the recipient"),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn mark_read(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Notification>> {
    let notification = state.services.notifications.get_by_id(id).await?;
    require_recipient(&claims, &notification)?;

    let updated = state.services.notifications.mark_read(id).await?;
    Ok(Json(updated))
}

/// Delete a notification
#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Notification ID")
    ),
    responses(
        (status = 204, description = "Notification deleted"),
        (status = 403, description = "Not the recipient"),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn delete_notification(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let notification = state.services.notifications.get_by_id(id).await?;
    require_recipient(&claims, &notification)?;

    state.services.notifications.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
