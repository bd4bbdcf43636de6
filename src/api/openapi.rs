//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, health, lending, notifications, stats, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Athenaeum API",
        version = "1.0.0",
        description = "Library Management System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        // Lending
        lending::borrow_book,
        lending::return_book,
        lending::get_user_loans,
        lending::list_overdue,
        // Notifications
        notifications::list_notifications,
        notifications::unread_count,
        notifications::create_notification,
        notifications::mark_read,
        notifications::delete_notification,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::BookQuery,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Authors
            crate::models::author::Author,
            crate::models::author::AuthorSummary,
            crate::models::author::AuthorQuery,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            // Users
            crate::models::user::User,
            crate::models::user::UserSummary,
            crate::models::user::UserQuery,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::user::Role,
            crate::models::user::LoginRequest,
            crate::models::user::LoginResponse,
            // Lending
            lending::LoanRequest,
            // Notifications
            crate::models::notification::Notification,
            crate::models::notification::NotificationQuery,
            crate::models::notification::CreateNotification,
            crate::models::notification::UnreadCount,
            // Stats
            stats::StatsResponse,
            stats::BookStats,
            stats::UserStats,
            stats::NotificationStats,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "authors", description = "Author management"),
        (name = "users", description = "User management"),
        (name = "lending", description = "Borrow and return lifecycle"),
        (name = "notifications", description = "Notification delivery"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
