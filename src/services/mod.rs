//! Business logic services

pub mod authors;
pub mod catalog;
pub mod lending;
pub mod notifications;
pub mod redis;
pub mod stats;
pub mod users;

use std::sync::Arc;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub authors: authors::AuthorsService,
    pub catalog: catalog::CatalogService,
    pub lending: lending::LendingService,
    pub notifications: notifications::NotificationsService,
    pub stats: stats::StatsService,
    pub users: users::UsersService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        config: &AppConfig,
        redis_service: redis::RedisService,
    ) -> Self {
        Self {
            authors: authors::AuthorsService::new(repository.clone()),
            catalog: catalog::CatalogService::new(repository.clone(), redis_service.clone()),
            lending: lending::LendingService::new(
                Arc::new(repository.clone()),
                redis_service,
                config.lending.loan_period_days,
            ),
            notifications: notifications::NotificationsService::new(repository.clone()),
            stats: stats::StatsService::new(repository.clone()),
            users: users::UsersService::new(repository, config.auth.clone()),
        }
    }
}
