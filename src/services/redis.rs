//! Redis service for caching book details

use redis::{AsyncCommands, Client};

use crate::{
    error::{AppError, AppResult},
    models::book::Book,
};

#[derive(Clone)]
pub struct RedisService {
    client: Client,
    cache_ttl_seconds: u64,
}

impl RedisService {
    /// Create a new Redis service
    pub async fn new(url: &str, cache_ttl_seconds: u64) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        // Test connection
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self {
            client,
            cache_ttl_seconds,
        })
    }

    /// Client pointed at a closed port, for unit tests that only need the
    /// error path. `Client::open` does not connect, so this never blocks.
    #[cfg(test)]
    pub(crate) fn disconnected() -> Self {
        Self {
            client: Client::open("redis://127.0.0.1:1/").expect("static test url"),
            cache_ttl_seconds: 1,
        }
    }

    fn book_key(id: i32) -> String {
        format!("book:{}", id)
    }

    /// Cache a book's detail view with the configured expiration
    pub async fn cache_book(&self, book: &Book) -> AppResult<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))?;

        let json = serde_json::to_string(book)
            .map_err(|e| AppError::Internal(format!("Failed to serialize book: {}", e)))?;

        conn.set_ex::<_, _, ()>(Self::book_key(book.id), json, self.cache_ttl_seconds)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to cache book in Redis: {}", e)))?;

        Ok(())
    }

    /// Fetch a cached book, None on miss
    pub async fn get_cached_book(&self, id: i32) -> AppResult<Option<Book>> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))?;

        let cached: Option<String> = conn
            .get(Self::book_key(id))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get book from Redis: {}", e)))?;

        match cached {
            Some(json) => {
                let book = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Failed to deserialize cached book: {}", e))
                })?;
                Ok(Some(book))
            }
            None => Ok(None),
        }
    }

    /// Drop a book from the cache (after any mutation of its row)
    pub async fn invalidate_book(&self, id: i32) -> AppResult<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))?;

        let _: () = conn
            .del(Self::book_key(id))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete book from Redis: {}", e)))?;

        Ok(())
    }
}
