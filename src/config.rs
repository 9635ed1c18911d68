use crate::queue::QueueConfig;
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    /// Offline queue tuning (retention, read batch, length cap)
    pub queue: QueueConfig,
    /// Default page size for unread listings
    pub unread_page_size: usize,
}

impl Config {
    fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
        env::var(name)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(default)
    }

    pub fn from_env() -> Result<Self, crate::error::AppError> {
        dotenv().ok();

        let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into());

        let defaults = QueueConfig::default();
        let queue = QueueConfig {
            max_age_ms: Self::parse_env("DELIVERY_QUEUE_MAX_AGE_MS", defaults.max_age_ms),
            batch_size: Self::parse_env("DELIVERY_QUEUE_BATCH_SIZE", defaults.batch_size),
            max_len: Self::parse_env("DELIVERY_QUEUE_MAX_LEN", defaults.max_len),
        };

        if queue.batch_size == 0 {
            return Err(crate::error::AppError::Config(
                "DELIVERY_QUEUE_BATCH_SIZE must be positive".into(),
            ));
        }

        let unread_page_size = Self::parse_env("UNREAD_PAGE_SIZE", 50);

        Ok(Self {
            redis_url,
            queue,
            unread_page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_falls_back_to_default() {
        // Env var absent: the default survives untouched
        assert_eq!(
            Config::parse_env("DELIVERY_TEST_UNSET_VARIABLE", 42usize),
            42
        );
    }
}
