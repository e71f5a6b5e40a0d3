// libs/infra/dispatcher/src/config.rs

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub batch_size: i64,
    pub poll_interval: Duration,
    pub max_retries: i32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub consecutive_failure_threshold: u32,
    pub topic_prefix: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            poll_interval: Duration::from_secs(1),
            max_retries: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            consecutive_failure_threshold: 10,
            topic_prefix: "payments".to_string(),
        }
    }
}
