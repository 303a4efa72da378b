//! Prefetch Configuration

use std::time::Duration;

/// Dwell time before a hover counts as intent
pub const DEFAULT_HOVER_DELAY: Duration = Duration::from_millis(200);

/// Prefetch configuration options
#[derive(Debug, Clone)]
pub struct PrefetchConfig {
    /// Pointer dwell threshold for gated prefetches
    pub hover_delay: Duration,

    /// `Accept` header sent by the fetch and XHR transports
    pub accept: String,

    /// User agent string for the blocking backend
    pub user_agent: String,

    /// Per-request timeout for the blocking backend
    pub request_timeout: Duration,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            hover_delay: DEFAULT_HOVER_DELAY,
            accept: "*/*".to_string(),
            user_agent: format!("warmlink/{}", crate::VERSION),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PrefetchConfig::default();
        assert_eq!(config.hover_delay, Duration::from_millis(200));
        assert_eq!(config.accept, "*/*");
        assert!(config.user_agent.starts_with("warmlink/"));
    }
}
