//! Time utilities and constants for Rateway.

use chrono::Duration;

/// Service timing constants.
pub mod constants {
    use super::Duration;

    /// Rate cache entry lifetime (30 minutes).
    pub fn rate_cache_ttl() -> Duration {
        Duration::seconds(1800)
    }

    /// Upstream rate fetch timeout (5 seconds).
    pub fn upstream_timeout() -> Duration {
        Duration::seconds(5)
    }

    /// Database connection acquire timeout (5 seconds).
    pub fn connection_timeout() -> Duration {
        Duration::seconds(5)
    }
}

/// Duration extensions for convenient construction.
pub trait DurationExt {
    fn as_std(&self) -> std::time::Duration;
}

impl DurationExt for Duration {
    fn as_std(&self) -> std::time::Duration {
        self.to_std().unwrap_or(std::time::Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_cache_ttl() {
        assert_eq!(constants::rate_cache_ttl().num_seconds(), 1800);
    }

    #[test]
    fn test_as_std() {
        assert_eq!(
            constants::upstream_timeout().as_std(),
            std::time::Duration::from_secs(5)
        );
        assert_eq!(Duration::seconds(-1).as_std(), std::time::Duration::ZERO);
    }
}
