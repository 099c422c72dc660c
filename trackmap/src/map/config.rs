//! Download configuration.
//!
//! Controls how tile downloads behave: how many requests may be on the
//! wire at once, how long a single request may take, how often a failed
//! tile is retried, and whether tiles already on disk are reused.

use std::time::Duration;

/// Default number of tile requests in flight at once.
///
/// Tile servers for the free sources are shared community infrastructure,
/// so the default keeps transfers strictly sequential. Raise it via
/// [`DownloadConfig::with_max_in_flight`] when the source allows it.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 1;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of attempts per tile (first try plus retries).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Configuration for a tile download run.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use trackmap::map::DownloadConfig;
///
/// let config = DownloadConfig::new()
///     .with_max_in_flight(4)
///     .with_request_timeout(Duration::from_secs(10))
///     .with_max_attempts(2);
///
/// assert_eq!(config.max_in_flight(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadConfig {
    max_in_flight: usize,
    request_timeout: Duration,
    max_attempts: u32,
    reuse_cached: bool,
}

impl DownloadConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            reuse_cached: false,
        }
    }

    /// Sets the maximum number of requests in flight at once.
    ///
    /// Values below 1 are treated as 1.
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// Sets the timeout for a single tile request.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the number of attempts per tile before it is reported failed.
    ///
    /// Values below 1 are treated as 1.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Reuse non-empty cache files instead of fetching the tile again.
    pub fn with_reuse_cached(mut self, reuse: bool) -> Self {
        self.reuse_cached = reuse;
        self
    }

    /// Maximum number of requests in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Timeout for a single tile request.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Number of attempts per tile.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether non-empty cache files are reused without a fetch.
    pub fn reuse_cached(&self) -> bool {
        self.reuse_cached
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DownloadConfig::new();
        assert_eq!(config.max_in_flight(), DEFAULT_MAX_IN_FLIGHT);
        assert_eq!(config.request_timeout(), DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.max_attempts(), DEFAULT_MAX_ATTEMPTS);
        assert!(!config.reuse_cached());
    }

    #[test]
    fn test_default_trait_matches_new() {
        assert_eq!(DownloadConfig::default(), DownloadConfig::new());
    }

    #[test]
    fn test_with_max_in_flight() {
        let config = DownloadConfig::new().with_max_in_flight(8);
        assert_eq!(config.max_in_flight(), 8);
    }

    #[test]
    fn test_max_in_flight_floor() {
        let config = DownloadConfig::new().with_max_in_flight(0);
        assert_eq!(config.max_in_flight(), 1);
    }

    #[test]
    fn test_with_request_timeout() {
        let config = DownloadConfig::new().with_request_timeout(Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_with_max_attempts() {
        let config = DownloadConfig::new().with_max_attempts(5);
        assert_eq!(config.max_attempts(), 5);
    }

    #[test]
    fn test_max_attempts_floor() {
        let config = DownloadConfig::new().with_max_attempts(0);
        assert_eq!(config.max_attempts(), 1);
    }

    #[test]
    fn test_with_reuse_cached() {
        let config = DownloadConfig::new().with_reuse_cached(true);
        assert!(config.reuse_cached());
    }

    #[test]
    fn test_builder_chain() {
        let config = DownloadConfig::new()
            .with_max_in_flight(16)
            .with_request_timeout(Duration::from_millis(500))
            .with_max_attempts(1)
            .with_reuse_cached(true);

        assert_eq!(config.max_in_flight(), 16);
        assert_eq!(config.request_timeout(), Duration::from_millis(500));
        assert_eq!(config.max_attempts(), 1);
        assert!(config.reuse_cached());
    }

    #[test]
    fn test_copy_semantics() {
        let config = DownloadConfig::new().with_max_in_flight(2);
        let copy = config;
        assert_eq!(config, copy);
    }

    #[test]
    fn test_debug_impl() {
        let config = DownloadConfig::new();
        let debug = format!("{config:?}");
        assert!(debug.contains("DownloadConfig"));
        assert!(debug.contains("max_in_flight"));
    }
}
