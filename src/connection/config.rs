use crate::core::{GatewayError, Result};
use std::time::Duration;

/// Age in days used by `purge_older_than` when the caller passes `None`
pub const DEFAULT_MAX_AGE_DAYS: u32 = 10;

/// Client handle configuration
///
/// Applies to every handle a registry creates. Which endpoint, database and
/// collection an operation hits is never configured here; it always comes
/// from the per-call [`ConnectionDescriptor`](super::ConnectionDescriptor).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout for establishing a connection to the store
    pub connect_timeout: Duration,

    /// Maximum number of driver-level connections per handle
    pub max_pool_size: u32,

    /// Application name reported to the store, if any
    pub app_name: Option<String>,

    /// Purge age applied when none is given
    pub default_max_age_days: u32,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            max_pool_size: 10,
            app_name: None,
            default_max_age_days: DEFAULT_MAX_AGE_DAYS,
        }
    }

    /// Set connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set maximum driver pool size
    pub fn max_pool_size(mut self, max: u32) -> Self {
        self.max_pool_size = max;
        self
    }

    /// Set the application name
    pub fn app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    /// Set the default purge age
    pub fn default_max_age_days(mut self, days: u32) -> Self {
        self.default_max_age_days = days;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_pool_size == 0 {
            return Err(GatewayError::InvalidConfig(
                "max_pool_size must be > 0".to_string(),
            ));
        }

        if self.default_max_age_days == 0 {
            return Err(GatewayError::InvalidConfig(
                "default_max_age_days must be > 0".to_string(),
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(GatewayError::InvalidConfig(
                "connect_timeout must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.max_pool_size, 10);
        assert_eq!(config.default_max_age_days, 10);
        assert!(config.app_name.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfig::new()
            .connect_timeout(Duration::from_secs(5))
            .max_pool_size(4)
            .app_name("ingest")
            .default_max_age_days(30);

        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.max_pool_size, 4);
        assert_eq!(config.app_name.as_deref(), Some("ingest"));
        assert_eq!(config.default_max_age_days, 30);
    }

    #[test]
    fn test_validate() {
        assert!(ClientConfig::new().validate().is_ok());
        assert!(ClientConfig::new().max_pool_size(0).validate().is_err());
        assert!(ClientConfig::new().default_max_age_days(0).validate().is_err());
        assert!(ClientConfig::new().connect_timeout(Duration::ZERO).validate().is_err());
    }
}
