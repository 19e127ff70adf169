//! Configuration for the sync client
//!
//! Controls the backend address, the polling cadence of every resource and
//! the HTTP timeouts.

use std::time::Duration;

use url::Url;

use crate::error::{Result, SdkError};

/// Environment variable overriding [`SyncConfig::base_url`]
pub const API_URL_ENV: &str = "OFFICE_API_URL";

/// Configuration for the [`SyncClient`](crate::SyncClient)
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Backend base URL
    /// Default: http://0.0.0.0:8080
    pub base_url: String,

    /// Environment snapshot polling interval
    /// Default: 1 second
    pub state_interval: Duration,

    /// Alerts polling interval
    /// Default: 2 seconds
    pub alerts_interval: Duration,

    /// Agent messages polling interval
    /// Default: 2 seconds
    pub messages_interval: Duration,

    /// Per-room heating polling interval
    /// Default: 1 second
    pub heating_interval: Duration,

    /// Timeout for establishing a connection
    /// Default: 5 seconds
    pub connect_timeout: Duration,

    /// Timeout for a whole request
    /// Default: 10 seconds
    pub request_timeout: Duration,

    /// Capacity of each output broadcast channel
    /// Default: 1000
    pub change_buffer_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: office_api::DEFAULT_BASE_URL.to_string(),
            state_interval: Duration::from_secs(1),
            alerts_interval: Duration::from_secs(2),
            messages_interval: Duration::from_secs(2),
            heating_interval: Duration::from_secs(1),
            connect_timeout: http_client::DEFAULT_CONNECT_TIMEOUT,
            request_timeout: http_client::DEFAULT_REQUEST_TIMEOUT,
            change_buffer_size: 1000,
        }
    }
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with the base URL taken from `OFFICE_API_URL` when set
    pub fn from_env() -> Self {
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::default().with_base_url(url.trim()),
            _ => Self::default(),
        }
    }

    /// Sub-second cadence for a local simulation running at high speed
    pub fn fast_polling() -> Self {
        Self {
            state_interval: Duration::from_millis(250),
            alerts_interval: Duration::from_millis(500),
            messages_interval: Duration::from_millis(500),
            heating_interval: Duration::from_millis(250),
            connect_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(5),
            ..Default::default()
        }
    }

    /// Slow cadence and small buffers
    pub fn resource_efficient() -> Self {
        Self {
            state_interval: Duration::from_secs(5),
            alerts_interval: Duration::from_secs(10),
            messages_interval: Duration::from_secs(10),
            heating_interval: Duration::from_secs(5),
            change_buffer_size: 100,
            ..Default::default()
        }
    }

    /// Validate the configuration and return the first issue found
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| SdkError::Config(format!("Invalid base URL {:?}: {}", self.base_url, e)))?;
        if url.cannot_be_a_base() {
            return Err(SdkError::Config(format!(
                "Base URL {:?} cannot carry a path",
                self.base_url
            )));
        }

        let intervals = [
            ("State", self.state_interval),
            ("Alerts", self.alerts_interval),
            ("Messages", self.messages_interval),
            ("Heating", self.heating_interval),
            ("Connect timeout", self.connect_timeout),
            ("Request timeout", self.request_timeout),
        ];
        for (name, value) in intervals {
            if value.is_zero() {
                return Err(SdkError::Config(format!("{name} must be greater than 0")));
            }
        }

        if self.change_buffer_size == 0 {
            return Err(SdkError::Config(
                "Change buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder pattern methods for fluent configuration

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_state_interval(mut self, interval: Duration) -> Self {
        self.state_interval = interval;
        self
    }

    pub fn with_alerts_interval(mut self, interval: Duration) -> Self {
        self.alerts_interval = interval;
        self
    }

    pub fn with_messages_interval(mut self, interval: Duration) -> Self {
        self.messages_interval = interval;
        self
    }

    pub fn with_heating_interval(mut self, interval: Duration) -> Self {
        self.heating_interval = interval;
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, request: Duration) -> Self {
        self.connect_timeout = connect;
        self.request_timeout = request;
        self
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.change_buffer_size = size;
        self
    }
}
