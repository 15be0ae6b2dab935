//! Configuration Module
//!
//! Handles loading controller and client configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Reads and parses an environment variable, falling back to `default`.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Options recognised by the paged data controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerOptions {
    /// Rows requested per page; always greater than zero
    pub page_size: usize,
    /// Logical cache key the controller's entries are derived from
    pub cache_key: String,
    /// When false, `visible_items` returns the whole collection
    pub enable_virtual_scroll: bool,
    /// Quiet period before a search request is issued
    pub debounce_delay: Duration,
    /// Minimum spacing between filter requests
    pub throttle_delay: Duration,
    /// Lifetime of cached collections
    pub cache_ttl: Duration,
    /// Row height assumed until the view reports one
    pub item_height: f64,
}

impl ControllerOptions {
    /// Creates options by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PAGE_SIZE` - Rows per page (default: 50, zero is ignored)
    /// - `CACHE_KEY` - Base cache key (default: "default")
    /// - `ENABLE_VIRTUAL_SCROLL` - Window the visible items (default: false)
    /// - `DEBOUNCE_DELAY_MS` - Search debounce in milliseconds (default: 300)
    /// - `THROTTLE_DELAY_MS` - Filter throttle in milliseconds (default: 100)
    /// - `CACHE_TTL_SECS` - Cache lifetime in seconds (default: 300)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let page_size = env_or("PAGE_SIZE", defaults.page_size);

        Self {
            page_size: if page_size == 0 {
                defaults.page_size
            } else {
                page_size
            },
            cache_key: env::var("CACHE_KEY").unwrap_or(defaults.cache_key),
            enable_virtual_scroll: env_or("ENABLE_VIRTUAL_SCROLL", defaults.enable_virtual_scroll),
            debounce_delay: Duration::from_millis(env_or("DEBOUNCE_DELAY_MS", 300)),
            throttle_delay: Duration::from_millis(env_or("THROTTLE_DELAY_MS", 100)),
            cache_ttl: Duration::from_secs(env_or("CACHE_TTL_SECS", 300)),
            item_height: defaults.item_height,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_cache_key(mut self, cache_key: impl Into<String>) -> Self {
        self.cache_key = cache_key.into();
        self
    }

    pub fn with_virtual_scroll(mut self, enabled: bool) -> Self {
        self.enable_virtual_scroll = enabled;
        self
    }

    // == Validation ==
    /// Replaces a zero page size or a non-positive row height with its default.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if self.page_size == 0 {
            warn!(default = defaults.page_size, "page size of zero replaced by default");
            self.page_size = defaults.page_size;
        }
        if !(self.item_height > 0.0) {
            warn!(
                item_height = self.item_height,
                default = defaults.item_height,
                "non-positive item height replaced by default"
            );
            self.item_height = defaults.item_height;
        }
        self
    }
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            page_size: 50,
            cache_key: "default".to_string(),
            enable_virtual_scroll: false,
            debounce_delay: Duration::from_millis(300),
            throttle_delay: Duration::from_millis(100),
            cache_ttl: Duration::from_secs(5 * 60),
            item_height: 60.0,
        }
    }
}

/// Configuration of the command-line client.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST backend
    pub api_base_url: String,
    /// HTTP request timeout in seconds
    pub request_timeout: u64,
    /// Cache sweep interval in seconds; 0 disables the sweep
    pub cleanup_interval: u64,
    /// Upper bound on pages loaded by one run
    pub max_pages: u32,
    /// Options for the controller
    pub controller: ControllerOptions,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `API_BASE_URL` - Backend base URL (default: http://localhost:8081/api)
    /// - `REQUEST_TIMEOUT` - Request timeout in seconds (default: 30)
    /// - `CLEANUP_INTERVAL` - Cache sweep frequency in seconds (default: 0, disabled)
    /// - `MAX_PAGES` - Pages to load at most (default: 10)
    /// - plus everything read by [`ControllerOptions::from_env`]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: env::var("API_BASE_URL").unwrap_or(defaults.api_base_url),
            request_timeout: env_or("REQUEST_TIMEOUT", defaults.request_timeout),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            max_pages: env_or("MAX_PAGES", defaults.max_pages),
            controller: ControllerOptions::from_env(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8081/api".to_string(),
            request_timeout: 30,
            cleanup_interval: 0,
            max_pages: 10,
            controller: ControllerOptions::default(),
        }
    }
}
