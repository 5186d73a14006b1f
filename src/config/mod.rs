// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Configuration module for the BusTime aggregator
//!
//! Loads and parses configuration from environment variables.

#[cfg(test)]
mod tests;

/// Default configuration values
pub mod defaults {
    pub const SERVER_ADDR: &str = "0.0.0.0:4000";
    pub const BASE_URL: &str = "https://www.ctabustracker.com/bustime/api/v2";
    pub const REFRESH_INTERVAL_SECS: u64 = 60;
    pub const RECENCY_WINDOW_SECS: u64 = 600;
    pub const UPSTREAM_TIMEOUT_SECS: u64 = 10;
}

/// Environment variable names used by the application
pub mod env_vars {
    pub const SERVER_ADDR: &str = "SERVER_ADDR";
    pub const API_KEY: &str = "CTA_BUS_API_KEY";
    pub const BASE_URL: &str = "BUSTIME_BASE_URL";
    pub const REFRESH_INTERVAL: &str = "REFRESH_INTERVAL_SECONDS";
    pub const RECENCY_WINDOW: &str = "RECENCY_WINDOW_SECONDS";
    pub const UPSTREAM_TIMEOUT: &str = "UPSTREAM_TIMEOUT_SECONDS";
    pub const PRELOAD_ROUTES: &str = "PRELOAD_ROUTES";
}

/// Application-wide configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub api_key: String,
    pub base_url: String,
    pub refresh_interval_secs: u64,
    pub recency_window_secs: u64,
    pub upstream_timeout_secs: u64,
    /// Routes warmed into the caches right after startup
    pub preload_routes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_addr: defaults::SERVER_ADDR.to_string(),
            api_key: String::new(),
            base_url: defaults::BASE_URL.to_string(),
            refresh_interval_secs: defaults::REFRESH_INTERVAL_SECS,
            recency_window_secs: defaults::RECENCY_WINDOW_SECS,
            upstream_timeout_secs: defaults::UPSTREAM_TIMEOUT_SECS,
            preload_routes: vec![],
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let server_addr = std::env::var(env_vars::SERVER_ADDR)
            .unwrap_or_else(|_| defaults::SERVER_ADDR.to_string());

        let api_key = std::env::var(env_vars::API_KEY).unwrap_or_else(|_| {
            tracing::warn!(
                "{} is not set. Upstream requests will be rejected by the API.",
                env_vars::API_KEY
            );
            String::new()
        });

        let base_url =
            std::env::var(env_vars::BASE_URL).unwrap_or_else(|_| defaults::BASE_URL.to_string());

        let refresh_interval_secs =
            parse_secs(env_vars::REFRESH_INTERVAL, defaults::REFRESH_INTERVAL_SECS);
        let recency_window_secs =
            parse_secs(env_vars::RECENCY_WINDOW, defaults::RECENCY_WINDOW_SECS);
        let upstream_timeout_secs =
            parse_secs(env_vars::UPSTREAM_TIMEOUT, defaults::UPSTREAM_TIMEOUT_SECS);

        let preload_routes = std::env::var(env_vars::PRELOAD_ROUTES)
            .map(|v| parse_route_list(&v))
            .unwrap_or_default();

        Config {
            server_addr,
            api_key,
            base_url,
            refresh_interval_secs,
            recency_window_secs,
            upstream_timeout_secs,
            preload_routes,
        }
    }
}

fn parse_secs(var: &str, default: u64) -> u64 {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

/// Parses a comma-separated route list, dropping empty segments
fn parse_route_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
