// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Unit tests for configuration module

#[cfg(test)]
mod test {
    use super::super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_addr, "0.0.0.0:4000");
        assert_eq!(
            config.base_url,
            "https://www.ctabustracker.com/bustime/api/v2"
        );
        assert_eq!(config.refresh_interval_secs, 60);
        assert_eq!(config.recency_window_secs, 600);
        assert_eq!(config.upstream_timeout_secs, 10);
        assert!(config.api_key.is_empty());
        assert!(config.preload_routes.is_empty());
    }

    #[test]
    fn test_parse_route_list() {
        assert_eq!(parse_route_list("74,76"), vec!["74", "76"]);
        assert_eq!(parse_route_list(" 74 , 76 ,"), vec!["74", "76"]);
        assert!(parse_route_list("").is_empty());
        assert!(parse_route_list(" , ,").is_empty());
    }

    #[test]
    fn test_parse_route_list_single() {
        assert_eq!(parse_route_list("X9"), vec!["X9"]);
    }
}
