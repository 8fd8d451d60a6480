//! Client configuration, read from the environment once at start-up.

use std::env;

/// API base URL baked in at compile time when `COMMUNITY_HUB_API_BASE` is set
/// for the build, otherwise the local development server.
pub const DEFAULT_API_BASE: &str = match option_env!("COMMUNITY_HUB_API_BASE") {
    Some(url) => url,
    None => "http://localhost:5000/api",
};

/// Records per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Upper bound for `COMMUNITY_HUB_PAGE_SIZE`.
pub const MAX_PAGE_SIZE: u32 = 100;
/// Reply levels materialized below a root comment.
pub const DEFAULT_REPLY_DISPLAY_DEPTH: usize = 3;

/// Settings shared by the API client and the stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL including the `/api` prefix, without a trailing slash.
    pub api_base: String,
    /// Bearer token sent with every request (admin sessions).
    pub api_token: Option<String>,
    /// Records requested per page.
    pub page_size: u32,
    /// Send the `approved` filter to the server. Off until the comments
    /// collection has the index that filter needs; when off the filter is
    /// applied locally to the returned page.
    pub server_approved_filter: bool,
    /// Deepest reply level materialized by display threads.
    pub reply_display_depth: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_token: None,
            page_size: DEFAULT_PAGE_SIZE,
            server_approved_filter: false,
            reply_display_depth: DEFAULT_REPLY_DISPLAY_DEPTH,
        }
    }
}

impl ClientConfig {
    /// Read `COMMUNITY_HUB_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; unset or unparsable values fall
    /// back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let api_base = lookup("COMMUNITY_HUB_API_BASE")
            .map(|value| normalize_api_base(&value))
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.api_base);
        let api_token = lookup("COMMUNITY_HUB_API_TOKEN")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let page_size = lookup("COMMUNITY_HUB_PAGE_SIZE")
            .and_then(|value| value.trim().parse::<u32>().ok())
            .unwrap_or(defaults.page_size)
            .clamp(1, MAX_PAGE_SIZE);
        let server_approved_filter = lookup("COMMUNITY_HUB_SERVER_APPROVED_FILTER")
            .map(|value| parse_bool_env(&value))
            .unwrap_or(defaults.server_approved_filter);
        let reply_display_depth = lookup("COMMUNITY_HUB_REPLY_DEPTH")
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(defaults.reply_display_depth);

        Self {
            api_base,
            api_token,
            page_size,
            server_approved_filter,
            reply_display_depth,
        }
    }

    /// Override the base URL; a trailing slash is dropped.
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = normalize_api_base(api_base);
        self
    }

    /// Override the bearer token; blank tokens clear it.
    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|value| !value.trim().is_empty());
        self
    }
}

fn normalize_api_base(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn parse_bool_env(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "y" | "on")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config, ClientConfig::default());
        assert!(!config.server_approved_filter);
    }

    #[test]
    fn reads_and_sanitizes_values() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("COMMUNITY_HUB_API_BASE", " https://hub.example.org/api/ "),
            ("COMMUNITY_HUB_API_TOKEN", "  "),
            ("COMMUNITY_HUB_PAGE_SIZE", "500"),
            ("COMMUNITY_HUB_SERVER_APPROVED_FILTER", "Yes"),
            ("COMMUNITY_HUB_REPLY_DEPTH", "oops"),
        ]));

        assert_eq!(config.api_base, "https://hub.example.org/api");
        assert_eq!(config.api_token, None);
        assert_eq!(config.page_size, MAX_PAGE_SIZE);
        assert!(config.server_approved_filter);
        assert_eq!(config.reply_display_depth, DEFAULT_REPLY_DISPLAY_DEPTH);
    }
}
