use std::fmt;
use std::time::Duration;

/// Messages endpoint the relay forwards to unless overridden.
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.anthropic.com/v1/messages";
/// Value sent as `anthropic-version` on every upstream call.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Allowed-origin marker that accepts any caller.
pub const WILDCARD_ORIGIN: &str = "*";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8787;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required config field: {0}")]
    MissingField(&'static str),
    #[error("invalid config field {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Upstream API key. Never printed; use [`ApiKey::expose`] at the one place it is sent.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField("api_key"));
        }
        Ok(Self(value))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([redacted])")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

/// Origin accepted by the edge variant's CORS gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AllowedOrigin {
    #[default]
    Any,
    Exact(String),
}

impl AllowedOrigin {
    pub fn parse(value: &str) -> Self {
        if value == WILDCARD_ORIGIN {
            AllowedOrigin::Any
        } else {
            AllowedOrigin::Exact(value.to_string())
        }
    }

    /// Exact string comparison; a missing `Origin` header is passed in as `""`.
    pub fn permits(&self, origin: &str) -> bool {
        match self {
            AllowedOrigin::Any => true,
            AllowedOrigin::Exact(allowed) => allowed == origin,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, AllowedOrigin::Any)
    }
}

impl fmt::Display for AllowedOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllowedOrigin::Any => f.write_str(WILDCARD_ORIGIN),
            AllowedOrigin::Exact(origin) => f.write_str(origin),
        }
    }
}

/// Final configuration used by the running process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub api_key: ApiKey,
    pub allowed_origin: AllowedOrigin,
    pub upstream_url: String,
    /// Optional outbound proxy (for upstream egress).
    pub proxy: Option<String>,
    pub connect_timeout: Option<Duration>,
    pub request_timeout: Option<Duration>,
}

impl RelayConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Optional layer used for merging config.
///
/// Merge order: CLI > ENV (resolved by clap) > defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayConfigPatch {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub api_key: Option<String>,
    pub allowed_origin: Option<String>,
    pub upstream_url: Option<String>,
    pub proxy: Option<String>,
    pub connect_timeout: Option<Duration>,
    pub request_timeout: Option<Duration>,
}

impl RelayConfigPatch {
    pub fn overlay(&mut self, other: RelayConfigPatch) {
        if other.host.is_some() {
            self.host = other.host;
        }
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.allowed_origin.is_some() {
            self.allowed_origin = other.allowed_origin;
        }
        if other.upstream_url.is_some() {
            self.upstream_url = other.upstream_url;
        }
        if other.proxy.is_some() {
            self.proxy = other.proxy;
        }
        if other.connect_timeout.is_some() {
            self.connect_timeout = other.connect_timeout;
        }
        if other.request_timeout.is_some() {
            self.request_timeout = other.request_timeout;
        }
    }

    pub fn into_config(self) -> Result<RelayConfig, ConfigError> {
        let api_key = ApiKey::new(self.api_key.ok_or(ConfigError::MissingField("api_key"))?)?;
        let upstream_url = self
            .upstream_url
            .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string());
        if !upstream_url.starts_with("http://") && !upstream_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                field: "upstream_url",
                message: format!("expected an http(s) url, got {upstream_url}"),
            });
        }
        Ok(RelayConfig {
            host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            api_key,
            allowed_origin: self
                .allowed_origin
                .as_deref()
                .map(AllowedOrigin::parse)
                .unwrap_or_default(),
            upstream_url,
            proxy: self.proxy,
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_is_redacted_in_debug_and_display() {
        let key = ApiKey::new("sk-ant-very-secret").unwrap();
        assert_eq!(format!("{key:?}"), "ApiKey([redacted])");
        assert_eq!(key.to_string(), "[redacted]");
        assert_eq!(key.expose(), "sk-ant-very-secret");

        let config = RelayConfigPatch {
            api_key: Some("sk-ant-very-secret".to_string()),
            ..Default::default()
        }
        .into_config()
        .unwrap();
        assert!(!format!("{config:?}").contains("sk-ant-very-secret"));
    }

    #[test]
    fn blank_api_key_is_rejected() {
        assert!(matches!(
            ApiKey::new("  "),
            Err(ConfigError::MissingField("api_key"))
        ));
    }

    #[test]
    fn allowed_origin_matches_exactly() {
        let origin = AllowedOrigin::parse("https://good.example");
        assert!(origin.permits("https://good.example"));
        assert!(!origin.permits("https://good.example/"));
        assert!(!origin.permits("https://evil.example"));
        assert!(!origin.permits(""));

        let any = AllowedOrigin::parse("*");
        assert!(any.is_wildcard());
        assert!(any.permits(""));
        assert!(any.permits("https://evil.example"));
    }

    #[test]
    fn overlay_prefers_later_layer() {
        let mut merged = RelayConfigPatch {
            host: Some("0.0.0.0".to_string()),
            port: Some(9000),
            api_key: Some("k1".to_string()),
            ..Default::default()
        };
        merged.overlay(RelayConfigPatch {
            port: Some(9100),
            api_key: Some("k2".to_string()),
            allowed_origin: Some("https://good.example".to_string()),
            ..Default::default()
        });

        let config = merged.into_config().unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:9100");
        assert_eq!(config.api_key.expose(), "k2");
        assert_eq!(
            config.allowed_origin,
            AllowedOrigin::Exact("https://good.example".to_string())
        );
        assert_eq!(config.upstream_url, DEFAULT_UPSTREAM_URL);
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let config = RelayConfigPatch {
            api_key: Some("k".to_string()),
            ..Default::default()
        }
        .into_config()
        .unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.allowed_origin, AllowedOrigin::Any);
        assert!(config.proxy.is_none());
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn missing_api_key_fails() {
        let err = RelayConfigPatch::default().into_config().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("api_key")));
    }

    #[test]
    fn non_http_upstream_url_fails() {
        let err = RelayConfigPatch {
            api_key: Some("k".to_string()),
            upstream_url: Some("ftp://example".to_string()),
            ..Default::default()
        }
        .into_config()
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "upstream_url",
                ..
            }
        ));
    }
}
