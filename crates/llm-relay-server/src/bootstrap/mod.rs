use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use llm_relay_common::{RelayConfig, RelayConfigPatch};
use llm_relay_core::UpstreamClient;

use crate::upstream_client::{UpstreamClientConfig, WreqUpstreamClient};

#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "llm-relay",
    version,
    about = "Relay browser chat requests to the Anthropic API without exposing the key"
)]
pub struct CliArgs {
    /// Upstream API key, attached as `x-api-key`.
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Origin allowed by the edge route; `*` accepts any origin.
    #[arg(long, env = "LLM_RELAY_ALLOWED_ORIGIN")]
    pub allowed_origin: Option<String>,

    /// Bind host.
    #[arg(long, env = "LLM_RELAY_HOST")]
    pub host: Option<String>,

    /// Bind port.
    #[arg(long, env = "LLM_RELAY_PORT")]
    pub port: Option<String>,

    /// Messages endpoint to forward to.
    #[arg(long, env = "LLM_RELAY_UPSTREAM_URL")]
    pub upstream_url: Option<String>,

    /// Optional outbound proxy for upstream requests.
    #[arg(long, env = "LLM_RELAY_PROXY")]
    pub proxy: Option<String>,

    #[arg(long, env = "LLM_RELAY_CONNECT_TIMEOUT_SECS")]
    pub connect_timeout_secs: Option<String>,

    #[arg(long, env = "LLM_RELAY_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<String>,
}

pub struct Bootstrap {
    pub config: Arc<RelayConfig>,
    pub upstream: Arc<dyn UpstreamClient>,
}

pub fn bootstrap_from_env() -> anyhow::Result<Bootstrap> {
    let args = CliArgs::parse();
    bootstrap(args)
}

pub fn bootstrap(args: CliArgs) -> anyhow::Result<Bootstrap> {
    let config = resolve_config(args)?;
    let client = WreqUpstreamClient::new(UpstreamClientConfig::from_relay(&config))
        .context("build upstream client")?;
    Ok(Bootstrap {
        config: Arc::new(config),
        upstream: Arc::new(client),
    })
}

/// clap already applies CLI > ENV precedence for each field; defaults fill the rest.
pub fn resolve_config(args: CliArgs) -> anyhow::Result<RelayConfig> {
    let patch = RelayConfigPatch {
        host: sanitize_optional_env_value(args.host),
        port: parse_u16_env_value(args.port, "LLM_RELAY_PORT")?,
        api_key: sanitize_optional_env_value(args.api_key),
        allowed_origin: sanitize_optional_env_value(args.allowed_origin),
        upstream_url: sanitize_optional_env_value(args.upstream_url),
        proxy: sanitize_optional_env_value(args.proxy),
        connect_timeout: parse_secs_env_value(
            args.connect_timeout_secs,
            "LLM_RELAY_CONNECT_TIMEOUT_SECS",
        )?,
        request_timeout: parse_secs_env_value(
            args.request_timeout_secs,
            "LLM_RELAY_REQUEST_TIMEOUT_SECS",
        )?,
    };
    let mut merged = RelayConfigPatch::default();
    merged.overlay(patch);
    merged.into_config().context("finalize relay config")
}

fn sanitize_optional_env_value(value: Option<String>) -> Option<String> {
    let trimmed = value?.trim().to_string();
    if trimmed.is_empty() {
        return None;
    }
    // Some PaaS systems may inject unresolved placeholders like `${VAR}`.
    if trimmed.starts_with("${") && trimmed.ends_with('}') {
        return None;
    }
    Some(trimmed)
}

fn parse_u16_env_value(value: Option<String>, env_name: &str) -> anyhow::Result<Option<u16>> {
    let Some(raw) = sanitize_optional_env_value(value) else {
        return Ok(None);
    };
    let parsed = raw
        .parse::<u16>()
        .with_context(|| format!("invalid {env_name} value: {raw}"))?;
    Ok(Some(parsed))
}

fn parse_secs_env_value(
    value: Option<String>,
    env_name: &str,
) -> anyhow::Result<Option<Duration>> {
    let Some(raw) = sanitize_optional_env_value(value) else {
        return Ok(None);
    };
    let secs = raw
        .parse::<u64>()
        .with_context(|| format!("invalid {env_name} value: {raw}"))?;
    if secs == 0 {
        return Err(anyhow::anyhow!("invalid {env_name} value: must be positive"));
    }
    Ok(Some(Duration::from_secs(secs)))
}

#[cfg(test)]
mod tests {
    use llm_relay_common::{AllowedOrigin, DEFAULT_UPSTREAM_URL};

    use super::*;

    fn args_with_key() -> CliArgs {
        CliArgs {
            api_key: Some("sk-ant-test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn placeholders_and_blanks_are_unset() {
        assert_eq!(sanitize_optional_env_value(Some("${PORT}".to_string())), None);
        assert_eq!(sanitize_optional_env_value(Some("   ".to_string())), None);
        assert_eq!(
            sanitize_optional_env_value(Some(" https://a.example ".to_string())),
            Some("https://a.example".to_string())
        );
    }

    #[test]
    fn resolves_defaults() {
        let config = resolve_config(args_with_key()).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8787");
        assert_eq!(config.allowed_origin, AllowedOrigin::Any);
        assert_eq!(config.upstream_url, DEFAULT_UPSTREAM_URL);
        assert!(config.connect_timeout.is_none());
    }

    #[test]
    fn parses_numeric_fields() {
        let config = resolve_config(CliArgs {
            port: Some("9000".to_string()),
            request_timeout_secs: Some("30".to_string()),
            allowed_origin: Some("https://good.example".to_string()),
            ..args_with_key()
        })
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert!(config.allowed_origin.permits("https://good.example"));
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = resolve_config(CliArgs {
            port: Some("eighty".to_string()),
            ..args_with_key()
        })
        .unwrap_err();
        assert!(err.to_string().contains("LLM_RELAY_PORT"));

        assert!(
            resolve_config(CliArgs {
                connect_timeout_secs: Some("0".to_string()),
                ..args_with_key()
            })
            .is_err()
        );
    }

    #[test]
    fn missing_api_key_is_an_error() {
        assert!(resolve_config(CliArgs::default()).is_err());
        assert!(
            resolve_config(CliArgs {
                api_key: Some("${ANTHROPIC_API_KEY}".to_string()),
                ..Default::default()
            })
            .is_err()
        );
    }

    #[test]
    fn parses_cli_flags() {
        let args = CliArgs::try_parse_from([
            "llm-relay",
            "--api-key",
            "sk-flag",
            "--allowed-origin",
            "https://good.example",
            "--port",
            "8080",
        ])
        .unwrap();
        let config = resolve_config(args).unwrap();
        assert_eq!(config.api_key.expose(), "sk-flag");
        assert_eq!(config.port, 8080);
    }
}
