use anyhow::{Context, Result, bail};
use statrelay_sdk::ClientConfig;
use statrelay_sdk::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_ADDR: &str = "0.0.0.0:8080";

const ENV_ADDR: &str = "STATRELAY_ADDR";
const ENV_UPSTREAM: &str = "STATRELAY_UPSTREAM";
const ENV_INSECURE_TLS: &str = "STATRELAY_INSECURE_TLS";
const ENV_TIMEOUT_SECS: &str = "STATRELAY_TIMEOUT_SECS";

/// 命令行参数，未给出的项回落到环境变量，再回落到默认值
#[derive(Debug, Default, clap::Parser)]
#[command(name = "statrelay-server")]
#[command(about = "Relays follower and view stats as display frames")]
pub(crate) struct CliArgs {
    /// Listen address
    #[arg(long)]
    pub(crate) addr: Option<String>,

    /// Stats API base URL
    #[arg(long)]
    pub(crate) upstream: Option<String>,

    /// Accept invalid upstream TLS certificates
    #[arg(long)]
    pub(crate) insecure_tls: bool,

    /// Outbound request timeout in seconds, 0 disables it
    #[arg(long)]
    pub(crate) timeout_secs: Option<u64>,
}

#[derive(Debug)]
pub(crate) struct RelayConfig {
    pub(crate) addr: SocketAddr,
    pub(crate) client: ClientConfig,
}

pub(crate) fn relay_config(args: &CliArgs) -> Result<RelayConfig> {
    relay_config_from(args, |key| std::env::var(key).ok())
}

fn relay_config_from(args: &CliArgs, env: impl Fn(&str) -> Option<String>) -> Result<RelayConfig> {
    let addr_text = args
        .addr
        .clone()
        .or_else(|| env(ENV_ADDR))
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());
    let addr: SocketAddr = addr_text
        .parse()
        .with_context(|| format!("invalid {ENV_ADDR}: {addr_text}"))?;

    let base_url = args
        .upstream
        .clone()
        .or_else(|| env(ENV_UPSTREAM))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    url::Url::parse(&base_url).with_context(|| format!("invalid {ENV_UPSTREAM}: {base_url}"))?;

    let accept_invalid_certs = match env(ENV_INSECURE_TLS) {
        _ if args.insecure_tls => true,
        Some(text) => parse_flag(&text)
            .with_context(|| format!("invalid {ENV_INSECURE_TLS}: {text}"))?,
        None => false,
    };

    let timeout_secs = match (args.timeout_secs, env(ENV_TIMEOUT_SECS)) {
        (Some(secs), _) => Some(secs),
        (None, Some(text)) => Some(
            text.trim()
                .parse::<u64>()
                .with_context(|| format!("invalid {ENV_TIMEOUT_SECS}: {text}"))?,
        ),
        (None, None) => None,
    };
    let timeout = match timeout_secs {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => Some(DEFAULT_TIMEOUT),
    };

    Ok(RelayConfig {
        addr,
        client: ClientConfig {
            base_url,
            accept_invalid_certs,
            timeout,
        },
    })
}

fn parse_flag(text: &str) -> Result<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got {other:?}"),
    }
}
