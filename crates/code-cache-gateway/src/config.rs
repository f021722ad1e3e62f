//! Command line and environment configuration

use crate::error::Result;
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_UPSTREAM_URL: &str = "https://http.cat";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Command line arguments. `-h` is taken by `--host`, so help is `--help` only.
///
/// Every flag can also be set through a `GATEWAY_`-prefixed environment variable.
#[derive(Parser, Debug)]
#[command(name = "code-cache-gateway")]
#[command(version, about = "Caching gateway for images keyed by numeric code", long_about = None)]
#[command(disable_help_flag = true)]
pub struct Args {
    /// Host to listen on (or GATEWAY_HOST)
    #[arg(short = 'h', long, env = "GATEWAY_HOST")]
    pub host: String,

    /// Port to listen on (or GATEWAY_PORT)
    #[arg(short, long, env = "GATEWAY_PORT")]
    pub port: u16,

    /// Path to the cache directory, relative to the working directory (or GATEWAY_CACHE_DIR)
    #[arg(short, long, env = "GATEWAY_CACHE_DIR")]
    pub cache: PathBuf,

    /// Base URL of the upstream image service
    #[arg(long, env = "GATEWAY_UPSTREAM_URL", default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream: String,

    /// Upstream request timeout in seconds
    #[arg(long, env = "GATEWAY_UPSTREAM_TIMEOUT_SECS", default_value_t = DEFAULT_UPSTREAM_TIMEOUT_SECS)]
    pub upstream_timeout: u64,

    /// Print help
    #[arg(long, action = clap::ArgAction::Help)]
    #[allow(dead_code)]
    help: Option<bool>,
}

/// Gateway configuration, built once at startup
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Absolute cache directory
    pub cache_dir: PathBuf,
    /// Upstream base URL without a trailing slash
    pub upstream_url: String,
    pub upstream_timeout_secs: u64,
}

impl GatewayConfig {
    /// Build the configuration, resolving the cache path against the working directory
    pub fn from_args(args: Args) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::resolve(args, &cwd))
    }

    fn resolve(args: Args, cwd: &std::path::Path) -> Self {
        Self {
            host: args.host,
            port: args.port,
            cache_dir: cwd.join(args.cache),
            upstream_url: args.upstream.trim_end_matches('/').to_string(),
            upstream_timeout_secs: args.upstream_timeout,
        }
    }

    /// `host:port` string to bind to
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::Path;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_short_flags() {
        let args = parse(&["gw", "-h", "127.0.0.1", "-p", "8080", "-c", "cache"]);
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.port, 8080);
        assert_eq!(args.cache, PathBuf::from("cache"));
    }

    #[test]
    fn test_long_flags() {
        let args = parse(&[
            "gw",
            "--host",
            "0.0.0.0",
            "--port",
            "3000",
            "--cache",
            "/tmp/cats",
            "--upstream",
            "http://localhost:9999/",
            "--upstream-timeout",
            "5",
        ]);
        assert_eq!(args.host, "0.0.0.0");
        assert_eq!(args.port, 3000);
        assert_eq!(args.upstream, "http://localhost:9999/");
        assert_eq!(args.upstream_timeout, 5);
    }

    #[test]
    fn test_env_fallbacks_are_prefixed() {
        let command = Args::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .map(|env| env.to_string_lossy().into_owned())
        };

        assert_eq!(env_of("host").as_deref(), Some("GATEWAY_HOST"));
        assert_eq!(env_of("port").as_deref(), Some("GATEWAY_PORT"));
        assert_eq!(env_of("cache").as_deref(), Some("GATEWAY_CACHE_DIR"));
        assert_eq!(env_of("upstream").as_deref(), Some("GATEWAY_UPSTREAM_URL"));
        assert_eq!(
            env_of("upstream_timeout").as_deref(),
            Some("GATEWAY_UPSTREAM_TIMEOUT_SECS")
        );
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = Args::try_parse_from(["gw", "-h", "localhost", "-p", "abc", "-c", "cache"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_relative_cache_dir() {
        let args = parse(&["gw", "-h", "localhost", "-p", "1", "-c", "data/cache"]);
        let config = GatewayConfig::resolve(args, Path::new("/srv/app"));
        assert_eq!(config.cache_dir, PathBuf::from("/srv/app/data/cache"));
    }

    #[test]
    fn test_resolve_absolute_cache_dir() {
        let args = parse(&["gw", "-h", "localhost", "-p", "1", "-c", "/var/cache/cats"]);
        let config = GatewayConfig::resolve(args, Path::new("/srv/app"));
        assert_eq!(config.cache_dir, PathBuf::from("/var/cache/cats"));
    }

    #[test]
    fn test_upstream_trailing_slash_trimmed() {
        let args = parse(&[
            "gw",
            "-h",
            "localhost",
            "-p",
            "1",
            "-c",
            "c",
            "--upstream",
            "https://example.com/",
        ]);
        let config = GatewayConfig::resolve(args, Path::new("/"));
        assert_eq!(config.upstream_url, "https://example.com");
        assert_eq!(config.listen_addr(), "localhost:1");
    }

    #[test]
    fn test_from_args_is_absolute() {
        let args = parse(&["gw", "-h", "localhost", "-p", "1", "-c", "cache"]);
        let config = GatewayConfig::from_args(args).unwrap();
        assert!(config.cache_dir.is_absolute());
    }
}
