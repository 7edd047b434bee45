use super::cli_app::Cli;
use crate::error::FatalError;
use crate::pattern::{CompiledPattern, JoinSeparator};
use clap::ValueEnum;
use log::LevelFilter;
use std::time::Duration;

/// Log verbosity accepted by `--log-level`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    /// Same filter as `error`; kept for compatibility with older invocations
    Fatal,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error | LogLevel::Fatal => LevelFilter::Error,
        }
    }
}

/// Immutable run configuration, built once from the command line
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub pattern: CompiledPattern,
    pub host: String,
    pub organization: Option<String>,
    pub http_timeout: Duration,
}

impl ScanConfig {
    /// Validate flags and compile the pattern; nothing touches the network.
    /// `--log-level` is not part of it: logging is set up before validation
    /// so configuration errors are reported too.
    pub fn from_cli(cli: &Cli) -> Result<Self, FatalError> {
        Self::build(&cli.patterns, cli.join, &cli.host, &cli.organization, cli.http_timeout)
    }

    pub fn build(
        patterns: &[String],
        join: JoinSeparator,
        host: &str,
        organization: &str,
        http_timeout: Duration,
    ) -> Result<Self, FatalError> {
        let pattern = CompiledPattern::from_args(patterns, join)?;

        let host = host.trim();
        if host.is_empty() {
            return Err(FatalError::Config("host must not be empty".to_string()));
        }

        let organization = organization.trim();
        Ok(Self {
            pattern,
            host: host.to_string(),
            organization: (!organization.is_empty()).then(|| organization.to_string()),
            http_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fatal_maps_to_error() {
        assert_eq!(LogLevel::Fatal.to_level_filter(), LevelFilter::Error);
        assert_eq!(LogLevel::default().to_level_filter(), LevelFilter::Info);
    }

    #[test]
    fn test_build_config() {
        let config = ScanConfig::build(
            &args(&["TODO", "fix"]),
            JoinSeparator::Space,
            "github.com",
            "",
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(config.pattern.as_str(), "TODO fix");
        assert_eq!(config.organization, None);
    }

    #[test]
    fn test_organization_is_kept() {
        let config = ScanConfig::build(
            &args(&["x"]),
            JoinSeparator::Space,
            "github.com",
            "rust-lang",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(config.organization.as_deref(), Some("rust-lang"));
    }

    #[test]
    fn test_no_patterns() {
        let err = ScanConfig::build(&[], JoinSeparator::Space, "github.com", "", Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, FatalError::NoPatterns));
    }

    #[test]
    fn test_empty_host() {
        let err = ScanConfig::build(&args(&["x"]), JoinSeparator::Space, " ", "", Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, FatalError::Config(_)));
    }
}
