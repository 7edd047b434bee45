use super::config::{LogLevel, ScanConfig};
use crate::error::FatalError;
use crate::pattern::JoinSeparator;
use crate::reporter::{LogReporter, ScanReporter};
use crate::scan_coordinator::ScanCoordinator;
use crate::services::{CredentialResolver, GitCloner, GitHubLister, HubConfigResolver};
use crate::types::ScanSummary;
use anyhow::Result;
use clap::Parser;
use log::{debug, info};
use std::io::{self, Write};
use std::time::Duration;

/// hubgrep - search every repository of a GitHub account
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Regular expression; several arguments are joined (see --join)
    pub patterns: Vec<String>,

    /// Logging level
    #[arg(short = 'v', long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// GitHub host to use
    #[arg(short = 'H', long, default_value = "github.com")]
    pub host: String,

    /// Limit search to certain organization (or user)
    #[arg(short, long, default_value = "")]
    pub organization: String,

    /// Timeout for HTTP requests to the API
    #[arg(long, value_parser = humantime::parse_duration, default_value = "5s")]
    pub http_timeout: Duration,

    /// Separator used to join the pattern arguments
    #[arg(long, value_enum, default_value_t = JoinSeparator::Space)]
    pub join: JoinSeparator,
}

/// stderrへのログ出力を初期化（タイムスタンプなし）
pub fn init_logging(level: LogLevel) {
    env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();
}

/// CLI実行エントリーポイント
pub fn run_cli(cli: &Cli) -> Result<ScanSummary> {
    let config = ScanConfig::from_cli(cli)?;
    info!("Pattern: {}", config.pattern.as_str());
    debug!("Host: {}, organization: {:?}", config.host, config.organization);

    let resolver = HubConfigResolver::from_env();
    let mut reporter = LogReporter;
    let stdout = io::stdout();

    let summary = run(&config, &resolver, &mut reporter, stdout.lock())?;
    Ok(summary)
}

/// Resolve credentials, list repositories and scan them into `out`.
///
/// Every step before the first clone is fatal; nothing is written to `out`
/// unless listing succeeded.
pub fn run<W: Write>(
    config: &ScanConfig,
    resolver: &dyn CredentialResolver,
    reporter: &mut dyn ScanReporter,
    out: W,
) -> Result<ScanSummary, FatalError> {
    let credential = resolver.resolve(&config.host)?;
    let lister = GitHubLister::new(
        &config.host,
        config.organization.as_deref(),
        &credential,
        config.http_timeout,
    )?;
    let cloner = GitCloner::new(credential);

    ScanCoordinator::new(&config.pattern, &cloner, reporter, out).run(&lister)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CredentialError;
    use crate::reporter::CollectingReporter;
    use crate::services::credentials::MockCredentialResolver;
    use mockall::predicate::eq;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["hubgrep", "TODO"]).unwrap();
        assert_eq!(cli.patterns, vec!["TODO"]);
        assert_eq!(cli.log_level, LogLevel::Info);
        assert_eq!(cli.host, "github.com");
        assert_eq!(cli.organization, "");
        assert_eq!(cli.http_timeout, Duration::from_secs(5));
        assert_eq!(cli.join, JoinSeparator::Space);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "hubgrep",
            "-v",
            "fatal",
            "-H",
            "ghe.example.com",
            "-o",
            "infra",
            "--http-timeout",
            "1m 30s",
            "--join",
            "none",
            "foo",
            "bar",
        ])
        .unwrap();

        assert_eq!(cli.log_level, LogLevel::Fatal);
        assert_eq!(cli.host, "ghe.example.com");
        assert_eq!(cli.organization, "infra");
        assert_eq!(cli.http_timeout, Duration::from_secs(90));

        let config = ScanConfig::from_cli(&cli).unwrap();
        assert_eq!(config.pattern.as_str(), "foobar");
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        assert!(Cli::try_parse_from(["hubgrep", "-v", "loud", "x"]).is_err());
    }

    #[test]
    fn test_zero_patterns_is_config_error() {
        let cli = Cli::try_parse_from(["hubgrep", "-o", "infra"]).unwrap();
        assert!(matches!(ScanConfig::from_cli(&cli), Err(FatalError::NoPatterns)));
    }

    #[test]
    fn test_missing_credential_is_fatal_before_output() {
        let cli = Cli::try_parse_from(["hubgrep", "-H", "ghe.example.com", "error"]).unwrap();
        let config = ScanConfig::from_cli(&cli).unwrap();

        let mut resolver = MockCredentialResolver::new();
        resolver
            .expect_resolve()
            .with(eq("ghe.example.com"))
            .returning(|host| Err(CredentialError::Missing(host.to_string())));

        let mut reporter = CollectingReporter::default();
        let mut out = Vec::new();
        let result = run(&config, &resolver, &mut reporter, &mut out);

        assert!(matches!(result, Err(FatalError::Auth(_))));
        assert!(out.is_empty());
    }
}
