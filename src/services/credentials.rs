//! Host credentials, read from hub's configuration
//!
//! hub stores one YAML document mapping each host to a list of accounts:
//!
//! ```yaml
//! github.com:
//! - user: octocat
//!   oauth_token: 0123456789abcdef
//!   protocol: https
//! ```

use crate::error::CredentialError;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Authenticated identity for one host
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub user: String,
    pub token: String,
    pub protocol: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .field("protocol", &self.protocol)
            .finish()
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait CredentialResolver {
    fn resolve(&self, host: &str) -> Result<Credential, CredentialError>;
}

#[derive(Debug, Deserialize)]
struct HubHost {
    user: String,
    oauth_token: String,
    #[serde(default = "default_protocol")]
    protocol: String,
}

fn default_protocol() -> String {
    "https".to_string()
}

const DEFAULT_TOKEN_HOST: &str = "github.com";

/// Resolver that behaves like hub: `GITHUB_TOKEN` wins for its own host
/// (`GITHUB_HOST`, else github.com), otherwise the config file is consulted
#[derive(Debug, Clone, Default)]
pub struct HubConfigResolver {
    path: Option<PathBuf>,
    env_token: Option<String>,
    env_user: Option<String>,
    env_host: Option<String>,
}

impl HubConfigResolver {
    /// Locate the config via `HUB_CONFIG`, `XDG_CONFIG_HOME` or `~/.config/hub`
    pub fn from_env() -> Self {
        let path = env::var_os("HUB_CONFIG")
            .map(PathBuf::from)
            .or_else(|| env::var_os("XDG_CONFIG_HOME").map(|dir| PathBuf::from(dir).join("hub")))
            .or_else(|| dirs::home_dir().map(|home| home.join(".config").join("hub")));

        Self {
            path,
            env_token: env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
            env_user: env::var("GITHUB_USER").ok().filter(|u| !u.is_empty()),
            env_host: env::var("GITHUB_HOST").ok().filter(|h| !h.is_empty()),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>, user: Option<String>) -> Self {
        self.env_token = Some(token.into());
        self.env_user = user;
        self
    }

    /// Host the environment token belongs to
    pub fn with_token_host(mut self, host: impl Into<String>) -> Self {
        self.env_host = Some(host.into());
        self
    }

    fn env_token_for(&self, host: &str) -> Option<&str> {
        let token_host = self.env_host.as_deref().unwrap_or(DEFAULT_TOKEN_HOST);
        if token_host.eq_ignore_ascii_case(host) {
            self.env_token.as_deref()
        } else {
            None
        }
    }

    fn read_config(&self, host: &str) -> Result<HashMap<String, Vec<HubHost>>, CredentialError> {
        let Some(path) = &self.path else {
            return Err(CredentialError::Missing(host.to_string()));
        };

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CredentialError::Missing(host.to_string()));
            }
            Err(source) => {
                return Err(CredentialError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }

        serde_yaml::from_str(&content).map_err(|source| CredentialError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

impl CredentialResolver for HubConfigResolver {
    fn resolve(&self, host: &str) -> Result<Credential, CredentialError> {
        if let Some(token) = self.env_token_for(host) {
            return Ok(Credential {
                user: self.env_user.clone().unwrap_or_else(|| "x-access-token".to_string()),
                token: token.to_string(),
                protocol: default_protocol(),
            });
        }

        let hosts = self.read_config(host)?;
        hosts
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(host))
            .and_then(|(_, accounts)| accounts.into_iter().next())
            .map(|account| Credential {
                user: account.user,
                token: account.oauth_token,
                protocol: account.protocol,
            })
            .ok_or_else(|| CredentialError::Missing(host.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hub");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_reads_host_entry() {
        let (_dir, path) = write_config(
            "github.com:\n- user: octocat\n  oauth_token: secret\n  protocol: https\n\
             ghe.example.com:\n- user: alice\n  oauth_token: other\n  protocol: http\n",
        );
        let resolver = HubConfigResolver::with_path(&path);

        let cred = resolver.resolve("github.com").unwrap();
        assert_eq!(cred.user, "octocat");
        assert_eq!(cred.token, "secret");

        let cred = resolver.resolve("ghe.example.com").unwrap();
        assert_eq!(cred.protocol, "http");
    }

    #[test]
    fn test_protocol_defaults_to_https() {
        let (_dir, path) = write_config("github.com:\n- user: octocat\n  oauth_token: secret\n");
        let cred = HubConfigResolver::with_path(&path).resolve("github.com").unwrap();
        assert_eq!(cred.protocol, "https");
    }

    #[test]
    fn test_unknown_host_is_missing() {
        let (_dir, path) = write_config("github.com:\n- user: octocat\n  oauth_token: secret\n");
        let err = HubConfigResolver::with_path(&path).resolve("gitlab.com").unwrap_err();
        assert!(matches!(err, CredentialError::Missing(host) if host == "gitlab.com"));
    }

    #[test]
    fn test_missing_file_is_missing_credential() {
        let dir = TempDir::new().unwrap();
        let err = HubConfigResolver::with_path(dir.path().join("nope"))
            .resolve("github.com")
            .unwrap_err();
        assert!(matches!(err, CredentialError::Missing(_)));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let (_dir, path) = write_config("github.com: [unclosed\n");
        let err = HubConfigResolver::with_path(&path).resolve("github.com").unwrap_err();
        assert!(matches!(err, CredentialError::Parse { .. }));
    }

    #[test]
    fn test_env_token_overrides_file() {
        let (_dir, path) = write_config("github.com:\n- user: octocat\n  oauth_token: secret\n");
        let cred = HubConfigResolver::with_path(&path)
            .with_token("from-env", Some("robot".to_string()))
            .resolve("github.com")
            .unwrap();
        assert_eq!(cred.token, "from-env");
        assert_eq!(cred.user, "robot");
    }

    #[test]
    fn test_env_token_ignored_for_other_host() {
        let (_dir, path) = write_config("ghe.example.com:\n- user: alice\n  oauth_token: enterprise\n");
        let resolver = HubConfigResolver::with_path(&path).with_token("from-env", None);

        let cred = resolver.resolve("ghe.example.com").unwrap();
        assert_eq!(cred.token, "enterprise");
        assert_eq!(cred.user, "alice");

        let dir = TempDir::new().unwrap();
        let err = HubConfigResolver::with_path(dir.path().join("nope"))
            .with_token("from-env", None)
            .resolve("ghe.example.com")
            .unwrap_err();
        assert!(matches!(err, CredentialError::Missing(host) if host == "ghe.example.com"));
    }

    #[test]
    fn test_env_token_follows_github_host() {
        let dir = TempDir::new().unwrap();
        let resolver = HubConfigResolver::with_path(dir.path().join("nope"))
            .with_token("from-env", None)
            .with_token_host("GHE.example.com");

        assert_eq!(resolver.resolve("ghe.example.com").unwrap().token, "from-env");
        assert!(resolver.resolve("github.com").is_err());
    }

    #[test]
    fn test_debug_hides_token() {
        let cred = Credential {
            user: "octocat".to_string(),
            token: "secret".to_string(),
            protocol: "https".to_string(),
        };
        assert!(!format!("{:?}", cred).contains("secret"));
    }
}
