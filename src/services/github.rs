//! Repository listing through the GitHub REST API

use super::credentials::Credential;
use crate::error::{FatalError, ListError};
use crate::types::RepositoryRef;
use log::debug;
use reqwest::blocking::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::time::Duration;

const PUBLIC_HOST: &str = "github.com";
const PUBLIC_API: &str = "https://api.github.com";
const PER_PAGE: u32 = 100;

#[cfg_attr(test, mockall::automock)]
pub trait RepositoryLister {
    /// All repositories to scan, in the order the service returns them
    fn list(&self) -> Result<Vec<RepositoryRef>, ListError>;
}

/// API root for a host: the public API for github.com, `/api/v3` for
/// GitHub Enterprise
pub fn api_base_url(host: &str, protocol: &str) -> String {
    if host.eq_ignore_ascii_case(PUBLIC_HOST) {
        return PUBLIC_API.to_string();
    }

    let host = host.trim_end_matches('/');
    if host.starts_with(protocol) {
        format!("{}/api/v3", host)
    } else {
        format!("{}://{}/api/v3", protocol, host)
    }
}

/// First page of the listing: the authenticated user's repositories, or
/// those of the named user/organization
pub fn first_page_url(base: &str, organization: Option<&str>) -> String {
    match organization {
        Some(owner) => format!("{}/users/{}/repos?per_page={}", base, owner, PER_PAGE),
        None => format!("{}/user/repos?per_page={}", base, PER_PAGE),
    }
}

/// Extract the `rel="next"` target of an RFC 8288 `Link` header
pub fn next_link(link: &str) -> Option<String> {
    link.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|p| p.trim() == r#"rel="next""#);
        is_next.then(|| target.trim_start_matches('<').trim_end_matches('>').to_string())
    })
}

/// Lists repositories of one account, following pagination
#[derive(Debug, Clone)]
pub struct GitHubLister {
    client: Client,
    first_page: String,
}

impl GitHubLister {
    pub fn new(
        host: &str,
        organization: Option<&str>,
        credential: &Credential,
        timeout: Duration,
    ) -> Result<Self, FatalError> {
        let mut auth = HeaderValue::from_str(&format!("token {}", credential.token))
            .map_err(|e| FatalError::Client(format!("invalid token: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| FatalError::Client(e.to_string()))?;

        let base = api_base_url(host, &credential.protocol);
        Ok(Self {
            client,
            first_page: first_page_url(&base, organization),
        })
    }

    pub fn first_page(&self) -> &str {
        &self.first_page
    }

    fn fetch_page(&self, url: &str) -> Result<(Vec<RepositoryRef>, Option<String>), ListError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().map_err(|source| ListError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ListError::Status {
                url: url.to_string(),
                status,
            });
        }

        let next = response
            .headers()
            .get(header::LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_link);

        let page = response.json().map_err(|source| ListError::Request {
            url: url.to_string(),
            source,
        })?;

        Ok((page, next))
    }
}

impl RepositoryLister for GitHubLister {
    fn list(&self) -> Result<Vec<RepositoryRef>, ListError> {
        let mut repositories = Vec::new();
        let mut url = Some(self.first_page.clone());

        while let Some(current) = url {
            let (page, next) = self.fetch_page(&current)?;
            repositories.extend(page);
            url = next;
        }

        debug!("Listed {} repositories", repositories.len());
        Ok(repositories)
    }
}
