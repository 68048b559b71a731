//! Repository listing through the GitHub GraphQL API.

mod error;
mod types;

pub use error::ListError;
pub use types::RepositoryPage;

use reqwest::blocking::Client;
use serde_json::json;
use std::time::Duration;

use crate::config::{Affiliation, SyncConfig};
use crate::repo::RepoDescriptor;
use crate::utils::logger;
use crate::utils::StyleMessage;

use types::{parse_page, PAGE_SIZE, REPOSITORIES_QUERY};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Source of listing pages. `cursor` is `None` for the first page.
pub trait PageFetcher {
    fn fetch_page(&self, cursor: Option<&str>) -> Result<RepositoryPage, ListError>;
}

/// Blocking GraphQL client for the authenticated viewer.
pub struct GithubClient {
    http: Client,
    endpoint: String,
    token: String,
    affiliations: Vec<&'static str>,
    ssh: bool,
}

impl GithubClient {
    pub fn new(config: &SyncConfig) -> Result<Self, ListError> {
        let http = Client::builder()
            .user_agent(concat!("ghsync/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
            affiliations: config.affiliations.iter().map(Affiliation::as_graphql).collect(),
            ssh: config.ssh,
        })
    }
}

impl PageFetcher for GithubClient {
    fn fetch_page(&self, cursor: Option<&str>) -> Result<RepositoryPage, ListError> {
        let body = json!({
            "query": REPOSITORIES_QUERY,
            "variables": {
                "cursor": cursor,
                "affiliations": self.affiliations,
                "pageSize": PAGE_SIZE,
            },
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(ListError::from_status(status, &text));
        }
        parse_page(&text, self.ssh)
    }
}

/// Lazy sequence of listing pages, following cursors until the last page.
///
/// Yields at most one error, after which the sequence ends.
pub struct RepoPages<'a, F: PageFetcher> {
    fetcher: &'a F,
    cursor: Option<String>,
    fetched: usize,
    done: bool,
}

impl<'a, F: PageFetcher> RepoPages<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self {
            fetcher,
            cursor: None,
            fetched: 0,
            done: false,
        }
    }
}

impl<'a, F: PageFetcher> Iterator for RepoPages<'a, F> {
    type Item = Result<Vec<RepoDescriptor>, ListError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let page = match self.fetcher.fetch_page(self.cursor.as_deref()) {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        self.fetched += page.repos.len();
        logger::info(StyleMessage::repos_fetched(self.fetched, page.total_count));

        if page.has_next_page {
            match page.end_cursor {
                Some(cursor) if self.cursor.as_deref() != Some(cursor.as_str()) => {
                    self.cursor = Some(cursor);
                }
                _ => {
                    self.done = true;
                    return Some(Err(ListError::Api(
                        "pagination cursor did not advance".to_string(),
                    )));
                }
            }
        } else {
            self.done = true;
        }

        Some(Ok(page.repos))
    }
}

/// Drain every page. Nothing is returned unless the whole listing succeeded.
pub fn list_repos<F: PageFetcher>(fetcher: &F) -> Result<Vec<RepoDescriptor>, ListError> {
    let mut repos = Vec::new();
    for page in RepoPages::new(fetcher) {
        repos.extend(page?);
    }
    Ok(repos)
}
