use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

use priscope_core::{GithubConfig, PriscopeError, PullRequestRecord, RepoRef};

/// How many merged PRs a scan should retrieve.
///
/// The count-based and time-based modes are mutually exclusive, so the
/// choice is encoded in the type rather than in two optional parameters.
///
/// # Examples
///
/// ```
/// use priscope_scan::github::PrSelection;
///
/// let selection = PrSelection::Latest(10);
/// assert!(matches!(selection, PrSelection::Latest(10)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrSelection {
    /// Stop as soon as this many PRs have been collected, even mid-page.
    Latest(usize),
    /// Collect every PR merged on or after this instant.
    MergedSince(DateTime<Utc>),
}

/// How a retrieval ended.
///
/// A failed search page aborts the whole retrieval and discards any pages
/// already fetched. That mirrors the upstream policy this scanner inherits;
/// the caller decides whether to continue with an empty set.
#[derive(Debug)]
pub enum RetrievalOutcome {
    /// Retrieval ran to its stop condition.
    Complete(Vec<PullRequestRecord>),
    /// A search page failed; no partial results are returned.
    Aborted {
        /// Status code or transport error from the failed page.
        reason: String,
    },
}

#[derive(Deserialize)]
struct SearchResponse {
    total_count: usize,
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    number: u64,
    title: String,
    body: Option<String>,
    pull_request: PullRequestLinks,
}

#[derive(Deserialize)]
struct PullRequestLinks {
    url: String,
}

#[derive(Deserialize)]
struct PrDetail {
    merged_at: Option<DateTime<Utc>>,
    diff_url: Option<String>,
}

/// GitHub client for searching merged PRs and fetching details and diffs.
pub struct GitHubClient {
    http: reqwest::Client,
    config: GithubConfig,
    token: Option<String>,
}

impl GitHubClient {
    /// Create a client from configuration.
    ///
    /// The token comes from the config or the `GITHUB_TOKEN` environment
    /// variable; without one, requests go out unauthenticated at GitHub's
    /// lower rate ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`PriscopeError::GitHub`] if the HTTP client cannot be built.
    pub fn new(config: &GithubConfig) -> Result<Self, PriscopeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PriscopeError::GitHub(format!("failed to create HTTP client: {e}")))?;
        let token = config
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok());
        Ok(Self {
            http,
            config: config.clone(),
            token,
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", "priscope");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        request
    }

    /// Retrieve merged PRs for `repo`, paginating the search endpoint until
    /// the selection's stop condition is met.
    ///
    /// Strictly sequential: one search page, then one detail fetch and one
    /// diff fetch per item, in result order. A PR whose detail fetch fails
    /// or carries no merge timestamp is skipped with a warning; a failed
    /// search page aborts the whole retrieval.
    pub async fn retrieve(&self, repo: &RepoRef, selection: PrSelection) -> RetrievalOutcome {
        if let PrSelection::Latest(0) = selection {
            return RetrievalOutcome::Complete(Vec::new());
        }

        let query = search_query(repo, selection);
        let url = format!("{}/search/issues", self.config.api_url);
        let mut records: Vec<PullRequestRecord> = Vec::new();
        let mut page = 1usize;

        loop {
            let params = [
                ("q", query.clone()),
                ("sort", "updated".to_string()),
                ("order", "desc".to_string()),
                ("per_page", self.config.per_page.to_string()),
                ("page", page.to_string()),
            ];
            let response = match self.get(&url).query(&params).send().await {
                Ok(r) => r,
                Err(e) => {
                    return RetrievalOutcome::Aborted {
                        reason: format!("search request failed: {e}"),
                    }
                }
            };
            let status = response.status();
            if !status.is_success() {
                return RetrievalOutcome::Aborted {
                    reason: format!("search returned {status}"),
                };
            }
            let search: SearchResponse = match response.json().await {
                Ok(s) => s,
                Err(e) => {
                    return RetrievalOutcome::Aborted {
                        reason: format!("failed to parse search response: {e}"),
                    }
                }
            };

            if search.items.is_empty() {
                break;
            }

            for item in &search.items {
                let Some(detail) = self.fetch_pr_detail(&item.pull_request.url).await else {
                    continue;
                };
                let Some(merged_at) = detail.merged_at else {
                    eprintln!(
                        "warning: PR #{} has no merge timestamp, skipping",
                        item.number
                    );
                    continue;
                };
                if let PrSelection::MergedSince(cutoff) = selection {
                    if merged_at < cutoff {
                        continue;
                    }
                }
                let diff = match &detail.diff_url {
                    Some(diff_url) => self.fetch_diff(diff_url).await,
                    None => None,
                };

                records.push(PullRequestRecord {
                    number: item.number,
                    title: item.title.clone(),
                    description: item.body.clone(),
                    merged_at,
                    diff,
                });

                if let PrSelection::Latest(limit) = selection {
                    if records.len() >= limit {
                        return RetrievalOutcome::Complete(records);
                    }
                }
            }

            if !has_next_page(page, self.config.per_page, search.total_count) {
                break;
            }
            page += 1;
        }

        RetrievalOutcome::Complete(records)
    }

    async fn fetch_pr_detail(&self, detail_url: &str) -> Option<PrDetail> {
        let response = match self.get(detail_url).send().await {
            Ok(r) => r,
            Err(e) => {
                eprintln!("warning: failed to fetch PR detail: {e}");
                return None;
            }
        };
        let status = response.status();
        if !status.is_success() {
            eprintln!("warning: PR detail fetch returned {status}");
            return None;
        }
        match response.json().await {
            Ok(detail) => Some(detail),
            Err(e) => {
                eprintln!("warning: failed to parse PR detail: {e}");
                None
            }
        }
    }

    /// Fetch the raw diff for a PR.
    ///
    /// Returns `None` on any non-success status or transport error, with a
    /// warning on stderr; the caller tolerates a record without a diff.
    pub async fn fetch_diff(&self, diff_url: &str) -> Option<String> {
        let response = match self.get(diff_url).send().await {
            Ok(r) => r,
            Err(e) => {
                eprintln!("warning: failed to fetch diff: {e}");
                return None;
            }
        };
        let status = response.status();
        if !status.is_success() {
            eprintln!("warning: diff fetch returned {status}");
            return None;
        }
        match response.text().await {
            Ok(text) => Some(text),
            Err(e) => {
                eprintln!("warning: failed to read diff body: {e}");
                None
            }
        }
    }
}

/// Build the search predicate for merged PRs of `repo`.
///
/// # Examples
///
/// ```
/// use priscope_core::RepoRef;
/// use priscope_scan::github::{search_query, PrSelection};
///
/// let repo = RepoRef::from_url("https://github.com/acme/widget").unwrap();
/// let q = search_query(&repo, PrSelection::Latest(5));
/// assert_eq!(q, "repo:acme/widget is:pr is:merged");
/// ```
pub fn search_query(repo: &RepoRef, selection: PrSelection) -> String {
    let mut query = format!("repo:{}/{} is:pr is:merged", repo.owner, repo.name);
    if let PrSelection::MergedSince(cutoff) = selection {
        query.push_str(&format!(
            " merged:>={}",
            cutoff.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
    }
    query
}

/// Whether another search page remains past `page`, given the API's reported
/// total count.
pub fn has_next_page(page: usize, per_page: usize, total_count: usize) -> bool {
    page * per_page < total_count
}
