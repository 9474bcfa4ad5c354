use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::TrackerSettings;
use crate::error::{ReleaseError, Result};
use crate::tracker::{Issue, IssueTracker};

const PAGE_SIZE: usize = 50;

/// JIRA REST (v2) client using HTTP basic authentication
pub struct JiraTracker {
    client: Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPage {
    #[serde(default)]
    start_at: usize,
    #[serde(default)]
    total: usize,
    #[serde(default)]
    issues: Vec<RawIssue>,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    key: String,
    #[serde(default)]
    fields: Option<RawFields>,
}

#[derive(Debug, Deserialize)]
struct RawFields {
    summary: Option<String>,
}

impl From<RawIssue> for Issue {
    fn from(raw: RawIssue) -> Self {
        Issue {
            key: raw.key,
            summary: raw.fields.and_then(|f| f.summary),
        }
    }
}

fn parse_search_page(body: &str) -> Result<SearchPage> {
    serde_json::from_str(body)
        .map_err(|e| ReleaseError::tracker(format!("Unexpected search payload: {}", e)))
}

fn api_url(server: &str, path: &str) -> String {
    format!("{}/rest/api/2/{}", server.trim_end_matches('/'), path)
}

impl JiraTracker {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("jira-release"));

        let client = Client::builder().default_headers(headers).build()?;
        Ok(JiraTracker { client })
    }

    /// Checks the credentials against `/myself`.
    fn authenticate(&self, settings: &TrackerSettings) -> Result<()> {
        let response = self
            .client
            .get(api_url(&settings.server, "myself"))
            .basic_auth(&settings.username, Some(&settings.password))
            .send()
            .map_err(|e| {
                ReleaseError::authentication(format!("cannot reach {}: {}", settings.server, e))
            })?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ReleaseError::authentication(
                format!("{} rejected user '{}'", settings.server, settings.username),
            )),
            status => Err(ReleaseError::authentication(format!(
                "{} answered {}",
                settings.server, status
            ))),
        }
    }

    fn fetch_page(&self, settings: &TrackerSettings, query: &str, start_at: usize) -> Result<SearchPage> {
        let response = self
            .client
            .get(api_url(&settings.server, "search"))
            .basic_auth(&settings.username, Some(&settings.password))
            .query(&[
                ("jql", query.to_string()),
                ("startAt", start_at.to_string()),
                ("maxResults", PAGE_SIZE.to_string()),
                ("fields", "summary".to_string()),
            ])
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ReleaseError::tracker(format!(
                "search failed with {}: {}",
                status, body
            )));
        }

        parse_search_page(&body)
    }
}

impl IssueTracker for JiraTracker {
    fn search(&self, settings: &TrackerSettings, query: &str) -> Result<Vec<Issue>> {
        self.authenticate(settings)?;

        let mut issues: Vec<Issue> = Vec::new();
        loop {
            let page = self.fetch_page(settings, query, issues.len())?;
            let received = page.issues.len();
            issues.extend(page.issues.into_iter().map(Issue::from));

            if received == 0 || page.start_at + received >= page.total {
                break;
            }
        }

        Ok(issues)
    }
}
