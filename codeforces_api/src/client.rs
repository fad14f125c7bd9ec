//! HTTP client for the public Codeforces API.

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    query::{Query, StandingsQuery, UserRatingQuery, UserStatusQuery},
    types::{Envelope, EnvelopeStatus, RatingChange, Standings, Submission},
    Error,
};

const USER_AGENT: &str = concat!("cftracker/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the Codeforces API.
///
/// Only the read-only, unauthenticated methods are exposed. The client does
/// no pacing of its own; callers are expected to respect the API's limit of
/// roughly one call every two seconds.
pub struct Client {
    /// Base URL for the API. Defaults to `https://codeforces.com/api`.
    base_api_url: String,
    /// Built once; a builder failure is reported by every call.
    http: Result<reqwest::Client, String>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Creates a new client pointing at the production Codeforces API.
    pub fn new() -> Self {
        Self::with_base_url("https://codeforces.com/api")
    }

    /// Creates a new client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                e.to_string()
            });
        Self {
            base_api_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn get_url(&self, query: &impl Query) -> Result<Url, Error> {
        let url = Url::parse(format!("{}/{}", &self.base_api_url, query.method()).as_str())
            .map_err(|e| {
                tracing::error!("Invalid URL constructed: {}", e);
                Error::RequestFailed(format!("invalid URL: {}", e))
            })?;
        Ok(query.add_to_url(&url))
    }

    async fn get<T, Q>(&self, query: &Q) -> Result<T, Error>
    where
        T: DeserializeOwned,
        Q: Query,
    {
        let http = self
            .http
            .as_ref()
            .map_err(|e| Error::RequestFailed(format!("HTTP client unavailable: {}", e)))?;
        let url = self.get_url(query)?;
        tracing::debug!("Calling API: {}", url);
        let resp = http
            .get(url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get {}: {}", query.method(), e);
                Error::RequestFailed(e.to_string())
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed(e.to_string())
        })?;

        if !status.is_success() {
            // Codeforces answers bad parameters with 400 and a FAILED envelope.
            if let Ok(envelope) = serde_json::from_str::<Envelope<serde_json::Value>>(&body) {
                if let (EnvelopeStatus::Failed, Some(comment)) = (envelope.status, envelope.comment)
                {
                    tracing::error!(
                        "{} failed with status {}: {}",
                        query.method(),
                        status,
                        comment
                    );
                    return Err(Error::Failed { comment });
                }
            }
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        let envelope = serde_json::from_str::<Envelope<T>>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::error!("Failed to parse {}: {} | body: {}", query.method(), e, snippet);
            Error::Malformed(e.to_string())
        })?;

        match (envelope.status, envelope.result) {
            (EnvelopeStatus::Ok, Some(result)) => Ok(result),
            (EnvelopeStatus::Ok, None) => Err(Error::Malformed(
                "status OK without a result".to_string(),
            )),
            (EnvelopeStatus::Failed, _) => Err(Error::Failed {
                comment: envelope
                    .comment
                    .unwrap_or_else(|| "no comment provided".to_string()),
            }),
        }
    }

    /// Fetches the rated-contest history of a handle.
    pub async fn user_rating(&self, query: &UserRatingQuery) -> Result<Vec<RatingChange>, Error> {
        self.get::<Vec<RatingChange>, UserRatingQuery>(query).await
    }

    /// Fetches the most recent submissions of a handle, newest first.
    pub async fn user_status(&self, query: &UserStatusQuery) -> Result<Vec<Submission>, Error> {
        self.get::<Vec<Submission>, UserStatusQuery>(query).await
    }

    /// Fetches the standings of one contest, optionally restricted to handles.
    pub async fn contest_standings(&self, query: &StandingsQuery) -> Result<Standings, Error> {
        self.get::<Standings, StandingsQuery>(query).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}
