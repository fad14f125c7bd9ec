use url::Url;

use crate::types::ContestID;

use super::common::Query;

/// Parameters for `contest.standings`.
///
/// When `handles` is non-empty the ranklist is restricted to those handles;
/// the API expects them joined with `;`.
#[derive(Clone, Debug)]
pub struct StandingsQuery {
    pub contest_id: ContestID,
    pub handles: Vec<String>,
    pub show_unofficial: bool,
}

impl StandingsQuery {
    pub fn new(contest_id: ContestID) -> Self {
        Self {
            contest_id,
            handles: Vec::new(),
            show_unofficial: false,
        }
    }

    pub fn with_handles<I, S>(mut self, handles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.handles = handles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_unofficial(mut self, show_unofficial: bool) -> Self {
        self.show_unofficial = show_unofficial;
        self
    }
}

impl Query for StandingsQuery {
    fn method(&self) -> &'static str {
        "contest.standings"
    }

    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut()
            .append_pair("contestId", &self.contest_id.to_string());
        if !self.handles.is_empty() {
            url.query_pairs_mut()
                .append_pair("handles", &self.handles.join(";"));
        }
        url.query_pairs_mut()
            .append_pair("showUnofficial", &self.show_unofficial.to_string());
        url
    }
}
