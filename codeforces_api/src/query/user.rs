use url::Url;

use super::common::Query;

/// Parameters for `user.rating`: the rated-contest history of one handle.
#[derive(Clone, Debug)]
pub struct UserRatingQuery {
    pub handle: String,
}

impl UserRatingQuery {
    pub fn new(handle: &str) -> Self {
        Self {
            handle: handle.to_string(),
        }
    }
}

impl Query for UserRatingQuery {
    fn method(&self) -> &'static str {
        "user.rating"
    }

    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut().append_pair("handle", &self.handle);
        url
    }
}

/// Parameters for `user.status`: the most recent submissions of one handle.
///
/// `from` is 1-based, matching the API.
#[derive(Clone, Debug)]
pub struct UserStatusQuery {
    pub handle: String,
    pub from: i64,
    pub count: i64,
}

impl UserStatusQuery {
    pub fn new(handle: &str) -> Self {
        Self {
            handle: handle.to_string(),
            from: 1,
            count: 10,
        }
    }

    pub fn with_from(mut self, from: i64) -> Self {
        self.from = from;
        self
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }
}

impl Query for UserStatusQuery {
    fn method(&self) -> &'static str {
        "user.status"
    }

    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut()
            .append_pair("handle", &self.handle)
            .append_pair("from", &self.from.to_string())
            .append_pair("count", &self.count.to_string());
        url
    }
}
