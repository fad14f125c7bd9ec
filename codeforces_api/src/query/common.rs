//! Shared query infrastructure: the [`Query`] trait.

use url::Url;

/// Trait implemented by all query builders. Each query knows the API method
/// it targets and how to serialize its parameters onto a URL.
pub trait Query {
    /// Codeforces method name, e.g. `user.rating`.
    fn method(&self) -> &'static str;

    /// Appends this query's parameters to the given URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url;
}
