//! Rate-limited wrapper around the Codeforces API client.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use codeforces_api::types::{ContestID, RatingChange, Standings, Submission};
use codeforces_api::{Client, Error, StandingsQuery, UserRatingQuery, UserStatusQuery};
use tokio::time::{sleep, Instant};

/// Pause enforced after every API call.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(2100);

/// API client wrapper that paces calls with a fixed cooldown.
///
/// After every call, whatever its outcome, the wrapper sleeps for the
/// cooldown before handing the result back. If a call is abandoned before the
/// cooldown was served (the future was dropped), the debt is recorded and the
/// next call waits it out before sending anything. There is no retry.
pub struct PacedClient {
    inner: Client,
    cooldown: Duration,
    /// Deadline left behind by an abandoned call.
    owed_until: Mutex<Option<Instant>>,
}

impl Default for PacedClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PacedClient {
    /// Creates a paced client using the production API URL.
    pub fn new() -> Self {
        Self::from_client(Client::new())
    }

    /// Creates a paced client with a custom base URL. Used for testing.
    pub fn with_base_url(base_url: &str) -> Self {
        Self::from_client(Client::with_base_url(base_url))
    }

    fn from_client(inner: Client) -> Self {
        Self {
            inner,
            cooldown: DEFAULT_COOLDOWN,
            owed_until: Mutex::new(None),
        }
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    async fn settle_debt(&self) {
        let wait = {
            let mut owed = self.owed_until.lock().unwrap_or_else(|e| e.into_inner());
            owed.take()
                .and_then(|until| until.checked_duration_since(Instant::now()))
        };
        if let Some(dur) = wait {
            tracing::debug!("Waiting {:.1}s left over from an abandoned call", dur.as_secs_f64());
            sleep(dur).await;
        }
    }

    async fn paced<T, F>(&self, label: &str, call: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        self.settle_debt().await;
        let cooldown = Cooldown {
            slot: &self.owed_until,
            duration: self.cooldown,
            served: false,
        };
        let result = call.await;
        if let Err(err) = &result {
            tracing::warn!("{} request failed: {}", label, err);
        }
        cooldown.serve().await;
        result
    }

    /// Rated-contest history of `handle`.
    pub async fn user_rating(&self, handle: &str) -> Result<Vec<RatingChange>, Error> {
        let query = UserRatingQuery::new(handle);
        self.paced("user.rating", self.inner.user_rating(&query)).await
    }

    /// The `count` most recent submissions of `handle`.
    pub async fn user_status(&self, handle: &str, count: i64) -> Result<Vec<Submission>, Error> {
        let query = UserStatusQuery::new(handle).with_from(1).with_count(count);
        self.paced("user.status", self.inner.user_status(&query)).await
    }

    /// Standings of `contest_id` restricted to `handles`, unofficial rows included.
    pub async fn contest_standings(
        &self,
        contest_id: ContestID,
        handles: &[String],
    ) -> Result<Standings, Error> {
        let query = StandingsQuery::new(contest_id)
            .with_handles(handles.iter().cloned())
            .with_unofficial(true);
        self.paced("contest.standings", self.inner.contest_standings(&query)).await
    }
}

/// Scope guard for the post-call pause. Serving it sleeps in place; dropping
/// it unserved leaves the pause as a debt for the next call.
struct Cooldown<'a> {
    slot: &'a Mutex<Option<Instant>>,
    duration: Duration,
    served: bool,
}

impl Cooldown<'_> {
    async fn serve(mut self) {
        sleep(self.duration).await;
        self.served = true;
    }
}

impl Drop for Cooldown<'_> {
    fn drop(&mut self) {
        if self.served {
            return;
        }
        let until = Instant::now() + self.duration;
        let mut owed = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *owed = Some(owed.map_or(until, |current| current.max(until)));
    }
}
