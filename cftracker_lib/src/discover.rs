//! Discovery of participations that still need to be synced.
//!
//! Two upstream feeds are reconciled: the rated-contest history yields
//! CONTESTANT participations, and the recent submission history yields
//! VIRTUAL participations. Whatever is already stored is dropped and the rest
//! is ordered newest contest first.

use std::collections::{BTreeSet, HashSet};

use codeforces_api::types::{ContestID, ParticipantType, RatingChange, Submission};

use crate::client::PacedClient;
use crate::db::participation_id;

/// How many recent submissions are scanned for virtual participations.
pub const DISCOVERY_SUBMISSION_WINDOW: i64 = 2000;

/// One participation to fetch standings for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SyncTask {
    pub contest_id: ContestID,
    pub participant_type: ParticipantType,
}

impl SyncTask {
    pub fn unique_id(&self, handle: &str) -> String {
        participation_id(&self.contest_id.to_string(), handle, self.participant_type)
    }
}

/// Fetches both feeds for `handle` and returns the pending tasks.
///
/// A feed that fails to load contributes nothing; the run goes on with
/// whatever the other feed produced.
pub async fn discover_pending(
    client: &PacedClient,
    handle: &str,
    stored: &HashSet<String>,
) -> Vec<SyncTask> {
    let rating_changes = match client.user_rating(handle).await {
        Ok(changes) => changes,
        Err(err) => {
            tracing::warn!("Rating history unavailable for {}: {}", handle, err);
            Vec::new()
        }
    };
    let submissions = match client
        .user_status(handle, DISCOVERY_SUBMISSION_WINDOW)
        .await
    {
        Ok(subs) => subs,
        Err(err) => {
            tracing::warn!("Submission history unavailable for {}: {}", handle, err);
            Vec::new()
        }
    };

    let tasks = pending_tasks(handle, &rating_changes, &submissions, stored);
    tracing::info!(
        "Discovered {} pending participations ({} rated contests, {} submissions scanned)",
        tasks.len(),
        rating_changes.len(),
        submissions.len()
    );
    tasks
}

/// Merges both feeds into one set keyed by `(contest, type)`, removes stored
/// participations and sorts by contest id, newest first.
pub fn pending_tasks(
    handle: &str,
    rating_changes: &[RatingChange],
    submissions: &[Submission],
    stored: &HashSet<String>,
) -> Vec<SyncTask> {
    let rated = rating_changes.iter().map(|rc| SyncTask {
        contest_id: rc.contest_id,
        participant_type: ParticipantType::Contestant,
    });
    let virtuals = submissions
        .iter()
        .filter(|sub| sub.author.participant_type == ParticipantType::Virtual)
        .filter_map(|sub| sub.contest_id)
        .map(|contest_id| SyncTask {
            contest_id,
            participant_type: ParticipantType::Virtual,
        });

    let merged: BTreeSet<SyncTask> = rated.chain(virtuals).collect();

    let mut tasks: Vec<SyncTask> = merged
        .into_iter()
        .filter(|task| !stored.contains(&task.unique_id(handle)))
        .collect();
    tasks.sort_by(|a, b| {
        b.contest_id
            .cmp(&a.contest_id)
            .then(a.participant_type.cmp(&b.participant_type))
    });
    tasks
}
