//! Batch sync: fetch standings for pending tasks and persist new rows.
//!
//! Each task is independent. Its rows are written in one transaction and
//! every row is checked against the seen sets first, so a run can stop at
//! any point and the next run picks up exactly what is still missing.

use std::collections::HashSet;

use codeforces_api::types::{ParticipantType, RanklistRow, Standings};

use crate::client::PacedClient;
use crate::db::{
    participation_id, problem_id, ContestRecord, Db, DbError, ParticipationRecord, ProblemRecord,
    StandingsBatch, StoredResult,
};
use crate::discover::SyncTask;

/// Upper bound on tasks processed per invocation.
pub const DEFAULT_BATCH_LIMIT: usize = 20;

/// Keys already present in the store, loaded once per run and kept current
/// as rows are written.
#[derive(Debug, Default, Clone)]
pub struct SyncState {
    contests: HashSet<String>,
    participations: HashSet<String>,
}

impl SyncState {
    pub fn load(db: &Db) -> Result<Self, DbError> {
        Ok(Self {
            contests: db.contest_ids()?,
            participations: db.participation_ids()?,
        })
    }

    pub fn has_contest(&self, contest_id: &str) -> bool {
        self.contests.contains(contest_id)
    }

    pub fn has_participation(&self, unique_id: &str) -> bool {
        self.participations.contains(unique_id)
    }

    pub fn participation_ids(&self) -> &HashSet<String> {
        &self.participations
    }

    fn record(&mut self, batch: &StandingsBatch) {
        if let Some((contest, _)) = &batch.contest {
            self.contests.insert(contest.contest_id.clone());
        }
        for p in &batch.participations {
            self.participations.insert(p.unique_id.clone());
        }
    }
}

/// What happened to one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Standings were fetched; counts of new rows.
    Synced {
        contest_added: bool,
        participations_added: usize,
    },
    /// Standings could not be fetched; the task stays pending.
    Skipped,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    pub pending: usize,
    pub attempted: usize,
    pub skipped: usize,
    pub contests_added: usize,
    pub participations_added: usize,
}

impl SyncSummary {
    /// Tasks left for a later run (not attempted, or attempted and skipped).
    pub fn remaining(&self) -> usize {
        self.pending - self.attempted + self.skipped
    }
}

/// Processes pending tasks against one store, with one paced client.
pub struct BatchProcessor<'a> {
    client: &'a PacedClient,
    db: &'a mut Db,
    roster: &'a [String],
    state: SyncState,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(
        client: &'a PacedClient,
        db: &'a mut Db,
        roster: &'a [String],
    ) -> Result<Self, DbError> {
        let state = SyncState::load(db)?;
        Ok(Self {
            client,
            db,
            roster,
            state,
        })
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// Runs at most `limit` tasks from the front of `tasks`, calling
    /// `on_progress` after each one. Only store failures abort the batch.
    pub async fn run<F>(
        &mut self,
        tasks: &[SyncTask],
        limit: usize,
        mut on_progress: F,
    ) -> Result<SyncSummary, DbError>
    where
        F: FnMut(&SyncTask, &TaskOutcome),
    {
        let batch = &tasks[..tasks.len().min(limit)];
        let mut summary = SyncSummary {
            pending: tasks.len(),
            ..SyncSummary::default()
        };
        tracing::info!(
            "{} pending participations, processing a batch of {}",
            tasks.len(),
            batch.len()
        );

        for task in batch {
            let outcome = self.process(task).await?;
            summary.attempted += 1;
            match outcome {
                TaskOutcome::Synced {
                    contest_added,
                    participations_added,
                } => {
                    if contest_added {
                        summary.contests_added += 1;
                    }
                    summary.participations_added += participations_added;
                }
                TaskOutcome::Skipped => summary.skipped += 1,
            }
            on_progress(task, &outcome);
        }
        tracing::info!(
            "Batch done: {} attempted, {} skipped, {} contests and {} participations added, {} remaining",
            summary.attempted,
            summary.skipped,
            summary.contests_added,
            summary.participations_added,
            summary.remaining()
        );
        Ok(summary)
    }

    /// Fetches and persists one task.
    pub async fn process(&mut self, task: &SyncTask) -> Result<TaskOutcome, DbError> {
        tracing::debug!(
            "Processing contest {} ({})",
            task.contest_id,
            task.participant_type
        );
        let standings = match self
            .client
            .contest_standings(task.contest_id, self.roster)
            .await
        {
            Ok(standings) => standings,
            Err(err) => {
                tracing::warn!(
                    "Could not fetch standings for contest {}, skipping: {}",
                    task.contest_id,
                    err
                );
                return Ok(TaskOutcome::Skipped);
            }
        };

        let batch = build_batch(&standings, self.roster, &self.state);
        let counts = self.db.write_batch(&batch)?;
        self.state.record(&batch);

        Ok(TaskOutcome::Synced {
            contest_added: counts.contests > 0,
            participations_added: counts.participations,
        })
    }
}

/// Turns fetched standings into the rows that are not stored yet.
pub fn build_batch(standings: &Standings, roster: &[String], state: &SyncState) -> StandingsBatch {
    let contest_id = standings.contest.id.to_string();

    let contest = if state.has_contest(&contest_id) {
        None
    } else {
        let record = ContestRecord {
            contest_id: contest_id.clone(),
            name: standings.contest.name.clone(),
            start_time: standings.contest.start_time_seconds.unwrap_or(0),
            contest_type: standings.contest.contest_type,
        };
        let problems = standings
            .problems
            .iter()
            .map(|p| ProblemRecord {
                problem_id: problem_id(&contest_id, &p.index),
                contest_id: contest_id.clone(),
                index: p.index.clone(),
                rating: p.rating,
                accepted_count: None,
                tried_count: None,
            })
            .collect();
        Some((record, problems))
    };

    let mut seen_in_batch = HashSet::new();
    let participations = standings
        .rows
        .iter()
        .filter_map(|row| participation_from_row(&contest_id, row, roster))
        .filter(|p| !state.has_participation(&p.unique_id))
        .filter(|p| seen_in_batch.insert(p.unique_id.clone()))
        .collect();

    StandingsBatch {
        contest,
        participations,
    }
}

/// Builds a participation for a tracked, non-practice row.
fn participation_from_row(
    contest_id: &str,
    row: &RanklistRow,
    roster: &[String],
) -> Option<ParticipationRecord> {
    let handle = row.party.primary_handle()?;
    if !roster.iter().any(|h| h == handle) {
        return None;
    }
    let participant_type = row.party.participant_type;
    if participant_type == ParticipantType::Practice {
        return None;
    }

    let results: Vec<StoredResult> = row
        .problem_results
        .iter()
        .map(|pr| StoredResult {
            points: pr.points,
            rejected_attempt_count: pr.rejected_attempt_count,
            best_submission_time_seconds: pr.best_submission_time_seconds,
        })
        .collect();
    let solved_count = results.iter().filter(|r| r.is_solved()).count() as i64;

    Some(ParticipationRecord {
        unique_id: participation_id(contest_id, handle, participant_type),
        contest_id: contest_id.to_string(),
        handle: handle.to_string(),
        participant_type,
        rank: row.rank,
        solved_count,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeforces_api::types::{
        Contest, ContestPhase, ContestType, Member, Party, Problem, ProblemResult,
    };

    fn roster() -> Vec<String> {
        vec!["alice".into(), "bob".into()]
    }

    fn row(handle: &str, ty: ParticipantType, rank: i64, points: &[f64]) -> RanklistRow {
        RanklistRow {
            party: Party {
                contest_id: Some(42),
                members: vec![Member {
                    handle: handle.into(),
                }],
                participant_type: ty,
                ghost: false,
                start_time_seconds: None,
            },
            rank,
            points: points.iter().sum(),
            penalty: 0,
            successful_hack_count: 0,
            unsuccessful_hack_count: 0,
            problem_results: points
                .iter()
                .map(|&p| ProblemResult {
                    points: p,
                    penalty: None,
                    rejected_attempt_count: if p > 0.0 { 0 } else { 1 },
                    best_submission_time_seconds: if p > 0.0 { Some(900) } else { None },
                })
                .collect(),
        }
    }

    fn standings(rows: Vec<RanklistRow>) -> Standings {
        Standings {
            contest: Contest {
                id: 42,
                name: "Round 42".into(),
                contest_type: ContestType::Cf,
                phase: ContestPhase::Finished,
                frozen: false,
                duration_seconds: Some(7200),
                start_time_seconds: Some(1_000),
            },
            problems: ["A", "B"]
                .iter()
                .map(|idx| Problem {
                    contest_id: Some(42),
                    index: idx.to_string(),
                    name: idx.to_string(),
                    rating: Some(800),
                    points: None,
                    tags: vec![],
                })
                .collect(),
            rows,
        }
    }

    #[test]
    fn builds_contest_problems_and_tracked_rows() {
        let s = standings(vec![
            row("alice", ParticipantType::Contestant, 10, &[500.0, 0.0]),
            row("bob", ParticipantType::Virtual, 5, &[500.0, 1000.0]),
            row("mallory", ParticipantType::Contestant, 1, &[500.0, 1000.0]),
        ]);
        let batch = build_batch(&s, &roster(), &SyncState::default());

        let (contest, problems) = batch.contest.unwrap();
        assert_eq!(contest.contest_id, "42");
        assert_eq!(contest.start_time, 1_000);
        assert_eq!(problems.len(), 2);
        assert_eq!(problems[1].problem_id, "42_B");
        assert!(problems.iter().all(|p| p.tried_count.is_none()));

        assert_eq!(batch.participations.len(), 2);
        let alice = &batch.participations[0];
        assert_eq!(alice.unique_id, "42_alice_CONTESTANT");
        assert_eq!(alice.solved_count, 1);
        assert_eq!(alice.results[1].best_submission_time_seconds, None);
        assert_eq!(batch.participations[1].solved_count, 2);
    }

    #[test]
    fn practice_rows_are_never_persisted() {
        let s = standings(vec![row("alice", ParticipantType::Practice, 0, &[1.0, 1.0])]);
        let batch = build_batch(&s, &roster(), &SyncState::default());
        assert!(batch.participations.is_empty());
    }

    #[test]
    fn known_keys_are_skipped() {
        let mut state = SyncState::default();
        state.contests.insert("42".into());
        state.participations.insert("42_alice_CONTESTANT".into());

        let s = standings(vec![
            row("alice", ParticipantType::Contestant, 10, &[500.0, 0.0]),
            row("alice", ParticipantType::Virtual, 12, &[500.0, 0.0]),
        ]);
        let batch = build_batch(&s, &roster(), &state);
        assert!(batch.contest.is_none());
        assert_eq!(batch.participations.len(), 1);
        assert_eq!(batch.participations[0].unique_id, "42_alice_VIRTUAL");
    }

    #[test]
    fn duplicate_rows_in_one_response_collapse() {
        let s = standings(vec![
            row("alice", ParticipantType::Virtual, 10, &[500.0, 0.0]),
            row("alice", ParticipantType::Virtual, 11, &[0.0, 0.0]),
        ]);
        let batch = build_batch(&s, &roster(), &SyncState::default());
        assert_eq!(batch.participations.len(), 1);
        assert_eq!(batch.participations[0].rank, 10);
    }

    #[test]
    fn missing_start_time_defaults_to_zero() {
        let mut s = standings(vec![]);
        s.contest.start_time_seconds = None;
        let batch = build_batch(&s, &roster(), &SyncState::default());
        assert_eq!(batch.contest.unwrap().0.start_time, 0);
    }

    #[test]
    fn remaining_counts_unattempted_and_skipped() {
        let summary = SyncSummary {
            pending: 25,
            attempted: 20,
            skipped: 3,
            contests_added: 17,
            participations_added: 40,
        };
        assert_eq!(summary.remaining(), 8);
    }
}
