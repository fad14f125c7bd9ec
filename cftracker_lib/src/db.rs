//! SQLite storage for synced contests, problems and participations.

use std::collections::HashSet;
use std::path::Path;

use codeforces_api::types::{ContestType, ParticipantType};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid stored value: {0}")]
    InvalidValue(String),
}

/// Key of a participation row: `{contestId}_{handle}_{type}`.
pub fn participation_id(
    contest_id: &str,
    handle: &str,
    participant_type: ParticipantType,
) -> String {
    format!("{}_{}_{}", contest_id, handle, participant_type)
}

/// Key of a problem row: `{contestId}_{index}`.
pub fn problem_id(contest_id: &str, index: &str) -> String {
    format!("{}_{}", contest_id, index)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContestRecord {
    pub contest_id: String,
    pub name: String,
    /// Epoch seconds; 0 when the API did not report a start time.
    pub start_time: i64,
    pub contest_type: ContestType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProblemRecord {
    pub problem_id: String,
    pub contest_id: String,
    pub index: String,
    pub rating: Option<i64>,
    pub accepted_count: Option<i64>,
    pub tried_count: Option<i64>,
}

/// Per-problem outcome as stored in the `results` JSON column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    #[serde(rename = "p")]
    pub points: f64,
    #[serde(rename = "r")]
    pub rejected_attempt_count: i64,
    #[serde(rename = "t", default)]
    pub best_submission_time_seconds: Option<i64>,
}

impl StoredResult {
    pub fn is_solved(&self) -> bool {
        self.points > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticipationRecord {
    pub unique_id: String,
    pub contest_id: String,
    pub handle: String,
    pub participant_type: ParticipantType,
    pub rank: i64,
    pub solved_count: i64,
    /// Positionally aligned with the contest's problems. May be shorter.
    pub results: Vec<StoredResult>,
}

/// All rows produced by one sync task, written in a single transaction.
#[derive(Debug, Default)]
pub struct StandingsBatch {
    /// Present only when the contest is not stored yet.
    pub contest: Option<(ContestRecord, Vec<ProblemRecord>)>,
    pub participations: Vec<ParticipationRecord>,
}

/// Row counts written by [`Db::write_batch`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchCounts {
    pub contests: usize,
    pub problems: usize,
    pub participations: usize,
}

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    #[doc(hidden)]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn init(&self) -> Result<(), DbError> {
        let schema = include_str!("../../schema/sqlite.sql");
        self.conn.execute_batch(schema)?;

        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;
        if version < 1 {
            self.conn.pragma_update(None, "user_version", 1)?;
        }
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<String>, DbError> {
        self.conn
            .query_row(
                "SELECT value FROM ingest_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(DbError::from)
    }

    pub fn set_meta(&self, key: &str, value: &str) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO ingest_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn contest_count(&self) -> Result<i64, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(1) FROM contests", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn problem_count(&self) -> Result<i64, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(1) FROM problems", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn participation_count(&self) -> Result<i64, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(1) FROM participations", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn contest_ids(&self) -> Result<HashSet<String>, DbError> {
        let mut stmt = self.conn.prepare("SELECT contest_id FROM contests")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row?);
        }
        Ok(ids)
    }

    pub fn participation_ids(&self) -> Result<HashSet<String>, DbError> {
        let mut stmt = self.conn.prepare("SELECT unique_id FROM participations")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row?);
        }
        Ok(ids)
    }

    /// Writes one task's rows atomically. Rows whose key already exists are
    /// left untouched; the store is append-only.
    pub fn write_batch(&mut self, batch: &StandingsBatch) -> Result<BatchCounts, DbError> {
        let tx = self.conn.transaction()?;
        let mut counts = BatchCounts::default();

        {
            if let Some((contest, problems)) = &batch.contest {
                counts.contests += tx.execute(
                    "INSERT OR IGNORE INTO contests (contest_id, name, start_time, contest_type)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        contest.contest_id,
                        contest.name,
                        contest.start_time,
                        contest.contest_type.to_string()
                    ],
                )?;

                let mut stmt_problem = tx.prepare(
                    "INSERT OR IGNORE INTO problems
                       (problem_id, contest_id, problem_index, seq, rating, accepted_count, tried_count)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )?;
                for (seq, problem) in problems.iter().enumerate() {
                    counts.problems += stmt_problem.execute(params![
                        problem.problem_id,
                        problem.contest_id,
                        problem.index,
                        seq as i64,
                        problem.rating,
                        problem.accepted_count,
                        problem.tried_count
                    ])?;
                }
            }

            let mut stmt_participation = tx.prepare(
                "INSERT OR IGNORE INTO participations
                   (unique_id, contest_id, handle, participant_type, rank, solved_count, results)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for p in &batch.participations {
                let results = serde_json::to_string(&p.results)?;
                counts.participations += stmt_participation.execute(params![
                    p.unique_id,
                    p.contest_id,
                    p.handle,
                    p.participant_type.as_str(),
                    p.rank,
                    p.solved_count,
                    results
                ])?;
            }
        }

        tx.commit()?;
        Ok(counts)
    }

    pub fn load_contests(&self) -> Result<Vec<ContestRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT contest_id, name, start_time, contest_type FROM contests ORDER BY start_time DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut contests = Vec::new();
        for row in rows {
            let (contest_id, name, start_time, contest_type) = row?;
            let contest_type = contest_type
                .parse::<ContestType>()
                .map_err(DbError::InvalidValue)?;
            contests.push(ContestRecord {
                contest_id,
                name,
                start_time,
                contest_type,
            });
        }
        Ok(contests)
    }

    /// All problems, grouped by contest and kept in API order within each.
    pub fn load_problems(&self) -> Result<Vec<ProblemRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT problem_id, contest_id, problem_index, rating, accepted_count, tried_count
             FROM problems
             ORDER BY contest_id, seq",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ProblemRecord {
                problem_id: row.get(0)?,
                contest_id: row.get(1)?,
                index: row.get(2)?,
                rating: row.get(3)?,
                accepted_count: row.get(4)?,
                tried_count: row.get(5)?,
            })
        })?;
        let mut problems = Vec::new();
        for row in rows {
            problems.push(row?);
        }
        Ok(problems)
    }

    pub fn load_participations(&self) -> Result<Vec<ParticipationRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT unique_id, contest_id, handle, participant_type, rank, solved_count, results
             FROM participations",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut participations = Vec::new();
        for row in rows {
            let (unique_id, contest_id, handle, participant_type, rank, solved_count, results) =
                row?;
            let participant_type = participant_type
                .parse::<ParticipantType>()
                .map_err(DbError::InvalidValue)?;
            let results: Vec<StoredResult> = if results.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&results)?
            };
            participations.push(ParticipationRecord {
                unique_id,
                contest_id,
                handle,
                participant_type,
                rank,
                solved_count,
                results,
            });
        }
        Ok(participations)
    }
}
