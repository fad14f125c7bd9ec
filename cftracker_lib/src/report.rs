//! Report assembly: one flat row per athlete participation.
//!
//! Loads a snapshot of the store, fetches live rating and submission data
//! once, and evaluates every analytic for each participation. Rows come with
//! parallel style hints so a renderer can colour cells without knowing the
//! analytics.

use std::collections::HashMap;

use chrono::DateTime;
use codeforces_api::types::{ParticipantType, RatingChange, Submission};
use serde::Serialize;

use crate::analytics::{
    self, Metric, Percentile, ProblemVerdict, RankTrend, SpeedVerdict, UPSOLVE_SUBMISSION_WINDOW,
};
use crate::client::PacedClient;
use crate::config::TrackerConfig;
use crate::db::{ContestRecord, Db, DbError, ParticipationRecord, ProblemRecord};

/// Number of leading columns before the problem cells.
pub const LEADING_COLUMNS: usize = 8;

/// A contest with its problems sorted by index.
#[derive(Debug, Clone)]
pub struct ContestEntry {
    pub contest: ContestRecord,
    pub problems: Vec<ProblemRecord>,
}

/// Everything the report needs from the store.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub contests: HashMap<String, ContestEntry>,
    pub participations: Vec<ParticipationRecord>,
}

impl Snapshot {
    pub fn load(db: &Db) -> Result<Self, DbError> {
        let mut contests: HashMap<String, ContestEntry> = db
            .load_contests()?
            .into_iter()
            .map(|c| {
                (
                    c.contest_id.clone(),
                    ContestEntry {
                        contest: c,
                        problems: Vec::new(),
                    },
                )
            })
            .collect();
        for problem in db.load_problems()? {
            if let Some(entry) = contests.get_mut(&problem.contest_id) {
                entry.problems.push(problem);
            }
        }
        for entry in contests.values_mut() {
            entry.problems.sort_by(|a, b| a.index.cmp(&b.index));
        }
        Ok(Self {
            contests,
            participations: db.load_participations()?,
        })
    }

    /// Widest problem list among stored contests.
    pub fn max_problems(&self) -> usize {
        self.contests
            .values()
            .map(|c| c.problems.len())
            .max()
            .unwrap_or(0)
    }
}

/// Style hint for one rendered cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellHint {
    Rated,
    Virtual,
    RatingGain,
    RatingLoss,
    Solved,
    Failed,
    Untouched,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProblemCell {
    pub index: String,
    pub rating: Option<i64>,
    pub verdict: ProblemVerdict,
    pub solve_time: Option<i64>,
    pub attempted: bool,
}

impl ProblemCell {
    pub fn text(&self) -> String {
        let rating = self.rating.map(|r| r.to_string()).unwrap_or_default();
        match (self.is_solved(), self.solve_time) {
            (true, Some(t)) => format!("{} ({:02}:{:02})", rating, t / 60, t % 60)
                .trim_start()
                .to_string(),
            _ => rating,
        }
    }

    fn is_solved(&self) -> bool {
        matches!(
            self.verdict,
            ProblemVerdict::Solved | ProblemVerdict::SolvedHard
        )
    }

    pub fn hint(&self) -> CellHint {
        if self.is_solved() {
            CellHint::Solved
        } else if self.attempted {
            CellHint::Failed
        } else {
            CellHint::Untouched
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipationKind {
    Rated,
    Virtual,
    Unofficial,
}

impl ParticipationKind {
    pub fn label(&self) -> &'static str {
        match self {
            ParticipationKind::Rated => "Rated",
            ParticipationKind::Virtual => "Virtual",
            ParticipationKind::Unofficial => "Unofficial",
        }
    }
}

impl From<ParticipantType> for ParticipationKind {
    fn from(ty: ParticipantType) -> Self {
        match ty {
            ParticipantType::Contestant => ParticipationKind::Rated,
            ParticipantType::Virtual => ParticipationKind::Virtual,
            _ => ParticipationKind::Unofficial,
        }
    }
}

/// One athlete participation with its display fields and analytics.
#[derive(Debug, Clone)]
pub struct ReportRow {
    pub contest_id: String,
    pub contest_name: String,
    pub kind: ParticipationKind,
    pub start_time: i64,
    pub rank: i64,
    pub new_rating: Option<i64>,
    pub rating_change: Option<i64>,
    pub problems: Vec<ProblemCell>,
    pub upsolved: usize,
    pub rank_trend: Option<RankTrend>,
    pub correctness: Vec<ProblemVerdict>,
    pub same_level: Percentile,
    pub higher_level: Percentile,
    pub speed: SpeedVerdict,
}

impl ReportRow {
    pub fn date(&self) -> String {
        DateTime::from_timestamp(self.start_time, 0)
            .map(|dt| dt.format("%d/%m/%Y").to_string())
            .unwrap_or_default()
    }

    pub fn time(&self) -> String {
        DateTime::from_timestamp(self.start_time, 0)
            .map(|dt| dt.format("%H:%M").to_string())
            .unwrap_or_default()
    }

    pub fn rating_title(&self) -> Option<&'static str> {
        self.new_rating.map(analytics::rating_title)
    }

    pub fn rating_change_text(&self) -> String {
        match self.rating_change {
            Some(c) if c > 0 => format!("+{}", c),
            Some(c) => c.to_string(),
            None => String::new(),
        }
    }

    pub fn rank_trend_text(&self) -> String {
        self.rank_trend.map(|t| t.to_string()).unwrap_or_default()
    }

    pub fn correctness_text(&self) -> String {
        analytics::correctness_summary(&self.correctness)
    }

    pub fn upsolved_text(&self) -> String {
        if self.upsolved > 0 {
            self.upsolved.to_string()
        } else {
            String::new()
        }
    }

    /// All cells in column order, problem cells padded to `problem_columns`.
    pub fn cells(&self, problem_columns: usize) -> Vec<String> {
        let mut cells = vec![
            self.contest_name.clone(),
            self.kind.label().to_string(),
            self.date(),
            self.time(),
            self.rank.to_string(),
            self.new_rating.map(|r| r.to_string()).unwrap_or_default(),
            self.rating_change_text(),
            self.rating_title().unwrap_or_default().to_string(),
        ];
        for i in 0..problem_columns {
            cells.push(self.problems.get(i).map(ProblemCell::text).unwrap_or_default());
        }
        cells.extend([
            self.upsolved_text(),
            self.rank_trend_text(),
            self.correctness_text(),
            self.same_level.to_string(),
            self.higher_level.to_string(),
            self.speed.to_string(),
        ]);
        cells
    }

    /// Style hints aligned with [`ReportRow::cells`].
    pub fn hints(&self, problem_columns: usize) -> Vec<Option<CellHint>> {
        let mut hints = vec![None; LEADING_COLUMNS];
        hints[1] = match self.kind {
            ParticipationKind::Rated => Some(CellHint::Rated),
            ParticipationKind::Virtual => Some(CellHint::Virtual),
            ParticipationKind::Unofficial => None,
        };
        hints[6] = match self.rating_change {
            Some(c) if c > 0 => Some(CellHint::RatingGain),
            Some(c) if c < 0 => Some(CellHint::RatingLoss),
            _ => None,
        };
        for i in 0..problem_columns {
            hints.push(self.problems.get(i).map(ProblemCell::hint));
        }
        hints.extend([None; 6]);
        hints
    }
}

/// The evaluated report.
#[derive(Debug, Default)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub problem_columns: usize,
}

/// Builds the report from the store plus live data for the athlete.
///
/// Failed live fetches are logged and treated as empty; the stored part of
/// the report is still produced.
pub async fn generate(
    db: &Db,
    client: &PacedClient,
    config: &TrackerConfig,
) -> Result<Report, DbError> {
    let snapshot = Snapshot::load(db)?;

    let rating_changes = client
        .user_rating(&config.athlete)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!("Rating history unavailable, report without ratings: {}", err);
            Vec::new()
        });
    let submissions = client
        .user_status(&config.athlete, UPSOLVE_SUBMISSION_WINDOW)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!("Submission history unavailable, upsolving not counted: {}", err);
            Vec::new()
        });

    Ok(build_report(&snapshot, config, &rating_changes, &submissions))
}

/// Evaluates every athlete participation, newest contest first.
pub fn build_report(
    snapshot: &Snapshot,
    config: &TrackerConfig,
    rating_changes: &[RatingChange],
    submissions: &[Submission],
) -> Report {
    let ratings: HashMap<String, &RatingChange> = rating_changes
        .iter()
        .map(|rc| (rc.contest_id.to_string(), rc))
        .collect();

    let mut by_contest: HashMap<&str, Vec<&ParticipationRecord>> = HashMap::new();
    for p in &snapshot.participations {
        by_contest.entry(p.contest_id.as_str()).or_default().push(p);
    }

    let mut athlete_rows: Vec<(&ParticipationRecord, &ContestEntry)> = snapshot
        .participations
        .iter()
        .filter(|p| p.handle == config.athlete)
        .filter(|p| p.participant_type != ParticipantType::Practice)
        .filter_map(|p| snapshot.contests.get(&p.contest_id).map(|c| (p, c)))
        .collect();
    athlete_rows.sort_by(|(pa, ca), (pb, cb)| {
        cb.contest
            .start_time
            .cmp(&ca.contest.start_time)
            .then_with(|| numeric_id(&pb.contest_id).cmp(&numeric_id(&pa.contest_id)))
            .then(pa.participant_type.cmp(&pb.participant_type))
    });

    let ordered: Vec<&ParticipationRecord> = athlete_rows.iter().map(|(p, _)| *p).collect();
    let benchmarks = config.all_benchmarks();
    let margin = config.time_margin_seconds();

    let rows = analytics::with_previous_rated_rank(&ordered)
        .into_iter()
        .zip(athlete_rows.iter().map(|(_, c)| *c))
        .map(|((athlete, previous_rank), entry)| {
            let contest_rows: &[&ParticipationRecord] = by_contest
                .get(athlete.contest_id.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let rating = ratings.get(&athlete.contest_id);

            let same_level = analytics::cohort(athlete, contest_rows, &config.same_level);
            let higher_level = analytics::cohort(athlete, contest_rows, &config.higher_level);
            let everyone = analytics::cohort(athlete, contest_rows, &benchmarks);

            let correctness = analytics::correctness(&entry.problems, &athlete.results);
            let problems = entry
                .problems
                .iter()
                .zip(&correctness)
                .enumerate()
                .map(|(i, (problem, verdict))| {
                    let result = athlete.results.get(i);
                    ProblemCell {
                        index: problem.index.clone(),
                        rating: problem.rating,
                        verdict: *verdict,
                        solve_time: result.and_then(|r| r.best_submission_time_seconds),
                        attempted: result.map_or(false, |r| r.rejected_attempt_count > 0),
                    }
                })
                .collect();

            let end_time =
                analytics::contest_end_time(entry.contest.start_time, entry.contest.contest_type);

            ReportRow {
                contest_id: athlete.contest_id.clone(),
                contest_name: entry.contest.name.clone(),
                kind: athlete.participant_type.into(),
                start_time: entry.contest.start_time,
                rank: athlete.rank,
                new_rating: rating.map(|rc| rc.new_rating),
                rating_change: rating
                    .filter(|_| athlete.participant_type == ParticipantType::Contestant)
                    .map(|rc| rc.delta()),
                problems,
                upsolved: analytics::upsolved_count(submissions, &athlete.contest_id, end_time),
                rank_trend: analytics::rank_trend(
                    athlete.rank,
                    previous_rank,
                    config.good_rank,
                    athlete.participant_type,
                ),
                correctness,
                same_level: analytics::percentile(athlete, &same_level, Metric::Rank),
                higher_level: analytics::percentile(athlete, &higher_level, Metric::Solved),
                speed: analytics::speed_tally(athlete, &everyone, margin).verdict(),
            }
        })
        .collect();

    Report {
        rows,
        problem_columns: snapshot.max_problems(),
    }
}

fn numeric_id(contest_id: &str) -> i64 {
    contest_id.parse().unwrap_or(0)
}
