//! Comparative performance analytics.
//!
//! Pure functions over stored participations: rank trend, difficulty-adjusted
//! correctness, percentile standing against a benchmark cohort, relative
//! solve speed and upsolving. Nothing here touches the network or the store.

use std::collections::HashSet;
use std::fmt;

use codeforces_api::types::{ContestType, ParticipantType, Submission};

use crate::db::{ParticipationRecord, ProblemRecord, StoredResult};

/// Assumed length of a `CF` round, in seconds.
pub const SHORT_CONTEST_SECONDS: i64 = 7_200;
/// Assumed length of every other round, in seconds.
pub const LONG_CONTEST_SECONDS: i64 = 18_000;

/// How many recent submissions are scanned for upsolves.
pub const UPSOLVE_SUBMISSION_WINDOW: i64 = 500;

// -- Rank trend --

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Improved,
    Worsened,
    Unchanged,
}

/// Rank assessment of a CONTESTANT participation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankTrend {
    pub within_target: bool,
    /// `None` when no rated rank precedes this one in the report.
    pub movement: Option<Movement>,
}

impl fmt::Display for RankTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.within_target { "✅" } else { "⛔" })?;
        match self.movement {
            Some(Movement::Improved) => write!(f, "📈"),
            Some(Movement::Worsened) => write!(f, "📉"),
            Some(Movement::Unchanged) => write!(f, "➡️"),
            None => Ok(()),
        }
    }
}

/// Rates `rank` against the target and the previous rated rank. Returns
/// `None` for non-CONTESTANT rows and for rows without a rank.
pub fn rank_trend(
    rank: i64,
    previous: Option<i64>,
    good_rank: i64,
    participant_type: ParticipantType,
) -> Option<RankTrend> {
    if participant_type != ParticipantType::Contestant || rank <= 0 {
        return None;
    }
    let movement = previous.filter(|&p| p > 0).map(|prev| match rank.cmp(&prev) {
        std::cmp::Ordering::Less => Movement::Improved,
        std::cmp::Ordering::Greater => Movement::Worsened,
        std::cmp::Ordering::Equal => Movement::Unchanged,
    });
    Some(RankTrend {
        within_target: rank <= good_rank,
        movement,
    })
}

/// Pairs each participation with the rank carried from the CONTESTANT
/// participations seen before it in `rows`.
///
/// `rows` is in report order, newest contest first, so a row is compared
/// with the closest more recent rated contest. The carried rank is replaced
/// only by CONTESTANT rows; other rows pass it through unchanged.
pub fn with_previous_rated_rank<'a>(
    rows: &[&'a ParticipationRecord],
) -> Vec<(&'a ParticipationRecord, Option<i64>)> {
    rows.iter()
        .scan(None, |carried: &mut Option<i64>, &row| {
            let previous = *carried;
            if row.participant_type == ParticipantType::Contestant {
                *carried = Some(row.rank);
            }
            Some((row, previous))
        })
        .collect()
}

// -- Difficulty-adjusted correctness --

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Classifies a problem by its global acceptance ratio. Medium when no
/// attempts are known.
pub fn classify_difficulty(accepted: Option<i64>, tried: Option<i64>) -> Difficulty {
    match (accepted, tried) {
        (Some(accepted), Some(tried)) if tried > 0 => {
            let ratio = accepted as f64 / tried as f64;
            if ratio < 0.25 {
                Difficulty::Hard
            } else if ratio > 0.75 {
                Difficulty::Easy
            } else {
                Difficulty::Medium
            }
        }
        _ => Difficulty::Medium,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemVerdict {
    NotAttempted,
    Solved,
    SolvedHard,
    Failed,
    FailedEasy,
    Untouched,
}

impl ProblemVerdict {
    pub fn symbol(&self) -> &'static str {
        match self {
            ProblemVerdict::NotAttempted | ProblemVerdict::Untouched => "➖",
            ProblemVerdict::Solved => "✅",
            ProblemVerdict::SolvedHard => "🔥",
            ProblemVerdict::Failed => "❌",
            ProblemVerdict::FailedEasy => "⚠️",
        }
    }
}

pub fn problem_verdict(result: Option<&StoredResult>, difficulty: Difficulty) -> ProblemVerdict {
    match result {
        None => ProblemVerdict::NotAttempted,
        Some(r) if r.is_solved() => {
            if difficulty == Difficulty::Hard {
                ProblemVerdict::SolvedHard
            } else {
                ProblemVerdict::Solved
            }
        }
        Some(r) if r.rejected_attempt_count > 0 => {
            if difficulty == Difficulty::Easy {
                ProblemVerdict::FailedEasy
            } else {
                ProblemVerdict::Failed
            }
        }
        Some(_) => ProblemVerdict::Untouched,
    }
}

/// One verdict per problem slot, in display order.
pub fn correctness(problems: &[ProblemRecord], results: &[StoredResult]) -> Vec<ProblemVerdict> {
    problems
        .iter()
        .enumerate()
        .map(|(i, problem)| {
            let difficulty = classify_difficulty(problem.accepted_count, problem.tried_count);
            problem_verdict(results.get(i), difficulty)
        })
        .collect()
}

pub fn correctness_summary(verdicts: &[ProblemVerdict]) -> String {
    verdicts.iter().map(ProblemVerdict::symbol).collect()
}

// -- Percentile against a cohort --

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Lower is better.
    Rank,
    /// Higher is better.
    Solved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Percentile {
    NotApplicable,
    /// Share of the cohort the athlete outperformed, in whole percent.
    BetterThan(u32),
}

impl fmt::Display for Percentile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Percentile::NotApplicable => write!(f, "N/A"),
            Percentile::BetterThan(pct) => write!(f, "better than {}%", pct),
        }
    }
}

/// Benchmark participations comparable to `athlete`: same contest, same
/// participation type, handle in `benchmarks`, not the athlete.
pub fn cohort<'a>(
    athlete: &ParticipationRecord,
    contest_rows: &'a [&'a ParticipationRecord],
    benchmarks: &[String],
) -> Vec<&'a ParticipationRecord> {
    contest_rows
        .iter()
        .copied()
        .filter(|p| p.contest_id == athlete.contest_id)
        .filter(|p| p.participant_type == athlete.participant_type)
        .filter(|p| p.handle != athlete.handle)
        .filter(|p| benchmarks.iter().any(|b| b == &p.handle))
        .collect()
}

pub fn percentile(
    athlete: &ParticipationRecord,
    cohort: &[&ParticipationRecord],
    metric: Metric,
) -> Percentile {
    if cohort.is_empty() {
        return Percentile::NotApplicable;
    }
    if metric == Metric::Rank && athlete.participant_type != ParticipantType::Contestant {
        return Percentile::NotApplicable;
    }
    let outperformed = cohort
        .iter()
        .filter(|b| match metric {
            Metric::Rank => athlete.rank < b.rank,
            Metric::Solved => athlete.solved_count > b.solved_count,
        })
        .count();
    let pct = (outperformed as f64 / cohort.len() as f64 * 100.0).round() as u32;
    Percentile::BetterThan(pct)
}

// -- Relative solve speed --

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedVerdict {
    NotApplicable,
    Better,
    Neutral,
    Worse,
}

impl fmt::Display for SpeedVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SpeedVerdict::NotApplicable => "N/A",
            SpeedVerdict::Better => "faster",
            SpeedVerdict::Neutral => "on par",
            SpeedVerdict::Worse => "slower",
        };
        write!(f, "{}", s)
    }
}

/// Per-problem tallies behind a [`SpeedVerdict`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SpeedTally {
    pub compared: usize,
    pub faster: usize,
    pub slower: usize,
}

impl SpeedTally {
    pub fn verdict(&self) -> SpeedVerdict {
        if self.compared == 0 {
            SpeedVerdict::NotApplicable
        } else if self.slower * 2 > self.compared {
            SpeedVerdict::Worse
        } else if self.faster * 2 > self.compared {
            SpeedVerdict::Better
        } else {
            SpeedVerdict::Neutral
        }
    }
}

fn solve_time(result: &StoredResult) -> Option<i64> {
    if !result.is_solved() {
        return None;
    }
    result.best_submission_time_seconds.filter(|&t| t > 0)
}

/// Compares the athlete's solve times with the cohort mean, problem by
/// problem. A solve is faster when below the mean and slower when above the
/// mean plus `margin_seconds`.
pub fn speed_tally(
    athlete: &ParticipationRecord,
    cohort: &[&ParticipationRecord],
    margin_seconds: i64,
) -> SpeedTally {
    let mut tally = SpeedTally::default();
    for (i, result) in athlete.results.iter().enumerate() {
        let Some(own) = solve_time(result) else {
            continue;
        };
        let times: Vec<i64> = cohort
            .iter()
            .filter_map(|b| b.results.get(i).and_then(solve_time))
            .collect();
        if times.is_empty() {
            continue;
        }
        tally.compared += 1;
        let mean = times.iter().sum::<i64>() as f64 / times.len() as f64;
        let own = own as f64;
        if own < mean {
            tally.faster += 1;
        }
        if own > mean + margin_seconds as f64 {
            tally.slower += 1;
        }
    }
    tally
}

// -- Upsolving --

/// Approximate end of a contest from its start and scoring type.
pub fn contest_end_time(start_time: i64, contest_type: ContestType) -> i64 {
    let duration = match contest_type {
        ContestType::Cf => SHORT_CONTEST_SECONDS,
        _ => LONG_CONTEST_SECONDS,
    };
    start_time + duration
}

/// Distinct problems of `contest_id` accepted strictly after `end_time`.
pub fn upsolved_count(submissions: &[Submission], contest_id: &str, end_time: i64) -> usize {
    submissions
        .iter()
        .filter(|s| s.is_accepted())
        .filter(|s| s.contest_id.map(|id| id.to_string()).as_deref() == Some(contest_id))
        .filter(|s| s.creation_time_seconds > end_time)
        .map(|s| s.problem.index.as_str())
        .collect::<HashSet<_>>()
        .len()
}

// -- Rating titles --

/// Codeforces title for a rating.
pub fn rating_title(rating: i64) -> &'static str {
    match rating {
        r if r >= 3000 => "Legendary Grandmaster",
        r if r >= 2600 => "International Grandmaster",
        r if r >= 2400 => "Grandmaster",
        r if r >= 2300 => "International Master",
        r if r >= 2100 => "Master",
        r if r >= 1900 => "Candidate Master",
        r if r >= 1600 => "Expert",
        r if r >= 1400 => "Specialist",
        r if r >= 1200 => "Pupil",
        _ => "Newbie",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeforces_api::types::{Member, Party, Problem};

    fn result(points: f64, rejected: i64, time: Option<i64>) -> StoredResult {
        StoredResult {
            points,
            rejected_attempt_count: rejected,
            best_submission_time_seconds: time,
        }
    }

    fn part(
        contest: &str,
        handle: &str,
        ty: ParticipantType,
        rank: i64,
        results: Vec<StoredResult>,
    ) -> ParticipationRecord {
        let solved_count = results.iter().filter(|r| r.is_solved()).count() as i64;
        ParticipationRecord {
            unique_id: format!("{}_{}_{}", contest, handle, ty),
            contest_id: contest.into(),
            handle: handle.into(),
            participant_type: ty,
            rank,
            solved_count,
            results,
        }
    }

    fn problem(index: &str, accepted: Option<i64>, tried: Option<i64>) -> ProblemRecord {
        ProblemRecord {
            problem_id: format!("1_{}", index),
            contest_id: "1".into(),
            index: index.into(),
            rating: None,
            accepted_count: accepted,
            tried_count: tried,
        }
    }

    fn accepted_submission(contest_id: i64, index: &str, at: i64) -> Submission {
        Submission {
            id: at,
            contest_id: Some(contest_id),
            creation_time_seconds: at,
            relative_time_seconds: None,
            problem: Problem {
                contest_id: Some(contest_id),
                index: index.into(),
                name: index.into(),
                rating: None,
                points: None,
                tags: vec![],
            },
            author: Party {
                contest_id: Some(contest_id),
                members: vec![Member {
                    handle: "alice".into(),
                }],
                participant_type: ParticipantType::Practice,
                ghost: false,
                start_time_seconds: None,
            },
            programming_language: None,
            verdict: Some("OK".into()),
        }
    }

    #[test]
    fn test_rank_trend_pass_fail_and_movement() {
        let t = rank_trend(500, Some(800), 1000, ParticipantType::Contestant).unwrap();
        assert!(t.within_target);
        assert_eq!(t.movement, Some(Movement::Improved));
        assert_eq!(t.to_string(), "✅📈");

        let t = rank_trend(1200, Some(800), 1000, ParticipantType::Contestant).unwrap();
        assert!(!t.within_target);
        assert_eq!(t.movement, Some(Movement::Worsened));

        let t = rank_trend(800, Some(800), 800, ParticipantType::Contestant).unwrap();
        assert!(t.within_target);
        assert_eq!(t.movement, Some(Movement::Unchanged));

        let t = rank_trend(800, None, 1000, ParticipantType::Contestant).unwrap();
        assert_eq!(t.movement, None);
        assert_eq!(t.to_string(), "✅");
    }

    #[test]
    fn test_rank_trend_only_for_rated_rows() {
        assert_eq!(rank_trend(10, Some(20), 100, ParticipantType::Virtual), None);
        assert_eq!(rank_trend(0, Some(20), 100, ParticipantType::Contestant), None);
    }

    #[test]
    fn test_carried_rank_passes_through_virtual_rows() {
        // Newest first.
        let rows = vec![
            part("4", "alice", ParticipantType::Contestant, 300, vec![]),
            part("3", "alice", ParticipantType::Virtual, 50, vec![]),
            part("2", "alice", ParticipantType::Contestant, 700, vec![]),
            part("1", "alice", ParticipantType::Contestant, 900, vec![]),
        ];
        let refs: Vec<&ParticipationRecord> = rows.iter().collect();
        let previous: Vec<Option<i64>> = with_previous_rated_rank(&refs)
            .into_iter()
            .map(|(_, p)| p)
            .collect();
        assert_eq!(previous, vec![None, Some(300), Some(300), Some(700)]);
    }

    #[test]
    fn test_difficulty_classification() {
        assert_eq!(classify_difficulty(Some(10), Some(50)), Difficulty::Hard);
        assert_eq!(classify_difficulty(Some(40), Some(50)), Difficulty::Easy);
        assert_eq!(classify_difficulty(Some(25), Some(50)), Difficulty::Medium);
        assert_eq!(classify_difficulty(Some(0), Some(0)), Difficulty::Medium);
        assert_eq!(classify_difficulty(None, None), Difficulty::Medium);
    }

    #[test]
    fn test_correctness_per_slot() {
        let problems = vec![
            problem("A", Some(10), Some(50)),
            problem("B", Some(40), Some(50)),
            problem("C", None, None),
            problem("D", None, None),
            problem("E", None, None),
        ];
        let results = vec![
            result(1000.0, 0, Some(100)),
            result(0.0, 2, None),
            result(500.0, 1, Some(900)),
            result(0.0, 0, None),
        ];
        let verdicts = correctness(&problems, &results);
        assert_eq!(
            verdicts,
            vec![
                ProblemVerdict::SolvedHard,
                ProblemVerdict::FailedEasy,
                ProblemVerdict::Solved,
                ProblemVerdict::Untouched,
                ProblemVerdict::NotAttempted,
            ]
        );
        assert_eq!(correctness_summary(&verdicts), "🔥⚠️✅➖➖");
    }

    #[test]
    fn test_failed_medium_problem() {
        let verdicts = correctness(&[problem("A", None, None)], &[result(0.0, 3, None)]);
        assert_eq!(verdicts, vec![ProblemVerdict::Failed]);
    }

    #[test]
    fn test_percentile_rank_two_of_three() {
        let athlete = part("1", "alice", ParticipantType::Contestant, 15, vec![]);
        let b1 = part("1", "b1", ParticipantType::Contestant, 10, vec![]);
        let b2 = part("1", "b2", ParticipantType::Contestant, 20, vec![]);
        let b3 = part("1", "b3", ParticipantType::Contestant, 30, vec![]);
        let cohort = vec![&b1, &b2, &b3];
        assert_eq!(
            percentile(&athlete, &cohort, Metric::Rank),
            Percentile::BetterThan(67)
        );
    }

    #[test]
    fn test_percentile_solved_and_not_applicable() {
        let athlete = part(
            "1",
            "alice",
            ParticipantType::Virtual,
            15,
            vec![result(1.0, 0, Some(5)), result(1.0, 0, Some(5))],
        );
        let b1 = part("1", "b1", ParticipantType::Virtual, 10, vec![result(1.0, 0, Some(5))]);
        let cohort = vec![&b1];
        assert_eq!(
            percentile(&athlete, &cohort, Metric::Solved),
            Percentile::BetterThan(100)
        );
        assert_eq!(
            percentile(&athlete, &cohort, Metric::Rank),
            Percentile::NotApplicable
        );
        assert_eq!(
            percentile(&athlete, &[], Metric::Solved),
            Percentile::NotApplicable
        );
    }

    #[test]
    fn test_cohort_filters_type_handle_and_athlete() {
        let athlete = part("1", "alice", ParticipantType::Contestant, 15, vec![]);
        let same_type = part("1", "bob", ParticipantType::Contestant, 10, vec![]);
        let other_type = part("1", "carol", ParticipantType::Virtual, 10, vec![]);
        let stranger = part("1", "mallory", ParticipantType::Contestant, 10, vec![]);
        let rows = vec![&athlete, &same_type, &other_type, &stranger];
        let benchmarks = vec!["alice".to_string(), "bob".to_string(), "carol".to_string()];

        let c = cohort(&athlete, &rows, &benchmarks);
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].handle, "bob");
    }

    #[test]
    fn test_speed_faster_and_slower() {
        let athlete = part(
            "1",
            "alice",
            ParticipantType::Contestant,
            1,
            vec![result(500.0, 0, Some(600))],
        );
        let slow = part(
            "1",
            "b",
            ParticipantType::Contestant,
            2,
            vec![result(500.0, 0, Some(1500))],
        );
        let tally = speed_tally(&athlete, &[&slow], 600);
        assert_eq!(
            tally,
            SpeedTally {
                compared: 1,
                faster: 1,
                slower: 0
            }
        );
        assert_eq!(tally.verdict(), SpeedVerdict::Better);

        let fast = part(
            "1",
            "b",
            ParticipantType::Contestant,
            2,
            vec![result(500.0, 0, Some(100))],
        );
        // 600 is not above 100 + 600, so the margin absorbs the gap.
        let tally = speed_tally(&athlete, &[&fast], 600);
        assert_eq!(tally.slower, 0);
        assert_eq!(tally.faster, 0);
        assert_eq!(tally.verdict(), SpeedVerdict::Neutral);

        let tally = speed_tally(&athlete, &[&fast], 0);
        assert_eq!(tally.slower, 1);
        assert_eq!(tally.verdict(), SpeedVerdict::Worse);
    }

    #[test]
    fn test_speed_slower_beyond_margin() {
        let athlete = part(
            "1",
            "alice",
            ParticipantType::Contestant,
            1,
            vec![result(500.0, 0, Some(1500))],
        );
        let peer = part(
            "1",
            "b",
            ParticipantType::Contestant,
            2,
            vec![result(500.0, 0, Some(600))],
        );
        let tally = speed_tally(&athlete, &[&peer], 600);
        assert_eq!(
            tally,
            SpeedTally {
                compared: 1,
                faster: 0,
                slower: 1
            }
        );
        assert_eq!(tally.verdict(), SpeedVerdict::Worse);
    }

    #[test]
    fn test_speed_within_margin_is_neutral() {
        let athlete = part(
            "1",
            "alice",
            ParticipantType::Contestant,
            1,
            vec![result(500.0, 0, Some(1000))],
        );
        let peer = part(
            "1",
            "b",
            ParticipantType::Contestant,
            2,
            vec![result(500.0, 0, Some(900))],
        );
        let tally = speed_tally(&athlete, &[&peer], 600);
        assert_eq!(tally.verdict(), SpeedVerdict::Neutral);
    }

    #[test]
    fn test_speed_ignores_unsolved_and_missing_slots() {
        let athlete = part(
            "1",
            "alice",
            ParticipantType::Contestant,
            1,
            vec![result(500.0, 0, Some(600)), result(500.0, 0, Some(600))],
        );
        let peer = part(
            "1",
            "b",
            ParticipantType::Contestant,
            2,
            vec![result(0.0, 4, None)],
        );
        let tally = speed_tally(&athlete, &[&peer], 0);
        assert_eq!(tally.compared, 0);
        assert_eq!(tally.verdict(), SpeedVerdict::NotApplicable);
    }

    #[test]
    fn test_speed_uses_cohort_mean() {
        let athlete = part(
            "1",
            "alice",
            ParticipantType::Contestant,
            1,
            vec![result(500.0, 0, Some(1000))],
        );
        let a = part("1", "a", ParticipantType::Contestant, 2, vec![result(1.0, 0, Some(500))]);
        let b = part("1", "b", ParticipantType::Contestant, 3, vec![result(1.0, 0, Some(2500))]);
        // Mean 1500.
        assert_eq!(speed_tally(&athlete, &[&a, &b], 0).faster, 1);
    }

    #[test]
    fn test_upsolving_counts_distinct_indices_after_end() {
        let start = 1_000_000;
        let end = contest_end_time(start, ContestType::Cf);
        assert_eq!(end, start + 7200);

        let subs = vec![
            accepted_submission(5, "A", start + 7201),
            accepted_submission(5, "A", start + 9000),
            accepted_submission(5, "B", start + 7200),
            accepted_submission(5, "C", start + 100),
            accepted_submission(6, "D", start + 9000),
        ];
        assert_eq!(upsolved_count(&subs, "5", end), 1);
    }

    #[test]
    fn test_upsolving_ignores_rejected() {
        let mut sub = accepted_submission(5, "A", 99_999);
        sub.verdict = Some("WRONG_ANSWER".into());
        assert_eq!(upsolved_count(&[sub], "5", 0), 0);
    }

    #[test]
    fn test_long_contest_end() {
        assert_eq!(contest_end_time(0, ContestType::Icpc), 18_000);
        assert_eq!(contest_end_time(0, ContestType::Unknown), 18_000);
    }

    #[test]
    fn test_rating_titles() {
        assert_eq!(rating_title(1199), "Newbie");
        assert_eq!(rating_title(1200), "Pupil");
        assert_eq!(rating_title(1899), "Expert");
        assert_eq!(rating_title(3000), "Legendary Grandmaster");
    }
}
