use serde::{Deserialize, Serialize};

use super::{Contest, Party, Problem};

/// Result of `contest.standings`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Standings {
    pub contest: Contest,
    pub problems: Vec<Problem>,
    pub rows: Vec<RanklistRow>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RanklistRow {
    pub party: Party,
    pub rank: i64,
    pub points: f64,
    #[serde(default)]
    pub penalty: i64,
    #[serde(default)]
    pub successful_hack_count: i64,
    #[serde(default)]
    pub unsuccessful_hack_count: i64,
    pub problem_results: Vec<ProblemResult>,
}

/// One party's outcome on one problem. `best_submission_time_seconds` is
/// only present for problems the party solved.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProblemResult {
    pub points: f64,
    #[serde(default)]
    pub penalty: Option<i64>,
    pub rejected_attempt_count: i64,
    #[serde(default)]
    pub best_submission_time_seconds: Option<i64>,
}
