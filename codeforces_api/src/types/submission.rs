use serde::{Deserialize, Serialize};

use super::{ContestID, Party, Problem};

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: i64,
    /// Absent for submissions to problems outside any contest (e.g. gym).
    #[serde(default)]
    pub contest_id: Option<ContestID>,
    pub creation_time_seconds: i64,
    #[serde(default)]
    pub relative_time_seconds: Option<i64>,
    pub problem: Problem,
    pub author: Party,
    #[serde(default)]
    pub programming_language: Option<String>,
    /// Absent while the submission is still being judged.
    #[serde(default)]
    pub verdict: Option<String>,
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        self.verdict.as_deref() == Some("OK")
    }
}
