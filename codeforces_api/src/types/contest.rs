use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub type ContestID = i64;

/// Scoring system of a contest. `CF` rounds are the short format; `IOI` and
/// `ICPC` rounds usually run longer.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContestType {
    #[serde(rename = "CF")]
    Cf,
    #[serde(rename = "IOI")]
    Ioi,
    #[serde(rename = "ICPC")]
    Icpc,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ContestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContestType::Cf => "CF",
            ContestType::Ioi => "IOI",
            ContestType::Icpc => "ICPC",
            ContestType::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ContestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CF" => Ok(ContestType::Cf),
            "IOI" => Ok(ContestType::Ioi),
            "ICPC" => Ok(ContestType::Icpc),
            "UNKNOWN" => Ok(ContestType::Unknown),
            other => Err(format!("unknown contest type: {}", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContestPhase {
    Before,
    Coding,
    PendingSystemTest,
    SystemTest,
    Finished,
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub id: ContestID,
    pub name: String,
    #[serde(rename = "type")]
    pub contest_type: ContestType,
    pub phase: ContestPhase,
    #[serde(default)]
    pub frozen: bool,
    #[serde(default)]
    pub duration_seconds: Option<i64>,
    #[serde(default)]
    pub start_time_seconds: Option<i64>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    #[serde(default)]
    pub contest_id: Option<ContestID>,
    pub index: String,
    pub name: String,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub points: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
}
