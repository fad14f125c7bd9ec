use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ContestID;

/// How a party took part in a contest.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantType {
    Contestant,
    Practice,
    Virtual,
    Manager,
    OutOfCompetition,
}

impl ParticipantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantType::Contestant => "CONTESTANT",
            ParticipantType::Practice => "PRACTICE",
            ParticipantType::Virtual => "VIRTUAL",
            ParticipantType::Manager => "MANAGER",
            ParticipantType::OutOfCompetition => "OUT_OF_COMPETITION",
        }
    }
}

impl fmt::Display for ParticipantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ParticipantType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONTESTANT" => Ok(ParticipantType::Contestant),
            "PRACTICE" => Ok(ParticipantType::Practice),
            "VIRTUAL" => Ok(ParticipantType::Virtual),
            "MANAGER" => Ok(ParticipantType::Manager),
            "OUT_OF_COMPETITION" => Ok(ParticipantType::OutOfCompetition),
            other => Err(format!("unknown participant type: {}", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Member {
    pub handle: String,
}

/// A participating team or individual.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    #[serde(default)]
    pub contest_id: Option<ContestID>,
    #[serde(default)]
    pub members: Vec<Member>,
    pub participant_type: ParticipantType,
    #[serde(default)]
    pub ghost: bool,
    #[serde(default)]
    pub start_time_seconds: Option<i64>,
}

impl Party {
    /// Handle of the first member, which identifies individual participants.
    pub fn primary_handle(&self) -> Option<&str> {
        self.members.first().map(|m| m.handle.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_type_round_trips_through_display() {
        for ty in [
            ParticipantType::Contestant,
            ParticipantType::Practice,
            ParticipantType::Virtual,
            ParticipantType::Manager,
            ParticipantType::OutOfCompetition,
        ] {
            assert_eq!(ty.to_string().parse::<ParticipantType>(), Ok(ty));
        }
    }

    #[test]
    fn primary_handle_is_first_member() {
        let party: Party = serde_json::from_str(
            r#"{"members":[{"handle":"alice"},{"handle":"bob"}],"participantType":"CONTESTANT"}"#,
        )
        .unwrap();
        assert_eq!(party.primary_handle(), Some("alice"));

        let empty: Party =
            serde_json::from_str(r#"{"members":[],"participantType":"VIRTUAL"}"#).unwrap();
        assert_eq!(empty.primary_handle(), None);
    }
}
