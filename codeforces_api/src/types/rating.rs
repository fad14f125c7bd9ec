use serde::{Deserialize, Serialize};

use super::ContestID;

/// One entry of `user.rating`: the rating delta from a rated contest.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RatingChange {
    pub contest_id: ContestID,
    pub contest_name: String,
    pub handle: String,
    pub rank: i64,
    pub rating_update_time_seconds: i64,
    pub old_rating: i64,
    pub new_rating: i64,
}

impl RatingChange {
    pub fn delta(&self) -> i64 {
        self.new_rating - self.old_rating
    }
}
