mod common;
pub use self::common::Query;

mod user;
pub use self::user::{UserRatingQuery, UserStatusQuery};

mod standings;
pub use self::standings::StandingsQuery;
