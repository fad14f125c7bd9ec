mod envelope;
pub use self::envelope::{Envelope, EnvelopeStatus};

mod contest;
pub use self::contest::{Contest, ContestID, ContestPhase, ContestType, Problem};

mod party;
pub use self::party::{Member, ParticipantType, Party};

mod standings;
pub use self::standings::{ProblemResult, RanklistRow, Standings};

mod submission;
pub use self::submission::Submission;

mod rating;
pub use self::rating::RatingChange;
