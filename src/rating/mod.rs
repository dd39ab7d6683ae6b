pub mod elo;
pub mod types;

pub use elo::{expected_score, outcome_score, rating_deltas, team_rating};
pub use types::{GameId, PlayerId, RatingMap, RatingValue, Sequence};
