use std::collections::HashMap;

pub type PlayerId = i64;
pub type GameId = i64;
pub type Sequence = i64;
pub type RatingValue = f64;
pub type RatingMap = HashMap<PlayerId, RatingValue>;
