pub mod models;

pub use models::{Game, GameType, Participant, Player, TeamInput};
