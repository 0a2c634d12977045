pub mod config;
pub mod error;
pub mod fixture;
pub mod match_sim;
pub mod outcome;
pub mod schedule;
pub mod season;
pub mod setup;
pub mod standings;
pub mod store;
pub mod team;

pub use error::SeasonError;
pub use match_sim::{MatchResult, MatchSimulator, SimLevel};
pub use store::SeasonStore;
