pub mod autopilot;
pub mod clock;
pub mod collision;
pub mod error;
pub mod handle_race;
pub mod leaderboard;
pub mod race;
pub mod race_manager;
pub mod track;
pub mod track_catalog;
pub mod vehicle;
