pub mod leaderboard_export;
pub mod race_result;
