pub mod leaderboard;
pub mod score_keeper;
pub mod stats;
