pub mod aggregator;
pub mod leaderboard_service;
pub mod ranking;
pub mod trade_service;
