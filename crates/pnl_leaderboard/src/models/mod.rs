pub mod display_rows;
pub mod leaderboards;
pub mod traders;
pub mod trades;
