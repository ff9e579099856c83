/// CSV and JSON export of calculator results.
pub mod export;
