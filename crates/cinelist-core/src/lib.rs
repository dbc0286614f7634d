pub mod calculate;
pub mod config;
pub mod error;
pub mod models;
pub mod persisted;
pub mod storage;
pub mod watchlist;
