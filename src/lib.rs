//! weeksplit - Weekly training split planner
//!
//! Sign in, set a goal, pick a workout type for each weekday and get a
//! workout template for every training day.

pub mod db;
pub mod error;
pub mod exercises;
pub mod generator;
pub mod health;
pub mod onboarding;
pub mod profile;
pub mod schedule;
pub mod session;
pub mod store;
pub mod tui;

pub use db::Database;
pub use error::FlowError;
