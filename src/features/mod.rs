pub mod auth;
pub mod reports;
pub mod stats;
pub mod uploads;
