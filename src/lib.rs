pub mod config;
pub mod errors;
pub mod history;
pub mod models;
pub mod notifier;
pub mod poller;
pub mod sources;
pub mod utils;
