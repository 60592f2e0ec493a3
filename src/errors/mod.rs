//! Centralized error handling for the anime notifier
//!
//! Every component of the pipeline owns a narrow error type so that failures
//! can be handled at the boundary where they happen. Only startup failures
//! (configuration, corrupt history) ever reach `main`.
//!
//! # Error Categories
//!
//! - **Source Errors**: listing/detail page retrieval and parsing
//! - **History Errors**: reading and writing the persisted history file
//! - **Delivery Errors**: webhook POST failures
//! - **Configuration Errors**: missing or invalid settings

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;

/// Convenience type alias for History Results
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Convenience type alias for Delivery Results
pub type DeliveryResult<T> = Result<T, DeliveryError>;
