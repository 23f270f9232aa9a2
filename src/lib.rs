// Car Inventory - Core Library
// Exposes the validation + persistence workflow for the terminal form, CLI, and API server

pub mod car;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod transfer;
pub mod validator;
pub mod workflow;

// Re-export commonly used types
pub use car::{Car, CarInput, NewCar};
pub use config::Config;
pub use db::{setup_database, CarStore};
pub use error::{CarError, CarResult, Rejection};
pub use logging::{flush_logs, init_logging};
pub use transfer::{export_csv, import_csv, ImportReport, RejectedRow};
pub use validator::{validate, MAX_YEAR, MIN_YEAR};
pub use workflow::{submit_add, submit_delete, CarForm, Notice};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
