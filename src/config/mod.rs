/// Database connection and schema creation
pub mod database;

/// Settings loading from TOML and environment variables
pub mod settings;

pub use settings::{AuthSettings, SchedulerSettings, Settings, VendorSettings, load_settings};
