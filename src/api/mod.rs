//! HTTP surface - actix-web handlers over the core operations.
//!
//! Handlers receive [`AppState`] through `web::Data` and authenticate callers
//! with the [`AuthenticatedUser`] extractor. Every handler error is an
//! [`Error`], mapped to a status code in [`error`].

pub mod auth;
pub mod error;
pub mod field_operations;
pub mod inventory;
pub mod scheduler;
pub mod users;
pub mod work_plans;

pub use auth::{AuthenticatedUser, OptionalUser};

use crate::{
    config::AuthSettings, errors::Error, gateway::VendorGateway,
    scheduler::SchedulerCoordinator,
};
use actix_web::web;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Dependencies shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Local store
    pub db: DatabaseConnection,
    /// Vendor API port, used for passthrough reads and work plan mirroring
    pub gateway: Arc<dyn VendorGateway>,
    /// The process-wide scheduler
    pub scheduler: Arc<SchedulerCoordinator>,
    /// Token and password settings
    pub auth: AuthSettings,
}

/// Registers every route plus extractor configs that turn malformed bodies
/// into `400 {"detail": ...}` responses.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| Error::validation(err.to_string()).into()),
    )
    .app_data(
        web::FormConfig::default()
            .error_handler(|err, _req| Error::validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| Error::validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| Error::validation(err.to_string()).into()),
    )
    .service(users::register)
    .service(users::login)
    .service(inventory::list_machines)
    .service(inventory::list_fields)
    .service(work_plans::list_work_plans)
    .service(work_plans::get_work_plan)
    .service(work_plans::create_work_plan)
    .service(work_plans::update_work_plan)
    .service(work_plans::delete_work_plan)
    .service(scheduler::start)
    .service(scheduler::stop)
    .service(scheduler::update_interval)
    .service(scheduler::status)
    .service(scheduler::runs)
    .service(field_operations::list_field_operations)
    .service(field_operations::get_field_operation)
    .service(field_operations::get_measurements);
}
