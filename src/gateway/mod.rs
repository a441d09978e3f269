//! Vendor gateway - the port to the John Deere Operations Center API.
//!
//! The sync run, the scheduler and the HTTP passthrough handlers only depend on
//! the [`VendorGateway`] trait; [`JohnDeereClient`] is the reqwest-backed
//! implementation used in production.

mod client;
mod dto;

pub use client::JohnDeereClient;
pub use dto::VendorCollection;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Failure talking to the vendor API
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Connection failure, timeout, or unreadable body
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("vendor responded with HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// Response body was not the JSON shape we expected
    #[error("invalid vendor payload: {0}")]
    Decode(String),
}

impl GatewayError {
    /// True when the request failed because it ran into the client timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

/// Result alias for gateway calls
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Operations the backend needs from the vendor API.
#[async_trait]
pub trait VendorGateway: Send + Sync {
    /// Every equipment record of the organization, across all pages.
    async fn list_equipment(&self) -> GatewayResult<VendorCollection>;

    /// Every field of the organization, across all pages.
    async fn list_fields(&self) -> GatewayResult<VendorCollection>;

    /// Every field operation of the organization, across all pages.
    async fn list_field_operations(&self) -> GatewayResult<VendorCollection>;

    /// One field operation with its details.
    async fn get_field_operation(&self, operation_id: &str) -> GatewayResult<Option<Value>>;

    /// Measurements of a field operation, optionally narrowed to one measurement type.
    async fn get_field_operation_measurements(
        &self,
        operation_id: &str,
        measurement_type: Option<&str>,
    ) -> GatewayResult<Option<Value>>;

    /// Creates a work plan in the vendor system.
    async fn create_work_plan(&self, payload: &Value) -> GatewayResult<Option<Value>>;

    /// Replaces a work plan in the vendor system.
    async fn update_work_plan(&self, plan_id: i32, payload: &Value)
    -> GatewayResult<Option<Value>>;

    /// Removes a work plan from the vendor system.
    async fn delete_work_plan(&self, plan_id: i32) -> GatewayResult<Option<Value>>;
}
