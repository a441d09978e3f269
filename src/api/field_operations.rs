//! Read-through access to the vendor's field operations. Nothing is stored.

use super::{AppState, auth::AuthenticatedUser};
use crate::{errors::Result, gateway::VendorCollection};
use actix_web::{get, web};
use serde::Deserialize;
use serde_json::Value;

/// Query of the measurements endpoint.
#[derive(Debug, Deserialize)]
pub struct MeasurementsQuery {
    measurement_type: Option<String>,
}

#[get("/john-deere/field-operations")]
pub async fn list_field_operations(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
) -> Result<web::Json<VendorCollection>> {
    Ok(web::Json(state.gateway.list_field_operations().await?))
}

#[get("/john-deere/field-operations/{id}")]
pub async fn get_field_operation(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<web::Json<Option<Value>>> {
    Ok(web::Json(state.gateway.get_field_operation(&path).await?))
}

#[get("/john-deere/field-operations/{id}/measurements")]
pub async fn get_measurements(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
    query: web::Query<MeasurementsQuery>,
) -> Result<web::Json<Option<Value>>> {
    let measurements = state
        .gateway
        .get_field_operation_measurements(&path, query.measurement_type.as_deref())
        .await?;
    Ok(web::Json(measurements))
}
