//! Read access to the mirrored machines and fields.

use super::{AppState, auth::AuthenticatedUser};
use crate::{
    core::{field, machine},
    entities::{FieldModel, MachineModel},
    errors::Result,
};
use actix_web::{get, web};

#[get("/machines")]
pub async fn list_machines(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
) -> Result<web::Json<Vec<MachineModel>>> {
    Ok(web::Json(machine::list_machines(&state.db).await?))
}

#[get("/fields")]
pub async fn list_fields(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
) -> Result<web::Json<Vec<FieldModel>>> {
    Ok(web::Json(field::list_fields(&state.db).await?))
}
