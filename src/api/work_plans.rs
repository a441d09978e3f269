//! Work plan handlers. Mutations are mirrored to the vendor after the local
//! write succeeds; mirror failures do not change the response.

use super::{AppState, auth::AuthenticatedUser};
use crate::{
    core::{
        mirror,
        work_plan::{self, NewWorkPlan},
    },
    entities::WorkPlanModel,
    errors::{Error, Result},
};
use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;

/// Body of `PUT /work-plans/{id}`.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    status: String,
}

#[get("/work-plans")]
pub async fn list_work_plans(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
) -> Result<web::Json<Vec<WorkPlanModel>>> {
    Ok(web::Json(work_plan::list_work_plans(&state.db).await?))
}

#[get("/work-plans/{id}")]
pub async fn get_work_plan(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<web::Json<WorkPlanModel>> {
    let plan_id = path.into_inner();
    work_plan::get_work_plan(&state.db, plan_id)
        .await?
        .map(web::Json)
        .ok_or_else(|| Error::NotFound {
            entity: "Work plan",
            id: plan_id.to_string(),
        })
}

#[post("/work-plans")]
pub async fn create_work_plan(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: web::Json<NewWorkPlan>,
) -> Result<HttpResponse> {
    user.require_operator()?;
    let plan = work_plan::create_work_plan(&state.db, payload.into_inner()).await?;
    mirror::work_plan_created(state.gateway.as_ref(), &plan).await;
    Ok(HttpResponse::Created().json(plan))
}

#[put("/work-plans/{id}")]
pub async fn update_work_plan(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    payload: web::Json<StatusUpdate>,
) -> Result<web::Json<WorkPlanModel>> {
    user.require_operator()?;
    let plan = work_plan::update_work_plan_status(&state.db, path.into_inner(), &payload.status).await?;
    mirror::work_plan_updated(state.gateway.as_ref(), &plan).await;
    Ok(web::Json(plan))
}

#[delete("/work-plans/{id}")]
pub async fn delete_work_plan(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    user.require_operator()?;
    let plan = work_plan::delete_work_plan(&state.db, path.into_inner()).await?;
    mirror::work_plan_deleted(state.gateway.as_ref(), plan.id).await;
    Ok(HttpResponse::NoContent().finish())
}
