//! Scheduler control surface.

use super::{AppState, auth::AuthenticatedUser};
use crate::{core::scheduler_run, entities::SchedulerRunModel, errors::Result, scheduler::SchedulerStatus};
use actix_web::{get, post, web};
use serde::Deserialize;

const DEFAULT_RUNS_LIMIT: u64 = 20;

/// Body of `POST /scheduler/interval`.
#[derive(Debug, Deserialize)]
pub struct IntervalUpdate {
    #[serde(alias = "seconds")]
    interval_seconds: u64,
}

/// Query of `GET /scheduler/runs`.
#[derive(Debug, Deserialize)]
pub struct RunsQuery {
    limit: Option<u64>,
}

#[post("/scheduler/start")]
pub async fn start(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<web::Json<SchedulerStatus>> {
    user.require_admin()?;
    state.scheduler.start().await?;
    Ok(web::Json(state.scheduler.status().await?))
}

#[post("/scheduler/stop")]
pub async fn stop(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<web::Json<SchedulerStatus>> {
    user.require_admin()?;
    state.scheduler.stop().await;
    Ok(web::Json(state.scheduler.status().await?))
}

#[post("/scheduler/interval")]
pub async fn update_interval(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: web::Json<IntervalUpdate>,
) -> Result<web::Json<SchedulerStatus>> {
    user.require_admin()?;
    state.scheduler.update_interval(payload.interval_seconds).await?;
    Ok(web::Json(state.scheduler.status().await?))
}

#[get("/scheduler/status")]
pub async fn status(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
) -> Result<web::Json<SchedulerStatus>> {
    Ok(web::Json(state.scheduler.status().await?))
}

/// Most recent ledger rows, newest first.
#[get("/scheduler/runs")]
pub async fn runs(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    query: web::Query<RunsQuery>,
) -> Result<web::Json<Vec<SchedulerRunModel>>> {
    let limit = query.limit.unwrap_or(DEFAULT_RUNS_LIMIT);
    Ok(web::Json(scheduler_run::list_runs(&state.db, limit).await?))
}
