//! Work plan business logic - Handles creation, listing, status updates and deletion.
//!
//! Work plans are owned by the local store. Callers that want the vendor copy to
//! follow along pass the returned model to [`crate::core::mirror`].

use crate::{
    core::field,
    entities::{WorkPlan, WorkType, work_plan},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Status given to a work plan created without one.
pub const DEFAULT_STATUS: &str = "pending";

/// Input for [`create_work_plan`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewWorkPlan {
    /// Field the plan is scheduled on
    pub field_id: String,
    /// Kind of work
    #[serde(rename = "type")]
    pub work_type: WorkType,
    /// First day of the plan
    pub start_date: NaiveDate,
    /// Last day of the plan
    pub end_date: NaiveDate,
    /// Initial status; [`DEFAULT_STATUS`] when absent
    #[serde(default)]
    pub status: Option<String>,
}

/// Rejects date ranges whose end comes before their start.
pub fn validate_date_range(start_date: NaiveDate, end_date: NaiveDate) -> Result<()> {
    if start_date > end_date {
        return Err(Error::validation(format!(
            "start_date {start_date} is after end_date {end_date}"
        )));
    }
    Ok(())
}

/// Creates a work plan on an existing field.
///
/// The field must already be mirrored locally; an unknown `field_id` is a
/// [`Error::NotFound`].
pub async fn create_work_plan(
    db: &DatabaseConnection,
    new_plan: NewWorkPlan,
) -> Result<work_plan::Model> {
    validate_date_range(new_plan.start_date, new_plan.end_date)?;

    let status = match new_plan.status {
        Some(status) if status.trim().is_empty() => {
            return Err(Error::validation("Work plan status cannot be empty"));
        }
        Some(status) => status.trim().to_string(),
        None => DEFAULT_STATUS.to_string(),
    };

    if field::get_field(db, &new_plan.field_id).await?.is_none() {
        return Err(Error::NotFound {
            entity: "Field",
            id: new_plan.field_id,
        });
    }

    let plan = work_plan::ActiveModel {
        field_id: Set(new_plan.field_id),
        work_type: Set(new_plan.work_type),
        start_date: Set(new_plan.start_date),
        end_date: Set(new_plan.end_date),
        status: Set(status),
        ..Default::default()
    };
    let created = plan.insert(db).await?;
    info!(
        plan_id = created.id,
        field_id = %created.field_id,
        work_type = created.work_type.as_str(),
        "Work plan created"
    );
    Ok(created)
}

/// Lists every work plan ordered by start date, then id.
pub async fn list_work_plans(db: &DatabaseConnection) -> Result<Vec<work_plan::Model>> {
    WorkPlan::find()
        .order_by_asc(work_plan::Column::StartDate)
        .order_by_asc(work_plan::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a work plan by id.
pub async fn get_work_plan(db: &DatabaseConnection, plan_id: i32) -> Result<Option<work_plan::Model>> {
    WorkPlan::find_by_id(plan_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Replaces the status of a work plan and returns the updated row.
pub async fn update_work_plan_status(
    db: &DatabaseConnection,
    plan_id: i32,
    status: &str,
) -> Result<work_plan::Model> {
    let status = status.trim();
    if status.is_empty() {
        return Err(Error::validation("Work plan status cannot be empty"));
    }

    let plan = get_work_plan(db, plan_id).await?.ok_or_else(|| Error::NotFound {
        entity: "Work plan",
        id: plan_id.to_string(),
    })?;

    let mut active_model: work_plan::ActiveModel = plan.into();
    active_model.status = Set(status.to_string());
    let updated = active_model.update(db).await?;
    info!(plan_id, status, "Work plan status updated");
    Ok(updated)
}

/// Deletes a work plan and returns the removed row.
pub async fn delete_work_plan(db: &DatabaseConnection, plan_id: i32) -> Result<work_plan::Model> {
    let plan = get_work_plan(db, plan_id).await?.ok_or_else(|| Error::NotFound {
        entity: "Work plan",
        id: plan_id.to_string(),
    })?;

    WorkPlan::delete_by_id(plan_id).exec(db).await?;
    info!(plan_id, "Work plan deleted");
    Ok(plan)
}
