//! Best-effort mirroring of local work plan mutations to the vendor.
//!
//! The local store is authoritative. A failed vendor call is logged and then
//! dropped; it never fails the local operation.

use crate::{entities::work_plan, gateway::VendorGateway};
use serde_json::{Value, json};
use tracing::{debug, warn};

/// Vendor representation of a work plan.
#[must_use]
pub fn work_plan_payload(plan: &work_plan::Model) -> Value {
    json!({
        "fieldId": plan.field_id,
        "workType": plan.work_type.as_str(),
        "startDate": plan.start_date.to_string(),
        "endDate": plan.end_date.to_string(),
        "status": plan.status,
    })
}

/// Pushes a newly created plan. Returns whether the vendor accepted it.
pub async fn work_plan_created(gateway: &dyn VendorGateway, plan: &work_plan::Model) -> bool {
    match gateway.create_work_plan(&work_plan_payload(plan)).await {
        Ok(_) => {
            debug!(plan_id = plan.id, "Work plan mirrored to vendor");
            true
        }
        Err(e) => {
            warn!(plan_id = plan.id, error = %e, "Failed to mirror work plan creation");
            false
        }
    }
}

/// Pushes a plan whose status changed. Returns whether the vendor accepted it.
pub async fn work_plan_updated(gateway: &dyn VendorGateway, plan: &work_plan::Model) -> bool {
    match gateway.update_work_plan(plan.id, &work_plan_payload(plan)).await {
        Ok(_) => {
            debug!(plan_id = plan.id, "Work plan update mirrored to vendor");
            true
        }
        Err(e) => {
            warn!(plan_id = plan.id, error = %e, "Failed to mirror work plan update");
            false
        }
    }
}

/// Removes a deleted plan from the vendor. Returns whether the vendor accepted it.
pub async fn work_plan_deleted(gateway: &dyn VendorGateway, plan_id: i32) -> bool {
    match gateway.delete_work_plan(plan_id).await {
        Ok(_) => {
            debug!(plan_id, "Work plan deletion mirrored to vendor");
            true
        }
        Err(e) => {
            warn!(plan_id, error = %e, "Failed to mirror work plan deletion");
            false
        }
    }
}
