//! Field entity - a farm field (lot) and its boundary, mirrored from the vendor API.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Field database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fields")]
pub struct Model {
    /// Vendor-assigned identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Field name; kept when a sync payload omits it
    pub name: String,
    /// Opaque boundary geometry as delivered by the vendor
    pub boundary: Option<Json>,
    /// Crop currently planted on the field
    pub crop_type: Option<String>,
    /// Vendor modification timestamp
    pub updated_at: Option<DateTimeUtc>,
}

/// Defines relationships between Field and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One field has many work plans
    #[sea_orm(has_many = "super::work_plan::Entity")]
    WorkPlans,
}

impl Related<super::work_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkPlans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
