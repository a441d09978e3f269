//! Work plan entity - a locally created job (harvest, planting, fertilization)
//! scheduled on a field.
//!
//! Work plans are owned by the local store. Every mutation is also pushed to
//! the vendor API on a best-effort basis, see [`crate::core::mirror`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of work a plan schedules
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "UPPERCASE")]
pub enum WorkType {
    /// Crop harvest
    #[sea_orm(string_value = "HARVEST")]
    Harvest,
    /// Seeding
    #[sea_orm(string_value = "PLANTING")]
    Planting,
    /// Fertilizer application
    #[sea_orm(string_value = "FERTILIZATION")]
    Fertilization,
}

impl WorkType {
    /// Wire name shared by the local API and the vendor payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Harvest => "HARVEST",
            Self::Planting => "PLANTING",
            Self::Fertilization => "FERTILIZATION",
        }
    }
}

/// Work plan database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work_plans")]
pub struct Model {
    /// Locally generated sequential identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Field this plan is scheduled on
    pub field_id: String,
    /// Kind of work
    #[serde(rename = "type")]
    pub work_type: WorkType,
    /// First day of the plan
    pub start_date: Date,
    /// Last day of the plan, never before `start_date`
    pub end_date: Date,
    /// Free-form progress status, `"pending"` on creation by default
    pub status: String,
}

/// Defines relationships between WorkPlan and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each work plan belongs to one field
    #[sea_orm(
        belongs_to = "super::field::Entity",
        from = "Column::FieldId",
        to = "super::field::Column::Id"
    )]
    Field,
}

impl Related<super::field::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Field.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
