//! User entity - local accounts allowed to call the API.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Access level of a user
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including user registration and scheduler control
    #[sea_orm(string_value = "admin")]
    Admin,
    /// May read everything and mutate work plans
    #[default]
    #[sea_orm(string_value = "operator")]
    Operator,
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Sequential identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Unique login name
    #[sea_orm(unique)]
    pub username: String,
    /// bcrypt hash of the password
    #[serde(skip_serializing)]
    pub hashed_password: String,
    /// Access level
    pub role: Role,
}

/// `User` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
