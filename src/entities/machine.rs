//! Machine entity - a piece of equipment mirrored from the vendor API.
//!
//! Rows are only ever written by the synchronization run; the vendor id is the
//! primary key so a re-sync overwrites the existing row in place.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Machine database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "machines")]
pub struct Model {
    /// Vendor-assigned identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name reported by the vendor
    pub name: Option<String>,
    /// Equipment category (e.g. "Tractor", "Combine")
    pub category: Option<String>,
    /// Manufacturer serial number
    pub serial_number: Option<String>,
    /// Operational status as reported by the vendor
    pub status: Option<String>,
    /// When the vendor last saw an update for this machine
    pub last_update: Option<DateTimeUtc>,
    /// Last known latitude
    pub latitude: Option<f64>,
    /// Last known longitude
    pub longitude: Option<f64>,
}

/// Machines are standalone
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
