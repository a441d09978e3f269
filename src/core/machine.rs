//! Machine business logic - read access and sync upserts.

use crate::{
    entities::{Machine, machine},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};

/// A machine in local shape, produced by normalizing a vendor record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MachineRecord {
    /// Vendor id
    pub id: String,
    /// Display name
    pub name: Option<String>,
    /// Equipment category
    pub category: Option<String>,
    /// Serial number
    pub serial_number: Option<String>,
    /// Operational status
    pub status: Option<String>,
    /// Vendor's last update timestamp
    pub last_update: Option<DateTime<Utc>>,
    /// Last known latitude
    pub latitude: Option<f64>,
    /// Last known longitude
    pub longitude: Option<f64>,
}

/// Lists every mirrored machine ordered by id.
pub async fn list_machines(db: &DatabaseConnection) -> Result<Vec<machine::Model>> {
    Machine::find()
        .order_by_asc(machine::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a machine by vendor id.
pub async fn get_machine(db: &DatabaseConnection, id: &str) -> Result<Option<machine::Model>> {
    Machine::find_by_id(id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Inserts or overwrites each record and returns how many rows were written.
///
/// Existing rows get every mutable column replaced; the last write wins.
pub async fn upsert_machines<C>(db: &C, records: Vec<MachineRecord>) -> Result<usize>
where
    C: ConnectionTrait,
{
    let mut count = 0;
    for record in records {
        match Machine::find_by_id(record.id.clone()).one(db).await? {
            Some(existing) => {
                let mut active_model: machine::ActiveModel = existing.into();
                active_model.name = Set(record.name);
                active_model.category = Set(record.category);
                active_model.serial_number = Set(record.serial_number);
                active_model.status = Set(record.status);
                active_model.last_update = Set(record.last_update);
                active_model.latitude = Set(record.latitude);
                active_model.longitude = Set(record.longitude);
                active_model.update(db).await?;
            }
            None => {
                let new_machine = machine::ActiveModel {
                    id: Set(record.id),
                    name: Set(record.name),
                    category: Set(record.category),
                    serial_number: Set(record.serial_number),
                    status: Set(record.status),
                    last_update: Set(record.last_update),
                    latitude: Set(record.latitude),
                    longitude: Set(record.longitude),
                };
                new_machine.insert(db).await?;
            }
        }
        count += 1;
    }
    Ok(count)
}
