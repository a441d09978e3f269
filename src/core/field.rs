//! Field business logic - read access and sync upserts.

use crate::{
    entities::{Field, field},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde_json::Value;

/// A field in local shape, produced by normalizing a vendor record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldRecord {
    /// Vendor id
    pub id: String,
    /// Field name; empty when the vendor omitted it
    pub name: String,
    /// Opaque boundary geometry
    pub boundary: Option<Value>,
    /// Crop planted on the field
    pub crop_type: Option<String>,
    /// Vendor modification timestamp
    pub updated_at: Option<DateTime<Utc>>,
}

/// Lists every mirrored field ordered by id.
pub async fn list_fields(db: &DatabaseConnection) -> Result<Vec<field::Model>> {
    Field::find()
        .order_by_asc(field::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a field by vendor id.
pub async fn get_field<C>(db: &C, id: &str) -> Result<Option<field::Model>>
where
    C: ConnectionTrait,
{
    Field::find_by_id(id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Inserts or overwrites each record and returns how many rows were written.
///
/// An empty incoming name never replaces a stored non-empty one.
pub async fn upsert_fields<C>(db: &C, records: Vec<FieldRecord>) -> Result<usize>
where
    C: ConnectionTrait,
{
    let mut count = 0;
    for record in records {
        match Field::find_by_id(record.id.clone()).one(db).await? {
            Some(existing) => {
                let name = if record.name.is_empty() {
                    existing.name.clone()
                } else {
                    record.name
                };
                let mut active_model: field::ActiveModel = existing.into();
                active_model.name = Set(name);
                active_model.boundary = Set(record.boundary);
                active_model.crop_type = Set(record.crop_type);
                active_model.updated_at = Set(record.updated_at);
                active_model.update(db).await?;
            }
            None => {
                let new_field = field::ActiveModel {
                    id: Set(record.id),
                    name: Set(record.name),
                    boundary: Set(record.boundary),
                    crop_type: Set(record.crop_type),
                    updated_at: Set(record.updated_at),
                };
                new_field.insert(db).await?;
            }
        }
        count += 1;
    }
    Ok(count)
}
