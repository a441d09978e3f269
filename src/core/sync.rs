//! Synchronization run - pulls equipment and fields from the vendor and mirrors
//! them into the local store.
//!
//! A run fetches both collections concurrently, normalizes every record, then
//! upserts machines, upserts fields and appends one ledger row inside a single
//! transaction. A fetch failure aborts the run before anything is written; a
//! failure during the writes rolls all of them back.

use crate::{
    core::{
        field::{self, FieldRecord},
        machine::{self, MachineRecord},
        scheduler_run,
    },
    entities::scheduler_run::Model as SchedulerRunModel,
    errors::Result,
    gateway::VendorGateway,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde_json::Value;
use std::collections::{HashMap, hash_map::Entry};
use tracing::{debug, info, instrument};

/// Performs one synchronization run and returns the ledger row it wrote.
#[instrument(skip_all)]
pub async fn run_once(
    db: &DatabaseConnection,
    gateway: &dyn VendorGateway,
) -> Result<SchedulerRunModel> {
    let (equipment, fields) = tokio::try_join!(gateway.list_equipment(), gateway.list_fields())?;
    debug!(
        equipment = equipment.values.len(),
        fields = fields.values.len(),
        "Fetched vendor collections"
    );

    let machine_records = last_record_per_id(
        equipment.values.iter().filter_map(normalize_machine),
        |record: &MachineRecord| record.id.clone(),
    );
    let field_records = last_record_per_id(
        fields.values.iter().filter_map(normalize_field),
        |record: &FieldRecord| record.id.clone(),
    );

    let txn = db.begin().await?;
    let machines_synced = machine::upsert_machines(&txn, machine_records).await?;
    let fields_synced = field::upsert_fields(&txn, field_records).await?;
    let run = scheduler_run::record_run(&txn, machines_synced, fields_synced).await?;
    txn.commit().await?;

    info!(machines_synced, fields_synced, "Synchronization run committed");
    Ok(run)
}

/// Maps a vendor equipment record onto a [`MachineRecord`].
///
/// Returns `None` for records without an id.
#[must_use]
pub fn normalize_machine(raw: &Value) -> Option<MachineRecord> {
    let id = identifier(raw)?;
    let location = raw.get("location");
    Some(MachineRecord {
        id,
        name: text(raw, "displayName").or_else(|| text(raw, "name")),
        category: text(raw, "category"),
        serial_number: text(raw, "serialNumber"),
        status: text(raw, "status"),
        last_update: raw
            .get("lastUpdated")
            .or_else(|| raw.get("lastModifiedTime"))
            .and_then(parse_timestamp),
        latitude: location.and_then(|l| l.get("latitude")).and_then(Value::as_f64),
        longitude: location.and_then(|l| l.get("longitude")).and_then(Value::as_f64),
    })
}

/// Maps a vendor field record onto a [`FieldRecord`].
///
/// Returns `None` for records without an id. A missing name becomes empty.
#[must_use]
pub fn normalize_field(raw: &Value) -> Option<FieldRecord> {
    let id = identifier(raw)?;
    Some(FieldRecord {
        id,
        name: text(raw, "name").unwrap_or_default(),
        boundary: raw.get("boundary").filter(|b| !b.is_null()).cloned(),
        crop_type: text(raw, "cropType"),
        updated_at: raw
            .get("lastModifiedTime")
            .or_else(|| raw.get("updatedAt"))
            .and_then(parse_timestamp),
    })
}

/// Parses a vendor timestamp.
///
/// Accepts RFC 3339 and offset-less ISO 8601 (taken as UTC). Anything else,
/// including non-strings, yields `None`.
#[must_use]
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let text = value.as_str()?.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

/// Collapses records sharing an id: the last record wins, at the position of
/// the first. Counts reported by a run are therefore distinct rows.
fn last_record_per_id<T, I, F>(records: I, id_of: F) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> String,
{
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<T> = Vec::new();
    for record in records {
        match positions.entry(id_of(&record)) {
            Entry::Occupied(slot) => unique[*slot.get()] = record,
            Entry::Vacant(slot) => {
                slot.insert(unique.len());
                unique.push(record);
            }
        }
    }
    unique
}

fn identifier(raw: &Value) -> Option<String> {
    match raw.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn text(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}
