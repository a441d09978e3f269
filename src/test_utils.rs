//! Shared test utilities.
//!
//! Provides an in-memory database with the schema applied, seed helpers, and
//! [`FakeGateway`], a scriptable stand-in for the vendor API.

use crate::{
    core::field::{FieldRecord, upsert_fields},
    entities,
    errors::Result,
    gateway::{GatewayError, GatewayResult, VendorCollection, VendorGateway},
};
use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::watch;

/// bcrypt cost used by tests; the minimum bcrypt accepts.
pub const TEST_BCRYPT_COST: u32 = 4;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Seeds a field the way a sync run would.
pub async fn create_test_field(
    db: &DatabaseConnection,
    id: &str,
    name: &str,
) -> Result<entities::field::Model> {
    let record = FieldRecord {
        id: id.to_string(),
        name: name.to_string(),
        ..FieldRecord::default()
    };
    upsert_fields(db, vec![record]).await?;
    crate::core::field::get_field(db, id)
        .await?
        .ok_or_else(|| crate::errors::Error::NotFound {
            entity: "Field",
            id: id.to_string(),
        })
}

/// In-memory vendor double.
///
/// Listings return the configured records in one page. Failures can be
/// toggled at any time, which lets scheduler tests break a later run. A gate
/// holds every listing call open until it is set to `true`; calls are counted
/// before they wait on the gate.
#[derive(Debug, Default)]
pub struct FakeGateway {
    machines: Vec<Value>,
    fields: Vec<Value>,
    operations: Vec<Value>,
    fail_equipment: AtomicBool,
    fail_fields: AtomicBool,
    fail_mirror: AtomicBool,
    list_calls: AtomicUsize,
    mirror_calls: AtomicUsize,
    gate: Option<watch::Receiver<bool>>,
}

impl FakeGateway {
    /// A gateway with no records that never fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Equipment records returned by `list_equipment`.
    pub fn with_machines(mut self, machines: Vec<Value>) -> Self {
        self.machines = machines;
        self
    }

    /// Field records returned by `list_fields`.
    pub fn with_fields(mut self, fields: Vec<Value>) -> Self {
        self.fields = fields;
        self
    }

    /// Field operations returned by the passthrough calls.
    pub fn with_operations(mut self, operations: Vec<Value>) -> Self {
        self.operations = operations;
        self
    }

    /// Holds listing calls open until `gate` reads `true`.
    pub fn with_gate(mut self, gate: watch::Receiver<bool>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Makes `list_fields` fail.
    pub fn failing_fields(self) -> Self {
        self.set_fields_failing(true);
        self
    }

    /// Makes `list_equipment` fail.
    pub fn failing_equipment(self) -> Self {
        self.fail_equipment.store(true, Ordering::SeqCst);
        self
    }

    /// Makes every work plan mirror call fail.
    pub fn failing_mirror(self) -> Self {
        self.fail_mirror.store(true, Ordering::SeqCst);
        self
    }

    /// Toggles `list_fields` failures on a shared instance.
    pub fn set_fields_failing(&self, failing: bool) {
        self.fail_fields.store(failing, Ordering::SeqCst);
    }

    /// Number of listing calls served so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of work plan mirror calls received so far.
    pub fn mirror_calls(&self) -> usize {
        self.mirror_calls.load(Ordering::SeqCst)
    }

    async fn listing(
        &self,
        values: &[Value],
        failing: &AtomicBool,
    ) -> GatewayResult<VendorCollection> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let mut gate = gate.clone();
            // A dropped sender opens the gate.
            let _ = gate.wait_for(|open| *open).await;
        }
        if failing.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(VendorCollection {
            values: values.to_vec(),
        })
    }

    fn mirror(&self) -> GatewayResult<Option<Value>> {
        self.mirror_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_mirror.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(Some(json!({"ok": true})))
    }
}

fn unavailable() -> GatewayError {
    GatewayError::Status {
        status: 503,
        body: "vendor unavailable".to_string(),
    }
}

#[async_trait]
impl VendorGateway for FakeGateway {
    async fn list_equipment(&self) -> GatewayResult<VendorCollection> {
        self.listing(&self.machines, &self.fail_equipment).await
    }

    async fn list_fields(&self) -> GatewayResult<VendorCollection> {
        self.listing(&self.fields, &self.fail_fields).await
    }

    async fn list_field_operations(&self) -> GatewayResult<VendorCollection> {
        self.listing(&self.operations, &AtomicBool::new(false))
            .await
    }

    async fn get_field_operation(&self, operation_id: &str) -> GatewayResult<Option<Value>> {
        self.operations
            .iter()
            .find(|op| op.get("id").and_then(Value::as_str) == Some(operation_id))
            .cloned()
            .map(Some)
            .ok_or_else(|| GatewayError::Status {
                status: 404,
                body: format!("no field operation {operation_id}"),
            })
    }

    async fn get_field_operation_measurements(
        &self,
        operation_id: &str,
        measurement_type: Option<&str>,
    ) -> GatewayResult<Option<Value>> {
        self.get_field_operation(operation_id).await?;
        Ok(Some(json!({
            "operationId": operation_id,
            "measurementType": measurement_type,
            "values": [],
        })))
    }

    async fn create_work_plan(&self, _payload: &Value) -> GatewayResult<Option<Value>> {
        self.mirror()
    }

    async fn update_work_plan(
        &self,
        _plan_id: i32,
        _payload: &Value,
    ) -> GatewayResult<Option<Value>> {
        self.mirror()
    }

    async fn delete_work_plan(&self, _plan_id: i32) -> GatewayResult<Option<Value>> {
        self.mirror()
    }
}
