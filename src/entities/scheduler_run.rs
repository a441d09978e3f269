//! Scheduler run entity - the append-only ledger of completed sync runs.
//!
//! Rows are written in the same transaction as the upserts they describe and
//! are never updated afterwards. The most recent row (by `last_run`, then `id`)
//! is what the scheduler status reports.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Scheduler run database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "scheduler_runs")]
pub struct Model {
    /// Sequential identifier, also the tie-breaker for equal timestamps
    #[sea_orm(primary_key)]
    pub id: i32,
    /// When the run committed
    pub last_run: DateTimeUtc,
    /// Number of machine rows upserted by the run
    pub machines_synced: i32,
    /// Number of field rows upserted by the run
    pub fields_synced: i32,
}

/// `SchedulerRun` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
