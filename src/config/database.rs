//! Database configuration module.
//!
//! This module handles the `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL.

use crate::entities::{Field, Machine, SchedulerRun, User, WorkPlan};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info, instrument};

/// Connects to the database at `database_url`.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Opening database connection");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables that do not exist yet.
///
/// Fields are created before work plans because of the foreign key between them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    create_table(db, Machine).await?;
    create_table(db, Field).await?;
    create_table(db, WorkPlan).await?;
    create_table(db, SchedulerRun).await?;
    create_table(db, User).await?;
    info!("Database tables ensured");
    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}
