//! Scheduler run ledger - append and read completed sync runs.

use crate::{
    entities::{SchedulerRun, scheduler_run},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};

/// Appends a ledger row stamped with the current time.
///
/// Meant to be called inside the transaction that performed the upserts.
pub async fn record_run<C>(
    db: &C,
    machines_synced: usize,
    fields_synced: usize,
) -> Result<scheduler_run::Model>
where
    C: ConnectionTrait,
{
    let run = scheduler_run::ActiveModel {
        last_run: Set(Utc::now()),
        machines_synced: Set(clamp_count(machines_synced)),
        fields_synced: Set(clamp_count(fields_synced)),
        ..Default::default()
    };
    run.insert(db).await.map_err(Into::into)
}

/// Most recent run, by timestamp and then by id.
pub async fn latest_run(db: &DatabaseConnection) -> Result<Option<scheduler_run::Model>> {
    SchedulerRun::find()
        .order_by_desc(scheduler_run::Column::LastRun)
        .order_by_desc(scheduler_run::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Most recent runs first, at most `limit` of them.
pub async fn list_runs(db: &DatabaseConnection, limit: u64) -> Result<Vec<scheduler_run::Model>> {
    SchedulerRun::find()
        .order_by_desc(scheduler_run::Column::LastRun)
        .order_by_desc(scheduler_run::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

fn clamp_count(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_latest_run_on_empty_ledger_is_none() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(latest_run(&db).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_latest_run_returns_newest_row() -> Result<()> {
        let db = setup_test_db().await?;
        record_run(&db, 1, 1).await?;
        let newest = record_run(&db, 3, 2).await?;

        let latest = latest_run(&db).await?.unwrap();
        assert_eq!(latest.id, newest.id);
        assert_eq!(latest.machines_synced, 3);
        assert_eq!(latest.fields_synced, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_runs_is_newest_first_and_limited() -> Result<()> {
        let db = setup_test_db().await?;
        for n in 0..5 {
            record_run(&db, n, n).await?;
        }

        let runs = list_runs(&db, 3).await?;
        assert_eq!(runs.len(), 3);
        assert!(runs[0].id > runs[1].id);
        assert_eq!(runs[0].machines_synced, 4);
        Ok(())
    }
}
