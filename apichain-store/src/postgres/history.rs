use sqlx::PgPool;
use uuid::Uuid;

use crate::store::{HistoryEntry, StoreError};

pub async fn insert_history_entry(pool: &PgPool, entry: HistoryEntry) -> Result<(), StoreError> {
    sqlx::query(
        r#"
INSERT INTO step_history
  (run_id, workflow_id, step_order, step_name, request, response, duration_ms, success, recorded_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(entry.run_id)
    .bind(entry.workflow_id)
    .bind(entry.step_order)
    .bind(entry.step_name)
    .bind(entry.request)
    .bind(entry.response)
    .bind(entry.duration_ms)
    .bind(entry.success)
    .bind(entry.recorded_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_history_for_run(pool: &PgPool, run_id: Uuid) -> Result<Vec<HistoryEntry>, StoreError> {
    let rows = sqlx::query_as::<_, HistoryEntry>(
        r#"
SELECT run_id, workflow_id, step_order, step_name, request, response, duration_ms, success, recorded_at
FROM step_history WHERE run_id = $1 ORDER BY step_order, id
        "#,
    )
    .bind(run_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
