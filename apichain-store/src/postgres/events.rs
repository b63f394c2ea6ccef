use sqlx::PgPool;
use uuid::Uuid;

use crate::store::{NewEvent, RunEvent, StoreError};

pub async fn append_event(pool: &PgPool, event: NewEvent) -> Result<(), StoreError> {
    sqlx::query(r#"INSERT INTO run_events (run_id, type, payload) VALUES ($1, $2, $3)"#)
        .bind(event.run_id)
        .bind(event.r#type)
        .bind(event.payload)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn get_events_after(pool: &PgPool, run_id: Uuid, after_id: i64, limit: i64) -> Result<Vec<RunEvent>, StoreError> {
    let rows = sqlx::query_as::<_, RunEvent>(
        r#"
SELECT id, run_id, ts, type as event_type, payload
FROM run_events WHERE run_id = $1 AND id > $2 ORDER BY id LIMIT $3
        "#,
    )
    .bind(run_id)
    .bind(after_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
