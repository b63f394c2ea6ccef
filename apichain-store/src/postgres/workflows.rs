use apichain_core::Workflow;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::{NewWorkflow, StoreError, StoredWorkflow};

#[derive(sqlx::FromRow)]
struct WorkflowRow {
    id: Uuid,
    owner: Option<String>,
    definition: JsonValue,
    created_at: DateTime<Utc>,
}

impl WorkflowRow {
    fn into_stored(self) -> Result<StoredWorkflow, StoreError> {
        let mut workflow: Workflow =
            serde_json::from_value(self.definition).map_err(|e| StoreError::Decode {
                id: self.id,
                message: e.to_string(),
            })?;
        workflow.id = Some(self.id.to_string());
        Ok(StoredWorkflow {
            id: self.id,
            owner: self.owner,
            workflow,
            created_at: self.created_at,
        })
    }
}

pub async fn insert_workflow(pool: &PgPool, new: NewWorkflow) -> Result<StoredWorkflow, StoreError> {
    let id = Uuid::new_v4();
    let mut workflow = new.workflow;
    workflow.id = Some(id.to_string());
    let definition =
        serde_json::to_value(&workflow).map_err(|e| StoreError::Other(e.to_string()))?;

    let created_at: DateTime<Utc> = sqlx::query_scalar(
        r#"
INSERT INTO workflows (id, owner, name, definition)
VALUES ($1, $2, $3, $4)
RETURNING created_at
        "#,
    )
    .bind(id)
    .bind(&new.owner)
    .bind(&workflow.name)
    .bind(definition)
    .fetch_one(pool)
    .await?;

    Ok(StoredWorkflow {
        id,
        owner: new.owner,
        workflow,
        created_at,
    })
}

pub async fn get_workflow(pool: &PgPool, id: Uuid) -> Result<Option<StoredWorkflow>, StoreError> {
    let row = sqlx::query_as::<_, WorkflowRow>(
        r#"SELECT id, owner, definition, created_at FROM workflows WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(WorkflowRow::into_stored).transpose()
}
