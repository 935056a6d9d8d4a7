//! SQLite base adapter for tasks.

#![allow(non_camel_case_types)]
mod raw;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use raw::{get_task_by_id, get_task_by_id_params, insert_task, insert_task_params};
use shared::{
    error::StorageError,
    libsql::{Connection, is_unique_violation},
    primitives::{IdGenerator, SqlMigrationLoader, UuidV4Generator},
    validation::Validator,
};
use tracing::debug;

use crate::logic::{Task, TaskValidator};
use crate::repository::TaskRepositoryLike;

/// Task storage on the `tasks` table. Validates tasks itself before writing.
#[derive(Clone)]
pub struct Repository {
    conn: Connection,
    validator: Arc<dyn Validator<Task>>,
    id_generator: Arc<dyn IdGenerator>,
}

impl Repository {
    /// Repository with the default [`TaskValidator`] and uuid v4 ids.
    pub fn new(conn: Connection) -> Self {
        Self::with_dependencies(conn, Arc::new(TaskValidator), Arc::new(UuidV4Generator))
    }

    pub fn with_dependencies(
        conn: Connection,
        validator: Arc<dyn Validator<Task>>,
        id_generator: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            conn,
            validator,
            id_generator,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl SqlMigrationLoader for Repository {
    fn load_sql_migrations() -> BTreeMap<&'static str, BTreeMap<&'static str, &'static str>> {
        let mut sqlite = BTreeMap::new();
        sqlite.insert(
            "20250301000000_create_tasks.up.sql",
            include_str!("../../../dbs/tasks/migrations/sqlite/20250301000000_create_tasks.up.sql"),
        );
        sqlite.insert(
            "20250301000000_create_tasks.down.sql",
            include_str!(
                "../../../dbs/tasks/migrations/sqlite/20250301000000_create_tasks.down.sql"
            ),
        );
        BTreeMap::from([("sqlite", sqlite)])
    }
}

#[async_trait]
impl TaskRepositoryLike for Repository {
    async fn get_task(&self, id: &str) -> Result<Task, StorageError> {
        let row = match get_task_by_id(&self.conn, get_task_by_id_params { id }).await {
            Ok(row) => row,
            Err(libsql::Error::QueryReturnedNoRows) => {
                return Err(StorageError::not_found("task", id));
            }
            Err(e) => {
                debug!(error = ?e, task_id = %id, "failed to query task");
                return Err(StorageError::internal("failed to query task", e));
            }
        };

        Ok(Task {
            id: row.id,
            title: row.title,
            description: row.description,
            completed: row.completed.map(|c| c != 0),
        })
    }

    async fn save_task(&self, mut task: Task) -> Result<Task, StorageError> {
        self.validator.apply_defaults(&mut task)?;
        self.validator.validate(&task)?;

        let id = match &task.id {
            Some(id) => id.clone(),
            None => self.id_generator.generate(),
        };

        let params = insert_task_params {
            id: &id,
            title: &task.title,
            description: &task.description,
            completed: &task.completed,
        };
        let affected = match insert_task(&self.conn, params).await {
            Ok(affected) => affected,
            Err(e) if is_unique_violation(&e) => {
                debug!(error = ?e, task_id = %id, "task id already taken");
                return Err(StorageError::NotUnique {
                    msg: format!("task {id} already exists"),
                    source: Some(e.into()),
                });
            }
            Err(e) => {
                debug!(error = ?e, task_id = %id, "failed to insert task");
                return Err(StorageError::internal("failed to insert task", e));
            }
        };

        if affected != 1 {
            return Err(StorageError::internal(
                "unexpected number of rows affected",
                anyhow::anyhow!("expected 1 row, got {affected}"),
            ));
        }

        task.id = Some(id);
        Ok(task)
    }
}

/// Counts rows in `tasks`; used to check that failed writes left nothing behind.
pub async fn count_tasks(conn: &Connection) -> Result<i64, anyhow::Error> {
    let mut rows = conn
        .query("SELECT COUNT(*) FROM tasks", ())
        .await
        .context("failed to count tasks")?;
    let row = rows
        .next()
        .await
        .context("failed to read task count")?
        .ok_or_else(|| anyhow::anyhow!("count query returned no rows"))?;
    Ok(row.get::<i64>(0)?)
}
