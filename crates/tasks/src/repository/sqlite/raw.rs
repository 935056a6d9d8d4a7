use shared::libsql::{Connection, nullable_bool, nullable_text};

pub struct insert_task_params<'a> {
    pub id: &'a str,
    pub title: &'a Option<String>,
    pub description: &'a Option<String>,
    pub completed: &'a Option<bool>,
}

pub async fn insert_task(
    conn: &Connection,
    params: insert_task_params<'_>,
) -> Result<u64, libsql::Error> {
    conn.execute(
        r#"INSERT INTO tasks (id, title, description, completed) VALUES (?1, ?2, ?3, ?4)"#,
        libsql::params![
            params.id.to_string(),
            nullable_text(params.title),
            nullable_text(params.description),
            nullable_bool(params.completed),
        ],
    )
    .await
}

pub struct get_task_by_id_params<'a> {
    pub id: &'a str,
}

#[derive(Debug)]
pub struct Row_get_task_by_id {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<i64>,
}

/// Fails with [`libsql::Error::QueryReturnedNoRows`] when no task matches.
pub async fn get_task_by_id(
    conn: &Connection,
    params: get_task_by_id_params<'_>,
) -> Result<Row_get_task_by_id, libsql::Error> {
    let mut stmt = conn
        .prepare(r#"SELECT id, title, description, completed FROM tasks WHERE id = ?1"#)
        .await?;
    let id = params.id.to_string();
    let row = stmt.query_row(libsql::params![id]).await?;

    Ok(Row_get_task_by_id {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        completed: row.get(3)?,
    })
}
