use shared::libsql::{Connection, nullable_text};

pub struct insert_profile_params<'a> {
    pub id: &'a str,
    pub user_id: &'a Option<String>,
    pub name: &'a Option<String>,
    pub email: &'a Option<String>,
    pub phone: &'a Option<String>,
    pub address: &'a Option<String>,
}

pub async fn insert_profile(
    conn: &Connection,
    params: insert_profile_params<'_>,
) -> Result<u64, libsql::Error> {
    conn.execute(
        r#"INSERT INTO profiles (id, user_id, name, email, phone, address) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
        libsql::params![
            params.id.to_string(),
            nullable_text(params.user_id),
            nullable_text(params.name),
            nullable_text(params.email),
            nullable_text(params.phone),
            nullable_text(params.address),
        ],
    )
    .await
}

#[derive(Debug)]
pub struct Row_get_profile {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

async fn query_profile(
    conn: &Connection,
    sql: &str,
    key: &str,
) -> Result<Row_get_profile, libsql::Error> {
    let mut stmt = conn.prepare(sql).await?;
    let row = stmt.query_row(libsql::params![key.to_string()]).await?;

    Ok(Row_get_profile {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        address: row.get(5)?,
    })
}

pub struct get_profile_by_id_params<'a> {
    pub id: &'a str,
}

/// Fails with [`libsql::Error::QueryReturnedNoRows`] when no profile matches.
pub async fn get_profile_by_id(
    conn: &Connection,
    params: get_profile_by_id_params<'_>,
) -> Result<Row_get_profile, libsql::Error> {
    query_profile(
        conn,
        r#"SELECT id, user_id, name, email, phone, address FROM profiles WHERE id = ?1"#,
        params.id,
    )
    .await
}

pub struct get_profile_by_user_id_params<'a> {
    pub user_id: &'a str,
}

/// Fails with [`libsql::Error::QueryReturnedNoRows`] when no profile matches.
pub async fn get_profile_by_user_id(
    conn: &Connection,
    params: get_profile_by_user_id_params<'_>,
) -> Result<Row_get_profile, libsql::Error> {
    query_profile(
        conn,
        r#"SELECT id, user_id, name, email, phone, address FROM profiles WHERE user_id = ?1"#,
        params.user_id,
    )
    .await
}

pub async fn get_profile_id_by_user_id(
    conn: &Connection,
    params: get_profile_by_user_id_params<'_>,
) -> Result<String, libsql::Error> {
    let mut stmt = conn
        .prepare(r#"SELECT id FROM profiles WHERE user_id = ?1"#)
        .await?;
    let row = stmt
        .query_row(libsql::params![params.user_id.to_string()])
        .await?;
    row.get(0)
}
