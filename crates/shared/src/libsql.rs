use std::collections::BTreeMap;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use crate::error::CommonError;
use libsql::params::IntoParams;
use libsql::{BatchRows, Database, Rows};
use tracing::info;
use url::Url;

/// Extended result code for a violated UNIQUE constraint.
pub const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;
/// Extended result code for a violated PRIMARY KEY constraint.
pub const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;
/// Primary result code shared by every constraint violation.
pub const SQLITE_CONSTRAINT: i32 = 19;

#[derive(Debug, Clone)]
pub struct Connection(pub libsql::Connection);

impl Connection {
    pub fn new(connection: libsql::Connection) -> Self {
        Self(connection)
    }
}

impl Deref for Connection {
    type Target = libsql::Connection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[macro_export]
macro_rules! execute_with_retry {
    ($operation:expr) => {
        execute_with_retry!($operation, 10)
    };
    ($operation:expr, $max_retries:expr) => {{
        async {
            let mut _retries = 0u32;
            let _max_retries: u32 = $max_retries;

            loop {
                match $operation.await {
                    Ok(result) => break Ok(result),
                    Err(err) => {
                        let err_str = err.to_string();
                        if err_str.contains("database is locked") || err_str.contains("SQLITE_BUSY")
                        {
                            tracing::warn!("Database is locked, retrying... {:?}", err);
                            if _retries >= _max_retries {
                                break Err(err);
                            }

                            _retries += 1;

                            // Very low delay with exponential backoff
                            let delay_us = 10_000 * (1 << _retries.min(6));
                            tokio::time::sleep(std::time::Duration::from_micros(delay_us)).await;
                        } else {
                            tracing::debug!("Error executing with retry: {:?}", err);
                            break Err(err);
                        }
                    }
                }
            }
        }
        .await
    }};
}

impl Connection {
    /// Execute sql query provided some type that implements [`IntoParams`] returning
    /// on success the number of rows that were changed.
    ///
    /// Busy/locked errors are retried with a short backoff; every other error
    /// is returned on the first attempt.
    pub async fn execute(&self, sql: &str, params: impl IntoParams) -> libsql::Result<u64> {
        tracing::trace!("executing `{}`", sql);
        let params = params.into_params()?;
        execute_with_retry!(self.0.execute(sql, params.clone()), 10)
    }

    /// Execute a batch set of statements.
    pub async fn execute_batch(&self, sql: &str) -> libsql::Result<BatchRows> {
        tracing::trace!("executing batch `{}`", sql);
        execute_with_retry!(self.0.execute_batch(sql), 10)
    }

    /// Execute sql query provided some type that implements [`IntoParams`] returning
    /// on success the [`Rows`].
    pub async fn query(&self, sql: &str, params: impl IntoParams) -> libsql::Result<Rows> {
        let stmt = self.prepare(sql).await?;
        let params = params.into_params()?;
        execute_with_retry!(stmt.query(params.clone()), 10)
    }
}

/// Whether the store rejected a write because it would duplicate a unique key.
pub fn is_unique_violation(err: &libsql::Error) -> bool {
    match err {
        libsql::Error::SqliteFailure(code, msg) => {
            *code == SQLITE_CONSTRAINT_UNIQUE
                || *code == SQLITE_CONSTRAINT_PRIMARYKEY
                || ((*code & 0xff) == SQLITE_CONSTRAINT && msg.contains("UNIQUE constraint failed"))
        }
        _ => false,
    }
}

/// Converts an optional text field into its nullable column value.
pub fn nullable_text(value: &Option<String>) -> libsql::Value {
    match value {
        Some(s) => libsql::Value::Text(s.clone()),
        None => libsql::Value::Null,
    }
}

/// Converts an optional boolean field into its nullable INTEGER column value.
pub fn nullable_bool(value: &Option<bool>) -> libsql::Value {
    match value {
        Some(b) => libsql::Value::Integer(i64::from(*b)),
        None => libsql::Value::Null,
    }
}

pub struct LocalConnectionParams {
    pub path_to_db_file: PathBuf,
}

pub struct RemoteConnectionParams {
    pub remote_url: String,
    pub auth_token: String,
}

pub enum ConnectionType {
    Local(LocalConnectionParams),
    Memory,
    Remote(RemoteConnectionParams),
}

fn get_libsql_path(url: &Url) -> String {
    // libsql://./relative/path keeps the leading dot as the host
    if url.host_str() == Some(".") {
        format!(".{}", url.path())
    } else {
        url.path().to_string()
    }
}

impl TryFrom<Url> for ConnectionType {
    type Error = CommonError;
    fn try_from(url: Url) -> Result<Self, Self::Error> {
        if url.scheme() != "libsql" {
            let scheme = url.scheme();
            return Err(CommonError::InvalidConfiguration {
                msg: format!("invalid scheme: {scheme}"),
                source: None,
            });
        }

        let mode = match url
            .query_pairs()
            .find(|(key, _)| key == "mode")
            .map(|(_, value)| value.to_string())
        {
            Some(mode) => mode,
            None => {
                return Err(CommonError::InvalidConfiguration {
                    msg: "missing mode query parameter".to_string(),
                    source: None,
                });
            }
        };

        match mode.as_str() {
            "local" => Ok(ConnectionType::Local(LocalConnectionParams {
                path_to_db_file: PathBuf::from(get_libsql_path(&url)),
            })),
            "memory" => Ok(ConnectionType::Memory),
            "remote" => {
                let auth_token = match url.query_pairs().find(|(key, _)| key == "auth") {
                    Some((_, value)) => value.to_string(),
                    None => {
                        return Err(CommonError::InvalidConfiguration {
                            msg: "missing auth query parameter for remote connection".to_string(),
                            source: None,
                        });
                    }
                };

                let mut remote_url = url.clone();
                remote_url.set_query(None);
                let remote_url = remote_url.to_string();

                Ok(ConnectionType::Remote(RemoteConnectionParams {
                    remote_url,
                    auth_token,
                }))
            }
            _ => Err(CommonError::InvalidConfiguration {
                msg: format!("invalid mode: {mode}"),
                source: None,
            }),
        }
    }
}

pub fn inject_auth_token_to_db_url(
    url: &Url,
    auth_token: &Option<String>,
) -> Result<Url, CommonError> {
    let mut conn_url = url.clone();
    if let Some(auth_token) = auth_token {
        conn_url.query_pairs_mut().append_pair("auth", auth_token);
    }
    Ok(conn_url)
}

pub type Migrations<'a> = BTreeMap<&'a str, BTreeMap<&'a str, &'a str>>;

pub fn merge_nested_migrations<'a>(mergable_migrations: Vec<Migrations<'a>>) -> Migrations<'a> {
    let mut target = Migrations::new();
    for other in mergable_migrations {
        for (outer_key, inner_map) in other {
            target
                .entry(outer_key)
                .and_modify(|existing_inner| {
                    for (inner_key, value) in inner_map.iter() {
                        existing_inner.insert(*inner_key, *value);
                    }
                })
                .or_insert(inner_map);
        }
    }
    target
}

/// Runs every `.up.` sqlite script in filename order.
pub async fn run_migrations(
    conn: &Connection,
    migrations: &Migrations<'_>,
) -> Result<(), CommonError> {
    let Some(sqlite_migrations) = migrations.get("sqlite") else {
        return Ok(());
    };

    for (filename, contents) in sqlite_migrations
        .iter()
        .filter(|(filename, _)| filename.contains(".up."))
    {
        info!(migration = %filename, "applying migration");
        conn.execute_batch(contents).await?;
    }
    Ok(())
}

fn create_db_file_parent_dir(parent_path: Option<&Path>) -> Result<(), CommonError> {
    if let Some(path) = parent_path {
        if !path.as_os_str().is_empty() && !std::fs::exists(path)? {
            std::fs::create_dir_all(path)?;
        }
    }
    Ok(())
}

pub async fn establish_db_connection(
    connection_string: &Url,
    migrations: Option<Migrations<'_>>,
) -> Result<(Database, Connection), CommonError> {
    let connection_type = ConnectionType::try_from(connection_string.clone())?;

    let db = match connection_type {
        ConnectionType::Local(params) => {
            info!(path = %params.path_to_db_file.display(), "establishing local connection");
            create_db_file_parent_dir(params.path_to_db_file.parent())?;
            libsql::Builder::new_local(params.path_to_db_file.clone())
                .build()
                .await?
        }
        ConnectionType::Memory => {
            info!("establishing in-memory connection");
            libsql::Builder::new_local(":memory:").build().await?
        }
        ConnectionType::Remote(params) => {
            info!(url = %params.remote_url, "establishing remote connection");
            libsql::Builder::new_remote(params.remote_url.clone(), params.auth_token.clone())
                .build()
                .await?
        }
    };
    let conn = Connection(db.connect()?);

    if let Some(migrations) = migrations {
        run_migrations(&conn, &migrations).await?;
    }

    Ok((db, conn))
}
