//! SQLite base adapter and mapper for profiles.
//!
//! The base adapter does not validate: validation is layered on top by
//! [`super::ValidatingProfileRepository`].

#![allow(non_camel_case_types)]
mod raw;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use raw::{
    Row_get_profile, get_profile_by_id, get_profile_by_id_params, get_profile_by_user_id,
    get_profile_by_user_id_params, get_profile_id_by_user_id, insert_profile,
    insert_profile_params,
};
use shared::{
    error::StorageError,
    libsql::{Connection, is_unique_violation},
    primitives::{IdGenerator, SqlMigrationLoader, UuidV4Generator},
};
use tracing::debug;

use crate::logic::{Profile, ProfileId};
use crate::repository::{MapperError, ProfileMapperLike, ProfileRepositoryLike};

/// Column `get_profile` looks profiles up by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProfileLookup {
    #[default]
    Id,
    UserId,
}

#[derive(Clone)]
pub struct Repository {
    conn: Connection,
    lookup: ProfileLookup,
    id_generator: Arc<dyn IdGenerator>,
}

impl Repository {
    pub fn new(conn: Connection, lookup: ProfileLookup) -> Self {
        Self::with_id_generator(conn, lookup, Arc::new(UuidV4Generator))
    }

    pub fn with_id_generator(
        conn: Connection,
        lookup: ProfileLookup,
        id_generator: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            conn,
            lookup,
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
            "20250301000100_create_profiles.up.sql",
            include_str!(
                "../../../dbs/profiles/migrations/sqlite/20250301000100_create_profiles.up.sql"
            ),
        );
        sqlite.insert(
            "20250301000100_create_profiles.down.sql",
            include_str!(
                "../../../dbs/profiles/migrations/sqlite/20250301000100_create_profiles.down.sql"
            ),
        );
        BTreeMap::from([("sqlite", sqlite)])
    }
}

impl From<Row_get_profile> for Profile {
    fn from(row: Row_get_profile) -> Self {
        Profile {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
        }
    }
}

#[async_trait]
impl ProfileRepositoryLike for Repository {
    async fn get_profile(&self, key: &str) -> Result<Profile, StorageError> {
        let res = match self.lookup {
            ProfileLookup::Id => {
                let params = get_profile_by_id_params { id: key };
                get_profile_by_id(&self.conn, params).await
            }
            ProfileLookup::UserId => {
                let params = get_profile_by_user_id_params { user_id: key };
                get_profile_by_user_id(&self.conn, params).await
            }
        };

        match res {
            Ok(row) => Ok(Profile::from(row)),
            Err(libsql::Error::QueryReturnedNoRows) => Err(StorageError::not_found("profile", key)),
            Err(e) => {
                debug!(error = ?e, lookup = ?self.lookup, "failed to query profile");
                Err(StorageError::internal("failed to query profile", e))
            }
        }
    }

    async fn activate_profile(&self, mut profile: Profile) -> Result<Profile, StorageError> {
        let id = match &profile.id {
            Some(id) => id.clone(),
            None => self.id_generator.generate(),
        };

        let params = insert_profile_params {
            id: &id,
            user_id: &profile.user_id,
            name: &profile.name,
            email: &profile.email,
            phone: &profile.phone,
            address: &profile.address,
        };
        let affected = match insert_profile(&self.conn, params).await {
            Ok(affected) => affected,
            Err(e) if is_unique_violation(&e) => {
                debug!(error = ?e, profile_id = %id, "profile violates a uniqueness constraint");
                return Err(StorageError::NotUnique {
                    msg: "profile already exists".to_string(),
                    source: Some(e.into()),
                });
            }
            Err(e) => {
                debug!(error = ?e, profile_id = %id, "failed to insert profile");
                return Err(StorageError::internal("failed to insert profile", e));
            }
        };

        if affected != 1 {
            return Err(StorageError::internal(
                "unexpected number of rows affected",
                anyhow::anyhow!("expected 1 row, got {affected}"),
            ));
        }

        profile.id = Some(id);
        Ok(profile)
    }
}

/// Maps user ids to profile ids with a lookup on `profiles.user_id`.
#[derive(Clone)]
pub struct ProfileMapper {
    conn: Connection,
}

impl ProfileMapper {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ProfileMapperLike for ProfileMapper {
    async fn map_profile(&self, user_id: &str) -> Result<ProfileId, MapperError> {
        let params = get_profile_by_user_id_params { user_id };
        match get_profile_id_by_user_id(&self.conn, params).await {
            Ok(id) => Ok(ProfileId(id)),
            Err(libsql::Error::QueryReturnedNoRows) => Err(MapperError::NotFound {
                user_id: user_id.to_string(),
            }),
            Err(e) => {
                debug!(error = ?e, "failed to map profile");
                Err(MapperError::Internal {
                    msg: "failed to query profile id".to_string(),
                    source: Some(e.into()),
                })
            }
        }
    }
}

/// Counts rows in `profiles`; used to check that failed writes left nothing behind.
pub async fn count_profiles(conn: &Connection) -> Result<i64, anyhow::Error> {
    let mut rows = conn
        .query("SELECT COUNT(*) FROM profiles", ())
        .await
        .context("failed to count profiles")?;
    let row = rows
        .next()
        .await
        .context("failed to read profile count")?
        .ok_or_else(|| anyhow::anyhow!("count query returned no rows"))?;
    Ok(row.get::<i64>(0)?)
}
