use std::sync::Arc;

use profiles::{
    ProfileLookup, ProfileMapper, ProfileValidator, ProfileValidatorConfig,
    TransactionalProfileRepository, ValidatingProfileRepository, service::ProfileServiceParams,
};
use shared::error::CommonError;
use shared::libsql::{Connection, Migrations, merge_nested_migrations};
use shared::primitives::{SqlMigrationLoader, UuidV4Generator};
use shared::transaction::LibsqlTransactioner;
use tasks::{MemoryTaskRepository, TaskRepositoryLike, TransactionalTaskRepository};
use tracing::info;

use crate::config::TaskStorage;

pub use profiles::ProfileService;
pub use tasks::TaskService;

#[derive(Debug, Clone, Default)]
pub struct ApiServiceConfig {
    pub task_storage: TaskStorage,
    pub profile_lookup: ProfileLookup,
    pub profile_validator: ProfileValidatorConfig,
}

/// Router state of every endpoint group.
#[derive(Clone)]
pub struct ApiService {
    pub task_service: Arc<TaskService>,
    pub profile_service: Arc<ProfileService>,
}

/// Migrations of every crate that stores data in the shared database.
pub fn load_sql_migrations() -> Migrations<'static> {
    merge_nested_migrations(vec![
        tasks::Repository::load_sql_migrations(),
        profiles::Repository::load_sql_migrations(),
    ])
}

/// Builds both storage stacks on top of `conn`.
///
/// Tasks and profiles share one transactioner, so their transactions never
/// interleave on the connection.
pub fn create_api_service(
    conn: Connection,
    config: &ApiServiceConfig,
) -> Result<ApiService, CommonError> {
    let transactioner = LibsqlTransactioner::new(conn.clone());

    let task_repository: Box<dyn TaskRepositoryLike> = match config.task_storage {
        TaskStorage::Sqlite => Box::new(TransactionalTaskRepository::new(
            tasks::Repository::new(conn.clone()),
            transactioner.clone(),
        )),
        TaskStorage::Memory => Box::new(MemoryTaskRepository::default()),
    };
    info!(storage = ?config.task_storage, "task storage configured");

    let validator = ProfileValidator::new(config.profile_validator.clone()).map_err(|e| {
        CommonError::InvalidConfiguration {
            msg: "invalid profile validator configuration".to_string(),
            source: Some(e.into()),
        }
    })?;
    let profile_repository = ValidatingProfileRepository::new(
        TransactionalProfileRepository::new(
            profiles::Repository::new(conn.clone(), config.profile_lookup),
            transactioner,
        ),
        validator,
    );
    info!(lookup = ?config.profile_lookup, "profile storage configured");

    Ok(ApiService {
        task_service: Arc::new(TaskService::new(task_repository)),
        profile_service: Arc::new(ProfileService::new(ProfileServiceParams {
            repository: Box::new(profile_repository),
            mapper: Box::new(ProfileMapper::new(conn)),
            id_generator: Arc::new(UuidV4Generator),
            lookup: config.profile_lookup,
        })),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use profiles::repository::sqlite::count_profiles;
    use shared::error::StorageErrorKind;
    use shared::test_utils::repository::setup_in_memory_database;
    use tasks::Task;
    use tasks::repository::sqlite::count_tasks;

    async fn setup() -> (libsql::Database, Connection) {
        setup_in_memory_database(vec![load_sql_migrations()])
            .await
            .unwrap()
    }

    fn task(title: &str) -> Task {
        Task {
            title: Some(title.to_string()),
            completed: Some(false),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_sqlite_task_storage_writes_to_database() {
        let (_db, conn) = setup().await;
        let config = ApiServiceConfig::default();
        let service = create_api_service(conn.clone(), &config).unwrap();
        let repository = &service.task_service.repository;

        let saved = repository.save_task(task("write docs")).await.unwrap();

        assert!(saved.id.is_some());
        assert_eq!(count_tasks(&conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_memory_task_storage_leaves_database_untouched() {
        let (_db, conn) = setup().await;
        let config = ApiServiceConfig {
            task_storage: TaskStorage::Memory,
            ..Default::default()
        };
        let service = create_api_service(conn.clone(), &config).unwrap();
        let repository = &service.task_service.repository;

        let saved = repository.save_task(task("write docs")).await.unwrap();
        let fetched = repository.get_task(saved.id.as_deref().unwrap()).await;

        assert_eq!(fetched.unwrap(), saved);
        assert_eq!(count_tasks(&conn).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_profile_stack_validates_before_storing() {
        let (_db, conn) = setup().await;
        let config = ApiServiceConfig::default();
        let service = create_api_service(conn.clone(), &config).unwrap();
        let profile = profiles::Profile {
            id: Some("p-1".to_string()),
            user_id: Some(String::new()),
            ..Default::default()
        };

        let res = service.profile_service.repository.activate_profile(profile);
        let err = res.await.unwrap_err();

        assert_eq!(err.kind(), StorageErrorKind::Invalid);
        assert_eq!(count_profiles(&conn).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_regex_is_a_configuration_error() {
        let (_db, conn) = setup().await;
        let config = ApiServiceConfig {
            profile_validator: ProfileValidatorConfig {
                email_regex: Some("([".to_string()),
                phone_regex: None,
            },
            ..Default::default()
        };

        let res = create_api_service(conn, &config);
        let is_config_error = matches!(res, Err(CommonError::InvalidConfiguration { .. }));
        assert!(is_config_error);
    }
}
