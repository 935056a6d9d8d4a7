use clap::{Args, ValueEnum};
use profiles::{ProfileLookup, ProfileValidatorConfig};
use url::Url;

use crate::factory::ApiServiceConfig;

/// Backend the task endpoints store tasks in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TaskStorage {
    #[default]
    Sqlite,
    /// Process-local store, lost on restart.
    Memory,
}

/// Column `GET /profiles` finds the caller's profile by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ProfileLookupArg {
    #[default]
    Id,
    UserId,
}

impl From<ProfileLookupArg> for ProfileLookup {
    fn from(arg: ProfileLookupArg) -> Self {
        match arg {
            ProfileLookupArg::Id => ProfileLookup::Id,
            ProfileLookupArg::UserId => ProfileLookup::UserId,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServeParams {
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,
    /// libsql connection string, e.g. `libsql://./.data/local.db?mode=local`
    #[arg(
        long,
        env = "DB_CONN_STRING",
        default_value = "libsql://./.data/local.db?mode=local"
    )]
    pub db_conn_string: Url,
    /// Auth token appended to remote connection strings
    #[arg(long, env = "DB_AUTH_TOKEN")]
    pub db_auth_token: Option<String>,
    #[arg(long, env = "TASK_STORAGE", value_enum, default_value_t = TaskStorage::Sqlite)]
    pub task_storage: TaskStorage,
    #[arg(long, env = "PROFILE_LOOKUP", value_enum, default_value_t = ProfileLookupArg::Id)]
    pub profile_lookup: ProfileLookupArg,
    /// Overrides the pattern profile emails must match
    #[arg(long, env = "PROFILE_EMAIL_REGEX")]
    pub email_regex: Option<String>,
    /// Overrides the pattern profile phone numbers must match
    #[arg(long, env = "PROFILE_PHONE_REGEX")]
    pub phone_regex: Option<String>,
}

impl ServeParams {
    pub fn api_service_config(&self) -> ApiServiceConfig {
        ApiServiceConfig {
            task_storage: self.task_storage,
            profile_lookup: self.profile_lookup.into(),
            profile_validator: ProfileValidatorConfig {
                email_regex: self.email_regex.clone(),
                phone_regex: self.phone_regex.clone(),
            },
        }
    }
}
