//! Profiles crate: profile activation and lookup.
//!
//! Storage is layered: the sqlite base adapter is wrapped by a transactional
//! decorator, which is wrapped by a validating decorator. Each layer only sees
//! the [`ProfileRepositoryLike`] contract of the layer below.

pub mod logic;
pub mod repository;
pub mod router;
pub mod service;

pub use logic::{Profile, ProfileValidator, ProfileValidatorConfig};
pub use repository::{
    MapperError, ProfileLookup, ProfileMapper, ProfileMapperLike, ProfileRepositoryLike,
    Repository, TransactionalProfileRepository, ValidatingProfileRepository,
};
pub use router::create_router;
pub use service::ProfileService;
