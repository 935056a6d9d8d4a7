use std::sync::Arc;

use shared::primitives::IdGenerator;

use crate::repository::{ProfileLookup, ProfileMapperLike, ProfileRepositoryLike};

/// Dependencies of the profile endpoints.
pub struct ProfileService {
    pub repository: Box<dyn ProfileRepositoryLike>,
    pub mapper: Box<dyn ProfileMapperLike>,
    pub id_generator: Arc<dyn IdGenerator>,
    /// Key the repository expects in `get_profile`.
    pub lookup: ProfileLookup,
}

pub struct ProfileServiceParams {
    pub repository: Box<dyn ProfileRepositoryLike>,
    pub mapper: Box<dyn ProfileMapperLike>,
    pub id_generator: Arc<dyn IdGenerator>,
    pub lookup: ProfileLookup,
}

impl ProfileService {
    pub fn new(params: ProfileServiceParams) -> Self {
        Self {
            repository: params.repository,
            mapper: params.mapper,
            id_generator: params.id_generator,
            lookup: params.lookup,
        }
    }
}
