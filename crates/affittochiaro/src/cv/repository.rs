use super::domain::{TenantCv, TenantId};

/// Source of whole tenant CVs. Implementations replace records wholesale on save.
pub trait CvRepository: Send + Sync {
    fn load(&self, tenant_id: &TenantId) -> Result<Option<TenantCv>, RepositoryError>;
    fn save(&self, cv: TenantCv) -> Result<(), RepositoryError>;
    fn tenants(&self) -> Result<Vec<TenantId>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
