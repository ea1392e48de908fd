use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::domain::{TenantCv, TenantId};
use super::repository::{CvRepository, RepositoryError};

const RECORD_EXTENSION: &str = "json";

/// CV provider storing one JSON document per tenant inside a directory.
///
/// Writes go to a temporary file that is renamed over the previous record, so readers never
/// observe a half-written CV.
#[derive(Debug, Clone)]
pub struct JsonFileCvRepository {
    root: PathBuf,
}

impl JsonFileCvRepository {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| {
            RepositoryError::Unavailable(format!("cannot create {}: {err}", root.display()))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, tenant_id: &TenantId) -> Option<PathBuf> {
        tenant_id
            .is_record_safe()
            .then(|| self.root.join(format!("{tenant_id}.{RECORD_EXTENSION}")))
    }
}

impl CvRepository for JsonFileCvRepository {
    fn load(&self, tenant_id: &TenantId) -> Result<Option<TenantCv>, RepositoryError> {
        let Some(path) = self.record_path(tenant_id) else {
            return Ok(None);
        };

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(RepositoryError::Unavailable(format!(
                    "cannot read {}: {err}",
                    path.display()
                )))
            }
        };

        TenantCv::from_json_str(&raw).map(Some).map_err(|err| {
            RepositoryError::Unavailable(format!("corrupt record {}: {err}", path.display()))
        })
    }

    fn save(&self, cv: TenantCv) -> Result<(), RepositoryError> {
        let path = self.record_path(cv.tenant_id()).ok_or_else(|| {
            RepositoryError::Unavailable(format!(
                "tenant id '{}' cannot be used as a record name",
                cv.tenant_id()
            ))
        })?;

        let payload = serde_json::to_vec_pretty(&cv)
            .map_err(|err| RepositoryError::Unavailable(format!("cannot encode cv: {err}")))?;

        let staging = path.with_extension("json.tmp");
        fs::write(&staging, payload)
            .and_then(|_| fs::rename(&staging, &path))
            .map_err(|err| {
                RepositoryError::Unavailable(format!("cannot write {}: {err}", path.display()))
            })?;

        debug!(tenant = %cv.tenant_id(), path = %path.display(), "cv record written");
        Ok(())
    }

    fn tenants(&self) -> Result<Vec<TenantId>, RepositoryError> {
        let entries = fs::read_dir(&self.root).map_err(|err| {
            RepositoryError::Unavailable(format!("cannot list {}: {err}", self.root.display()))
        })?;

        let mut tenants = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|err| RepositoryError::Unavailable(err.to_string()))?
                .path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                tenants.push(TenantId(stem.to_string()));
            }
        }
        tenants.sort();
        Ok(tenants)
    }
}
