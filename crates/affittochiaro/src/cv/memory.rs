use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{TenantCv, TenantId};
use super::repository::{CvRepository, RepositoryError};

/// Mock CV provider keeping every record in process memory.
#[derive(Default, Clone)]
pub struct InMemoryCvRepository {
    records: Arc<Mutex<BTreeMap<TenantId, TenantCv>>>,
}

impl InMemoryCvRepository {
    pub fn seeded(cvs: impl IntoIterator<Item = TenantCv>) -> Self {
        let records = cvs
            .into_iter()
            .map(|cv| (cv.tenant_id().clone(), cv))
            .collect();
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<TenantId, TenantCv>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("cv store mutex poisoned".to_string()))
    }
}

impl CvRepository for InMemoryCvRepository {
    fn load(&self, tenant_id: &TenantId) -> Result<Option<TenantCv>, RepositoryError> {
        Ok(self.lock()?.get(tenant_id).cloned())
    }

    fn save(&self, cv: TenantCv) -> Result<(), RepositoryError> {
        self.lock()?.insert(cv.tenant_id().clone(), cv);
        Ok(())
    }

    fn tenants(&self) -> Result<Vec<TenantId>, RepositoryError> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}
