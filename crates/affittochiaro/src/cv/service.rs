use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::completeness::{CvCompleteness, ReliabilityScore};
use super::directory::{build_directory, DirectoryEntry, DirectoryQuery};
use super::domain::{
    CvEmploymentInfo, CvGuarantor, CvPersonalInfo, CvRentalEntry, DocumentStatus, DocumentType,
    FileMetadata, PresentationVideo, RecordId, TenantCv, TenantDocument, TenantId,
    TenantPreferences, TenantProfile, TenantReference,
};
use super::guard::{CvGuard, CvGuardPolicy, CvValidationError};
use super::lenient;
use super::repository::{CvRepository, RepositoryError};

/// A freshly loaded CV with the completeness derived from exactly that record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CvView {
    pub cv: TenantCv,
    pub completeness: CvCompleteness,
    pub reliability: ReliabilityScore,
}

impl CvView {
    fn from_cv(cv: TenantCv) -> Self {
        let completeness = cv.completeness();
        let reliability = completeness.reliability();
        Self {
            cv,
            completeness,
            reliability,
        }
    }
}

/// Replacement for the personal and employment parts of a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub personal: CvPersonalInfo,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub employment: CvEmploymentInfo,
}

/// Metadata sent when a tenant uploads a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpload {
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub name: String,
    pub file_name: String,
    pub size_bytes: u64,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub mime_type: Option<String>,
}

/// Back-office verdict on an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReview {
    pub status: DocumentStatus,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Document,
    RentalEntry,
    Guarantor,
    Reference,
}

impl RecordKind {
    const fn id_prefix(self) -> &'static str {
        match self {
            RecordKind::Document => "doc",
            RecordKind::RentalEntry => "rent",
            RecordKind::Guarantor => "guar",
            RecordKind::Reference => "ref",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecordKind::Document => "document",
            RecordKind::RentalEntry => "rental entry",
            RecordKind::Guarantor => "guarantor",
            RecordKind::Reference => "reference",
        };
        f.write_str(label)
    }
}

/// Error raised by the CV service.
#[derive(Debug, thiserror::Error)]
pub enum CvServiceError {
    #[error(transparent)]
    Validation(#[from] CvValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("no cv found for tenant {0}")]
    TenantNotFound(TenantId),
    #[error("{kind} {id} not found")]
    RecordNotFound { kind: RecordKind, id: RecordId },
    #[error("{kind} {id} already exists")]
    DuplicateRecord { kind: RecordKind, id: RecordId },
}

/// Service owning every CV mutation.
///
/// Each change loads the whole CV, applies the edit, stores the whole record again, and then
/// reloads it so the returned completeness always reflects what was persisted. Writes are
/// serialized so concurrent edits never overwrite each other's record.
pub struct CvService<R> {
    repository: Arc<R>,
    guard: Arc<CvGuard>,
    writes: Mutex<()>,
    record_sequence: AtomicU64,
}

impl<R> CvService<R>
where
    R: CvRepository + 'static,
{
    pub fn new(repository: Arc<R>, policy: CvGuardPolicy) -> Self {
        Self {
            repository,
            guard: Arc::new(CvGuard::with_policy(policy)),
            writes: Mutex::new(()),
            record_sequence: AtomicU64::new(1),
        }
    }

    pub fn guard(&self) -> &CvGuard {
        &self.guard
    }

    pub fn view(&self, tenant_id: &TenantId) -> Result<CvView, CvServiceError> {
        let cv = self
            .repository
            .load(tenant_id)?
            .ok_or_else(|| CvServiceError::TenantNotFound(tenant_id.clone()))?;
        Ok(CvView::from_cv(cv))
    }

    pub fn completeness(&self, tenant_id: &TenantId) -> Result<CvCompleteness, CvServiceError> {
        Ok(self.view(tenant_id)?.completeness)
    }

    /// Create an empty CV for a new tenant.
    pub fn register(&self, profile: TenantProfile) -> Result<CvView, CvServiceError> {
        self.guard.check_tenant_id(&profile.tenant_id)?;
        if let Some(video) = &profile.presentation_video {
            self.guard.check_video(video)?;
        }

        let _writes = self.lock_writes()?;
        if self.repository.load(&profile.tenant_id)?.is_some() {
            return Err(RepositoryError::Conflict.into());
        }

        let tenant_id = profile.tenant_id.clone();
        self.repository.save(TenantCv::new(profile))?;
        let view = self.view(&tenant_id)?;
        info!(tenant = %tenant_id, total = view.completeness.total, "cv registered");
        Ok(view)
    }

    pub fn update_profile(
        &self,
        tenant_id: &TenantId,
        update: ProfileUpdate,
    ) -> Result<CvView, CvServiceError> {
        self.mutate(tenant_id, "update_profile", |cv| {
            cv.profile.personal = update.personal;
            cv.profile.employment = update.employment;
            Ok(())
        })
    }

    pub fn set_preferences(
        &self,
        tenant_id: &TenantId,
        preferences: Option<TenantPreferences>,
    ) -> Result<CvView, CvServiceError> {
        if let Some(preferences) = &preferences {
            self.guard.check_preferences(preferences)?;
        }
        self.mutate(tenant_id, "set_preferences", |cv| {
            cv.preferences = preferences;
            Ok(())
        })
    }

    pub fn set_video(
        &self,
        tenant_id: &TenantId,
        video: Option<PresentationVideo>,
    ) -> Result<CvView, CvServiceError> {
        if let Some(video) = &video {
            self.guard.check_video(video)?;
        }
        self.mutate(tenant_id, "set_video", |cv| {
            cv.profile.presentation_video = video;
            Ok(())
        })
    }

    /// Record an upload. New documents start out pending review.
    pub fn add_document(
        &self,
        tenant_id: &TenantId,
        upload: DocumentUpload,
    ) -> Result<CvView, CvServiceError> {
        let mime_type = upload
            .mime_type
            .filter(|mime| !mime.trim().is_empty())
            .unwrap_or_else(|| {
                mime_guess::from_path(&upload.file_name)
                    .first_raw()
                    .unwrap_or("application/octet-stream")
                    .to_string()
            });

        let document = TenantDocument {
            id: RecordId::default(),
            doc_type: upload.doc_type,
            name: upload.name,
            file: FileMetadata {
                file_name: upload.file_name,
                size_bytes: upload.size_bytes,
                mime_type,
            },
            status: DocumentStatus::Pending,
            uploaded_at: Utc::now(),
            rejection_reason: None,
        };
        self.guard.check_document(&document)?;

        self.mutate(tenant_id, "add_document", |cv| {
            self.insert_record(&mut cv.documents, document, RecordKind::Document)
        })
    }

    pub fn review_document(
        &self,
        tenant_id: &TenantId,
        document_id: &RecordId,
        review: DocumentReview,
    ) -> Result<CvView, CvServiceError> {
        self.mutate(tenant_id, "review_document", |cv| {
            let document = cv
                .documents
                .iter_mut()
                .find(|document| &document.id == document_id)
                .ok_or_else(|| CvServiceError::RecordNotFound {
                    kind: RecordKind::Document,
                    id: document_id.clone(),
                })?;

            let mut reviewed = document.clone();
            reviewed.status = review.status;
            reviewed.rejection_reason = match review.status {
                DocumentStatus::Rejected => review.rejection_reason,
                DocumentStatus::Pending | DocumentStatus::Verified => None,
            };
            self.guard.check_document(&reviewed)?;
            *document = reviewed;
            Ok(())
        })
    }

    pub fn remove_document(
        &self,
        tenant_id: &TenantId,
        document_id: &RecordId,
    ) -> Result<CvView, CvServiceError> {
        self.mutate(tenant_id, "remove_document", |cv| {
            remove_record(&mut cv.documents, document_id, RecordKind::Document)
        })
    }

    pub fn add_rental_entry(
        &self,
        tenant_id: &TenantId,
        entry: CvRentalEntry,
    ) -> Result<CvView, CvServiceError> {
        self.guard.check_rental_entry(&entry)?;
        self.mutate(tenant_id, "add_rental_entry", |cv| {
            self.insert_record(&mut cv.rental_history, entry, RecordKind::RentalEntry)
        })
    }

    pub fn update_rental_entry(
        &self,
        tenant_id: &TenantId,
        entry_id: &RecordId,
        entry: CvRentalEntry,
    ) -> Result<CvView, CvServiceError> {
        self.guard.check_rental_entry(&entry)?;
        self.mutate(tenant_id, "update_rental_entry", |cv| {
            replace_record(
                &mut cv.rental_history,
                entry_id,
                entry,
                RecordKind::RentalEntry,
            )
        })
    }

    pub fn delete_rental_entry(
        &self,
        tenant_id: &TenantId,
        entry_id: &RecordId,
    ) -> Result<CvView, CvServiceError> {
        self.mutate(tenant_id, "delete_rental_entry", |cv| {
            remove_record(&mut cv.rental_history, entry_id, RecordKind::RentalEntry)
        })
    }

    pub fn add_guarantor(
        &self,
        tenant_id: &TenantId,
        guarantor: CvGuarantor,
    ) -> Result<CvView, CvServiceError> {
        self.guard.check_guarantor(&guarantor)?;
        self.mutate(tenant_id, "add_guarantor", |cv| {
            self.insert_record(&mut cv.guarantors, guarantor, RecordKind::Guarantor)
        })
    }

    pub fn update_guarantor(
        &self,
        tenant_id: &TenantId,
        guarantor_id: &RecordId,
        guarantor: CvGuarantor,
    ) -> Result<CvView, CvServiceError> {
        self.guard.check_guarantor(&guarantor)?;
        self.mutate(tenant_id, "update_guarantor", |cv| {
            replace_record(
                &mut cv.guarantors,
                guarantor_id,
                guarantor,
                RecordKind::Guarantor,
            )
        })
    }

    pub fn delete_guarantor(
        &self,
        tenant_id: &TenantId,
        guarantor_id: &RecordId,
    ) -> Result<CvView, CvServiceError> {
        self.mutate(tenant_id, "delete_guarantor", |cv| {
            remove_record(&mut cv.guarantors, guarantor_id, RecordKind::Guarantor)
        })
    }

    pub fn add_reference(
        &self,
        tenant_id: &TenantId,
        reference: TenantReference,
    ) -> Result<CvView, CvServiceError> {
        self.guard.check_reference(&reference)?;
        self.mutate(tenant_id, "add_reference", |cv| {
            self.insert_record(&mut cv.references, reference, RecordKind::Reference)
        })
    }

    pub fn update_reference(
        &self,
        tenant_id: &TenantId,
        reference_id: &RecordId,
        reference: TenantReference,
    ) -> Result<CvView, CvServiceError> {
        self.guard.check_reference(&reference)?;
        self.mutate(tenant_id, "update_reference", |cv| {
            replace_record(
                &mut cv.references,
                reference_id,
                reference,
                RecordKind::Reference,
            )
        })
    }

    pub fn delete_reference(
        &self,
        tenant_id: &TenantId,
        reference_id: &RecordId,
    ) -> Result<CvView, CvServiceError> {
        self.mutate(tenant_id, "delete_reference", |cv| {
            remove_record(&mut cv.references, reference_id, RecordKind::Reference)
        })
    }

    /// Agency-facing listing of every stored CV. Records that cannot be read are skipped.
    pub fn directory(&self, query: &DirectoryQuery) -> Result<Vec<DirectoryEntry>, CvServiceError> {
        let mut cvs = Vec::new();
        for tenant_id in self.repository.tenants()? {
            match self.repository.load(&tenant_id) {
                Ok(Some(cv)) => cvs.push(cv),
                Ok(None) => {}
                Err(err) => warn!(tenant = %tenant_id, error = %err, "skipping unreadable cv"),
            }
        }
        Ok(build_directory(&cvs, query))
    }

    fn mutate<F>(
        &self,
        tenant_id: &TenantId,
        operation: &'static str,
        change: F,
    ) -> Result<CvView, CvServiceError>
    where
        F: FnOnce(&mut TenantCv) -> Result<(), CvServiceError>,
    {
        let _writes = self.lock_writes()?;
        let mut cv = self
            .repository
            .load(tenant_id)?
            .ok_or_else(|| CvServiceError::TenantNotFound(tenant_id.clone()))?;

        change(&mut cv)?;
        self.repository.save(cv)?;

        let view = self.view(tenant_id)?;
        info!(
            tenant = %tenant_id,
            operation,
            total = view.completeness.total,
            tier = view.reliability.label,
            "cv updated"
        );
        Ok(view)
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, RepositoryError> {
        self.writes
            .lock()
            .map_err(|_| RepositoryError::Unavailable("cv write lock poisoned".to_string()))
    }

    fn insert_record<T: CvRecord>(
        &self,
        records: &mut Vec<T>,
        mut record: T,
        kind: RecordKind,
    ) -> Result<(), CvServiceError> {
        if record.record_id().is_blank() {
            record.set_record_id(self.next_record_id(records, kind));
        } else if records
            .iter()
            .any(|existing| existing.record_id() == record.record_id())
        {
            return Err(CvServiceError::DuplicateRecord {
                kind,
                id: record.record_id().clone(),
            });
        }

        debug!(%kind, id = %record.record_id(), "record added");
        records.push(record);
        Ok(())
    }

    fn next_record_id<T: CvRecord>(&self, records: &[T], kind: RecordKind) -> RecordId {
        loop {
            let sequence = self.record_sequence.fetch_add(1, Ordering::Relaxed);
            let candidate = RecordId(format!("{}-{sequence:06}", kind.id_prefix()));
            if !records
                .iter()
                .any(|existing| existing.record_id() == &candidate)
            {
                return candidate;
            }
        }
    }
}

trait CvRecord {
    fn record_id(&self) -> &RecordId;
    fn set_record_id(&mut self, id: RecordId);
}

macro_rules! impl_cv_record {
    ($($record:ty),+ $(,)?) => {
        $(
            impl CvRecord for $record {
                fn record_id(&self) -> &RecordId {
                    &self.id
                }

                fn set_record_id(&mut self, id: RecordId) {
                    self.id = id;
                }
            }
        )+
    };
}

impl_cv_record!(TenantDocument, CvRentalEntry, CvGuarantor, TenantReference);

fn replace_record<T: CvRecord>(
    records: &mut [T],
    id: &RecordId,
    mut record: T,
    kind: RecordKind,
) -> Result<(), CvServiceError> {
    let slot = records
        .iter_mut()
        .find(|existing| existing.record_id() == id)
        .ok_or_else(|| CvServiceError::RecordNotFound {
            kind,
            id: id.clone(),
        })?;

    record.set_record_id(id.clone());
    *slot = record;
    Ok(())
}

fn remove_record<T: CvRecord>(
    records: &mut Vec<T>,
    id: &RecordId,
    kind: RecordKind,
) -> Result<(), CvServiceError> {
    let before = records.len();
    records.retain(|existing| existing.record_id() != id);
    if records.len() == before {
        return Err(CvServiceError::RecordNotFound {
            kind,
            id: id.clone(),
        });
    }
    Ok(())
}
