use chrono::NaiveDate;

use super::domain::{
    CvGuarantor, CvRentalEntry, DocumentStatus, PresentationVideo, TenantDocument, TenantId,
    TenantPreferences, TenantReference,
};
use super::lenient::is_filled;

/// Validation errors raised before a CV change is stored.
#[derive(Debug, thiserror::Error)]
pub enum CvValidationError {
    #[error("{field} must not be blank")]
    BlankField { field: &'static str },
    #[error("tenant id '{0}' may only contain letters, digits, '-' and '_'")]
    InvalidTenantId(String),
    #[error("reference rating must be between 1 and 5 (found {0})")]
    RatingOutOfRange(u8),
    #[error("{context} ends on {end} before it starts on {start}")]
    EndsBeforeStart {
        context: &'static str,
        start: NaiveDate,
        end: NaiveDate,
    },
    #[error("a current tenancy cannot have an end date")]
    CurrentTenancyWithEndDate,
    #[error("minimum budget {min} exceeds maximum budget {max}")]
    InvertedBudget { min: u32, max: u32 },
    #[error("document exceeds the upload limit ({max} bytes, found {found})")]
    DocumentTooLarge { max: u64, found: u64 },
    #[error("document type '{0}' is not accepted (pdf, jpeg or png only)")]
    UnsupportedMimeType(String),
    #[error("rejected documents need a rejection reason")]
    MissingRejectionReason,
}

const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;
const ACCEPTED_MIME_TYPES: &[&str] = &["application/pdf", "image/jpeg", "image/png"];

/// Limits applied to tenant uploads.
#[derive(Debug, Clone)]
pub struct CvGuardPolicy {
    max_document_bytes: u64,
}

impl CvGuardPolicy {
    pub fn new(max_document_bytes: u64) -> Self {
        let sanitized = if max_document_bytes > 0 {
            max_document_bytes
        } else {
            DEFAULT_MAX_DOCUMENT_BYTES
        };

        Self {
            max_document_bytes: sanitized,
        }
    }

    pub fn max_document_bytes(&self) -> u64 {
        self.max_document_bytes
    }
}

impl Default for CvGuardPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DOCUMENT_BYTES)
    }
}

/// Guard checking CV sub-records before the service persists them.
#[derive(Debug, Clone, Default)]
pub struct CvGuard {
    policy: CvGuardPolicy,
}

impl CvGuard {
    pub fn with_policy(policy: CvGuardPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &CvGuardPolicy {
        &self.policy
    }

    /// Tenant ids double as file store record names.
    pub fn check_tenant_id(&self, tenant_id: &TenantId) -> Result<(), CvValidationError> {
        require(&tenant_id.0, "tenant_id")?;
        if tenant_id.is_record_safe() {
            Ok(())
        } else {
            Err(CvValidationError::InvalidTenantId(tenant_id.0.clone()))
        }
    }

    pub fn check_rental_entry(&self, entry: &CvRentalEntry) -> Result<(), CvValidationError> {
        require(&entry.address, "address")?;
        require(&entry.city, "city")?;

        if let Some(end) = entry.end_date {
            if entry.is_current {
                return Err(CvValidationError::CurrentTenancyWithEndDate);
            }
            ordered("rental entry", entry.start_date, end)?;
        }

        Ok(())
    }

    pub fn check_reference(&self, reference: &TenantReference) -> Result<(), CvValidationError> {
        require(&reference.landlord_name, "landlord_name")?;

        if !(1..=5).contains(&reference.rating) {
            return Err(CvValidationError::RatingOutOfRange(reference.rating));
        }

        if let Some(period) = reference.rental_period {
            ordered("reference rental period", period.start, period.end)?;
        }

        Ok(())
    }

    pub fn check_guarantor(&self, guarantor: &CvGuarantor) -> Result<(), CvValidationError> {
        require(&guarantor.full_name, "full_name")?;
        require(&guarantor.relationship, "relationship")
    }

    pub fn check_preferences(
        &self,
        preferences: &TenantPreferences,
    ) -> Result<(), CvValidationError> {
        match (preferences.min_budget, preferences.max_budget) {
            (Some(min), Some(max)) if min > max => {
                Err(CvValidationError::InvertedBudget { min, max })
            }
            _ => Ok(()),
        }
    }

    pub fn check_video(&self, video: &PresentationVideo) -> Result<(), CvValidationError> {
        require(&video.url, "video url")
    }

    pub fn check_document(&self, document: &TenantDocument) -> Result<(), CvValidationError> {
        require(&document.name, "document name")?;
        require(&document.file.file_name, "file_name")?;

        if document.file.size_bytes > self.policy.max_document_bytes {
            return Err(CvValidationError::DocumentTooLarge {
                max: self.policy.max_document_bytes,
                found: document.file.size_bytes,
            });
        }

        let mime = document.file.mime_type.trim().to_ascii_lowercase();
        if !ACCEPTED_MIME_TYPES.contains(&mime.as_str()) {
            return Err(CvValidationError::UnsupportedMimeType(
                document.file.mime_type.clone(),
            ));
        }

        if document.status == DocumentStatus::Rejected
            && !is_filled(document.rejection_reason.as_deref())
        {
            return Err(CvValidationError::MissingRejectionReason);
        }

        Ok(())
    }
}

fn require(value: &str, field: &'static str) -> Result<(), CvValidationError> {
    if is_filled(Some(value)) {
        Ok(())
    } else {
        Err(CvValidationError::BlankField { field })
    }
}

fn ordered(
    context: &'static str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(), CvValidationError> {
    if end < start {
        Err(CvValidationError::EndsBeforeStart {
            context,
            start,
            end,
        })
    } else {
        Ok(())
    }
}
