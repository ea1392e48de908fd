//! Tenant CV: records, completeness scoring, storage, and the HTTP surface around them.

pub mod completeness;
pub mod directory;
pub mod domain;
pub mod file_store;
pub mod format;
pub mod guard;
mod lenient;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use completeness::{
    calculate_cv_completeness, CvCompleteness, CvSectionId, CvSectionScore, ReliabilityScore,
    ReliabilityTier,
};
pub use directory::{build_directory, write_csv, DirectoryEntry, DirectoryQuery, DirectorySort};
pub use domain::{
    CvEmploymentInfo, CvGuarantor, CvPersonalInfo, CvRentalEntry, DocumentStatus, DocumentType,
    EmploymentType, FileMetadata, GuarantorType, PresentationVideo, PropertyType, RecordId,
    RentalPeriod, TenantCv, TenantDocument, TenantId, TenantPreferences, TenantProfile,
    TenantReference,
};
pub use file_store::JsonFileCvRepository;
pub use guard::{CvGuard, CvGuardPolicy, CvValidationError};
pub use memory::InMemoryCvRepository;
pub use repository::{CvRepository, RepositoryError};
pub use router::cv_router;
pub use service::{
    CvService, CvServiceError, CvView, DocumentReview, DocumentUpload, ProfileUpdate, RecordKind,
};
