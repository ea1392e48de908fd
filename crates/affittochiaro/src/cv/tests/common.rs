use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::cv::domain::{
    CvEmploymentInfo, CvGuarantor, CvPersonalInfo, CvRentalEntry, DocumentStatus, DocumentType,
    EmploymentType, FileMetadata, GuarantorType, PresentationVideo, PropertyType, RecordId,
    RentalPeriod, TenantCv, TenantDocument, TenantId, TenantPreferences, TenantProfile,
    TenantReference,
};
use crate::cv::guard::CvGuardPolicy;
use crate::cv::memory::InMemoryCvRepository;
use crate::cv::repository::{CvRepository, RepositoryError};
use crate::cv::service::{CvService, DocumentUpload};

pub(super) fn tenant_id() -> TenantId {
    TenantId("tenant-giulia".to_string())
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 2, 10, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn full_personal() -> CvPersonalInfo {
    CvPersonalInfo {
        first_name: Some("Giulia".to_string()),
        last_name: Some("Rossi".to_string()),
        phone: Some("+39 347 123 4567".to_string()),
        date_of_birth: Some(date(1994, 3, 18)),
        bio: Some("Architetta, non fumatrice, cerco casa vicino al lavoro.".to_string()),
        avatar_url: Some("https://cdn.affittochiaro.it/avatars/giulia.jpg".to_string()),
    }
}

pub(super) fn full_employment() -> CvEmploymentInfo {
    CvEmploymentInfo {
        occupation: Some("Architetta".to_string()),
        employment_type: Some(EmploymentType::Permanent),
        employer: Some("Studio Lamberti".to_string()),
        sector: Some("Edilizia".to_string()),
        annual_income: Some(34_000),
        income_visible: true,
        employment_start_date: Some(date(2020, 9, 1)),
    }
}

pub(super) fn video() -> PresentationVideo {
    PresentationVideo {
        url: "https://cdn.affittochiaro.it/videos/giulia.mp4".to_string(),
        duration_seconds: Some(58),
        uploaded_at: Some(timestamp()),
    }
}

pub(super) fn empty_profile() -> TenantProfile {
    TenantProfile::empty(tenant_id())
}

pub(super) fn full_profile() -> TenantProfile {
    TenantProfile {
        tenant_id: tenant_id(),
        personal: full_personal(),
        employment: full_employment(),
        presentation_video: Some(video()),
    }
}

pub(super) fn preferences() -> TenantPreferences {
    TenantPreferences {
        min_budget: Some(600),
        max_budget: Some(950),
        cities: vec!["Milano".to_string(), "Monza".to_string()],
        property_types: vec![PropertyType::Apartment, PropertyType::Studio],
        move_in_date: Some(date(2024, 9, 1)),
    }
}

pub(super) fn document(id: &str, status: DocumentStatus) -> TenantDocument {
    TenantDocument {
        id: RecordId(id.to_string()),
        doc_type: DocumentType::IdentityCard,
        name: "Carta d'identità".to_string(),
        file: FileMetadata {
            file_name: format!("{id}.pdf"),
            size_bytes: 240_000,
            mime_type: "application/pdf".to_string(),
        },
        status,
        uploaded_at: timestamp(),
        rejection_reason: None,
    }
}

pub(super) fn reference(id: &str) -> TenantReference {
    TenantReference {
        id: RecordId(id.to_string()),
        landlord_name: "Paolo Bianchi".to_string(),
        property_address: Some("Via Padova 41, Milano".to_string()),
        rating: 5,
        rental_period: Some(RentalPeriod {
            start: date(2019, 10, 1),
            end: date(2023, 9, 30),
        }),
        comment: Some("Sempre puntuale con l'affitto.".to_string()),
        is_verified: true,
    }
}

pub(super) fn rental_entry(id: &str) -> CvRentalEntry {
    CvRentalEntry {
        id: RecordId(id.to_string()),
        address: "Via Padova 41".to_string(),
        city: "Milano".to_string(),
        province: Some("MI".to_string()),
        start_date: date(2019, 10, 1),
        end_date: Some(date(2023, 9, 30)),
        is_current: false,
        monthly_rent: 780,
        has_reference: true,
        reason_for_leaving: Some("Trasferimento".to_string()),
    }
}

pub(super) fn guarantor(id: &str) -> CvGuarantor {
    CvGuarantor {
        id: RecordId(id.to_string()),
        full_name: "Marco Rossi".to_string(),
        guarantor_type: GuarantorType::Family,
        relationship: "Padre".to_string(),
        occupation: Some("Pensionato".to_string()),
        annual_income: Some(28_000),
        phone: None,
        email: Some("marco.rossi@example.it".to_string()),
        is_verified: false,
        document_uploaded: true,
    }
}

pub(super) fn upload(name: &str, file_name: &str) -> DocumentUpload {
    DocumentUpload {
        doc_type: DocumentType::PaySlip,
        name: name.to_string(),
        file_name: file_name.to_string(),
        size_bytes: 180_000,
        mime_type: None,
    }
}

pub(super) fn empty_cv() -> TenantCv {
    TenantCv::new(empty_profile())
}

pub(super) fn full_cv() -> TenantCv {
    TenantCv {
        profile: full_profile(),
        preferences: Some(preferences()),
        documents: vec![
            document("doc-id", DocumentStatus::Verified),
            document("doc-payslip", DocumentStatus::Verified),
        ],
        references: vec![reference("ref-1")],
        rental_history: vec![rental_entry("rent-1")],
        guarantors: vec![guarantor("guar-1")],
    }
}

pub(super) fn build_service() -> (CvService<InMemoryCvRepository>, InMemoryCvRepository) {
    let repository = InMemoryCvRepository::default();
    let service = CvService::new(Arc::new(repository.clone()), CvGuardPolicy::default());
    (service, repository)
}

pub(super) fn service_with(
    cvs: Vec<TenantCv>,
) -> (CvService<InMemoryCvRepository>, InMemoryCvRepository) {
    let repository = InMemoryCvRepository::seeded(cvs);
    let service = CvService::new(Arc::new(repository.clone()), CvGuardPolicy::default());
    (service, repository)
}

pub(super) struct UnavailableRepository;

impl CvRepository for UnavailableRepository {
    fn load(&self, _tenant_id: &TenantId) -> Result<Option<TenantCv>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn save(&self, _cv: TenantCv) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn tenants(&self) -> Result<Vec<TenantId>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
