use affittochiaro::cv::{
    CvEmploymentInfo, CvGuarantor, CvPersonalInfo, CvRentalEntry, CvRepository, DirectorySort,
    DocumentStatus, DocumentType, EmploymentType, FileMetadata, GuarantorType, PresentationVideo,
    PropertyType, RecordId, ReliabilityTier, RentalPeriod, RepositoryError, TenantCv,
    TenantDocument, TenantId, TenantPreferences, TenantProfile, TenantReference,
};
use affittochiaro::error::AppError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_tier(raw: &str) -> Result<ReliabilityTier, String> {
    match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "excellent" | "eccellente" => Ok(ReliabilityTier::Excellent),
        "good" | "buono" => Ok(ReliabilityTier::Good),
        "sufficient" | "sufficiente" => Ok(ReliabilityTier::Sufficient),
        "needs_completion" | "da_completare" => Ok(ReliabilityTier::NeedsCompletion),
        _ => Err(format!(
            "unknown tier '{raw}' (expected excellent, good, sufficient or needs_completion)"
        )),
    }
}

pub(crate) fn parse_sort(raw: &str) -> Result<DirectorySort, String> {
    match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "completeness_desc" | "desc" => Ok(DirectorySort::CompletenessDesc),
        "completeness_asc" | "asc" => Ok(DirectorySort::CompletenessAsc),
        "name" => Ok(DirectorySort::Name),
        _ => Err(format!(
            "unknown sort '{raw}' (expected completeness_desc, completeness_asc or name)"
        )),
    }
}

pub(crate) fn load_cv_file(path: &Path) -> Result<TenantCv, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(TenantCv::from_json_str(&raw)?)
}

/// Store the demo tenants when the repository has no records yet.
pub(crate) fn seed_demo_tenants<R: CvRepository>(
    repository: &R,
) -> Result<usize, RepositoryError> {
    if !repository.tenants()?.is_empty() {
        return Ok(0);
    }

    let tenants = demo_tenants();
    let count = tenants.len();
    for cv in tenants {
        repository.save(cv)?;
    }
    info!(count, "seeded demo tenant cvs");
    Ok(count)
}

fn day(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn uploaded(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

fn demo_document(
    id: &str,
    doc_type: DocumentType,
    file_name: &str,
    status: DocumentStatus,
) -> TenantDocument {
    TenantDocument {
        id: RecordId(id.to_string()),
        doc_type,
        name: doc_type.label().to_string(),
        file: FileMetadata {
            file_name: file_name.to_string(),
            size_bytes: 310_000,
            mime_type: mime_for(file_name),
        },
        status,
        uploaded_at: uploaded(2024, 4, 12),
        rejection_reason: None,
    }
}

fn mime_for(file_name: &str) -> String {
    if file_name.ends_with(".pdf") {
        "application/pdf".to_string()
    } else {
        "image/jpeg".to_string()
    }
}

/// Sample tenants spanning every reliability tier.
pub(crate) fn demo_tenants() -> Vec<TenantCv> {
    vec![giulia(), luca(), sara(), tommaso()]
}

fn giulia() -> TenantCv {
    let mut cv = TenantCv::new(TenantProfile {
        tenant_id: TenantId("tenant-giulia".to_string()),
        personal: CvPersonalInfo {
            first_name: text("Giulia"),
            last_name: text("Rossi"),
            phone: text("+39 347 123 4567"),
            date_of_birth: day(1994, 3, 18),
            bio: text("Architetta, non fumatrice, cerco un bilocale vicino a Porta Romana."),
            avatar_url: text("https://cdn.affittochiaro.it/avatars/giulia.jpg"),
        },
        employment: CvEmploymentInfo {
            occupation: text("Architetta"),
            employment_type: Some(EmploymentType::Permanent),
            employer: text("Studio Lamberti"),
            sector: text("Edilizia"),
            annual_income: Some(34_000),
            income_visible: true,
            employment_start_date: day(2020, 9, 1),
        },
        presentation_video: Some(PresentationVideo {
            url: "https://cdn.affittochiaro.it/videos/giulia.mp4".to_string(),
            duration_seconds: Some(58),
            uploaded_at: Some(uploaded(2024, 4, 10)),
        }),
    });
    cv.preferences = Some(TenantPreferences {
        min_budget: Some(700),
        max_budget: Some(1_000),
        cities: vec!["Milano".to_string()],
        property_types: vec![PropertyType::Apartment],
        move_in_date: day(2024, 9, 1),
    });
    cv.documents = vec![
        demo_document(
            "doc-giulia-ci",
            DocumentType::IdentityCard,
            "ci.pdf",
            DocumentStatus::Verified,
        ),
        demo_document(
            "doc-giulia-bp",
            DocumentType::PaySlip,
            "busta-paga.pdf",
            DocumentStatus::Verified,
        ),
    ];
    cv.rental_history = vec![CvRentalEntry {
        id: RecordId("rent-giulia-1".to_string()),
        address: "Via Padova 41".to_string(),
        city: "Milano".to_string(),
        province: text("MI"),
        start_date: day(2019, 10, 1).unwrap_or_default(),
        end_date: day(2023, 9, 30),
        is_current: false,
        monthly_rent: 780,
        has_reference: true,
        reason_for_leaving: text("Trasferimento"),
    }];
    cv.references = vec![TenantReference {
        id: RecordId("ref-giulia-1".to_string()),
        landlord_name: "Paolo Bianchi".to_string(),
        property_address: text("Via Padova 41, Milano"),
        rating: 5,
        rental_period: match (day(2019, 10, 1), day(2023, 9, 30)) {
            (Some(start), Some(end)) => Some(RentalPeriod { start, end }),
            _ => None,
        },
        comment: text("Sempre puntuale, appartamento restituito in ordine."),
        is_verified: true,
    }];
    cv.guarantors = vec![CvGuarantor {
        id: RecordId("guar-giulia-1".to_string()),
        full_name: "Marco Rossi".to_string(),
        guarantor_type: GuarantorType::Family,
        relationship: "Padre".to_string(),
        occupation: text("Pensionato"),
        annual_income: Some(28_000),
        phone: None,
        email: text("marco.rossi@example.it"),
        is_verified: false,
        document_uploaded: true,
    }];
    cv
}

fn luca() -> TenantCv {
    let mut cv = TenantCv::new(TenantProfile {
        tenant_id: TenantId("tenant-luca".to_string()),
        personal: CvPersonalInfo {
            first_name: text("Luca"),
            last_name: text("Ferrari"),
            phone: text("+39 333 987 6543"),
            date_of_birth: day(1988, 11, 2),
            bio: text("Infermiere turnista, tranquillo, con un gatto."),
            avatar_url: None,
        },
        employment: CvEmploymentInfo {
            occupation: text("Infermiere"),
            employment_type: Some(EmploymentType::FixedTerm),
            employer: text("ASST Santi Paolo e Carlo"),
            sector: text("Sanità"),
            annual_income: Some(27_500),
            income_visible: false,
            employment_start_date: day(2023, 2, 1),
        },
        presentation_video: Some(PresentationVideo {
            url: "https://cdn.affittochiaro.it/videos/luca.mp4".to_string(),
            duration_seconds: Some(45),
            uploaded_at: None,
        }),
    });
    cv.preferences = Some(TenantPreferences {
        min_budget: None,
        max_budget: Some(850),
        cities: vec!["Milano".to_string(), "Sesto San Giovanni".to_string()],
        property_types: vec![PropertyType::Studio, PropertyType::Apartment],
        move_in_date: None,
    });
    cv.documents = vec![demo_document(
        "doc-luca-ci",
        DocumentType::IdentityCard,
        "documento.jpg",
        DocumentStatus::Pending,
    )];
    cv.rental_history = vec![CvRentalEntry {
        id: RecordId("rent-luca-1".to_string()),
        address: "Viale Monza 120".to_string(),
        city: "Milano".to_string(),
        province: text("MI"),
        start_date: day(2021, 3, 1).unwrap_or_default(),
        end_date: None,
        is_current: true,
        monthly_rent: 690,
        has_reference: false,
        reason_for_leaving: None,
    }];
    cv
}

fn sara() -> TenantCv {
    let mut cv = TenantCv::new(TenantProfile {
        tenant_id: TenantId("tenant-sara".to_string()),
        personal: CvPersonalInfo {
            first_name: text("Sara"),
            last_name: text("Colombo"),
            phone: text("+39 320 555 0101"),
            date_of_birth: None,
            bio: None,
            avatar_url: None,
        },
        employment: CvEmploymentInfo {
            occupation: text("Studentessa magistrale"),
            employment_type: Some(EmploymentType::Student),
            ..CvEmploymentInfo::default()
        },
        presentation_video: None,
    });
    cv.preferences = Some(TenantPreferences {
        max_budget: Some(450),
        cities: vec!["Bologna".to_string()],
        property_types: vec![PropertyType::Room],
        ..TenantPreferences::default()
    });
    cv.documents = vec![
        demo_document(
            "doc-sara-ci",
            DocumentType::IdentityCard,
            "ci-sara.pdf",
            DocumentStatus::Verified,
        ),
        demo_document(
            "doc-sara-iscrizione",
            DocumentType::Other,
            "iscrizione.pdf",
            DocumentStatus::Pending,
        ),
    ];
    cv
}

fn tommaso() -> TenantCv {
    TenantCv::new(TenantProfile {
        tenant_id: TenantId("tenant-tommaso".to_string()),
        personal: CvPersonalInfo {
            first_name: text("Tommaso"),
            ..CvPersonalInfo::default()
        },
        employment: CvEmploymentInfo::default(),
        presentation_video: None,
    })
}
