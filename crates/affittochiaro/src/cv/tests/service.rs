use std::sync::Arc;
use std::thread;

use super::common::{
    build_service, empty_profile, full_cv, full_employment, full_personal, guarantor,
    preferences, reference, rental_entry, service_with, tenant_id, upload, video,
    UnavailableRepository,
};
use crate::cv::completeness::CvSectionId;
use crate::cv::domain::{
    DocumentStatus, RecordId, TenantId, TenantPreferences, TenantProfile,
};
use crate::cv::guard::{CvGuardPolicy, CvValidationError};
use crate::cv::repository::{CvRepository, RepositoryError};
use crate::cv::service::{CvService, CvServiceError, DocumentReview, ProfileUpdate, RecordKind};

#[test]
fn register_creates_an_empty_cv_and_rejects_duplicates() {
    let (service, repository) = build_service();

    let view = service.register(empty_profile()).expect("register");
    assert_eq!(view.completeness.total, 0);
    assert_eq!(view.reliability.label, "Da completare");
    assert_eq!(repository.len(), 1);

    let err = service
        .register(empty_profile())
        .expect_err("duplicate registration");
    assert!(matches!(
        err,
        CvServiceError::Repository(RepositoryError::Conflict)
    ));
}

#[test]
fn register_rejects_blank_tenant_id() {
    let (service, repository) = build_service();
    let err = service
        .register(TenantProfile::empty(TenantId("  ".to_string())))
        .expect_err("blank id");

    assert!(matches!(
        err,
        CvServiceError::Validation(CvValidationError::BlankField { field: "tenant_id" })
    ));
    assert!(repository.is_empty());
}

#[test]
fn register_rejects_tenant_ids_that_cannot_name_a_record() {
    let (service, repository) = build_service();
    let err = service
        .register(TenantProfile::empty(TenantId(
            "mario.rossi@example.it".to_string(),
        )))
        .expect_err("unsafe id");

    assert!(matches!(
        err,
        CvServiceError::Validation(CvValidationError::InvalidTenantId(ref id))
            if id == "mario.rossi@example.it"
    ));
    assert!(repository.is_empty());
}

#[test]
fn concurrent_registrations_create_a_single_cv() {
    let (service, repository) = build_service();

    let outcomes: Vec<bool> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| service.register(empty_profile()).is_ok()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("register thread"))
            .collect()
    });

    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    assert_eq!(repository.len(), 1);
}

#[test]
fn concurrent_mutations_on_one_tenant_keep_every_record() {
    let (service, repository) = build_service();
    let tenant = tenant_id();
    service.register(empty_profile()).expect("register");

    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..25 {
                    let view = service
                        .add_reference(&tenant, reference(""))
                        .expect("add reference");
                    assert!(!view.cv.references.is_empty());
                }
            });
        }
    });

    let stored = repository.load(&tenant).expect("load").expect("cv");
    assert_eq!(stored.references.len(), 200);

    let mut ids: Vec<&str> = stored.references.iter().map(|r| r.id.0.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 200);
}

#[test]
fn every_mutation_returns_recomputed_completeness() {
    let (service, repository) = build_service();
    let tenant = tenant_id();
    service.register(empty_profile()).expect("register");

    let view = service
        .update_profile(
            &tenant,
            ProfileUpdate {
                personal: full_personal(),
                employment: full_employment(),
            },
        )
        .expect("profile");
    assert_eq!(view.completeness.total, 35);

    let view = service.set_video(&tenant, Some(video())).expect("video");
    assert_eq!(view.completeness.total, 50);

    let view = service
        .set_preferences(&tenant, Some(preferences()))
        .expect("preferences");
    assert_eq!(view.completeness.total, 60);
    assert_eq!(view.reliability.label, "Buono");

    let view = service
        .add_document(&tenant, upload("Busta paga marzo", "busta-marzo.pdf"))
        .expect("document");
    assert_eq!(view.completeness.total, 70);

    let view = service
        .add_rental_entry(&tenant, rental_entry(""))
        .expect("rental entry");
    assert_eq!(view.completeness.total, 80);
    assert_eq!(view.reliability.label, "Eccellente");

    let view = service
        .add_reference(&tenant, reference(""))
        .expect("reference");
    assert_eq!(view.completeness.total, 90);

    let stored = repository
        .load(&tenant)
        .expect("load")
        .expect("cv stored");
    assert_eq!(stored, view.cv);
    assert_eq!(stored.completeness(), view.completeness);
}

#[test]
fn update_profile_keeps_the_video() {
    let (service, _repository) = service_with(vec![full_cv()]);
    let view = service
        .update_profile(&tenant_id(), ProfileUpdate::default())
        .expect("profile");

    assert!(view.cv.profile.presentation_video.is_some());
    assert_eq!(
        view.completeness
            .section(CvSectionId::PersonalInfo)
            .expect("personal")
            .score,
        0
    );
    assert_eq!(view.completeness.total, 65);
}

#[test]
fn clearing_preferences_and_video_lowers_the_score() {
    let (service, _repository) = service_with(vec![full_cv()]);
    let tenant = tenant_id();

    let view = service.set_preferences(&tenant, None).expect("clear prefs");
    assert_eq!(view.completeness.total, 90);

    let view = service.set_video(&tenant, None).expect("clear video");
    assert_eq!(view.completeness.total, 75);
    assert!(view.cv.profile.presentation_video.is_none());
}

#[test]
fn inverted_budget_is_rejected_without_saving() {
    let (service, repository) = service_with(vec![full_cv()]);
    let err = service
        .set_preferences(
            &tenant_id(),
            Some(TenantPreferences {
                min_budget: Some(1200),
                max_budget: Some(800),
                ..preferences()
            }),
        )
        .expect_err("inverted budget");

    assert!(matches!(
        err,
        CvServiceError::Validation(CvValidationError::InvertedBudget {
            min: 1200,
            max: 800
        })
    ));
    let stored = repository.load(&tenant_id()).expect("load").expect("cv");
    assert_eq!(stored.preferences, Some(preferences()));
}

#[test]
fn uploads_start_pending_and_guess_the_mime_type() {
    let (service, _repository) = service_with(vec![full_cv()]);
    let view = service
        .add_document(&tenant_id(), upload("Contratto", "contratto.PDF"))
        .expect("upload");

    let document = view.cv.documents.last().expect("new document");
    assert_eq!(document.status, DocumentStatus::Pending);
    assert_eq!(document.file.mime_type, "application/pdf");
    assert!(document.id.0.starts_with("doc-"));
}

#[test]
fn uploads_outside_the_policy_are_rejected() {
    let repository = Arc::new(crate::cv::memory::InMemoryCvRepository::seeded(vec![
        full_cv(),
    ]));
    let service = CvService::new(repository, CvGuardPolicy::new(100_000));

    let err = service
        .add_document(&tenant_id(), upload("Busta paga", "busta.pdf"))
        .expect_err("too large");
    assert!(matches!(
        err,
        CvServiceError::Validation(CvValidationError::DocumentTooLarge {
            max: 100_000,
            found: 180_000
        })
    ));

    let mut archive = upload("Archivio", "documenti.zip");
    archive.size_bytes = 1_000;
    let err = service
        .add_document(&tenant_id(), archive)
        .expect_err("zip rejected");
    assert!(matches!(
        err,
        CvServiceError::Validation(CvValidationError::UnsupportedMimeType(_))
    ));
}

#[test]
fn review_requires_a_reason_for_rejections() {
    let (service, _repository) = service_with(vec![full_cv()]);
    let tenant = tenant_id();
    let id = RecordId("doc-id".to_string());

    let err = service
        .review_document(
            &tenant,
            &id,
            DocumentReview {
                status: DocumentStatus::Rejected,
                rejection_reason: None,
            },
        )
        .expect_err("reason required");
    assert!(matches!(
        err,
        CvServiceError::Validation(CvValidationError::MissingRejectionReason)
    ));

    let view = service
        .review_document(
            &tenant,
            &id,
            DocumentReview {
                status: DocumentStatus::Rejected,
                rejection_reason: Some("Documento scaduto".to_string()),
            },
        )
        .expect("rejected");
    let document = view
        .cv
        .documents
        .iter()
        .find(|document| document.id == id)
        .expect("document kept");
    assert_eq!(document.status, DocumentStatus::Rejected);
    assert_eq!(document.rejection_reason.as_deref(), Some("Documento scaduto"));
    // rejected documents still count towards the section
    assert_eq!(view.completeness.total, 100);

    let view = service
        .review_document(
            &tenant,
            &id,
            DocumentReview {
                status: DocumentStatus::Verified,
                rejection_reason: Some("ignored".to_string()),
            },
        )
        .expect("verified");
    let document = view
        .cv
        .documents
        .iter()
        .find(|document| document.id == id)
        .expect("document kept");
    assert_eq!(document.rejection_reason, None);
}

#[test]
fn removing_records_updates_the_breakdown() {
    let (service, _repository) = service_with(vec![full_cv()]);
    let tenant = tenant_id();

    let view = service
        .remove_document(&tenant, &RecordId("doc-id".to_string()))
        .expect("remove document");
    assert_eq!(view.completeness.total, 90);
    assert_eq!(
        view.completeness
            .section(CvSectionId::Documents)
            .expect("documents")
            .missing_fields,
        vec!["Carica ancora 1 documento"]
    );

    let view = service
        .delete_rental_entry(&tenant, &RecordId("rent-1".to_string()))
        .expect("remove rental");
    assert_eq!(view.completeness.total, 80);

    let view = service
        .delete_reference(&tenant, &RecordId("ref-1".to_string()))
        .expect("remove reference");
    assert_eq!(view.completeness.total, 70);

    let view = service
        .delete_guarantor(&tenant, &RecordId("guar-1".to_string()))
        .expect("remove guarantor");
    assert!(view.cv.guarantors.is_empty());
    assert_eq!(view.completeness.total, 70);
}

#[test]
fn updates_keep_the_record_id_from_the_path() {
    let (service, _repository) = service_with(vec![full_cv()]);
    let tenant = tenant_id();
    let id = RecordId("rent-1".to_string());

    let mut entry = rental_entry("something-else");
    entry.monthly_rent = 820;
    let view = service
        .update_rental_entry(&tenant, &id, entry)
        .expect("update rental");
    assert_eq!(view.cv.rental_history.len(), 1);
    assert_eq!(view.cv.rental_history[0].id, id);
    assert_eq!(view.cv.rental_history[0].monthly_rent, 820);

    let mut updated = guarantor("");
    updated.is_verified = true;
    let view = service
        .update_guarantor(&tenant, &RecordId("guar-1".to_string()), updated)
        .expect("update guarantor");
    assert!(view.cv.guarantors[0].is_verified);

    let mut updated = reference("");
    updated.rating = 4;
    let view = service
        .update_reference(&tenant, &RecordId("ref-1".to_string()), updated)
        .expect("update reference");
    assert_eq!(view.cv.references[0].rating, 4);
}

#[test]
fn missing_tenants_and_records_are_reported() {
    let (service, _repository) = service_with(vec![full_cv()]);

    let err = service
        .view(&TenantId("tenant-unknown".to_string()))
        .expect_err("unknown tenant");
    assert!(matches!(err, CvServiceError::TenantNotFound(_)));

    let err = service
        .delete_reference(&tenant_id(), &RecordId("ref-404".to_string()))
        .expect_err("unknown record");
    assert!(matches!(
        err,
        CvServiceError::RecordNotFound {
            kind: RecordKind::Reference,
            ..
        }
    ));
    assert_eq!(err.to_string(), "reference ref-404 not found");

    let err = service
        .update_guarantor(
            &tenant_id(),
            &RecordId("guar-404".to_string()),
            guarantor(""),
        )
        .expect_err("unknown guarantor");
    assert!(matches!(
        err,
        CvServiceError::RecordNotFound {
            kind: RecordKind::Guarantor,
            ..
        }
    ));
}

#[test]
fn explicit_duplicate_ids_are_rejected() {
    let (service, _repository) = service_with(vec![full_cv()]);
    let err = service
        .add_reference(&tenant_id(), reference("ref-1"))
        .expect_err("duplicate");

    assert!(matches!(
        err,
        CvServiceError::DuplicateRecord {
            kind: RecordKind::Reference,
            ..
        }
    ));
}

#[test]
fn generated_ids_are_unique_per_kind() {
    let (service, _repository) = build_service();
    let tenant = tenant_id();
    service.register(empty_profile()).expect("register");

    service
        .add_guarantor(&tenant, guarantor(""))
        .expect("first guarantor");
    let view = service
        .add_guarantor(&tenant, guarantor(""))
        .expect("second guarantor");

    let ids: Vec<&str> = view.cv.guarantors.iter().map(|g| g.id.0.as_str()).collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
    assert!(ids.iter().all(|id| id.starts_with("guar-")));
}

#[test]
fn record_sequences_belong_to_each_service() {
    let (first, _) = build_service();
    let (second, _) = build_service();
    let tenant = tenant_id();

    for service in [&first, &second] {
        service.register(empty_profile()).expect("register");
        let view = service
            .add_guarantor(&tenant, guarantor(""))
            .expect("guarantor");
        assert_eq!(view.cv.guarantors[0].id, RecordId("guar-000001".to_string()));
    }
}

#[test]
fn invalid_sub_records_never_reach_the_store() {
    let (service, repository) = service_with(vec![full_cv()]);
    let tenant = tenant_id();

    let mut entry = rental_entry("");
    entry.is_current = true;
    assert!(matches!(
        service.add_rental_entry(&tenant, entry),
        Err(CvServiceError::Validation(
            CvValidationError::CurrentTenancyWithEndDate
        ))
    ));

    let mut bad_reference = reference("");
    bad_reference.rating = 0;
    assert!(matches!(
        service.add_reference(&tenant, bad_reference),
        Err(CvServiceError::Validation(
            CvValidationError::RatingOutOfRange(0)
        ))
    ));

    let mut nameless = guarantor("");
    nameless.full_name = " ".to_string();
    assert!(matches!(
        service.add_guarantor(&tenant, nameless),
        Err(CvServiceError::Validation(CvValidationError::BlankField {
            field: "full_name"
        }))
    ));

    let stored = repository.load(&tenant).expect("load").expect("cv");
    assert_eq!(stored, full_cv());
}

#[test]
fn repository_outages_surface_as_repository_errors() {
    let service = CvService::new(Arc::new(UnavailableRepository), CvGuardPolicy::default());

    assert!(matches!(
        service.view(&tenant_id()),
        Err(CvServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
    assert!(matches!(
        service.directory(&Default::default()),
        Err(CvServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
}
