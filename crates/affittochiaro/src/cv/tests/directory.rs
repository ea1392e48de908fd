use super::common::{date, document, full_cv, rental_entry};
use crate::cv::completeness::ReliabilityTier;
use crate::cv::directory::{build_directory, write_csv, DirectoryQuery, DirectorySort};
use crate::cv::domain::{
    CvPersonalInfo, DocumentStatus, TenantCv, TenantId, TenantPreferences, TenantProfile,
};

fn tenant(id: &str, first_name: &str, city: &str) -> TenantCv {
    let mut cv = TenantCv::new(TenantProfile::empty(TenantId(id.to_string())));
    cv.profile.personal = CvPersonalInfo {
        first_name: Some(first_name.to_string()),
        last_name: Some("Neri".to_string()),
        ..CvPersonalInfo::default()
    };
    cv.preferences = Some(TenantPreferences {
        max_budget: Some(800),
        cities: vec![city.to_string()],
        ..TenantPreferences::default()
    });
    cv
}

fn population() -> Vec<TenantCv> {
    // totals: giulia 100, sara 52, paolo 12
    let mut sara = tenant("tenant-sara", "Sara", "Bologna");
    sara.profile.personal.phone = Some("+39 320 555 0000".to_string());
    sara.profile.personal.date_of_birth = Some(date(1990, 6, 2));
    sara.profile.personal.bio = Some("Dottoranda".to_string());
    sara.profile.personal.avatar_url = Some("https://cdn.example/sara.png".to_string());
    sara.documents = vec![
        document("doc-a", DocumentStatus::Verified),
        document("doc-b", DocumentStatus::Pending),
    ];
    sara.rental_history = vec![rental_entry("rent-a")];

    let paolo = tenant("tenant-paolo", "Paolo", "milano ");

    vec![paolo, full_cv(), sara]
}

#[test]
fn default_query_sorts_by_completeness_descending() {
    let cvs = population();
    let entries = build_directory(&cvs, &DirectoryQuery::default());

    let ids: Vec<&str> = entries.iter().map(|e| e.tenant_id.0.as_str()).collect();
    assert_eq!(ids, vec!["tenant-giulia", "tenant-sara", "tenant-paolo"]);

    assert_eq!(entries[0].total, 100);
    assert_eq!(entries[0].tier, ReliabilityTier::Excellent);
    assert_eq!(entries[0].verified_documents, 2);
    assert_eq!(entries[1].total, 52);
    assert_eq!(entries[1].tier_label, "Sufficiente");
    assert_eq!(entries[1].verified_documents, 1);
    assert_eq!(entries[2].total, 12);
    assert_eq!(entries[2].display_name, "Paolo N.");
}

#[test]
fn city_filter_ignores_case_and_padding() {
    let cvs = population();
    let entries = build_directory(
        &cvs,
        &DirectoryQuery {
            city: Some(" MILANO".to_string()),
            ..DirectoryQuery::default()
        },
    );

    let ids: Vec<&str> = entries.iter().map(|e| e.tenant_id.0.as_str()).collect();
    assert_eq!(ids, vec!["tenant-giulia", "tenant-paolo"]);
    assert_eq!(entries[0].city.as_deref(), Some("Milano"));
}

#[test]
fn tier_and_total_thresholds_are_inclusive() {
    let cvs = population();

    let sufficient_or_better = build_directory(
        &cvs,
        &DirectoryQuery {
            min_tier: Some(ReliabilityTier::Sufficient),
            ..DirectoryQuery::default()
        },
    );
    assert_eq!(sufficient_or_better.len(), 2);

    let at_least_52 = build_directory(
        &cvs,
        &DirectoryQuery {
            min_total: Some(52),
            ..DirectoryQuery::default()
        },
    );
    assert_eq!(at_least_52.len(), 2);

    let at_least_53 = build_directory(
        &cvs,
        &DirectoryQuery {
            min_total: Some(53),
            ..DirectoryQuery::default()
        },
    );
    assert_eq!(at_least_53.len(), 1);
}

#[test]
fn ascending_and_name_sorts_with_limit() {
    let cvs = population();

    let ascending = build_directory(
        &cvs,
        &DirectoryQuery {
            sort: DirectorySort::CompletenessAsc,
            limit: Some(1),
            ..DirectoryQuery::default()
        },
    );
    assert_eq!(ascending.len(), 1);
    assert_eq!(ascending[0].tenant_id.0, "tenant-paolo");

    let by_name = build_directory(
        &cvs,
        &DirectoryQuery {
            sort: DirectorySort::Name,
            ..DirectoryQuery::default()
        },
    );
    let names: Vec<&str> = by_name.iter().map(|e| e.display_name.as_str()).collect();
    assert_eq!(names, vec!["Giulia R.", "Paolo N.", "Sara N."]);
}

#[test]
fn csv_export_writes_header_and_rows() {
    let cvs = population();
    let entries = build_directory(
        &cvs,
        &DirectoryQuery {
            limit: Some(2),
            ..DirectoryQuery::default()
        },
    );

    let mut buffer = Vec::new();
    write_csv(&entries, &mut buffer).expect("csv export");
    let text = String::from_utf8(buffer).expect("utf8");
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(
        lines,
        vec![
            "tenant_id,display_name,city,total,tier,verified_documents",
            "tenant-giulia,Giulia R.,Milano,100,Eccellente,2",
            "tenant-sara,Sara N.,Bologna,52,Sufficiente,1",
        ]
    );
}

#[test]
fn directory_query_parses_from_json() {
    let query: DirectoryQuery = serde_json::from_str(
        r#"{"min_tier":"good","city":"Roma","sort":"completeness_asc","limit":5}"#,
    )
    .expect("query");

    assert_eq!(query.min_tier, Some(ReliabilityTier::Good));
    assert_eq!(query.sort, DirectorySort::CompletenessAsc);
    assert_eq!(query.limit, Some(5));
    assert_eq!(query.min_total, None);
}
