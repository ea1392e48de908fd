use super::super::domain::{
    CvEmploymentInfo, CvPersonalInfo, CvRentalEntry, PresentationVideo, TenantDocument,
    TenantPreferences, TenantReference,
};
use super::super::lenient::is_filled;

/// Documents needed for a complete documents section.
pub const REQUIRED_DOCUMENTS: usize = 2;
/// Prior tenancies needed for a complete rental history section.
pub const REQUIRED_RENTAL_ENTRIES: usize = 1;
/// References needed for a complete references section.
pub const REQUIRED_REFERENCES: usize = 1;

/// Raw result of scoring one section, before weighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionAssessment {
    pub score: u8,
    pub missing_fields: Vec<String>,
}

pub fn score_personal_info(info: &CvPersonalInfo) -> SectionAssessment {
    checklist(&[
        (is_filled(info.first_name.as_deref()), "Nome"),
        (is_filled(info.last_name.as_deref()), "Cognome"),
        (is_filled(info.phone.as_deref()), "Telefono"),
        (info.date_of_birth.is_some(), "Data di nascita"),
        (is_filled(info.bio.as_deref()), "Biografia"),
        (is_filled(info.avatar_url.as_deref()), "Foto profilo"),
    ])
}

/// Income only counts when the tenant lets agencies see it.
pub fn score_employment(info: &CvEmploymentInfo) -> SectionAssessment {
    checklist(&[
        (is_filled(info.occupation.as_deref()), "Professione"),
        (info.employment_type.is_some(), "Tipo di contratto"),
        (is_filled(info.employer.as_deref()), "Datore di lavoro"),
        (info.visible_income().is_some(), "Reddito annuo visibile"),
    ])
}

/// Any uploaded document counts, whatever its review status.
pub fn score_documents(documents: &[TenantDocument]) -> SectionAssessment {
    threshold(documents.len(), REQUIRED_DOCUMENTS, |remaining| {
        if remaining == 1 {
            "Carica ancora 1 documento".to_string()
        } else {
            format!("Carica ancora {remaining} documenti")
        }
    })
}

pub fn score_video(video: Option<&PresentationVideo>) -> SectionAssessment {
    let present = video.map(|clip| is_filled(Some(clip.url.as_str()))).unwrap_or(false);
    checklist(&[(present, "Video di presentazione")])
}

pub fn score_rental_history(entries: &[CvRentalEntry]) -> SectionAssessment {
    threshold(entries.len(), REQUIRED_RENTAL_ENTRIES, |_| {
        "Almeno un affitto precedente".to_string()
    })
}

pub fn score_preferences(preferences: Option<&TenantPreferences>) -> SectionAssessment {
    let Some(preferences) = preferences else {
        return SectionAssessment {
            score: 0,
            missing_fields: vec!["Preferenze di ricerca".to_string()],
        };
    };

    checklist(&[
        (
            preferences.min_budget.is_some() || preferences.max_budget.is_some(),
            "Budget",
        ),
        (preferences.primary_city().is_some(), "Città di interesse"),
        (
            !preferences.property_types.is_empty(),
            "Tipologia di immobile",
        ),
    ])
}

pub fn score_references(references: &[TenantReference]) -> SectionAssessment {
    threshold(references.len(), REQUIRED_REFERENCES, |_| {
        "Almeno una referenza".to_string()
    })
}

fn checklist(checks: &[(bool, &str)]) -> SectionAssessment {
    let present = checks.iter().filter(|(filled, _)| *filled).count();
    let missing_fields = checks
        .iter()
        .filter(|(filled, _)| !*filled)
        .map(|(_, label)| label.to_string())
        .collect();

    SectionAssessment {
        score: percent_of(present, checks.len()),
        missing_fields,
    }
}

fn threshold(
    count: usize,
    target: usize,
    missing: impl FnOnce(usize) -> String,
) -> SectionAssessment {
    let achieved = count.min(target);
    let missing_fields = if achieved < target {
        vec![missing(target - achieved)]
    } else {
        Vec::new()
    };

    SectionAssessment {
        score: percent_of(achieved, target),
        missing_fields,
    }
}

/// `round(part / whole * 100)` with halves rounding up. An empty checklist is complete.
fn percent_of(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 100;
    }
    let part = part.min(whole);
    ((part * 200 + whole) / (whole * 2)) as u8
}
