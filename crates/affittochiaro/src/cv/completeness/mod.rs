//! CV completeness scoring.
//!
//! Each of the seven sections is scored on its own (0–100), weighted by a fixed share, and
//! rounded per section. The total is the sum of the rounded weighted scores, so it always
//! stays within 0–100 and matches the per-section breakdown a tenant sees.

mod reliability;
pub mod scorers;
mod sections;

pub use reliability::{ReliabilityScore, ReliabilityTier};
pub use scorers::{
    SectionAssessment, REQUIRED_DOCUMENTS, REQUIRED_REFERENCES, REQUIRED_RENTAL_ENTRIES,
};
pub use sections::CvSectionId;

use serde::{Deserialize, Serialize};

use super::domain::{
    CvRentalEntry, TenantDocument, TenantPreferences, TenantProfile, TenantReference,
};

/// Score for one section together with the fields still missing from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvSectionScore {
    pub id: CvSectionId,
    pub label: String,
    pub weight: u8,
    pub score: u8,
    pub weighted_score: u8,
    pub missing_fields: Vec<String>,
}

impl CvSectionScore {
    fn from_assessment(id: CvSectionId, assessment: SectionAssessment) -> Self {
        let score = assessment.score.min(100);
        let weight = id.weight();

        Self {
            id,
            label: id.label().to_string(),
            weight,
            score,
            weighted_score: weighted(score, weight),
            missing_fields: assessment.missing_fields,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.score == 100
    }
}

/// Completeness breakdown for a whole CV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvCompleteness {
    pub total: u8,
    pub sections: Vec<CvSectionScore>,
}

impl CvCompleteness {
    pub fn section(&self, id: CvSectionId) -> Option<&CvSectionScore> {
        self.sections.iter().find(|section| section.id == id)
    }

    /// Reliability badge derived from this breakdown's total.
    pub fn reliability(&self) -> ReliabilityScore {
        ReliabilityScore::from_total(self.total)
    }

    pub fn is_complete(&self) -> bool {
        self.total == 100
    }

    /// Sections that still have work left, in display order.
    pub fn incomplete_sections(&self) -> impl Iterator<Item = &CvSectionScore> {
        self.sections.iter().filter(|section| !section.is_complete())
    }
}

/// Score a tenant's CV. Absent records score zero; this never fails.
pub fn calculate_cv_completeness(
    profile: &TenantProfile,
    preferences: Option<&TenantPreferences>,
    documents: &[TenantDocument],
    references: &[TenantReference],
    rental_history: &[CvRentalEntry],
) -> CvCompleteness {
    let sections: Vec<CvSectionScore> = CvSectionId::ALL
        .into_iter()
        .map(|id| {
            let assessment = match id {
                CvSectionId::PersonalInfo => scorers::score_personal_info(&profile.personal),
                CvSectionId::Employment => scorers::score_employment(&profile.employment),
                CvSectionId::Documents => scorers::score_documents(documents),
                CvSectionId::Video => {
                    scorers::score_video(profile.presentation_video.as_ref())
                }
                CvSectionId::RentalHistory => scorers::score_rental_history(rental_history),
                CvSectionId::Preferences => scorers::score_preferences(preferences),
                CvSectionId::References => scorers::score_references(references),
            };
            CvSectionScore::from_assessment(id, assessment)
        })
        .collect();

    let total: u16 = sections
        .iter()
        .map(|section| section.weighted_score as u16)
        .sum();

    CvCompleteness {
        total: total.min(100) as u8,
        sections,
    }
}

/// `round(score * weight / 100)`, halves rounding up.
fn weighted(score: u8, weight: u8) -> u8 {
    ((score as u16 * weight as u16 + 50) / 100) as u8
}
