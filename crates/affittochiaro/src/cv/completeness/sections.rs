use serde::{Deserialize, Serialize};

/// The seven fixed CV sections, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CvSectionId {
    PersonalInfo,
    Employment,
    Documents,
    Video,
    RentalHistory,
    Preferences,
    References,
}

impl CvSectionId {
    pub const ALL: [CvSectionId; 7] = [
        CvSectionId::PersonalInfo,
        CvSectionId::Employment,
        CvSectionId::Documents,
        CvSectionId::Video,
        CvSectionId::RentalHistory,
        CvSectionId::Preferences,
        CvSectionId::References,
    ];

    /// Share of the total, in percent. The weights across all sections sum to 100.
    pub const fn weight(self) -> u8 {
        match self {
            CvSectionId::PersonalInfo => 15,
            CvSectionId::Employment => 20,
            CvSectionId::Documents => 20,
            CvSectionId::Video => 15,
            CvSectionId::RentalHistory => 10,
            CvSectionId::Preferences => 10,
            CvSectionId::References => 10,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CvSectionId::PersonalInfo => "Dati personali",
            CvSectionId::Employment => "Situazione lavorativa",
            CvSectionId::Documents => "Documenti",
            CvSectionId::Video => "Video di presentazione",
            CvSectionId::RentalHistory => "Storico affitti",
            CvSectionId::Preferences => "Preferenze di ricerca",
            CvSectionId::References => "Referenze",
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            CvSectionId::PersonalInfo => "personal_info",
            CvSectionId::Employment => "employment",
            CvSectionId::Documents => "documents",
            CvSectionId::Video => "video",
            CvSectionId::RentalHistory => "rental_history",
            CvSectionId::Preferences => "preferences",
            CvSectionId::References => "references",
        }
    }
}
