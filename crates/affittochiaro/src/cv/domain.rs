use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::completeness::{calculate_cv_completeness, CvCompleteness};
use super::lenient;

/// Identifier wrapper for a tenant and the CV they own.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TenantId(pub String);

impl TenantId {
    /// Non-empty and made only of ASCII letters, digits, `-` and `_`.
    pub fn is_record_safe(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier for a record nested inside a CV (document, rental entry, guarantor, reference).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Personal details shown at the top of the CV.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvPersonalInfo {
    #[serde(default, deserialize_with = "lenient::optional")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub avatar_url: Option<String>,
}

/// Work situation declared by the tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvEmploymentInfo {
    #[serde(default, deserialize_with = "lenient::optional")]
    pub occupation: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub employment_type: Option<EmploymentType>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub employer: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub sector: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub annual_income: Option<u32>,
    /// Hidden income is kept on file but never shown to agencies.
    #[serde(default, deserialize_with = "lenient::flag")]
    pub income_visible: bool,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub employment_start_date: Option<NaiveDate>,
}

impl CvEmploymentInfo {
    /// Income an agency is allowed to see.
    pub fn visible_income(&self) -> Option<u32> {
        if self.income_visible {
            self.annual_income.filter(|amount| *amount > 0)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    Permanent,
    FixedTerm,
    SelfEmployed,
    Freelance,
    Student,
    Retired,
    Unemployed,
    Other,
}

impl EmploymentType {
    pub const fn label(self) -> &'static str {
        match self {
            EmploymentType::Permanent => "Tempo indeterminato",
            EmploymentType::FixedTerm => "Tempo determinato",
            EmploymentType::SelfEmployed => "Lavoratore autonomo",
            EmploymentType::Freelance => "Libero professionista",
            EmploymentType::Student => "Studente",
            EmploymentType::Retired => "Pensionato",
            EmploymentType::Unemployed => "In cerca di occupazione",
            EmploymentType::Other => "Altro",
        }
    }
}

/// Short self-presentation clip linked from the CV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationVideo {
    pub url: String,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub duration_seconds: Option<u32>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// Personal and employment data for a tenant, replaced as a whole on every edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantProfile {
    pub tenant_id: TenantId,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub personal: CvPersonalInfo,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub employment: CvEmploymentInfo,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub presentation_video: Option<PresentationVideo>,
}

impl TenantProfile {
    pub fn empty(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            personal: CvPersonalInfo::default(),
            employment: CvEmploymentInfo::default(),
            presentation_video: None,
        }
    }

    /// Name shown to agencies: first name plus last initial ("Giulia R.").
    pub fn display_name(&self) -> String {
        let first = self
            .personal
            .first_name
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());
        let initial = self
            .personal
            .last_name
            .as_deref()
            .and_then(|value| value.trim().chars().next());

        match (first, initial) {
            (Some(first), Some(initial)) => format!("{first} {initial}."),
            (Some(first), None) => first.to_string(),
            _ => self.tenant_id.0.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    Studio,
    Room,
    House,
    Loft,
}

impl PropertyType {
    pub const fn label(self) -> &'static str {
        match self {
            PropertyType::Apartment => "Appartamento",
            PropertyType::Studio => "Monolocale",
            PropertyType::Room => "Stanza",
            PropertyType::House => "Casa indipendente",
            PropertyType::Loft => "Loft",
        }
    }
}

/// Search preferences used to match the tenant with listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantPreferences {
    #[serde(default, deserialize_with = "lenient::optional")]
    pub min_budget: Option<u32>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub max_budget: Option<u32>,
    #[serde(default, deserialize_with = "lenient::collection")]
    pub cities: Vec<String>,
    #[serde(default, deserialize_with = "lenient::collection")]
    pub property_types: Vec<PropertyType>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub move_in_date: Option<NaiveDate>,
}

impl TenantPreferences {
    pub fn primary_city(&self) -> Option<&str> {
        self.cities
            .iter()
            .map(|city| city.trim())
            .find(|city| !city.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    IdentityCard,
    Passport,
    PaySlip,
    EmploymentContract,
    TaxReturn,
    BankStatement,
    Other,
}

impl DocumentType {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentType::IdentityCard => "Carta d'identità",
            DocumentType::Passport => "Passaporto",
            DocumentType::PaySlip => "Busta paga",
            DocumentType::EmploymentContract => "Contratto di lavoro",
            DocumentType::TaxReturn => "Dichiarazione dei redditi",
            DocumentType::BankStatement => "Estratto conto",
            DocumentType::Other => "Altro",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Verified,
    Rejected,
}

impl DocumentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentStatus::Pending => "In verifica",
            DocumentStatus::Verified => "Verificato",
            DocumentStatus::Rejected => "Rifiutato",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub file_name: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

/// Uploaded supporting document. Only metadata is tracked here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantDocument {
    #[serde(default)]
    pub id: RecordId,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub name: String,
    pub file: FileMetadata,
    pub status: DocumentStatus,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Landlord reference attached to the CV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantReference {
    #[serde(default)]
    pub id: RecordId,
    pub landlord_name: String,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub property_address: Option<String>,
    pub rating: u8,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub rental_period: Option<RentalPeriod>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_verified: bool,
}

/// Past or current tenancy listed in the rental history section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvRentalEntry {
    #[serde(default)]
    pub id: RecordId,
    pub address: String,
    pub city: String,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub province: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_current: bool,
    pub monthly_rent: u32,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub has_reference: bool,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub reason_for_leaving: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuarantorType {
    Family,
    Individual,
    BankGuarantee,
    InsurancePolicy,
}

impl GuarantorType {
    pub const fn label(self) -> &'static str {
        match self {
            GuarantorType::Family => "Familiare",
            GuarantorType::Individual => "Garante privato",
            GuarantorType::BankGuarantee => "Fideiussione bancaria",
            GuarantorType::InsurancePolicy => "Polizza assicurativa",
        }
    }
}

/// Person or institution vouching for the tenant's payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvGuarantor {
    #[serde(default)]
    pub id: RecordId,
    pub full_name: String,
    #[serde(rename = "type")]
    pub guarantor_type: GuarantorType,
    pub relationship: String,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub occupation: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub annual_income: Option<u32>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_verified: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub document_uploaded: bool,
}

/// Everything loaded for a tenant on a CV page view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantCv {
    pub profile: TenantProfile,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub preferences: Option<TenantPreferences>,
    #[serde(default, deserialize_with = "lenient::collection")]
    pub documents: Vec<TenantDocument>,
    #[serde(default, deserialize_with = "lenient::collection")]
    pub references: Vec<TenantReference>,
    #[serde(default, deserialize_with = "lenient::collection")]
    pub rental_history: Vec<CvRentalEntry>,
    #[serde(default, deserialize_with = "lenient::collection")]
    pub guarantors: Vec<CvGuarantor>,
}

impl TenantCv {
    pub fn new(profile: TenantProfile) -> Self {
        Self {
            profile,
            preferences: None,
            documents: Vec::new(),
            references: Vec::new(),
            rental_history: Vec::new(),
            guarantors: Vec::new(),
        }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.profile.tenant_id
    }

    pub fn completeness(&self) -> CvCompleteness {
        calculate_cv_completeness(
            &self.profile,
            self.preferences.as_ref(),
            &self.documents,
            &self.references,
            &self.rental_history,
        )
    }

    /// Parse an untrusted JSON document. Wrong-shaped optional data is dropped, not rejected.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
