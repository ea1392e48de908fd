use std::cmp::Ordering;
use std::io;

use serde::{Deserialize, Serialize};

use super::completeness::ReliabilityTier;
use super::domain::{DocumentStatus, TenantCv, TenantId};

/// Filters agencies apply when browsing tenant CVs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DirectoryQuery {
    #[serde(default)]
    pub min_total: Option<u8>,
    /// Keep tenants at this tier or above.
    #[serde(default)]
    pub min_tier: Option<ReliabilityTier>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub sort: DirectorySort,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectorySort {
    #[default]
    CompletenessDesc,
    CompletenessAsc,
    Name,
}

/// One row of the agency directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub tenant_id: TenantId,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub total: u8,
    pub tier: ReliabilityTier,
    pub tier_label: &'static str,
    pub verified_documents: usize,
}

impl DirectoryEntry {
    fn from_cv(cv: &TenantCv) -> Self {
        let reliability = cv.completeness().reliability();
        Self {
            tenant_id: cv.tenant_id().clone(),
            display_name: cv.profile.display_name(),
            city: cv
                .preferences
                .as_ref()
                .and_then(|preferences| preferences.primary_city())
                .map(str::to_string),
            total: reliability.total,
            tier: reliability.tier,
            tier_label: reliability.label,
            verified_documents: cv
                .documents
                .iter()
                .filter(|document| document.status == DocumentStatus::Verified)
                .count(),
        }
    }
}

pub fn build_directory<'a>(
    cvs: impl IntoIterator<Item = &'a TenantCv>,
    query: &DirectoryQuery,
) -> Vec<DirectoryEntry> {
    let city = query
        .city
        .as_deref()
        .map(str::trim)
        .filter(|city| !city.is_empty())
        .map(str::to_lowercase);

    let mut entries: Vec<DirectoryEntry> = cvs
        .into_iter()
        .filter(|cv| match &city {
            Some(city) => cv
                .preferences
                .as_ref()
                .map(|preferences| {
                    preferences
                        .cities
                        .iter()
                        .any(|candidate| candidate.trim().to_lowercase() == *city)
                })
                .unwrap_or(false),
            None => true,
        })
        .map(DirectoryEntry::from_cv)
        .filter(|entry| query.min_total.map_or(true, |min| entry.total >= min))
        .filter(|entry| query.min_tier.map_or(true, |tier| entry.tier >= tier))
        .collect();

    entries.sort_by(|left, right| compare(left, right, query.sort));

    if let Some(limit) = query.limit {
        entries.truncate(limit);
    }
    entries
}

fn compare(left: &DirectoryEntry, right: &DirectoryEntry, sort: DirectorySort) -> Ordering {
    let by_name = || {
        left.display_name
            .cmp(&right.display_name)
            .then_with(|| left.tenant_id.cmp(&right.tenant_id))
    };

    match sort {
        DirectorySort::CompletenessDesc => right.total.cmp(&left.total).then_with(by_name),
        DirectorySort::CompletenessAsc => left.total.cmp(&right.total).then_with(by_name),
        DirectorySort::Name => by_name(),
    }
}

/// Export directory rows as CSV with a header line.
pub fn write_csv<W: io::Write>(entries: &[DirectoryEntry], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "tenant_id",
        "display_name",
        "city",
        "total",
        "tier",
        "verified_documents",
    ])?;

    for entry in entries {
        csv_writer.write_record([
            entry.tenant_id.0.as_str(),
            entry.display_name.as_str(),
            entry.city.as_deref().unwrap_or(""),
            entry.total.to_string().as_str(),
            entry.tier_label,
            entry.verified_documents.to_string().as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}
