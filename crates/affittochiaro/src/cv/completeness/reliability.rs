use serde::{Deserialize, Serialize};

const EXCELLENT_FROM: u8 = 80;
const GOOD_FROM: u8 = 60;
const SUFFICIENT_FROM: u8 = 40;

/// Qualitative band shown to agencies next to a tenant's completeness total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReliabilityTier {
    NeedsCompletion,
    Sufficient,
    Good,
    Excellent,
}

impl ReliabilityTier {
    pub const fn from_total(total: u8) -> Self {
        if total >= EXCELLENT_FROM {
            ReliabilityTier::Excellent
        } else if total >= GOOD_FROM {
            ReliabilityTier::Good
        } else if total >= SUFFICIENT_FROM {
            ReliabilityTier::Sufficient
        } else {
            ReliabilityTier::NeedsCompletion
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ReliabilityTier::Excellent => "Eccellente",
            ReliabilityTier::Good => "Buono",
            ReliabilityTier::Sufficient => "Sufficiente",
            ReliabilityTier::NeedsCompletion => "Da completare",
        }
    }
}

/// Display-ready reliability badge. Built only from a computed `CvCompleteness`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReliabilityScore {
    pub total: u8,
    pub tier: ReliabilityTier,
    pub label: &'static str,
}

impl ReliabilityScore {
    pub(super) fn from_total(total: u8) -> Self {
        let tier = ReliabilityTier::from_total(total);
        Self {
            total,
            tier,
            label: tier.label(),
        }
    }
}
