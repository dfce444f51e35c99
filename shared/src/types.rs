//! Common types used across the platform

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Recyclable material category (PLA, PETG, ...)
///
/// The set is open-ended: the host decides which kinds exist by putting
/// them in a [`crate::RateTable`]. Identifiers are stored upper case so
/// `"pla"` and `"PLA"` name the same material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(from = "String", into = "String")]
pub struct MaterialKind(String);

impl MaterialKind {
    pub const PLA: &'static str = "PLA";
    pub const PETG: &'static str = "PETG";

    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_ascii_uppercase())
    }

    pub fn pla() -> Self {
        Self::new(Self::PLA)
    }

    pub fn petg() -> Self {
        Self::new(Self::PETG)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MaterialKind {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for MaterialKind {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<MaterialKind> for String {
    fn from(value: MaterialKind) -> Self {
        value.0
    }
}

impl std::fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Membership tiers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MembershipTier {
    #[default]
    Basic,
    Premium,
}

impl MembershipTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipTier::Basic => "basic",
            MembershipTier::Premium => "premium",
        }
    }
}

impl std::fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MembershipTier::Basic => write!(f, "Basic"),
            MembershipTier::Premium => write!(f, "Premium"),
        }
    }
}

/// Half-open date range `[start, end)`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}
