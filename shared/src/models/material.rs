//! Material and point-rate models

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::MaterialKind;

/// One weighed material inside a recycling submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialEntry {
    pub material_kind: MaterialKind,
    /// None until weighed by staff
    pub weight_kg: Option<Decimal>,
}

impl MaterialEntry {
    /// Entry declared by the customer, not yet weighed
    pub fn declared(material_kind: impl Into<MaterialKind>) -> Self {
        Self {
            material_kind: material_kind.into(),
            weight_kg: None,
        }
    }

    pub fn weighed(material_kind: impl Into<MaterialKind>, weight_kg: Decimal) -> Self {
        Self {
            material_kind: material_kind.into(),
            weight_kg: Some(weight_kg),
        }
    }

    pub fn is_weighed(&self) -> bool {
        self.weight_kg.is_some()
    }
}

/// Points per kg for a material kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PointRate {
    pub basic_rate: u32,
    pub premium_rate: u32,
}

impl PointRate {
    pub fn new(basic_rate: u32, premium_rate: u32) -> Self {
        Self {
            basic_rate,
            premium_rate,
        }
    }

    /// Rate applied for the given membership
    pub fn for_membership(&self, is_premium: bool) -> u32 {
        if is_premium {
            self.premium_rate
        } else {
            self.basic_rate
        }
    }

    /// Premium members are expected never to earn less than basic ones
    pub fn is_consistent(&self) -> bool {
        self.premium_rate >= self.basic_rate
    }
}

/// Rate lookup by material kind
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RateTable {
    rates: BTreeMap<MaterialKind, PointRate>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The seeded catalogue: PLA and PETG at 100 basic / 120 premium
    pub fn standard() -> Self {
        Self::new()
            .with_rate(MaterialKind::pla(), PointRate::new(100, 120))
            .with_rate(MaterialKind::petg(), PointRate::new(100, 120))
    }

    pub fn with_rate(mut self, kind: impl Into<MaterialKind>, rate: PointRate) -> Self {
        self.insert(kind, rate);
        self
    }

    pub fn insert(&mut self, kind: impl Into<MaterialKind>, rate: PointRate) -> Option<PointRate> {
        self.rates.insert(kind.into(), rate)
    }

    pub fn get(&self, kind: &MaterialKind) -> Option<&PointRate> {
        self.rates.get(kind)
    }

    pub fn contains(&self, kind: &MaterialKind) -> bool {
        self.rates.contains_key(kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MaterialKind, &PointRate)> {
        self.rates.iter()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl FromIterator<(MaterialKind, PointRate)> for RateTable {
    fn from_iter<T: IntoIterator<Item = (MaterialKind, PointRate)>>(iter: T) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}
