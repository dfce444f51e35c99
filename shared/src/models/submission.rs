//! Recycling submission (incoming parcel) models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SubmissionError;
use crate::models::MaterialEntry;
use crate::types::MaterialKind;
use crate::validation::validate_weight;

/// Submission lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Awaiting,
    Received,
    Processed,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Awaiting => "awaiting",
            SubmissionStatus::Received => "received",
            SubmissionStatus::Processed => "processed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "awaiting" => Some(SubmissionStatus::Awaiting),
            "received" => Some(SubmissionStatus::Received),
            "processed" => Some(SubmissionStatus::Processed),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Awaiting => write!(f, "Awaiting Parcel"),
            SubmissionStatus::Received => write!(f, "Received"),
            SubmissionStatus::Processed => write!(f, "Processed"),
        }
    }
}

/// A customer's recycling shipment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status: SubmissionStatus,
    pub materials: Vec<MaterialEntry>,
    /// Set by the host once the award effect has been applied
    #[serde(default)]
    pub points_awarded: bool,
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    /// New submission with one unweighed entry per selected kind
    pub fn new(customer_id: Uuid, selected: impl IntoIterator<Item = MaterialKind>) -> Self {
        let mut submission = Self {
            id: Uuid::new_v4(),
            customer_id,
            status: SubmissionStatus::Awaiting,
            materials: Vec::new(),
            points_awarded: false,
            submitted_at: Utc::now(),
        };
        for kind in selected {
            if !submission.has_material(&kind) {
                submission.materials.push(MaterialEntry::declared(kind));
            }
        }
        submission
    }

    pub fn is_processed(&self) -> bool {
        self.status == SubmissionStatus::Processed
    }

    pub fn has_material(&self, kind: &MaterialKind) -> bool {
        self.materials.iter().any(|m| &m.material_kind == kind)
    }

    /// Bring the entries in line with the customer's selection.
    ///
    /// Newly selected kinds get an unweighed entry, deselected kinds are
    /// dropped, and kinds still selected keep their recorded weight.
    pub fn sync_materials(
        &mut self,
        selected: impl IntoIterator<Item = MaterialKind>,
    ) -> Result<(), SubmissionError> {
        self.ensure_mutable()?;

        let mut wanted: Vec<MaterialKind> = Vec::new();
        for kind in selected {
            if !wanted.contains(&kind) {
                wanted.push(kind);
            }
        }

        self.materials.retain(|m| wanted.contains(&m.material_kind));
        for kind in wanted {
            if !self.has_material(&kind) {
                self.materials.push(MaterialEntry::declared(kind));
            }
        }
        Ok(())
    }

    /// Record the weighed amount for a declared material
    pub fn record_weight(
        &mut self,
        kind: &MaterialKind,
        weight_kg: Decimal,
    ) -> Result<(), SubmissionError> {
        self.ensure_mutable()?;
        if weight_kg < Decimal::ZERO {
            return Err(SubmissionError::NegativeWeight(weight_kg));
        }
        validate_weight(weight_kg).map_err(|reason| SubmissionError::InvalidWeight {
            weight: weight_kg,
            reason,
        })?;

        let entry = self
            .materials
            .iter_mut()
            .find(|m| &m.material_kind == kind)
            .ok_or_else(|| SubmissionError::MaterialNotDeclared(kind.clone()))?;
        entry.weight_kg = Some(weight_kg);
        Ok(())
    }

    /// Move the submission forward. Re-applying the current status is a no-op.
    pub fn advance(&mut self, to: SubmissionStatus) -> Result<(), SubmissionError> {
        if to < self.status {
            return Err(SubmissionError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// Sum of all recorded weights.
    ///
    /// Weights handed over by the host skip `record_weight`, so the sum is
    /// checked rather than trusted.
    pub fn verified_weight_kg(&self) -> Result<Decimal, SubmissionError> {
        self.materials
            .iter()
            .filter_map(|m| m.weight_kg)
            .filter(|w| *w > Decimal::ZERO)
            .try_fold(Decimal::ZERO, |total, w| {
                total.checked_add(w).ok_or(SubmissionError::WeightOverflow)
            })
    }

    /// Kinds declared but not yet weighed
    pub fn unweighed(&self) -> impl Iterator<Item = &MaterialKind> {
        self.materials
            .iter()
            .filter(|m| !m.is_weighed())
            .map(|m| &m.material_kind)
    }

    fn ensure_mutable(&self) -> Result<(), SubmissionError> {
        if self.is_processed() {
            Err(SubmissionError::AlreadyProcessed)
        } else {
            Ok(())
        }
    }
}

impl std::fmt::Display for Submission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let simple = self.id.simple().to_string();
        write!(f, "IP-{}", &simple[..8].to_ascii_uppercase())
    }
}
