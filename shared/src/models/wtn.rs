//! Waste Transfer Note for a business collection

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::WtnError;

/// Lightest parcel a customer can declare on the note (0.1 kg)
pub const MIN_ESTIMATED_WEIGHT_KG: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Heaviest parcel a customer can declare on the note
pub const MAX_ESTIMATED_WEIGHT_KG: Decimal = Decimal::from_parts(30, 0, 0, false, 0);

/// Where a note is in its pending → signed → approved lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "snake_case")]
pub enum WtnStatus {
    #[default]
    Pending,
    Signed,
    Approved,
}

impl WtnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WtnStatus::Pending => "pending",
            WtnStatus::Signed => "signed",
            WtnStatus::Approved => "approved",
        }
    }
}

impl std::fmt::Display for WtnStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The customer's note for their next collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct WasteTransferNote {
    pub estimated_weight_kg: Option<Decimal>,
    /// Customer signature image, as a data URL
    pub signature: Option<String>,
    pub signed_at: Option<DateTime<Utc>>,
    pub admin_signature: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub reminder_sent: bool,
    pub reminder_sent_at: Option<DateTime<Utc>>,
}

impl WasteTransferNote {
    pub fn status(&self) -> WtnStatus {
        match (self.signed_at, self.approved_at) {
            (Some(_), Some(_)) => WtnStatus::Approved,
            (Some(_), None) => WtnStatus::Signed,
            _ => WtnStatus::Pending,
        }
    }

    pub fn is_signed(&self) -> bool {
        self.signed_at.is_some()
    }

    /// Customer signs with their weight estimate.
    ///
    /// Re-signing is allowed until an admin approves. Any earlier reminder is
    /// cleared so the next collection can be reminded again.
    pub fn sign(
        &mut self,
        estimated_weight_kg: Decimal,
        signature: &str,
        signed_at: DateTime<Utc>,
    ) -> Result<(), WtnError> {
        if self.status() == WtnStatus::Approved {
            return Err(WtnError::AlreadyApproved);
        }
        if !(MIN_ESTIMATED_WEIGHT_KG..=MAX_ESTIMATED_WEIGHT_KG).contains(&estimated_weight_kg) {
            return Err(WtnError::EstimatedWeightOutOfRange(estimated_weight_kg));
        }
        if signature.trim().is_empty() {
            return Err(WtnError::MissingSignature);
        }

        self.estimated_weight_kg = Some(estimated_weight_kg);
        self.signature = Some(signature.to_string());
        self.signed_at = Some(signed_at);
        self.reminder_sent = false;
        self.reminder_sent_at = None;
        Ok(())
    }

    /// Admin countersigns a customer-signed note
    pub fn approve(&mut self, admin_signature: &str, approved_at: DateTime<Utc>) -> Result<(), WtnError> {
        match self.status() {
            WtnStatus::Pending => return Err(WtnError::NotSigned),
            WtnStatus::Approved => return Err(WtnError::AlreadyApproved),
            WtnStatus::Signed => {}
        }
        if admin_signature.trim().is_empty() {
            return Err(WtnError::MissingAdminSignature);
        }

        self.admin_signature = Some(admin_signature.to_string());
        self.approved_at = Some(approved_at);
        Ok(())
    }

    pub fn mark_reminded(&mut self, sent_at: DateTime<Utc>) {
        self.reminder_sent = true;
        self.reminder_sent_at = Some(sent_at);
    }
}
