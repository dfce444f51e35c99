//! Customer membership models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SubmissionError;
use crate::types::MembershipTier;

/// Snapshot of a customer's standing in the rewards program
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MembershipState {
    pub is_premium: bool,
    /// Cumulative weight across all processed submissions
    pub verified_weight_kg: Decimal,
    pub processed_submission_count: u32,
}

impl MembershipState {
    pub fn tier(&self) -> MembershipTier {
        if self.is_premium {
            MembershipTier::Premium
        } else {
            MembershipTier::Basic
        }
    }

    /// State after one more processed submission of the given weight.
    ///
    /// Premium status is carried over unchanged.
    pub fn with_processed_submission(&self, weight_kg: Decimal) -> Result<Self, SubmissionError> {
        let verified_weight_kg = self
            .verified_weight_kg
            .checked_add(weight_kg.max(Decimal::ZERO))
            .ok_or(SubmissionError::WeightOverflow)?;

        Ok(Self {
            is_premium: self.is_premium,
            verified_weight_kg,
            processed_submission_count: self.processed_submission_count.saturating_add(1),
        })
    }

    /// Upgrade to premium. There is no way back.
    pub fn upgrade(&mut self) {
        self.is_premium = true;
    }
}

/// A customer's reward account as the host hands it over
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerAccount {
    pub customer_id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub total_points: u64,
    pub membership: MembershipState,
}
