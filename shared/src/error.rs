//! Error types for the pure calculation layer

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::SubmissionStatus;
use crate::types::MaterialKind;

/// Point calculation errors (strict mode only)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RewardError {
    #[error("No point rate configured for material {0}")]
    UnknownMaterial(MaterialKind),
}

/// Recurrence calculation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid month {0}: expected 1-12")]
    InvalidMonth(u32),

    #[error("Year {0} is outside the supported calendar range")]
    InvalidYear(i32),

    #[error("Date overflow when resolving collection after {0}")]
    DateOverflow(NaiveDate),
}

/// Submission lifecycle errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SubmissionError {
    #[error("Submission is already processed and can no longer change")]
    AlreadyProcessed,

    #[error("Cannot move submission from {from} back to {to}")]
    InvalidTransition {
        from: SubmissionStatus,
        to: SubmissionStatus,
    },

    #[error("Material {0} was not declared on this submission")]
    MaterialNotDeclared(MaterialKind),

    #[error("Weight cannot be negative: {0}")]
    NegativeWeight(Decimal),

    #[error("Invalid weight {weight}: {reason}")]
    InvalidWeight { weight: Decimal, reason: &'static str },

    #[error("Total verified weight is too large to record")]
    WeightOverflow,
}

/// Waste Transfer Note signing and approval errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WtnError {
    #[error("Weight must be between 0.1 kg and 30 kg, got {0}")]
    EstimatedWeightOutOfRange(Decimal),

    #[error("Please provide your signature")]
    MissingSignature,

    #[error("An admin countersignature is required for approval")]
    MissingAdminSignature,

    #[error("Waste Transfer Note has not been signed by the customer")]
    NotSigned,

    #[error("Waste Transfer Note is already approved")]
    AlreadyApproved,
}
