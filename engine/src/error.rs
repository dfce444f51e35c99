//! Error handling for the KnightCycle rewards engine
//!
//! Provides a consistent JSON error envelope for job results

use serde::Serialize;
use shared::{MaterialKind, RewardError, ScheduleError, SubmissionError, WtnError};
use thiserror::Error;

/// Engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("No point rate configured for material {0}")]
    UnknownMaterial(MaterialKind),

    // Business logic errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation { .. } => "VALIDATION_ERROR",
            EngineError::UnknownMaterial(_) => "UNKNOWN_MATERIAL",
            EngineError::InvalidStateTransition(_) => "INVALID_STATE_TRANSITION",
            EngineError::Schedule(_) => "INVALID_ARGUMENT",
            EngineError::Configuration(_) => "CONFIGURATION_ERROR",
            EngineError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let field = match self {
            EngineError::Validation { field, .. } => Some(field.clone()),
            EngineError::UnknownMaterial(_) => Some("material_kind".to_string()),
            _ => None,
        };

        ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
                field,
            },
        }
    }
}

impl From<RewardError> for EngineError {
    fn from(err: RewardError) -> Self {
        match err {
            RewardError::UnknownMaterial(kind) => EngineError::UnknownMaterial(kind),
        }
    }
}

impl From<SubmissionError> for EngineError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::NegativeWeight(_)
            | SubmissionError::InvalidWeight { .. }
            | SubmissionError::WeightOverflow => EngineError::validation("weight_kg", err.to_string()),
            SubmissionError::MaterialNotDeclared(_) => {
                EngineError::validation("material_kind", err.to_string())
            }
            SubmissionError::AlreadyProcessed | SubmissionError::InvalidTransition { .. } => {
                EngineError::InvalidStateTransition(err.to_string())
            }
        }
    }
}

impl From<WtnError> for EngineError {
    fn from(err: WtnError) -> Self {
        match err {
            WtnError::EstimatedWeightOutOfRange(_) => {
                EngineError::validation("estimated_weight_kg", err.to_string())
            }
            WtnError::MissingSignature => EngineError::validation("signature", err.to_string()),
            WtnError::MissingAdminSignature => {
                EngineError::validation("admin_signature", err.to_string())
            }
            WtnError::NotSigned | WtnError::AlreadyApproved => {
                EngineError::InvalidStateTransition(err.to_string())
            }
        }
    }
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::Configuration(err.to_string())
    }
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Result type alias for engine services
pub type EngineResult<T> = Result<T, EngineError>;
