//! Side effects requested from the host
//!
//! Services never touch storage or mail. They return these values and the
//! host applies them inside its own transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{MembershipTier, PremiumMilestone};
use uuid::Uuid;

/// One action the host must carry out
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    AwardPoints {
        customer_id: Uuid,
        submission_id: Uuid,
        points: u64,
    },
    MarkPointsAwarded {
        submission_id: Uuid,
    },
    UpgradeToPremium {
        customer_id: Uuid,
    },
    AwardBonus {
        customer_id: Uuid,
        points: u64,
    },
    MarkWtnReminderSent {
        customer_id: Uuid,
        collection_date: NaiveDate,
    },
    SubscriptionExpired {
        customer_id: Uuid,
        /// Final collection date of the cancelled plan
        end_date: NaiveDate,
    },
    RecordWtnSignature {
        customer_id: Uuid,
        estimated_weight_kg: Decimal,
        signed_at: DateTime<Utc>,
    },
    ApproveWtn {
        customer_id: Uuid,
        approved_at: DateTime<Utc>,
    },
    SendEmail(Email),
}

/// Outgoing email with everything the template needs
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Email {
    pub to: String,
    pub customer_name: String,
    #[serde(flatten)]
    pub kind: EmailKind,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "template", rename_all = "snake_case")]
pub enum EmailKind {
    ParcelProcessed {
        parcel_reference: String,
        points_awarded: u64,
        membership: MembershipTier,
        total_points: u64,
    },
    PremiumUpgrade {
        milestone: PremiumMilestone,
        bonus_points: u64,
        parcel_count: u32,
        verified_weight_kg: Decimal,
        total_points: u64,
    },
    WtnReminder {
        collection_date: NaiveDate,
    },
}

impl Email {
    pub fn subject(&self) -> String {
        match &self.kind {
            EmailKind::ParcelProcessed {
                parcel_reference,
                points_awarded,
                ..
            } => format!(
                "Parcel {} Processed - {} Points Awarded!",
                parcel_reference, points_awarded
            ),
            EmailKind::PremiumUpgrade { .. } => {
                "Congratulations! You're Now a Premium Member!".to_string()
            }
            EmailKind::WtnReminder { collection_date } => format!(
                "Action required: sign your Waste Transfer Note before {}",
                collection_date.format("%d %b %Y")
            ),
        }
    }
}
