//! Business subscription models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::WasteTransferNote;

/// Collection plans offered to business customers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    /// Pay as you go: no recurring collection
    #[default]
    Payg,
    Weekly,
    Monthly,
    /// Negotiated plan with a bespoke label
    Custom(String),
}

impl SubscriptionPlan {
    pub fn is_recurring(&self) -> bool {
        !matches!(self, SubscriptionPlan::Payg)
    }
}

impl std::fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionPlan::Payg => write!(f, "PAYG"),
            SubscriptionPlan::Weekly => write!(f, "Weekly"),
            SubscriptionPlan::Monthly => write!(f, "Monthly Subscription"),
            SubscriptionPlan::Custom(label) => write!(f, "{}", label),
        }
    }
}

/// A business customer's collection subscription
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Subscription {
    pub plan: SubscriptionPlan,
    pub active: bool,
    pub cancelled: bool,
    /// Final collection date once cancelled
    pub end_date: Option<NaiveDate>,
    /// Reference date for the monthly "Nth weekday" collection pattern
    pub preferred_collection_day: Option<NaiveDate>,
    pub setup_complete: bool,
}

impl Subscription {
    pub fn new(plan: SubscriptionPlan, preferred_collection_day: NaiveDate) -> Self {
        Self {
            plan,
            active: true,
            cancelled: false,
            end_date: None,
            preferred_collection_day: Some(preferred_collection_day),
            setup_complete: true,
        }
    }

    /// Subscriptions that should appear on the collection calendar
    pub fn is_collecting(&self) -> bool {
        self.active && !self.cancelled && self.preferred_collection_day.is_some()
    }

    /// Cancel: service continues until the next preferred collection day
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.end_date = self.preferred_collection_day;
        self.active = false;
        self.plan = SubscriptionPlan::Payg;
    }

    /// Whether the customer can still manage their subscription on `today`
    pub fn has_service_access(&self, today: NaiveDate) -> bool {
        if self.active {
            return true;
        }
        match (self.cancelled, self.end_date) {
            (true, Some(end)) => end >= today,
            _ => false,
        }
    }

    /// Cancelled and past the final collection date
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.cancelled && self.end_date.is_some_and(|end| end < today)
    }

    /// Reset an expired subscription to PAYG.
    ///
    /// The preferred collection day is kept for reference; the customer
    /// goes through setup again if they resubscribe.
    pub fn expire(&mut self) {
        self.active = false;
        self.plan = SubscriptionPlan::Payg;
        self.setup_complete = false;
        self.cancelled = false;
        self.end_date = None;
    }

    /// Start a new plan from scratch
    pub fn resubscribe(&mut self, plan: SubscriptionPlan) {
        self.plan = plan;
        self.active = true;
        self.cancelled = false;
        self.end_date = None;
        self.preferred_collection_day = None;
        self.setup_complete = false;
    }
}

/// A subscriber as seen by the scheduling sweeps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    pub customer_id: Uuid,
    pub name: String,
    pub email: String,
    pub subscription: Subscription,
    /// Waste Transfer Note for the upcoming collection
    #[serde(default)]
    pub wtn: WasteTransferNote,
}
