//! Collection scheduling service for business subscriptions

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    add_working_days, month_bounds, recurring_date, Submission, SubmissionStatus, Subscriber,
    SubscriptionPlan,
};
use uuid::Uuid;

use crate::effects::{Effect, Email, EmailKind};
use crate::error::EngineResult;

/// Collection service for recurring subscription pickups
#[derive(Debug, Clone)]
pub struct CollectionService {
    wtn_reminder_lead_days: u32,
}

/// A pay-as-you-go parcel waiting to be collected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaygRequest {
    pub customer_name: String,
    pub submission: Submission,
}

/// A collection on the calendar
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CollectionEvent {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub kind: CollectionKind,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CollectionKind {
    Subscription { plan: SubscriptionPlan },
    PaygRequest { submission_id: Uuid, parcel_reference: String },
}

/// Result of the daily expiry sweep
#[derive(Debug, Clone, Serialize)]
pub struct ExpirySweep {
    pub expired: usize,
    pub effects: Vec<Effect>,
}

impl CollectionService {
    /// Create a new CollectionService instance
    pub fn new(wtn_reminder_lead_days: u32) -> Self {
        Self {
            wtn_reminder_lead_days,
        }
    }

    /// Subscription collections and awaiting PAYG parcels in the given month, by date
    pub fn collections_for_month(
        &self,
        subscribers: &[Subscriber],
        requests: &[PaygRequest],
        year: i32,
        month: u32,
    ) -> EngineResult<Vec<CollectionEvent>> {
        let range = month_bounds(year, month)?;
        let mut events = Vec::new();

        for subscriber in subscribers {
            let subscription = &subscriber.subscription;
            let Some(reference) = subscription.preferred_collection_day else {
                continue;
            };
            if !subscription.is_collecting() {
                continue;
            }

            let date = recurring_date(reference, year, month)?;
            tracing::debug!(
                customer_id = %subscriber.customer_id,
                %reference,
                %date,
                "Resolved subscription collection"
            );
            if range.contains(date) {
                events.push(CollectionEvent {
                    customer_id: subscriber.customer_id,
                    customer_name: subscriber.name.clone(),
                    date,
                    kind: CollectionKind::Subscription {
                        plan: subscription.plan.clone(),
                    },
                });
            }
        }

        for request in requests {
            let submission = &request.submission;
            let date = submission.submitted_at.date_naive();
            if submission.status != SubmissionStatus::Awaiting || !range.contains(date) {
                continue;
            }
            events.push(CollectionEvent {
                customer_id: submission.customer_id,
                customer_name: request.customer_name.clone(),
                date,
                kind: CollectionKind::PaygRequest {
                    submission_id: submission.id,
                    parcel_reference: submission.to_string(),
                },
            });
        }

        events.sort_by_key(|e| e.date);
        Ok(events)
    }

    /// WTN reminders for collections exactly `lead` working days away.
    ///
    /// Customers who have signed, or were already reminded, are skipped.
    pub fn wtn_reminders_due(
        &self,
        subscribers: &[Subscriber],
        today: NaiveDate,
    ) -> EngineResult<Vec<Effect>> {
        let target = add_working_days(today, self.wtn_reminder_lead_days)?;
        let mut effects = Vec::new();

        for subscriber in subscribers {
            let subscription = &subscriber.subscription;
            let Some(reference) = subscription.preferred_collection_day else {
                continue;
            };
            if !subscription.is_collecting() {
                continue;
            }

            let collection = shared::next_collection_on_or_after(reference, today)?;
            if collection != target {
                continue;
            }

            if subscriber.wtn.is_signed() {
                continue;
            }
            if subscriber.wtn.reminder_sent {
                tracing::info!(
                    customer_id = %subscriber.customer_id,
                    "WTN reminder already sent, skipping"
                );
                continue;
            }

            tracing::info!(
                customer_id = %subscriber.customer_id,
                collection_date = %target,
                "Queueing WTN reminder"
            );
            effects.push(Effect::SendEmail(Email {
                to: subscriber.email.clone(),
                customer_name: subscriber.name.clone(),
                kind: EmailKind::WtnReminder {
                    collection_date: target,
                },
            }));
            effects.push(Effect::MarkWtnReminderSent {
                customer_id: subscriber.customer_id,
                collection_date: target,
            });
        }

        Ok(effects)
    }

    /// Customer signs the note for their next collection
    pub fn sign_wtn(
        &self,
        subscriber: &mut Subscriber,
        estimated_weight_kg: Decimal,
        signature: &str,
        signed_at: DateTime<Utc>,
    ) -> EngineResult<Vec<Effect>> {
        subscriber.wtn.sign(estimated_weight_kg, signature, signed_at)?;

        tracing::info!(
            customer_id = %subscriber.customer_id,
            estimated_weight_kg = %estimated_weight_kg,
            "WTN signed by customer"
        );
        Ok(vec![Effect::RecordWtnSignature {
            customer_id: subscriber.customer_id,
            estimated_weight_kg,
            signed_at,
        }])
    }

    /// Admin countersigns and approves a signed note
    pub fn approve_wtn(
        &self,
        subscriber: &mut Subscriber,
        admin_signature: &str,
        approved_at: DateTime<Utc>,
    ) -> EngineResult<Vec<Effect>> {
        subscriber.wtn.approve(admin_signature, approved_at)?;

        tracing::info!(customer_id = %subscriber.customer_id, "WTN approved");
        Ok(vec![Effect::ApproveWtn {
            customer_id: subscriber.customer_id,
            approved_at,
        }])
    }

    /// Reset every expired subscription to PAYG in place
    pub fn expire_subscriptions(&self, subscribers: &mut [Subscriber], today: NaiveDate) -> ExpirySweep {
        let mut effects = Vec::new();

        for subscriber in subscribers.iter_mut() {
            if !subscriber.subscription.is_expired(today) {
                continue;
            }
            let Some(end_date) = subscriber.subscription.end_date else {
                continue;
            };
            subscriber.subscription.expire();

            tracing::info!(
                customer_id = %subscriber.customer_id,
                %end_date,
                "Processed expired subscription, now PAYG"
            );
            effects.push(Effect::SubscriptionExpired {
                customer_id: subscriber.customer_id,
                end_date,
            });
        }

        ExpirySweep {
            expired: effects.len(),
            effects,
        }
    }
}
