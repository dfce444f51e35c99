//! JSON job dispatch for the `kc-engine` binary

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared::{
    is_eligible_for_premium, progress_toward_premium, remaining_to_premium, CustomerAccount,
    MaterialEntry, MembershipState, Submission, Subscriber,
};

use crate::config::Config;
use crate::effects::Effect;
use crate::error::EngineResult;
use crate::services::{CollectionService, PaygRequest, RewardService};

/// A unit of work handed over by the host
#[derive(Debug, Deserialize)]
#[serde(tag = "job", rename_all = "snake_case")]
pub enum Job {
    ProcessSubmission {
        submission: Submission,
        account: CustomerAccount,
    },
    PreviewPoints {
        materials: Vec<MaterialEntry>,
        #[serde(default)]
        is_premium: bool,
    },
    PremiumProgress {
        membership: MembershipState,
    },
    CollectionCalendar {
        year: i32,
        month: u32,
        subscribers: Vec<Subscriber>,
        #[serde(default)]
        requests: Vec<PaygRequest>,
    },
    WtnReminders {
        today: Option<NaiveDate>,
        subscribers: Vec<Subscriber>,
    },
    ExpireSubscriptions {
        today: Option<NaiveDate>,
        subscribers: Vec<Subscriber>,
    },
    SignWtn {
        subscriber: Subscriber,
        estimated_weight_kg: Decimal,
        signature: String,
        signed_at: Option<DateTime<Utc>>,
    },
    ApproveWtn {
        subscriber: Subscriber,
        admin_signature: String,
        approved_at: Option<DateTime<Utc>>,
    },
}

impl Job {
    pub fn name(&self) -> &'static str {
        match self {
            Job::ProcessSubmission { .. } => "process_submission",
            Job::PreviewPoints { .. } => "preview_points",
            Job::PremiumProgress { .. } => "premium_progress",
            Job::CollectionCalendar { .. } => "collection_calendar",
            Job::WtnReminders { .. } => "wtn_reminders",
            Job::ExpireSubscriptions { .. } => "expire_subscriptions",
            Job::SignWtn { .. } => "sign_wtn",
            Job::ApproveWtn { .. } => "approve_wtn",
        }
    }
}

/// Services wired from configuration
pub struct Engine {
    rewards: RewardService,
    collections: CollectionService,
}

impl Engine {
    pub fn new(config: &Config) -> Self {
        Self {
            rewards: RewardService::new(config.policy.clone(), config.rates.clone()),
            collections: CollectionService::new(config.schedule.wtn_reminder_lead_days),
        }
    }

    /// Run one job and return its JSON result
    pub fn run(&self, job: Job) -> EngineResult<Value> {
        tracing::debug!(job = job.name(), "Running job");

        let result = match job {
            Job::ProcessSubmission {
                submission,
                account,
            } => to_value(self.rewards.on_submission_processed(&submission, &account)?)?,
            Job::PreviewPoints {
                materials,
                is_premium,
            } => to_value(shared::points_breakdown(
                &materials,
                self.rewards.rates(),
                is_premium,
            ))?,
            Job::PremiumProgress { membership } => {
                let policy = self.rewards.policy();
                json!({
                    "tier": membership.tier(),
                    "eligible": is_eligible_for_premium(&membership, policy),
                    "progress_percent": progress_toward_premium(&membership, policy),
                    "shortfall": remaining_to_premium(&membership, policy),
                })
            }
            Job::CollectionCalendar {
                year,
                month,
                subscribers,
                requests,
            } => to_value(
                self.collections
                    .collections_for_month(&subscribers, &requests, year, month)?,
            )?,
            Job::WtnReminders { today, subscribers } => {
                let today = today.unwrap_or_else(|| Utc::now().date_naive());
                to_value(self.collections.wtn_reminders_due(&subscribers, today)?)?
            }
            Job::ExpireSubscriptions {
                today,
                mut subscribers,
            } => {
                let today = today.unwrap_or_else(|| Utc::now().date_naive());
                let sweep = self.collections.expire_subscriptions(&mut subscribers, today);
                json!({
                    "expired": sweep.expired,
                    "effects": to_value(sweep.effects)?,
                    "subscribers": to_value(subscribers)?,
                })
            }
            Job::SignWtn {
                mut subscriber,
                estimated_weight_kg,
                signature,
                signed_at,
            } => {
                let signed_at = signed_at.unwrap_or_else(Utc::now);
                let effects = self.collections.sign_wtn(
                    &mut subscriber,
                    estimated_weight_kg,
                    &signature,
                    signed_at,
                )?;
                wtn_result(effects, subscriber)?
            }
            Job::ApproveWtn {
                mut subscriber,
                admin_signature,
                approved_at,
            } => {
                let approved_at = approved_at.unwrap_or_else(Utc::now);
                let effects =
                    self.collections
                        .approve_wtn(&mut subscriber, &admin_signature, approved_at)?;
                wtn_result(effects, subscriber)?
            }
        };

        Ok(result)
    }
}

fn wtn_result(effects: Vec<Effect>, subscriber: Subscriber) -> EngineResult<Value> {
    Ok(json!({
        "wtn_status": subscriber.wtn.status(),
        "effects": to_value(effects)?,
        "subscriber": to_value(subscriber)?,
    }))
}

fn to_value<T: Serialize>(value: T) -> EngineResult<Value> {
    Ok(serde_json::to_value(value)?)
}
