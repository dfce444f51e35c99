//! Reward service: turns a processed submission into point and membership effects

use serde::Serialize;
use shared::{
    compute_points_strict, is_eligible_for_premium, points_breakdown, premium_milestone,
    CustomerAccount, MembershipState, PointsBreakdown, RateTable, RewardPolicy, Submission,
    SubmissionStatus,
};

use crate::effects::{Effect, Email, EmailKind};
use crate::error::{EngineError, EngineResult};

/// Reward service for processed recycling submissions
#[derive(Debug, Clone)]
pub struct RewardService {
    policy: RewardPolicy,
    rates: RateTable,
}

/// Result of processing one submission
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingOutcome {
    pub points_awarded: u64,
    pub premium_unlocked: bool,
    /// Membership after this submission is counted
    pub membership: MembershipState,
    /// Point balance once every effect is applied
    pub total_points: u64,
    pub effects: Vec<Effect>,
}

impl ProcessingOutcome {
    fn unchanged(account: &CustomerAccount) -> Self {
        Self {
            points_awarded: 0,
            premium_unlocked: false,
            membership: account.membership.clone(),
            total_points: account.total_points,
            effects: Vec::new(),
        }
    }
}

impl RewardService {
    /// Create a new RewardService instance
    pub fn new(policy: RewardPolicy, rates: RateTable) -> Self {
        Self { policy, rates }
    }

    pub fn policy(&self) -> &RewardPolicy {
        &self.policy
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Itemised points preview for a customer's current tier
    pub fn preview(&self, submission: &Submission, is_premium: bool) -> PointsBreakdown {
        points_breakdown(&submission.materials, &self.rates, is_premium)
    }

    /// Compute the effects of a submission reaching `Processed`.
    ///
    /// Points use the tier the customer held before this submission. The
    /// premium check then runs against membership including it. A parcel
    /// worth no points produces no effects and no premium check.
    pub fn on_submission_processed(
        &self,
        submission: &Submission,
        account: &CustomerAccount,
    ) -> EngineResult<ProcessingOutcome> {
        if submission.status != SubmissionStatus::Processed {
            return Err(EngineError::InvalidStateTransition(format!(
                "submission {} is {}, not processed",
                submission, submission.status
            )));
        }

        if submission.customer_id != account.customer_id {
            return Err(EngineError::validation(
                "customer_id",
                format!("submission {} belongs to another customer", submission),
            ));
        }

        if submission.points_awarded {
            tracing::debug!("Points already awarded for {}, skipping", submission);
            return Ok(ProcessingOutcome::unchanged(account));
        }

        let is_premium = account.membership.is_premium;
        let points = self.calculate_points(submission, is_premium)?;
        let mut membership = account
            .membership
            .with_processed_submission(submission.verified_weight_kg()?)?;

        if points == 0 {
            tracing::info!(
                submission = %submission,
                "Processed parcel earned no points, nothing to award"
            );
            return Ok(ProcessingOutcome {
                membership,
                ..ProcessingOutcome::unchanged(account)
            });
        }

        tracing::info!(
            customer_id = %account.customer_id,
            submission = %submission,
            points,
            tier = %account.membership.tier(),
            "Awarding points for processed parcel"
        );

        let mut total_points = account.total_points.saturating_add(points);
        let mut effects = vec![
            Effect::AwardPoints {
                customer_id: account.customer_id,
                submission_id: submission.id,
                points,
            },
            Effect::MarkPointsAwarded {
                submission_id: submission.id,
            },
            Effect::SendEmail(Email {
                to: account.email.clone(),
                customer_name: account.name.clone(),
                kind: EmailKind::ParcelProcessed {
                    parcel_reference: submission.to_string(),
                    points_awarded: points,
                    membership: account.membership.tier(),
                    total_points,
                },
            }),
        ];

        let premium_unlocked = is_eligible_for_premium(&membership, &self.policy);
        if premium_unlocked {
            let bonus = self.policy.premium_bonus_points;
            total_points = total_points.saturating_add(bonus);
            membership.upgrade();

            tracing::info!(
                customer_id = %account.customer_id,
                parcels = membership.processed_submission_count,
                verified_weight_kg = %membership.verified_weight_kg,
                bonus,
                "Customer upgraded to premium"
            );

            let milestone = premium_milestone(&membership, &self.policy).ok_or_else(|| {
                EngineError::InvalidStateTransition(
                    "premium unlocked without a qualifying milestone".to_string(),
                )
            })?;

            effects.push(Effect::UpgradeToPremium {
                customer_id: account.customer_id,
            });
            effects.push(Effect::AwardBonus {
                customer_id: account.customer_id,
                points: bonus,
            });
            effects.push(Effect::SendEmail(Email {
                to: account.email.clone(),
                customer_name: account.name.clone(),
                kind: EmailKind::PremiumUpgrade {
                    milestone,
                    bonus_points: bonus,
                    parcel_count: membership.processed_submission_count,
                    verified_weight_kg: membership.verified_weight_kg,
                    total_points,
                },
            }));
        } else if !membership.is_premium {
            let shortfall = shared::remaining_to_premium(&membership, &self.policy);
            tracing::debug!(
                customer_id = %account.customer_id,
                parcels_remaining = shortfall.parcels_remaining,
                weight_remaining_kg = %shortfall.weight_remaining_kg,
                "Not yet eligible for premium"
            );
        }

        Ok(ProcessingOutcome {
            points_awarded: points,
            premium_unlocked,
            membership,
            total_points,
            effects,
        })
    }

    /// Points under the configured unknown-material policy
    fn calculate_points(&self, submission: &Submission, is_premium: bool) -> EngineResult<u64> {
        if self.policy.reject_unknown_materials {
            return Ok(compute_points_strict(&submission.materials, &self.rates, is_premium)?);
        }

        let breakdown = points_breakdown(&submission.materials, &self.rates, is_premium);
        for kind in &breakdown.skipped_unknown {
            tracing::warn!(
                submission = %submission,
                material = %kind,
                "No point rate for material, contributing 0 points"
            );
        }
        for kind in &breakdown.unweighed {
            tracing::warn!(
                submission = %submission,
                material = %kind,
                "Processed parcel has an unweighed material"
            );
        }
        Ok(breakdown.total)
    }
}
