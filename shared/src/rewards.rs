//! Reward point calculation and premium eligibility
//!
//! Everything here is a pure function over in-memory values. The host reads
//! a snapshot, calls in, and writes the results back.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RewardError;
use crate::models::{MaterialEntry, MembershipState, RateTable};
use crate::types::MaterialKind;

/// Business policy for premium membership
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RewardPolicy {
    pub premium_parcel_threshold: u32,
    pub premium_weight_threshold_kg: Decimal,
    /// Bonus granted once on upgrade
    pub premium_bonus_points: u64,
    /// Fail instead of skipping weighed materials with no rate
    pub reject_unknown_materials: bool,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            premium_parcel_threshold: 10,
            premium_weight_threshold_kg: Decimal::from(25),
            premium_bonus_points: 500,
            reject_unknown_materials: false,
        }
    }
}

/// Points earned by one material entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointsLine {
    pub material_kind: MaterialKind,
    pub weight_kg: Decimal,
    pub rate: u32,
    pub points: u64,
}

/// Itemised result of a point calculation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PointsBreakdown {
    pub lines: Vec<PointsLine>,
    /// Weighed kinds with no configured rate
    pub skipped_unknown: Vec<MaterialKind>,
    /// Declared kinds without a weight yet
    pub unweighed: Vec<MaterialKind>,
    pub total: u64,
}

/// Which premium threshold a customer crossed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PremiumMilestone {
    ParcelCount(u32),
    VerifiedWeight(Decimal),
}

impl std::fmt::Display for PremiumMilestone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PremiumMilestone::ParcelCount(count) => write!(f, "recycling {} parcels", count),
            PremiumMilestone::VerifiedWeight(kg) => {
                write!(f, "recycling {}kg of plastic", kg.round_dp(1))
            }
        }
    }
}

/// Distance left to either premium threshold
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PremiumShortfall {
    pub parcels_remaining: u32,
    pub weight_remaining_kg: Decimal,
}

/// Points for one entry, truncated toward zero.
///
/// `None` when the entry has no weight or no rate.
fn entry_points(entry: &MaterialEntry, rates: &RateTable, is_premium: bool) -> Option<(u32, u64)> {
    let weight = entry.weight_kg?;
    let rate = rates.get(&entry.material_kind)?.for_membership(is_premium);
    let raw = Decimal::from(rate)
        .checked_mul(weight.max(Decimal::ZERO))
        .unwrap_or(Decimal::MAX);
    Some((rate, raw.trunc().to_u64().unwrap_or(u64::MAX)))
}

/// Total points for a submission's materials.
///
/// Unweighed entries and kinds missing from `rates` contribute nothing.
/// Each entry is truncated on its own before summing.
pub fn compute_points(materials: &[MaterialEntry], rates: &RateTable, is_premium: bool) -> u64 {
    materials
        .iter()
        .filter_map(|entry| entry_points(entry, rates, is_premium))
        .fold(0u64, |acc, (_, points)| acc.saturating_add(points))
}

/// Like [`compute_points`], but a weighed entry with no rate is an error
pub fn compute_points_strict(
    materials: &[MaterialEntry],
    rates: &RateTable,
    is_premium: bool,
) -> Result<u64, RewardError> {
    if let Some(unknown) = materials
        .iter()
        .find(|m| m.is_weighed() && !rates.contains(&m.material_kind))
    {
        return Err(RewardError::UnknownMaterial(unknown.material_kind.clone()));
    }
    Ok(compute_points(materials, rates, is_premium))
}

/// Itemised version of [`compute_points`]
pub fn points_breakdown(
    materials: &[MaterialEntry],
    rates: &RateTable,
    is_premium: bool,
) -> PointsBreakdown {
    let mut breakdown = PointsBreakdown::default();

    for entry in materials {
        let Some(weight) = entry.weight_kg else {
            breakdown.unweighed.push(entry.material_kind.clone());
            continue;
        };
        match entry_points(entry, rates, is_premium) {
            Some((rate, points)) => {
                breakdown.total = breakdown.total.saturating_add(points);
                breakdown.lines.push(PointsLine {
                    material_kind: entry.material_kind.clone(),
                    weight_kg: weight,
                    rate,
                    points,
                });
            }
            None => breakdown.skipped_unknown.push(entry.material_kind.clone()),
        }
    }

    breakdown
}

/// Non-premium customer who meets either threshold
pub fn is_eligible_for_premium(state: &MembershipState, policy: &RewardPolicy) -> bool {
    !state.is_premium
        && (state.processed_submission_count >= policy.premium_parcel_threshold
            || state.verified_weight_kg >= policy.premium_weight_threshold_kg)
}

/// Percentage toward whichever threshold is closer, in `[0, 100]`
pub fn progress_toward_premium(state: &MembershipState, policy: &RewardPolicy) -> f64 {
    if state.is_premium {
        return 100.0;
    }

    let one = Decimal::ONE;
    let by_count = ratio(
        Decimal::from(state.processed_submission_count),
        Decimal::from(policy.premium_parcel_threshold),
    );
    let by_weight = ratio(
        state.verified_weight_kg.max(Decimal::ZERO),
        policy.premium_weight_threshold_kg,
    );

    let progress = by_count.min(one).max(by_weight.min(one)) * Decimal::from(100);
    progress.to_f64().unwrap_or(0.0).clamp(0.0, 100.0)
}

/// A zero threshold is already met
fn ratio(value: Decimal, threshold: Decimal) -> Decimal {
    if threshold <= Decimal::ZERO {
        Decimal::ONE
    } else {
        value.checked_div(threshold).unwrap_or(Decimal::ONE)
    }
}

/// How far the customer still is from each threshold
pub fn remaining_to_premium(state: &MembershipState, policy: &RewardPolicy) -> PremiumShortfall {
    if state.is_premium || is_eligible_for_premium(state, policy) {
        return PremiumShortfall {
            parcels_remaining: 0,
            weight_remaining_kg: Decimal::ZERO,
        };
    }

    PremiumShortfall {
        parcels_remaining: policy
            .premium_parcel_threshold
            .saturating_sub(state.processed_submission_count),
        weight_remaining_kg: (policy.premium_weight_threshold_kg - state.verified_weight_kg)
            .max(Decimal::ZERO),
    }
}

/// The threshold that qualifies the customer, parcel count first
pub fn premium_milestone(state: &MembershipState, policy: &RewardPolicy) -> Option<PremiumMilestone> {
    if state.processed_submission_count >= policy.premium_parcel_threshold {
        Some(PremiumMilestone::ParcelCount(state.processed_submission_count))
    } else if state.verified_weight_kg >= policy.premium_weight_threshold_kg {
        Some(PremiumMilestone::VerifiedWeight(state.verified_weight_kg))
    } else {
        None
    }
}
