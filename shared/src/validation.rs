//! Validation utilities for the recycling rewards program

use rust_decimal::Decimal;

use crate::models::PointRate;
use crate::rewards::RewardPolicy;

// ============================================================================
// Recycling Validations
// ============================================================================

/// Largest weight a single material line can record (6 digits, 3 decimals)
pub const MAX_MATERIAL_WEIGHT_KG: Decimal = Decimal::from_parts(999_999, 0, 0, false, 3);

/// Validate a weighed amount entered by staff
pub fn validate_weight(weight_kg: Decimal) -> Result<(), &'static str> {
    if weight_kg < Decimal::ZERO {
        return Err("Weight cannot be negative");
    }
    if weight_kg > MAX_MATERIAL_WEIGHT_KG {
        return Err("Weight exceeds the maximum recordable amount");
    }
    if weight_kg.normalize().scale() > 3 {
        return Err("Weight supports at most 3 decimal places");
    }
    Ok(())
}

/// Validate a per-kg point rate
pub fn validate_point_rate(rate: &PointRate) -> Result<(), &'static str> {
    if rate.basic_rate == 0 {
        return Err("Basic rate must be positive");
    }
    if !rate.is_consistent() {
        return Err("Premium rate cannot be lower than basic rate");
    }
    Ok(())
}

/// Validate premium policy thresholds
pub fn validate_reward_policy(policy: &RewardPolicy) -> Result<(), &'static str> {
    if policy.premium_parcel_threshold == 0 {
        return Err("Premium parcel threshold must be positive");
    }
    if policy.premium_weight_threshold_kg <= Decimal::ZERO {
        return Err("Premium weight threshold must be positive");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate UK postcode shape, e.g. `TS1 1TS` or `SW1A 1AA`
pub fn validate_uk_postcode(postcode: &str) -> Result<(), &'static str> {
    let compact: String = postcode
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();

    if compact.len() < 5 || compact.len() > 7 {
        return Err("Postcode must be 5 to 7 characters");
    }
    if !compact.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Postcode must be alphanumeric");
    }

    // Inward code is always digit + two letters
    let inward: Vec<char> = compact.chars().skip(compact.len() - 3).collect();
    if !(inward[0].is_ascii_digit() && inward[1].is_ascii_alphabetic() && inward[2].is_ascii_alphabetic())
    {
        return Err("Invalid postcode inward code");
    }
    if !compact.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err("Postcode must start with a letter");
    }
    Ok(())
}
