//! WebAssembly module for the KnightCycle rewards engine
//!
//! Provides client-side computation for:
//! - Points previews on the submission form
//! - Premium progress bars
//! - Subscription collection dates

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("knightcycle-wasm loaded"));
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| format!("Invalid date '{}': {}", value, e))
}

fn parse_rates(rates_json: Option<String>) -> Result<RateTable, String> {
    match rates_json {
        Some(json) => serde_json::from_str(&json).map_err(|e| format!("Invalid rates JSON: {}", e)),
        None => Ok(RateTable::standard()),
    }
}

fn breakdown(
    materials_json: &str,
    rates_json: Option<String>,
    is_premium: bool,
) -> Result<shared::PointsBreakdown, String> {
    let materials: Vec<MaterialEntry> = serde_json::from_str(materials_json)
        .map_err(|e| format!("Invalid materials JSON: {}", e))?;
    let rates = parse_rates(rates_json)?;
    Ok(shared::points_breakdown(&materials, &rates, is_premium))
}

fn membership(parcels: u32, verified_weight_kg: f64, is_premium: bool) -> MembershipState {
    MembershipState {
        is_premium,
        verified_weight_kg: Decimal::try_from(verified_weight_kg).unwrap_or(Decimal::ZERO),
        processed_submission_count: parcels,
    }
}

fn shift_recurring(reference: &str, year: i32, month: u32) -> Result<String, String> {
    let reference = parse_date(reference)?;
    let date = shared::recurring_date(reference, year, month).map_err(|e| e.to_string())?;
    Ok(date.format(DATE_FORMAT).to_string())
}

fn next_collection_from(reference: &str, today: NaiveDate) -> Result<String, String> {
    let reference = parse_date(reference)?;
    let date = shared::next_collection_on_or_after(reference, today).map_err(|e| e.to_string())?;
    Ok(date.format(DATE_FORMAT).to_string())
}

fn shift_working_days(start: &str, days: u32) -> Result<String, String> {
    let start = parse_date(start)?;
    let date = shared::add_working_days(start, days).map_err(|e| e.to_string())?;
    Ok(date.format(DATE_FORMAT).to_string())
}

/// Total points for a JSON list of material entries.
///
/// `rates_json` falls back to the standard PLA/PETG table when omitted.
#[wasm_bindgen]
pub fn compute_points(
    materials_json: &str,
    rates_json: Option<String>,
    is_premium: bool,
) -> Result<f64, JsValue> {
    let result = breakdown(materials_json, rates_json, is_premium).map_err(|e| JsValue::from_str(&e))?;
    for kind in &result.skipped_unknown {
        web_sys::console::warn_1(&JsValue::from_str(&format!("No point rate for {}", kind)));
    }
    Ok(result.total as f64)
}

/// Itemised points preview as JSON
#[wasm_bindgen]
pub fn points_breakdown(
    materials_json: &str,
    rates_json: Option<String>,
    is_premium: bool,
) -> Result<String, JsValue> {
    let result = breakdown(materials_json, rates_json, is_premium).map_err(|e| JsValue::from_str(&e))?;
    serde_json::to_string(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Whether the customer qualifies for the premium upgrade under default policy
#[wasm_bindgen]
pub fn is_eligible_for_premium(parcels: u32, verified_weight_kg: f64, is_premium: bool) -> bool {
    shared::is_eligible_for_premium(
        &membership(parcels, verified_weight_kg, is_premium),
        &shared::RewardPolicy::default(),
    )
}

/// Progress toward premium, 0 to 100
#[wasm_bindgen]
pub fn progress_toward_premium(parcels: u32, verified_weight_kg: f64, is_premium: bool) -> f64 {
    shared::progress_toward_premium(
        &membership(parcels, verified_weight_kg, is_premium),
        &shared::RewardPolicy::default(),
    )
}

/// Weight still needed for premium in kg, 0 once a threshold is met
#[wasm_bindgen]
pub fn weight_remaining_for_premium(parcels: u32, verified_weight_kg: f64, is_premium: bool) -> f64 {
    shared::remaining_to_premium(
        &membership(parcels, verified_weight_kg, is_premium),
        &shared::RewardPolicy::default(),
    )
    .weight_remaining_kg
    .to_f64()
    .unwrap_or(0.0)
}

/// Collection date in `year`/`month` following a `YYYY-MM-DD` reference
#[wasm_bindgen]
pub fn recurring_date(reference: &str, year: i32, month: u32) -> Result<String, JsValue> {
    shift_recurring(reference, year, month).map_err(|e| JsValue::from_str(&e))
}

/// `YYYY-MM-DD` date `days` working days after `start`
#[wasm_bindgen]
pub fn add_working_days(start: &str, days: u32) -> Result<String, JsValue> {
    shift_working_days(start, days).map_err(|e| JsValue::from_str(&e))
}

/// Next collection on or after today, in the browser's local date
#[wasm_bindgen]
pub fn next_collection_date(reference: &str) -> Result<String, JsValue> {
    let now = js_sys::Date::new_0();
    let today = NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
    .ok_or_else(|| JsValue::from_str("Browser returned an invalid date"))?;
    next_collection_from(reference, today).map_err(|e| JsValue::from_str(&e))
}

/// Human-readable pattern such as "4th Thursday"
#[wasm_bindgen]
pub fn describe_collection_pattern(reference: &str) -> Result<String, JsValue> {
    let reference = parse_date(reference).map_err(|e| JsValue::from_str(&e))?;
    Ok(shared::RecurrencePattern::from_date(reference).to_string())
}

/// Validate a weight entered on the processing form
#[wasm_bindgen]
pub fn is_valid_weight(weight_kg: &str) -> bool {
    weight_kg
        .parse::<Decimal>()
        .map(|w| validate_weight(w).is_ok())
        .unwrap_or(false)
}
