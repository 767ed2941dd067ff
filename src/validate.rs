//! Input validation.
//!
//! Checks run before any computation and stop at the first problem.
//! Data comes first, strategies second, so a run with both an empty
//! seller list and no strategies reports the data problem.

use crate::error::AnalysisError;
use crate::models::SalesData;
use crate::strategy::{Strategies, StrategyOptions, StrategyRegistry};
use serde_json::Value;

const COLLECTIONS: [&str; 3] = ["sellers", "products", "purchase_records"];

pub const REVENUE_SLOT: &str = "calculateRevenue";
pub const BONUS_SLOT: &str = "calculateBonus";

/// `null`, `false`, `0` and `""` count as "not provided".
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64().map_or(false, |n| n == 0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Number(number) => format!("the number {number}"),
        Value::String(text) => format!("the string \"{text}\""),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
    }
}

/// Shape-check a raw JSON bundle and decode it.
pub fn validate_data(raw: &Value) -> Result<SalesData, AnalysisError> {
    if is_blank(raw) {
        return Err(AnalysisError::InvalidInput("sales data is missing".into()));
    }
    let Some(bundle) = raw.as_object() else {
        return Err(AnalysisError::InvalidInput(format!(
            "sales data must be an object, got {}",
            describe(raw)
        )));
    };
    for name in COLLECTIONS {
        match bundle.get(name) {
            Some(Value::Array(items)) if items.is_empty() => {
                return Err(AnalysisError::InvalidInput(format!("`{name}` is empty")));
            }
            Some(Value::Array(_)) => {}
            Some(other) => {
                return Err(AnalysisError::InvalidInput(format!(
                    "`{name}` must be an array, got {}",
                    describe(other)
                )));
            }
            None => {
                return Err(AnalysisError::InvalidInput(format!("`{name}` is missing")));
            }
        }
    }
    serde_json::from_value(raw.clone())
        .map_err(|err| AnalysisError::InvalidInput(format!("malformed record: {err}")))
}

/// Checks a typed bundle; only emptiness can be wrong here.
pub fn validate_sales_data(data: &SalesData) -> Result<(), AnalysisError> {
    let sizes = [
        data.sellers.len(),
        data.products.len(),
        data.purchase_records.len(),
    ];
    for (name, size) in COLLECTIONS.into_iter().zip(sizes) {
        if size == 0 {
            return Err(AnalysisError::InvalidInput(format!("`{name}` is empty")));
        }
    }
    Ok(())
}

/// Resolve both strategy slots against `registry`.
///
/// Presence of both slots is checked before either is resolved.
pub fn validate_strategies(
    options: &StrategyOptions,
    registry: &StrategyRegistry,
) -> Result<Strategies, AnalysisError> {
    let revenue = present(REVENUE_SLOT, options.calculate_revenue.as_ref())?;
    let bonus = present(BONUS_SLOT, options.calculate_bonus.as_ref())?;

    let calculate_revenue = revenue
        .as_str()
        .and_then(|name| registry.revenue(name))
        .ok_or_else(|| not_callable(REVENUE_SLOT, revenue))?;
    let calculate_bonus = bonus
        .as_str()
        .and_then(|name| registry.bonus(name))
        .ok_or_else(|| not_callable(BONUS_SLOT, bonus))?;

    Ok(Strategies {
        calculate_revenue,
        calculate_bonus,
    })
}

fn present<'a>(slot: &'static str, value: Option<&'a Value>) -> Result<&'a Value, AnalysisError> {
    match value {
        Some(value) if !is_blank(value) => Ok(value),
        _ => Err(AnalysisError::MissingStrategy(slot)),
    }
}

fn not_callable(slot: &'static str, value: &Value) -> AnalysisError {
    AnalysisError::InvalidStrategyType {
        slot,
        found: describe(value),
    }
}
