//! Run configuration.
//!
//! [`AnalysisConfig`] is a plain serde struct so that embedding
//! applications can keep it next to the rest of their settings and
//! deserialize it from JSON.  Missing fields fall back to the defaults
//! the reference report uses.

use serde::{Deserialize, Serialize};

/// What to do when a purchase record cites an unknown seller or SKU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DanglingPolicy {
    /// Abort the run with
    /// [`AnalysisError::DanglingReference`](crate::error::AnalysisError::DanglingReference).
    #[default]
    Fail,
    /// Skip the offending receipt (unknown seller) or line item (unknown
    /// SKU) and report it in [`Analysis::skipped`](crate::engine::Analysis::skipped).
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Maximum length of each seller's top products list.
    pub top_products_limit: usize,
    /// Decimal places kept for revenue, profit and bonus.
    pub money_decimals: u32,
    pub dangling_policy: DanglingPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_products_limit: 10,
            money_decimals: 2,
            dangling_policy: DanglingPolicy::Fail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AnalysisConfig =
            serde_json::from_value(json!({"dangling_policy": "skip"})).unwrap();
        assert_eq!(config.dangling_policy, DanglingPolicy::Skip);
        assert_eq!(config.top_products_limit, 10);
        assert_eq!(config.money_decimals, 2);
    }
}
