//! Revenue and bonus strategies.
//!
//! The engine never hardcodes how a line item turns into revenue or how
//! a rank turns into a bonus.  Both formulas are supplied by the caller
//! through the [`RevenueCalculator`] and [`BonusCalculator`] traits.
//! Any closure with the right signature implements them, so callers
//! rarely need a named type; the reference formulas are provided as
//! [`SimpleRevenue`] and [`BonusByProfit`].
//!
//! Callers that receive their strategy choice as data (for example a
//! JSON settings document) describe it with [`StrategyOptions`] and
//! resolve it against a [`StrategyRegistry`]; see
//! [`validate_strategies`](crate::validate::validate_strategies).

use crate::models::{ItemSale, Product, SellerStat};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Computes the revenue of one line item.
///
/// Implementations must be pure: no lookups of their own and no side
/// effects.
pub trait RevenueCalculator: Send + Sync {
    /// Name under which the strategy shows up in logs.
    fn name(&self) -> &str {
        "custom"
    }
    fn calculate(&self, item: &ItemSale, product: &Product) -> f64;
}

/// Computes a seller's bonus from its 0-based rank `index` among `total`
/// sellers ordered by profit.
pub trait BonusCalculator: Send + Sync {
    fn name(&self) -> &str {
        "custom"
    }
    fn calculate(&self, index: usize, total: usize, seller: &SellerStat) -> f64;
}

impl<F> RevenueCalculator for F
where
    F: Fn(&ItemSale, &Product) -> f64 + Send + Sync,
{
    fn calculate(&self, item: &ItemSale, product: &Product) -> f64 {
        self(item, product)
    }
}

impl<F> BonusCalculator for F
where
    F: Fn(usize, usize, &SellerStat) -> f64 + Send + Sync,
{
    fn calculate(&self, index: usize, total: usize, seller: &SellerStat) -> f64 {
        self(index, total, seller)
    }
}

/// `sale_price * quantity * (1 - discount / 100)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleRevenue;

impl RevenueCalculator for SimpleRevenue {
    fn name(&self) -> &str {
        SimpleRevenue::NAME
    }

    fn calculate(&self, item: &ItemSale, _product: &Product) -> f64 {
        let discount_multiplier = 1.0 - item.discount / 100.0;
        item.sale_price * item.quantity as f64 * discount_multiplier
    }
}

impl SimpleRevenue {
    pub const NAME: &'static str = "simple_revenue";
}

/// Tiered bonus as a share of profit.
///
/// Rank 0 earns `first`, ranks 1 and 2 earn `runner_up`, the last rank
/// earns nothing and everybody else earns `rest`.  The rank-0 rule is
/// checked before the last-place rule, so a seller that is alone in the
/// run still gets `first`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusByProfit {
    pub first: f64,
    pub runner_up: f64,
    pub rest: f64,
}

impl Default for BonusByProfit {
    fn default() -> Self {
        Self {
            first: 0.15,
            runner_up: 0.10,
            rest: 0.05,
        }
    }
}

impl BonusByProfit {
    pub const NAME: &'static str = "bonus_by_profit";
}

impl BonusCalculator for BonusByProfit {
    fn name(&self) -> &str {
        BonusByProfit::NAME
    }

    fn calculate(&self, index: usize, total: usize, seller: &SellerStat) -> f64 {
        let profit = seller.profit;
        match index {
            0 => profit * self.first,
            1 | 2 => profit * self.runner_up,
            i if i + 1 == total => 0.0,
            _ => profit * self.rest,
        }
    }
}

/// The two strategies a run needs, ready to be called.
#[derive(Clone)]
pub struct Strategies {
    pub calculate_revenue: Arc<dyn RevenueCalculator>,
    pub calculate_bonus: Arc<dyn BonusCalculator>,
}

impl Strategies {
    pub fn new(
        calculate_revenue: impl RevenueCalculator + 'static,
        calculate_bonus: impl BonusCalculator + 'static,
    ) -> Self {
        Self {
            calculate_revenue: Arc::new(calculate_revenue),
            calculate_bonus: Arc::new(calculate_bonus),
        }
    }

    /// [`SimpleRevenue`] and [`BonusByProfit`] with default tiers.
    pub fn reference() -> Self {
        Self::new(SimpleRevenue, BonusByProfit::default())
    }
}

impl fmt::Debug for Strategies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategies")
            .field("calculate_revenue", &self.calculate_revenue.name())
            .field("calculate_bonus", &self.calculate_bonus.name())
            .finish()
    }
}

/// Strategy choice as it arrives from outside: each slot holds whatever
/// JSON value the caller put there.  A usable slot holds the name of a
/// strategy known to the [`StrategyRegistry`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyOptions {
    #[serde(rename = "calculateRevenue", default)]
    pub calculate_revenue: Option<Value>,
    #[serde(rename = "calculateBonus", default)]
    pub calculate_bonus: Option<Value>,
}

impl StrategyOptions {
    pub fn named(revenue: &str, bonus: &str) -> Self {
        Self {
            calculate_revenue: Some(Value::String(revenue.to_string())),
            calculate_bonus: Some(Value::String(bonus.to_string())),
        }
    }
}

/// Name-keyed lookup of the strategies a caller may select by name.
pub struct StrategyRegistry {
    revenue: HashMap<String, Arc<dyn RevenueCalculator>>,
    bonus: HashMap<String, Arc<dyn BonusCalculator>>,
}

impl StrategyRegistry {
    /// A registry without any strategy.
    pub fn empty() -> Self {
        Self {
            revenue: HashMap::new(),
            bonus: HashMap::new(),
        }
    }

    pub fn register_revenue(
        &mut self,
        name: impl Into<String>,
        strategy: Arc<dyn RevenueCalculator>,
    ) {
        self.revenue.insert(name.into(), strategy);
    }

    pub fn register_bonus(&mut self, name: impl Into<String>, strategy: Arc<dyn BonusCalculator>) {
        self.bonus.insert(name.into(), strategy);
    }

    pub fn revenue(&self, name: &str) -> Option<Arc<dyn RevenueCalculator>> {
        self.revenue.get(name).cloned()
    }

    pub fn bonus(&self, name: &str) -> Option<Arc<dyn BonusCalculator>> {
        self.bonus.get(name).cloned()
    }
}

impl Default for StrategyRegistry {
    /// Registers the reference strategies under their names.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register_revenue(SimpleRevenue::NAME, Arc::new(SimpleRevenue));
        registry.register_bonus(BonusByProfit::NAME, Arc::new(BonusByProfit::default()));
        registry
    }
}
