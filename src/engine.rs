//! Sales analysis engine.
//!
//! The `engine` module turns a validated [`SalesData`] bundle into a
//! ranked list of [`SellerReport`]s.  A run goes through four stages in
//! order and keeps no state between calls:
//!
//! 1. validation (see [`crate::validate`]),
//! 2. [`aggregate`]: fold purchase records into one [`SellerStat`] per seller,
//! 3. [`rank`]: order sellers by profit, assign bonuses, pick top products,
//! 4. [`format_report`]: project into the output shape with rounded money.
//!
//! Revenue and bonus formulas are delegated to the caller-supplied
//! [`Strategies`].

use crate::config::{AnalysisConfig, DanglingPolicy};
use crate::error::{AnalysisError, DanglingReference, ReferenceKind};
use crate::models::{Product, ProductSale, RankedSeller, SalesData, SellerReport, SellerStat};
use crate::rounding::round_money;
use crate::strategy::{
    BonusCalculator, RevenueCalculator, Strategies, StrategyOptions, StrategyRegistry,
};
use crate::validate::{validate_data, validate_sales_data, validate_strategies};
use anyhow::Context;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Result of a configurable run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// One row per input seller, highest profit first.
    pub reports: Vec<SellerReport>,
    /// References dropped under [`DanglingPolicy::Skip`].  Always empty
    /// under [`DanglingPolicy::Fail`].
    pub skipped: Vec<DanglingReference>,
}

/// Accumulators after every purchase record has been folded in.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// In seller input order.
    pub stats: Vec<SellerStat>,
    pub skipped: Vec<DanglingReference>,
}

/// Analyze `data` with the default [`AnalysisConfig`].
pub fn analyze_sales_data(
    data: &SalesData,
    strategies: &Strategies,
) -> Result<Vec<SellerReport>, AnalysisError> {
    run_analysis(data, strategies, &AnalysisConfig::default()).map(|analysis| analysis.reports)
}

/// Validate, aggregate, rank and format.
#[tracing::instrument(
    skip_all,
    fields(
        sellers = data.sellers.len(),
        receipts = data.purchase_records.len(),
        revenue = strategies.calculate_revenue.name(),
        bonus = strategies.calculate_bonus.name(),
    )
)]
pub fn run_analysis(
    data: &SalesData,
    strategies: &Strategies,
    config: &AnalysisConfig,
) -> Result<Analysis, AnalysisError> {
    validate_sales_data(data)?;
    let Aggregation { stats, skipped } =
        aggregate(data, strategies.calculate_revenue.as_ref(), config.dangling_policy)?;
    let ranked = rank(stats, strategies.calculate_bonus.as_ref(), config.top_products_limit);
    let reports = ranked
        .iter()
        .map(|seller| format_report(seller, config.money_decimals))
        .collect();
    Ok(Analysis { reports, skipped })
}

/// Analyze a raw JSON bundle with strategies chosen by name.
pub fn analyze_value(
    raw: &Value,
    options: &StrategyOptions,
    registry: &StrategyRegistry,
    config: &AnalysisConfig,
) -> Result<Analysis, AnalysisError> {
    let data = validate_data(raw)?;
    let strategies = validate_strategies(options, registry)?;
    run_analysis(&data, &strategies, config)
}

/// Analyze JSON text with the default registry and configuration.
///
/// `options` is a JSON object such as
/// `{"calculateRevenue": "simple_revenue", "calculateBonus": "bonus_by_profit"}`.
/// Validation failures are [`AnalysisError`]s and can be recovered with
/// `downcast_ref`.
pub fn analyze_json(data: &str, options: &str) -> anyhow::Result<Vec<SellerReport>> {
    let raw: Value = serde_json::from_str(data).context("failed to parse sales data")?;
    let options: StrategyOptions =
        serde_json::from_str(options).context("failed to parse strategy options")?;
    let analysis = analyze_value(
        &raw,
        &options,
        &StrategyRegistry::default(),
        &AnalysisConfig::default(),
    )?;
    Ok(analysis.reports)
}

/// Fold every purchase record into its seller's accumulator.
///
/// Sellers and products are indexed by identifier first; when an
/// identifier occurs twice the later record owns the index slot.
pub fn aggregate(
    data: &SalesData,
    revenue: &dyn RevenueCalculator,
    policy: DanglingPolicy,
) -> Result<Aggregation, AnalysisError> {
    let mut stats: Vec<SellerStat> = data.sellers.iter().map(SellerStat::new).collect();
    let seller_index: HashMap<&str, usize> = data
        .sellers
        .iter()
        .enumerate()
        .map(|(position, seller)| (seller.id.as_str(), position))
        .collect();
    let product_index: HashMap<&str, &Product> = data
        .products
        .iter()
        .map(|product| (product.sku.as_str(), product))
        .collect();

    let mut skipped = Vec::new();
    for (position, record) in data.purchase_records.iter().enumerate() {
        let Some(&slot) = seller_index.get(record.seller_id.as_str()) else {
            let dangling = DanglingReference {
                kind: ReferenceKind::Seller,
                id: record.seller_id.clone(),
                record: position,
            };
            skip_or_fail(policy, dangling, &mut skipped)?;
            continue;
        };
        let seller = &mut stats[slot];
        seller.sales_count += 1;
        seller.revenue += record.net_amount();

        for item in &record.items {
            let Some(product) = product_index.get(item.sku.as_str()) else {
                let dangling = DanglingReference {
                    kind: ReferenceKind::Product,
                    id: item.sku.clone(),
                    record: position,
                };
                skip_or_fail(policy, dangling, &mut skipped)?;
                continue;
            };
            let cost = product.purchase_price * item.quantity as f64;
            let item_revenue = revenue.calculate(&item.sale(), product);
            seller.profit += item_revenue - cost;
            let sold = seller.products_sold.entry(item.sku.clone()).or_insert(0);
            *sold = sold.saturating_add(item.quantity);
        }
    }

    debug!(
        sellers = stats.len(),
        products = product_index.len(),
        skipped = skipped.len(),
        "aggregated purchase records"
    );
    Ok(Aggregation { stats, skipped })
}

fn skip_or_fail(
    policy: DanglingPolicy,
    dangling: DanglingReference,
    skipped: &mut Vec<DanglingReference>,
) -> Result<(), AnalysisError> {
    match policy {
        DanglingPolicy::Fail => Err(dangling.into()),
        DanglingPolicy::Skip => {
            warn!(
                kind = %dangling.kind,
                id = %dangling.id,
                record = dangling.record,
                "skipping dangling reference"
            );
            skipped.push(dangling);
            Ok(())
        }
    }
}

/// Sort by profit, highest first, and derive bonus and top products.
///
/// The sort is stable: sellers with equal profit keep their input order.
/// A NaN profit ranks below every number.
pub fn rank(
    mut stats: Vec<SellerStat>,
    calculate_bonus: &dyn BonusCalculator,
    top_products_limit: usize,
) -> Vec<RankedSeller> {
    stats.sort_by(|a, b| {
        profit_key(b.profit)
            .partial_cmp(&profit_key(a.profit))
            .unwrap_or(Ordering::Equal)
    });
    let total = stats.len();
    stats
        .into_iter()
        .enumerate()
        .map(|(index, stat)| {
            let bonus = calculate_bonus.calculate(index, total, &stat);
            let top_products = top_products(&stat, top_products_limit);
            RankedSeller {
                stat,
                bonus,
                top_products,
            }
        })
        .collect()
}

fn profit_key(profit: f64) -> f64 {
    if profit.is_nan() {
        f64::NEG_INFINITY
    } else {
        profit
    }
}

/// Up to `limit` SKUs by quantity, highest first.  Equal quantities keep
/// the order in which the SKUs were first sold.
pub fn top_products(stat: &SellerStat, limit: usize) -> Vec<ProductSale> {
    let mut sold: Vec<ProductSale> = stat
        .products_sold
        .iter()
        .map(|(sku, &quantity)| ProductSale {
            sku: sku.clone(),
            quantity,
        })
        .collect();
    sold.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    sold.truncate(limit);
    sold
}

pub fn format_report(seller: &RankedSeller, decimals: u32) -> SellerReport {
    let stat = &seller.stat;
    SellerReport {
        seller_id: stat.id.clone(),
        name: stat.name.clone(),
        revenue: round_money(stat.revenue, decimals),
        profit: round_money(stat.profit, decimals),
        sales_count: stat.sales_count,
        top_products: seller.top_products.clone(),
        bonus: round_money(seller.bonus, decimals),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LineItem, PurchaseRecord, Seller};
    use crate::strategy::{BonusByProfit, SimpleRevenue};

    fn seller(id: &str) -> Seller {
        Seller {
            id: id.into(),
            first_name: "First".into(),
            last_name: id.into(),
            start_date: "2024-01-01".into(),
            position: "Seller".into(),
        }
    }

    fn product(sku: &str, purchase_price: f64) -> Product {
        Product {
            sku: sku.into(),
            purchase_price,
            name: None,
            category: None,
            sale_price: None,
        }
    }

    fn item(sku: &str, quantity: u64, sale_price: f64) -> LineItem {
        LineItem {
            sku: sku.into(),
            quantity,
            sale_price,
            discount: 0.0,
        }
    }

    fn receipt(seller_id: &str, items: Vec<LineItem>) -> PurchaseRecord {
        let total: f64 = items.iter().map(|i| i.sale_price * i.quantity as f64).sum();
        PurchaseRecord {
            receipt_id: None,
            date: None,
            seller_id: seller_id.into(),
            customer_id: None,
            total_amount: total,
            total_discount: 0.0,
            items,
        }
    }

    #[test]
    fn test_aggregate_accumulates_per_seller() {
        let data = SalesData {
            sellers: vec![seller("s1"), seller("s2")],
            products: vec![product("A", 10.0), product("B", 1.0)],
            purchase_records: vec![
                receipt("s1", vec![item("A", 2, 15.0), item("B", 5, 2.0)]),
                receipt("s1", vec![item("A", 1, 15.0)]),
            ],
        };
        let aggregation = aggregate(&data, &SimpleRevenue, DanglingPolicy::Fail).unwrap();
        let s1 = &aggregation.stats[0];
        assert_eq!(s1.sales_count, 2);
        assert_eq!(s1.revenue, 55.0);
        assert_eq!(s1.profit, 20.0);
        assert_eq!(s1.products_sold.get("A"), Some(&3));
        assert_eq!(s1.products_sold.get("B"), Some(&5));
        assert_eq!(aggregation.stats[1].sales_count, 0);
    }

    #[test]
    fn test_receipt_revenue_is_net_of_receipt_discount() {
        let mut record = receipt("s1", vec![item("A", 1, 100.0)]);
        record.total_discount = 30.0;
        let data = SalesData {
            sellers: vec![seller("s1")],
            products: vec![product("A", 50.0)],
            purchase_records: vec![record],
        };
        let aggregation = aggregate(&data, &SimpleRevenue, DanglingPolicy::Fail).unwrap();
        assert_eq!(aggregation.stats[0].revenue, 70.0);
        // Profit comes from the item, not from the receipt total.
        assert_eq!(aggregation.stats[0].profit, 50.0);
    }

    #[test]
    fn test_unknown_seller_fails_the_run() {
        let data = SalesData {
            sellers: vec![seller("s1")],
            products: vec![product("A", 1.0)],
            purchase_records: vec![receipt("s1", vec![]), receipt("X999", vec![])],
        };
        let err = aggregate(&data, &SimpleRevenue, DanglingPolicy::Fail).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::DanglingReference(DanglingReference {
                kind: ReferenceKind::Seller,
                id: "X999".into(),
                record: 1,
            })
        );
    }

    #[test]
    fn test_skip_policy_drops_only_the_dangling_part() {
        let data = SalesData {
            sellers: vec![seller("s1")],
            products: vec![product("A", 1.0)],
            purchase_records: vec![
                receipt("X999", vec![item("A", 1, 2.0)]),
                receipt("s1", vec![item("A", 1, 2.0), item("GHOST", 4, 2.0)]),
            ],
        };
        let aggregation = aggregate(&data, &SimpleRevenue, DanglingPolicy::Skip).unwrap();
        let s1 = &aggregation.stats[0];
        assert_eq!(s1.sales_count, 1);
        assert_eq!(s1.revenue, 10.0);
        assert_eq!(s1.profit, 1.0);
        assert_eq!(s1.items_sold(), 1);
        let ids: Vec<&str> = aggregation.skipped.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["X999", "GHOST"]);
    }

    #[test]
    fn test_quantity_counters_saturate() {
        let data = SalesData {
            sellers: vec![seller("s1")],
            products: vec![product("A", 0.0)],
            purchase_records: vec![
                receipt("s1", vec![item("A", u64::MAX, 0.0)]),
                receipt("s1", vec![item("A", 5, 0.0), item("A", 1, 0.0)]),
            ],
        };
        let aggregation = aggregate(&data, &SimpleRevenue, DanglingPolicy::Fail).unwrap();
        let s1 = &aggregation.stats[0];
        assert_eq!(s1.products_sold.get("A"), Some(&u64::MAX));
        assert_eq!(s1.items_sold(), u64::MAX);
    }

    #[test]
    fn test_rank_is_stable_on_equal_profit() {
        let stats: Vec<SellerStat> = ["a", "b", "c", "d"]
            .iter()
            .zip([5.0, 9.0, 5.0, 9.0])
            .map(|(id, profit)| SellerStat {
                profit,
                ..SellerStat::new(&seller(id))
            })
            .collect();
        let ranked = rank(stats, &BonusByProfit::default(), 10);
        let order: Vec<&str> = ranked.iter().map(|r| r.stat.id.as_str()).collect();
        assert_eq!(order, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_top_products_limit_and_tie_order() {
        let mut stat = SellerStat::new(&seller("s1"));
        for position in 0..12 {
            let quantity = if position < 2 { 1 } else { 2 };
            stat.products_sold.insert(format!("P{}", position + 1), quantity);
        }
        let top = top_products(&stat, 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].sku, "P3");
        assert_eq!(top[9].sku, "P12");
        assert!(top.iter().all(|sale| sale.sku != "P1" && sale.sku != "P2"));
        assert!(top.windows(2).all(|pair| pair[0].quantity >= pair[1].quantity));
    }

    #[test]
    fn test_format_report_rounds_money_only() {
        let ranked = RankedSeller {
            stat: SellerStat {
                revenue: 10.005,
                profit: 3.14159,
                sales_count: 3,
                ..SellerStat::new(&seller("s1"))
            },
            bonus: 0.125,
            top_products: vec![ProductSale {
                sku: "A".into(),
                quantity: 7,
            }],
        };
        let report = format_report(&ranked, 2);
        assert_eq!(report.revenue, 10.01);
        assert_eq!(report.profit, 3.14);
        assert_eq!(report.bonus, 0.13);
        assert_eq!(report.sales_count, 3);
        assert_eq!(report.top_products[0].quantity, 7);
    }
}
