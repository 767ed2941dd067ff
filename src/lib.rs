//! Sales Engine library crate.
//!
//! This crate computes a per-seller sales performance report from a
//! list of sellers, a product catalogue and purchase receipts.  Sellers
//! are ranked by profit, paid a rank-based bonus and annotated with
//! their best-selling products.  The revenue and bonus formulas are
//! pluggable; see [`strategy`].
//!
//! Most callers only need [`engine::analyze_sales_data`] together with
//! [`strategy::Strategies::reference`].

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod rounding;
pub mod strategy;
pub mod validate;

pub use config::{AnalysisConfig, DanglingPolicy};
pub use engine::{analyze_json, analyze_sales_data, analyze_value, run_analysis, Analysis};
pub use error::{AnalysisError, DanglingReference, ReferenceKind};
pub use models::{
    ItemSale, LineItem, Product, ProductSale, PurchaseRecord, SalesData, Seller, SellerReport,
    SellerStat,
};
pub use strategy::{
    BonusByProfit, BonusCalculator, RevenueCalculator, SimpleRevenue, Strategies,
    StrategyOptions, StrategyRegistry,
};
