//! Data models for the Sales Engine.
//!
//! The `models` module defines the serialisable records the engine
//! consumes (sellers, products and purchase receipts), the per-seller
//! accumulator it builds while folding receipts, and the report rows
//! it hands back.  Input types derive `Deserialize` so that they can be
//! loaded straight from the JSON exports the sales data usually lives
//! in; output types derive `Serialize` for the same reason.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A seller taking part in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    /// Unique identifier of the seller, e.g. `"seller_1"`.  Purchase
    /// records refer to sellers through this value.
    pub id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Hiring date as an ISO 8601 string (`YYYY-MM-DD`).
    pub start_date: String,
    /// Job title, e.g. `"Senior Seller"`.
    pub position: String,
}

impl Seller {
    /// First and last name joined by a single space.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A catalogue entry.  The SKU is the only lookup key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Stock-keeping unit, unique across the catalogue.
    pub sku: String,
    /// Cost price of a single unit.
    pub purchase_price: f64,
    /// Human-readable product name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Catalogue category, e.g. `"Food"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Catalogue retail price.  Receipts carry their own sale price, so
    /// this is informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
}

/// One position on a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// SKU of the catalogue product that was sold.
    pub sku: String,
    /// Number of units sold.
    pub quantity: u64,
    /// Unit price the item was actually sold at.
    pub sale_price: f64,
    /// Discount in percent, `0..=100`.
    pub discount: f64,
}

impl LineItem {
    /// The triple handed to a revenue strategy.
    pub fn sale(&self) -> ItemSale {
        ItemSale {
            discount: self.discount,
            sale_price: self.sale_price,
            quantity: self.quantity,
        }
    }
}

/// A single sales transaction made by one seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    /// Receipt number, when the export carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_id: Option<String>,
    /// Sale date as an ISO 8601 string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Identifier of the [`Seller`] who made the sale.
    pub seller_id: String,
    /// Identifier of the buyer.  Not used by the report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Gross receipt total.
    pub total_amount: f64,
    /// Discount granted on the whole receipt.
    pub total_discount: f64,
    /// Positions of the receipt, in input order.
    pub items: Vec<LineItem>,
}

impl PurchaseRecord {
    /// Receipt-level net figure, `total_amount - total_discount`.  This
    /// is what a seller's revenue accumulates; it is not reconciled with
    /// the per-item revenue used for profit.
    pub fn net_amount(&self) -> f64 {
        self.total_amount - self.total_discount
    }
}

/// The complete input bundle for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesData {
    /// Everyone who appears in the report, in input order.
    pub sellers: Vec<Seller>,
    /// The product catalogue, keyed by SKU.
    pub products: Vec<Product>,
    /// Receipts to fold into the seller totals.
    pub purchase_records: Vec<PurchaseRecord>,
}

/// Argument of a revenue strategy: the figures of one line item that
/// affect its revenue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemSale {
    /// Discount in percent.
    pub discount: f64,
    /// Unit sale price.
    pub sale_price: f64,
    /// Number of units.
    pub quantity: u64,
}

/// Running totals for one seller.
///
/// Created with zeroed figures before aggregation starts and filled in
/// place while purchase records are folded in.  Bonus strategies receive
/// a reference to the finished accumulator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SellerStat {
    /// Identifier of the seller this accumulator belongs to.
    pub id: String,
    /// `"<first_name> <last_name>"`.
    pub name: String,
    /// Sum of the net amounts of every receipt of this seller.
    pub revenue: f64,
    /// Sum of per-item `revenue - cost` across all receipts.
    pub profit: f64,
    /// Number of receipts.
    pub sales_count: u64,
    /// Cumulative quantity per SKU, in first-encounter order.
    pub products_sold: IndexMap<String, u64>,
    /// Copied from [`Seller::start_date`].
    pub start_date: String,
    /// Copied from [`Seller::position`].
    pub position: String,
}

impl SellerStat {
    /// A zero-valued accumulator for `seller`.
    pub fn new(seller: &Seller) -> Self {
        Self {
            id: seller.id.clone(),
            name: seller.display_name(),
            revenue: 0.0,
            profit: 0.0,
            sales_count: 0,
            products_sold: IndexMap::new(),
            start_date: seller.start_date.clone(),
            position: seller.position.clone(),
        }
    }

    /// Total number of units sold across all SKUs, saturating at
    /// `u64::MAX`.
    pub fn items_sold(&self) -> u64 {
        self.products_sold
            .values()
            .fold(0, |total, &quantity| total.saturating_add(quantity))
    }
}

/// A `{sku, quantity}` pair of the top products list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSale {
    pub sku: String,
    /// Units of this SKU sold by the seller across all receipts.
    pub quantity: u64,
}

/// A seller after ranking: its accumulator plus everything the ranker
/// derived from its position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSeller {
    /// The finished accumulator.
    pub stat: SellerStat,
    /// Unrounded bonus returned by the bonus strategy.
    pub bonus: f64,
    /// Best-selling SKUs, highest quantity first.
    pub top_products: Vec<ProductSale>,
}

/// One row of the final report.  Monetary fields are rounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerReport {
    /// [`Seller::id`] of the reported seller.
    pub seller_id: String,
    /// `"<first_name> <last_name>"`.
    pub name: String,
    /// Net receipt revenue, rounded.
    pub revenue: f64,
    /// Accumulated profit, rounded.
    pub profit: f64,
    /// Number of receipts.
    pub sales_count: u64,
    /// Up to the configured number of best-selling SKUs, highest
    /// quantity first.
    pub top_products: Vec<ProductSale>,
    /// Rank-based bonus, rounded.
    pub bonus: f64,
}
