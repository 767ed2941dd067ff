//! Error types for the Sales Engine.
//!
//! Every failure aborts the whole analysis run; there is no partial
//! result.  Messages are meant to be shown to the end user as they are.

use std::fmt;

use serde::Serialize;

/// What a dangling identifier was supposed to point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    /// A `seller_id` on a purchase record.
    Seller,
    /// A `sku` on a line item.
    Product,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Seller => f.write_str("seller"),
            ReferenceKind::Product => f.write_str("product"),
        }
    }
}

/// A purchase record or line item citing an identifier missing from the
/// seller list or the product catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("purchase record #{record} references unknown {kind} `{id}`")]
pub struct DanglingReference {
    /// Whether a seller id or a SKU was missing.
    pub kind: ReferenceKind,
    /// The identifier that could not be resolved.
    pub id: String,
    /// 0-based position of the purchase record in the input.
    pub record: usize,
}

/// Why an analysis run was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    /// The data bundle is missing, or one of its collections is not a
    /// list, is empty, or holds malformed records.
    #[error("invalid input data: {0}")]
    InvalidInput(String),
    /// A strategy slot is absent.
    #[error("strategy `{0}` is not defined")]
    MissingStrategy(&'static str),
    /// A strategy slot holds something that cannot be called.
    #[error("strategy `{slot}` must be a function, got {found}")]
    InvalidStrategyType { slot: &'static str, found: String },
    /// A purchase record or line item cites an unknown seller or SKU.
    #[error(transparent)]
    DanglingReference(#[from] DanglingReference),
}
