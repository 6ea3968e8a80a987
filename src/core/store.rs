//! Record store abstraction consumed by the governance and ranking services

use crate::core::error::Result;
use crate::core::fund::{Fund, VisibilityUpdate};
use async_trait::async_trait;

/// Predicate used for record lookups.
pub type FundPredicate<'a> = &'a (dyn Fn(&Fund) -> bool + Send + Sync);

#[async_trait]
pub trait FundStore: Send + Sync {
    async fn find_one(&self, fund_id: &str) -> Result<Option<Fund>>;

    /// Returns every record matching `predicate`, in store order.
    async fn find_many(&self, predicate: FundPredicate<'_>) -> Result<Vec<Fund>>;

    /// Writes back the public visibility flag. Returns `false` when no record
    /// with `fund_id` exists.
    async fn set_visibility(&self, fund_id: &str, update: VisibilityUpdate) -> Result<bool>;
}
