use crate::core::error::Result;
use crate::core::fund::{Fund, VisibilityUpdate};
use crate::core::store::{FundPredicate, FundStore};
use anyhow::Context;
use async_trait::async_trait;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::debug;

/// Fund records held in memory, in insertion order.
pub struct MemoryFundStore {
    funds: RwLock<Vec<Fund>>,
}

impl MemoryFundStore {
    pub fn from_funds(funds: Vec<Fund>) -> Self {
        Self {
            funds: RwLock::new(funds),
        }
    }

    /// Loads a JSON array of fund records.
    pub fn load_snapshot<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
        let funds: Vec<Fund> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;
        debug!("Loaded {} funds from {}", funds.len(), path.display());
        Ok(Self::from_funds(funds))
    }

    /// Adds a record, replacing any existing record with the same id.
    pub async fn insert(&self, fund: Fund) {
        let mut funds = self.funds.write().await;
        match funds.iter_mut().find(|f| f.fund_id == fund.fund_id) {
            Some(existing) => *existing = fund,
            None => funds.push(fund),
        }
    }

    pub async fn all(&self) -> Vec<Fund> {
        self.funds.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.funds.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl FundStore for MemoryFundStore {
    async fn find_one(&self, fund_id: &str) -> Result<Option<Fund>> {
        let funds = self.funds.read().await;
        Ok(funds.iter().find(|f| f.fund_id == fund_id).cloned())
    }

    async fn find_many(&self, predicate: FundPredicate<'_>) -> Result<Vec<Fund>> {
        let funds = self.funds.read().await;
        Ok(funds.iter().filter(|f| predicate(*f)).cloned().collect())
    }

    async fn set_visibility(&self, fund_id: &str, update: VisibilityUpdate) -> Result<bool> {
        let mut funds = self.funds.write().await;
        match funds.iter_mut().find(|f| f.fund_id == fund_id) {
            Some(fund) => {
                fund.apply_visibility(&update);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
