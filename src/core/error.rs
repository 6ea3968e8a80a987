use thiserror::Error;

/// Errors raised by the governance and ranking services.
///
/// A missing fund or an undersized peer group is not an error; those come
/// back as ordinary results.
#[derive(Debug, Error)]
pub enum GovernanceError {
    /// The service was used before a record store was attached.
    #[error("{0} service not initialized")]
    NotInitialized(&'static str),

    /// The record store failed to answer a query or apply a write.
    #[error("record store error: {0}")]
    Store(String),

    /// A caller supplied an unparseable category, period or similar value.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T, E = GovernanceError> = std::result::Result<T, E>;
