//! Concrete storage: the in-memory record store and the TTL cache backing
//! ranking views.

pub mod funds;
pub mod memory;

pub use funds::MemoryFundStore;
pub use memory::MemoryCache;
