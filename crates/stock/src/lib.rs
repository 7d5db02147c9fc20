//! Stock ledger domain module.
//!
//! Business rules for per-location stock records, implemented as deterministic
//! domain logic (no IO, no HTTP, no storage). Orchestration against the
//! catalog, the store and the external location service lives in
//! `equipstock-infra`.

pub mod alert;
pub mod location;
pub mod record;

pub use alert::LowStockAlert;
pub use location::LocationRef;
pub use record::{StockLevels, StockRecord, remaining_after};
