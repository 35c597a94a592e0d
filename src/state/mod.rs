//! Persistent per-installation state.
//!
//! Tracks which prerequisites each managed installation already has, so a
//! pass never repeats work a previous pass completed.

pub mod installation;
pub mod ledger;

pub use installation::InstallationId;
pub use ledger::{InstallationLedger, LedgerStore, PassLock};
