//! faultline - region/mutation state engine for synthetic fault-injection
//! campaigns over hardware-description source files.
//!
//! The crate keeps three views of one file consistent while an external
//! decision process proposes line-level defects: the in-memory edited text
//! ([`LineBuffer`] regions inside a [`Partition`]), each region's undo
//! history, and a durable append-only [`ChangeLedger`] that survives process
//! restarts. The [`MutationCoordinator`] drives the propose/validate/
//! commit-or-rollback protocol; everything the decision process sees or
//! answers goes through the [`DecisionOracle`] trait.
//!
//! The engine never interprets hardware-description syntax. It operates on
//! text lines and 1-based inclusive line ranges only.

pub mod buffer;
pub mod catalog;
pub mod cli;
pub mod coordinator;
pub mod history;
pub mod ledger;
pub mod oracle;
pub mod partition;
pub mod trace;

// Re-export commonly used types
pub use buffer::LineBuffer;
pub use catalog::{MutationCatalog, MutationClass};
pub use coordinator::MutationCoordinator;
pub use history::{Change, EditHistory};
pub use ledger::{ChangeLedger, RegionSnapshot};
pub use oracle::{DecisionOracle, LineRewrite, MutationChoice, RegionChoice};
pub use partition::Partition;
