//! Settlement records and overpayment validation.
//!
//! A settlement is validated against the balance computed from the
//! latest committed event log, so it can never pay back more than is
//! owed; edits re-validate against a recomputation that excludes the
//! settlement being edited.

pub mod service;
pub mod types;

pub use service::SettlementService;
pub use types::Settlement;
