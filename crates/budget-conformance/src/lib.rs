//! Budget ledger conformance suite.
//!
//! The library half provides a [`Harness`] wiring the ledger to the
//! reference adapters and a manual clock, plus whole-state invariant checks.
//! The scenarios and property tests live under `tests/`.

#![deny(unsafe_code)]

pub mod harness;
pub mod invariants;

pub use harness::{start_time, token, Harness, EXECUTOR, LEDGER_ACCOUNT, RECIPIENTS};
pub use invariants::{check, Violation};
