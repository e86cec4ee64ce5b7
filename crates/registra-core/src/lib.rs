//! registra-core — Evaluation scheme, grade ledger, and period lifecycle engine.
//!
//! This crate defines the data model, the weighted-grade computation, the
//! per-course evaluation scheme with retroactive score migration, the
//! attendance eligibility gate, and the academic-period state machine that
//! the rest of the registra system builds on.

pub mod engine;
pub mod error;
pub mod gate;
pub mod ledger;
pub mod model;
pub mod parser;
pub mod period;
pub mod ranking;
pub mod scheme;
pub mod score;
pub mod traits;
