//! knowcheck-core: Question bank model, quiz state machine, and scoring.
//!
//! This crate defines the data model, the pure session state machine and the
//! controller wrapped around it, plus the scoring and report types that the
//! CLI and the HTML dashboard build on.

pub mod controller;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod session;
