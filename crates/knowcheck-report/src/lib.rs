//! knowcheck-report: Results dashboard generation.

pub mod html;
