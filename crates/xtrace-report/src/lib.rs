//! Validation report parsing.
//!
//! Two report shapes are understood: SVRL documents written by rule-set
//! validators ([`parse_report`]) and line logs written by schema
//! validators ([`parse_schema_log`]). Records from an SVRL report are
//! placed on lines of the clean output with [`to_issues`].

#![deny(unsafe_code)]

pub mod error;
pub mod issues;
pub mod schema_log;
pub mod svrl;

pub use error::ReportError;
pub use issues::{parse_report_issues, to_issues};
pub use schema_log::parse_schema_log;
pub use svrl::{parse_report, read_report};
