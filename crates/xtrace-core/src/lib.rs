//! Fault localization pipeline.
//!
//! [`Pipeline`] ties the stages together over in-memory text: it splits the
//! traced output, places every report's findings on the clean output and
//! maps them back to program lines. [`TraceSession`] keeps the latest run
//! per document for later lookups such as "which program line produced
//! this output line".

#![deny(unsafe_code)]

pub mod pipeline;
pub mod session;

pub use pipeline::{Pipeline, PipelineRun, ReportInput};
pub use session::TraceSession;
