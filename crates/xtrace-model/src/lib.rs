#![deny(unsafe_code)]

pub mod error;
pub mod issue;
pub mod location;
pub mod trace;

pub use error::{ModelError, Result, read_text};
pub use issue::{IssueSource, Severity, TracedIssue, ValidationIssue, ViolationRecord};
pub use location::LocationSegment;
pub use trace::{ProducingLocation, TraceEntry, local_name};
