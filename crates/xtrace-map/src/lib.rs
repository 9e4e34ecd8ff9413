//! Violation to source mapping.
//!
//! Given issues placed on the clean output and the trace entries recovered
//! from a traced run, [`map_issues`] finds, for each issue, the output line
//! that most likely causes it and the program line that produced that
//! output. Element names are pulled out of the validator message by an
//! ordered list of [`heuristics`]; when none of them names a traced element
//! the issue falls back to the nearest preceding trace entry.

#![deny(unsafe_code)]

pub mod correlate;
pub mod heuristics;
pub mod options;
pub mod rules;

pub use correlate::{TraceIndex, map_issues, nearest_preceding};
pub use heuristics::{HEURISTICS, Heuristic, MessageContext, extract_element_names};
pub use options::{DEFAULT_ROOT_ELEMENTS, MapperOptions};
pub use rules::builtin_rule_targets;
