use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Mapping from one line of the clean output to the program line that
/// emitted the literal element found there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceEntry {
    /// 1-indexed line in the clean output.
    pub output_line: usize,
    pub source_file: PathBuf,
    /// 1-indexed line in the transformation program.
    pub source_line: usize,
    /// Qualified element name as written in the program (e.g. `cbc:ID`).
    pub element_name: String,
}

impl TraceEntry {
    /// Element name without its namespace prefix.
    pub fn local_element_name(&self) -> &str {
        local_name(&self.element_name)
    }

    pub fn producing_location(&self) -> ProducingLocation {
        ProducingLocation {
            file: self.source_file.clone(),
            line: self.source_line,
            element: self.element_name.clone(),
        }
    }
}

/// The program location that produced a piece of output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducingLocation {
    pub file: PathBuf,
    pub line: usize,
    pub element: String,
}

/// Strip a namespace prefix (`cbc:ID` -> `ID`, `*:ID` -> `ID`).
pub fn local_name(qualified: &str) -> &str {
    qualified
        .rsplit_once(':')
        .map_or(qualified, |(_, local)| local)
}
