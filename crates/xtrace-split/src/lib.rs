//! Traced output splitting.
//!
//! Running an instrumented program yields the real output interleaved with
//! marker comments. [`split_traced_output`] removes the markers and turns
//! them into [`TraceEntry`] values numbered against the clean output.
//!
//! ```
//! use xtrace_instrument::MarkerFormat;
//! use xtrace_split::split_traced_output;
//!
//! let raw = "<!--XTRACE|/tmp/map.xsl|42|cbc:ID-->\n<cbc:ID>INV-1</cbc:ID>";
//! let split = split_traced_output(raw, &MarkerFormat::default());
//! assert_eq!(split.clean_text, "<cbc:ID>INV-1</cbc:ID>");
//! assert_eq!(split.entries[0].output_line, 1);
//! assert_eq!(split.entries[0].source_line, 42);
//! ```

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use xtrace_instrument::{Marker, MarkerFormat};
use xtrace_model::TraceEntry;

/// Clean output plus the trace entries recovered from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitOutput {
    pub clean_text: String,
    /// Sorted by `output_line`.
    pub entries: Vec<TraceEntry>,
}

/// Split raw traced output into clean text and trace entries.
///
/// Never fails: truncated or partial output is processed as far as it goes.
/// Lines are separated on `\n`; a line holding nothing but markers and
/// whitespace is dropped, and its markers apply to the next kept line.
/// Markers after the last kept line attach to that line, or to line 1 when
/// nothing was kept.
pub fn split_traced_output(raw: &str, format: &MarkerFormat) -> SplitOutput {
    let start = Instant::now();
    let mut clean_lines: Vec<String> = Vec::new();
    let mut entries = Vec::new();
    let mut pending: Vec<Marker> = Vec::new();
    let mut dropped = 0usize;

    for raw_line in raw.split('\n') {
        let found = format.find_markers(raw_line);
        if found.is_empty() {
            clean_lines.push(raw_line.to_string());
            attach(&mut entries, pending.drain(..), clean_lines.len());
            continue;
        }

        let mut remainder = String::with_capacity(raw_line.len());
        let mut cursor = 0usize;
        for marker in &found {
            remainder.push_str(&raw_line[cursor..marker.span.start]);
            cursor = marker.span.end;
        }
        remainder.push_str(&raw_line[cursor..]);
        pending.extend(found.into_iter().map(|found| found.marker));

        if remainder.trim().is_empty() {
            dropped += 1;
            continue;
        }
        clean_lines.push(remainder);
        attach(&mut entries, pending.drain(..), clean_lines.len());
    }

    if !pending.is_empty() {
        debug!(
            markers = pending.len(),
            "markers after the last output line"
        );
        attach(&mut entries, pending.drain(..), clean_lines.len().max(1));
    }

    info!(
        clean_lines = clean_lines.len(),
        dropped_lines = dropped,
        entries = entries.len(),
        duration_ms = start.elapsed().as_millis(),
        "split traced output"
    );

    SplitOutput {
        clean_text: clean_lines.join("\n"),
        entries,
    }
}

fn attach(entries: &mut Vec<TraceEntry>, markers: impl Iterator<Item = Marker>, output_line: usize) {
    entries.extend(markers.map(|marker| TraceEntry {
        output_line,
        source_file: PathBuf::from(marker.program_file),
        source_line: marker.program_line,
        element_name: marker.element_name,
    }));
}
