//! Issue to trace correlation.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, info};

use xtrace_locate::{FALLBACK_LINE, TagPattern, buffer_lines};
use xtrace_model::{TraceEntry, TracedIssue, ValidationIssue};

use crate::heuristics::{MessageContext, extract_element_names};
use crate::options::MapperOptions;

/// Trace entries sorted by output line, with a lookup by local name.
#[derive(Debug)]
pub struct TraceIndex<'a> {
    sorted: Vec<&'a TraceEntry>,
    by_name: HashMap<&'a str, Vec<&'a TraceEntry>>,
}

impl<'a> TraceIndex<'a> {
    pub fn new(entries: &'a [TraceEntry]) -> Self {
        let mut sorted: Vec<&TraceEntry> = entries.iter().collect();
        sorted.sort_by_key(|entry| entry.output_line);
        let mut by_name: HashMap<&str, Vec<&TraceEntry>> = HashMap::new();
        for &entry in &sorted {
            by_name
                .entry(entry.local_element_name())
                .or_default()
                .push(entry);
        }
        Self { sorted, by_name }
    }

    /// The entry with the largest output line not after `target`; among
    /// entries on the same line the last one wins.
    pub fn nearest_preceding(&self, target: usize) -> Option<&'a TraceEntry> {
        self.sorted
            .iter()
            .rev()
            .find(|entry| entry.output_line <= target)
            .copied()
    }

    /// Entry for a local element name, preferring the last one at or before
    /// `near_line`, otherwise the first.
    pub fn for_element(&self, name: &str, near_line: usize) -> Option<&'a TraceEntry> {
        let candidates = self.by_name.get(name)?;
        let preceding = (near_line > FALLBACK_LINE)
            .then(|| {
                candidates
                    .iter()
                    .rev()
                    .find(|entry| entry.output_line <= near_line)
            })
            .flatten();
        preceding.or_else(|| candidates.first()).copied()
    }
}

/// Nearest preceding trace entry for `target` over unsorted `entries`.
pub fn nearest_preceding(entries: &[TraceEntry], target: usize) -> Option<&TraceEntry> {
    TraceIndex::new(entries).nearest_preceding(target)
}

/// Correlate issues with trace entries.
///
/// `clean_text` is the output the issues were reported against; it is
/// searched when an extracted element name has no trace entry.
pub fn map_issues(
    issues: &[ValidationIssue],
    entries: &[TraceEntry],
    clean_text: &str,
    options: &MapperOptions,
) -> Vec<TracedIssue> {
    let start = Instant::now();
    let index = TraceIndex::new(entries);
    let lines = buffer_lines(clean_text);

    let traced: Vec<TracedIssue> = issues
        .iter()
        .map(|issue| map_issue(issue, &index, &lines, options))
        .collect();

    info!(
        issues = traced.len(),
        traced = traced.iter().filter(|issue| issue.is_traced()).count(),
        entries = entries.len(),
        duration_ms = start.elapsed().as_millis(),
        "mapped issues to program lines"
    );
    traced
}

fn map_issue(
    issue: &ValidationIssue,
    index: &TraceIndex<'_>,
    lines: &[&str],
    options: &MapperOptions,
) -> TracedIssue {
    let names = extract_element_names(&MessageContext {
        message: &issue.message,
        rule_id: issue.rule_id.as_deref(),
        options,
    });

    for name in &names {
        if let Some(entry) = index.for_element(name, issue.line) {
            debug!(element = %name, output_line = entry.output_line, "matched trace entry by name");
            let mut relocated = issue.clone();
            relocated.line = entry.output_line;
            return TracedIssue::untraced(relocated).with_producer(entry.producing_location());
        }
    }

    let mut relocated = issue.clone();
    match names.iter().find_map(|name| first_open_line(lines, name)) {
        Some(line) => {
            debug!(line, "matched element in clean output");
            relocated.line = line;
        }
        // Line 1 is where unlocatable issues land, not a position.
        None if relocated.line <= FALLBACK_LINE => return TracedIssue::untraced(relocated),
        None => {}
    }
    match index.nearest_preceding(relocated.line) {
        Some(entry) => {
            let producer = entry.producing_location();
            TracedIssue::untraced(relocated).with_producer(producer)
        }
        None => TracedIssue::untraced(relocated),
    }
}

/// 1-indexed line of the first open tag for a local name.
fn first_open_line(lines: &[&str], name: &str) -> Option<usize> {
    let pattern = TagPattern::for_local_name(name)?;
    lines
        .iter()
        .position(|line| pattern.opens_on(line))
        .map(|idx| idx + 1)
}
