//! Location path to line resolution.
//!
//! Validation reports point at nodes with XPath-like location paths, but
//! editors need line numbers. [`LineScanResolver`] walks the path one step at
//! a time over the lines of the document, narrowing the search window to the
//! interior of each matched element so that repeated names in sibling
//! containers resolve to the right container.
//!
//! ```
//! use xtrace_locate::{LineScanResolver, LocationResolver};
//!
//! let doc = "<Root>\n  <Box>\n    <Item/>\n  </Box>\n  <Box>\n    <Item/>\n  </Box>\n</Root>";
//! let lines: Vec<&str> = doc.lines().collect();
//! assert_eq!(LineScanResolver.resolve("/Root/Box[2]/Item[1]", &lines), 6);
//! ```

#![deny(unsafe_code)]

pub mod path;
pub mod scan;

use tracing::debug;

pub use path::{PathStep, location_segments, parse_location_path};
pub use scan::TagPattern;

use xtrace_model::LocationSegment;

/// Line returned when nothing in a path could be resolved.
pub const FALLBACK_LINE: usize = 1;

/// Resolves a location path to a 1-indexed line of a text buffer.
///
/// Implementations never fail: an unresolvable path yields
/// [`FALLBACK_LINE`] and a partially resolvable one yields the line of the
/// deepest step that did resolve.
pub trait LocationResolver {
    fn resolve(&self, location_path: &str, lines: &[&str]) -> usize;
}

/// Pattern-matching resolver over raw lines; tolerant of malformed input.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineScanResolver;

impl LocationResolver for LineScanResolver {
    fn resolve(&self, location_path: &str, lines: &[&str]) -> usize {
        resolve_line(location_path, lines)
    }
}

/// Split a text buffer into the line slice resolvers operate on.
pub fn buffer_lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

/// Resolve `location_path` against `lines` with the line-scan algorithm.
pub fn resolve_line(location_path: &str, lines: &[&str]) -> usize {
    if lines.is_empty() {
        return FALLBACK_LINE;
    }

    let mut window = Window {
        start: 0,
        end: lines.len() - 1,
    };
    let mut resolved: Option<usize> = None;

    for step in parse_location_path(location_path) {
        let segment = match step {
            PathStep::Element(segment) => segment,
            PathStep::Stop(raw) => {
                debug!(step = %raw, "location step is not an element, stopping");
                break;
            }
        };
        if window.is_empty() {
            debug!(element = %segment.element_name, "no lines left inside parent element");
            break;
        }
        let Some((open_idx, pattern)) = find_nth_open(lines, window, &segment) else {
            debug!(
                element = %segment.element_name,
                occurrence = segment.occurrence_index,
                "location step not found"
            );
            break;
        };
        let close_idx = element_end(lines, open_idx, window.end, &pattern);
        resolved = Some(open_idx);
        window = Window {
            start: open_idx + 1,
            end: close_idx,
        };
    }

    resolved.map_or(FALLBACK_LINE, |idx| idx + 1)
}

/// Inclusive 0-based line range; empty when `start > end`.
#[derive(Debug, Clone, Copy)]
struct Window {
    start: usize,
    end: usize,
}

impl Window {
    fn is_empty(self) -> bool {
        self.start > self.end
    }
}

/// Find the line of the Nth open tag for `segment` inside the window and
/// the pattern for the concrete element found there.
fn find_nth_open(
    lines: &[&str],
    window: Window,
    segment: &LocationSegment,
) -> Option<(usize, TagPattern)> {
    let pattern = TagPattern::for_local_name(&segment.element_name)?;
    let mut seen = 0usize;
    for idx in window.start..=window.end {
        let Some(name) = pattern.first_open(lines[idx]) else {
            continue;
        };
        seen += 1;
        if seen == segment.occurrence_index {
            let concrete = if segment.element_name == "*" {
                TagPattern::for_local_name(name)?
            } else {
                pattern
            };
            return Some((idx, concrete));
        }
    }
    None
}

/// Last line of the element opened on `open_idx`. Same-named descendants
/// are skipped by depth counting; an element that never closes extends to
/// `limit`.
fn element_end(lines: &[&str], open_idx: usize, limit: usize, pattern: &TagPattern) -> usize {
    let mut depth = pattern.balance(lines, open_idx);
    if depth <= 0 {
        return open_idx;
    }
    let limit = limit.min(lines.len() - 1);
    for idx in open_idx + 1..=limit {
        depth += pattern.balance(lines, idx);
        if depth <= 0 {
            return idx;
        }
    }
    limit
}

#[cfg(test)]
mod tests {
    use super::*;

    const NESTED: &str = "\
<Root>
  <Section>
    <Section>
      <Title>inner</Title>
    </Section>
    <Title>outer</Title>
  </Section>
  <Title>top</Title>
</Root>";

    #[test]
    fn same_named_descendants_do_not_end_the_parent() {
        let lines = buffer_lines(NESTED);
        // Title[2] inside the outer Section is the one after the inner Section.
        assert_eq!(resolve_line("/Root/Section[1]/Title[2]", &lines), 6);
    }

    #[test]
    fn element_end_spans_nested_same_names() {
        let lines = buffer_lines(NESTED);
        let pattern = TagPattern::for_local_name("Section").unwrap();
        assert_eq!(element_end(&lines, 1, lines.len() - 1, &pattern), 6);
        assert_eq!(element_end(&lines, 2, lines.len() - 1, &pattern), 4);
    }

    #[test]
    fn partial_resolution_returns_deepest_match() {
        let lines = buffer_lines(NESTED);
        assert_eq!(resolve_line("/Root/Section[1]/Missing[1]", &lines), 2);
        assert_eq!(resolve_line("/Root/Section[9]", &lines), 1);
    }

    #[test]
    fn single_line_element_has_no_interior() {
        let lines = buffer_lines("<Root>\n  <Title>t</Title>\n</Root>");
        assert_eq!(resolve_line("/Root/Title/Anything", &lines), 2);
    }

    #[test]
    fn unterminated_element_extends_to_window_end() {
        let lines = buffer_lines("<Root>\n  <Body>\n    <Item>1</Item>\n    <Item>2");
        assert_eq!(resolve_line("/Root/Body/Item[2]", &lines), 4);
    }

    #[test]
    fn wildcard_steps_resolve_to_concrete_elements() {
        let lines = buffer_lines("<?xml version=\"1.0\"?>\n<a:Doc>\n  <a:Part/>\n</a:Doc>");
        assert_eq!(resolve_line("/*[1]/*:Part[1]", &lines), 3);
    }

    #[test]
    fn empty_inputs_fall_back_to_first_line() {
        assert_eq!(resolve_line("", &["<Root/>"]), FALLBACK_LINE);
        assert_eq!(resolve_line("/Root", &[]), FALLBACK_LINE);
    }
}
