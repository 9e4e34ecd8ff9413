//! Location path parsing.
//!
//! Only the location-path subset emitted by validation reports is handled:
//! `/`-separated element steps with optional prefixes or `*:` wildcards,
//! `Q{uri}` qualified names and bracketed predicates. The occurrence index
//! of a step is its last purely numeric predicate.

use xtrace_model::{LocationSegment, local_name};

/// One parsed step of a location path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    /// An element step to resolve.
    Element(LocationSegment),
    /// A step that cannot be mapped to an element line (attribute, node
    /// test, parent axis). Resolution stops here.
    Stop(String),
}

/// Parse a location path into steps, ignoring empty segments.
pub fn parse_location_path(path: &str) -> Vec<PathStep> {
    split_steps(path)
        .into_iter()
        .map(str::trim)
        .filter(|raw| !raw.is_empty() && *raw != ".")
        .map(parse_step)
        .collect()
}

/// Element segments of a path up to the first non-element step.
pub fn location_segments(path: &str) -> Vec<LocationSegment> {
    parse_location_path(path)
        .into_iter()
        .map_while(|step| match step {
            PathStep::Element(segment) => Some(segment),
            PathStep::Stop(_) => None,
        })
        .collect()
}

/// Split on `/` outside predicates, braces and quoted strings.
fn split_steps(path: &str) -> Vec<&str> {
    let mut steps = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    for (idx, ch) in path.char_indices() {
        if let Some(open) = quote {
            if ch == open {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' if depth > 0 => quote = Some(ch),
            '[' | '{' => depth += 1,
            ']' | '}' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => {
                steps.push(&path[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    steps.push(&path[start..]);
    steps
}

fn parse_step(raw: &str) -> PathStep {
    let (name_part, predicates) = split_name_and_predicates(raw);
    let name_part = name_part.trim();
    let name_part = name_part.strip_prefix("child::").unwrap_or(name_part);

    if name_part.starts_with('@')
        || name_part.contains("::")
        || name_part.contains('(')
        || name_part == ".."
    {
        return PathStep::Stop(raw.to_string());
    }

    let name = local_name(strip_uri_qualifier(name_part));
    if name.is_empty() {
        return PathStep::Stop(raw.to_string());
    }

    let occurrence = predicates
        .iter()
        .rev()
        .find_map(|predicate| predicate.trim().parse::<usize>().ok())
        .unwrap_or(1);

    PathStep::Element(LocationSegment::new(name, occurrence))
}

/// `Q{urn:x}Name` -> `Name`.
fn strip_uri_qualifier(name: &str) -> &str {
    if let Some(rest) = name.strip_prefix("Q{")
        && let Some(close) = rest.find('}')
    {
        return &rest[close + 1..];
    }
    name
}

/// Separate `name[p1][p2]` into `name` and the predicate bodies.
fn split_name_and_predicates(raw: &str) -> (&str, Vec<&str>) {
    let mut name_end = raw.len();
    let mut predicates = Vec::new();
    let mut depth = 0usize;
    let mut brace = 0usize;
    let mut quote: Option<char> = None;
    let mut open_at = 0usize;
    for (idx, ch) in raw.char_indices() {
        if let Some(open) = quote {
            if ch == open {
                quote = None;
            }
            continue;
        }
        match ch {
            '{' => brace += 1,
            '}' => brace = brace.saturating_sub(1),
            '\'' | '"' if depth > 0 => quote = Some(ch),
            '[' if brace == 0 => {
                if depth == 0 {
                    if name_end == raw.len() {
                        name_end = idx;
                    }
                    open_at = idx + 1;
                }
                depth += 1;
            }
            ']' if brace == 0 && depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    predicates.push(&raw[open_at..idx]);
                }
            }
            _ => {}
        }
    }
    (&raw[..name_end], predicates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(name: &str, index: usize) -> PathStep {
        PathStep::Element(LocationSegment::new(name, index))
    }

    #[test]
    fn parses_plain_steps_with_indices() {
        let steps = parse_location_path("/Invoice[1]/AccountingSupplierParty[1]/Party[2]");
        assert_eq!(
            steps,
            vec![
                element("Invoice", 1),
                element("AccountingSupplierParty", 1),
                element("Party", 2),
            ]
        );
    }

    #[test]
    fn default_index_is_one_and_prefixes_are_stripped() {
        let steps = parse_location_path("/cac:InvoiceLine/cbc:ID");
        assert_eq!(steps, vec![element("InvoiceLine", 1), element("ID", 1)]);
    }

    #[test]
    fn namespace_uri_predicates_do_not_split_steps() {
        let path = "/*:Invoice[namespace-uri()='urn:oasis:names:specification:ubl:schema:xsd:Invoice-2'][1]\
                    /*:InvoiceLine[namespace-uri()='urn:a/b/c'][3]";
        assert_eq!(
            parse_location_path(path),
            vec![element("Invoice", 1), element("InvoiceLine", 3)]
        );
    }

    #[test]
    fn eqname_steps_reduce_to_local_name() {
        let steps = parse_location_path("/Q{urn:x/y}Invoice[1]/Q{urn:x/y}Note[2]");
        assert_eq!(steps, vec![element("Invoice", 1), element("Note", 2)]);
    }

    #[test]
    fn empty_segments_are_ignored() {
        assert_eq!(parse_location_path("//Invoice//ID"), vec![
            element("Invoice", 1),
            element("ID", 1)
        ]);
        assert!(parse_location_path("").is_empty());
        assert!(parse_location_path("/").is_empty());
    }

    #[test]
    fn attribute_and_node_tests_stop_the_walk() {
        let steps = parse_location_path("/Invoice[1]/cbc:Amount[1]/@currencyID");
        assert_eq!(steps.len(), 3);
        assert!(matches!(steps[2], PathStep::Stop(_)));

        let segments = location_segments("/Invoice[1]/Note[1]/text()/Other[1]");
        assert_eq!(
            segments,
            vec![
                LocationSegment::new("Invoice", 1),
                LocationSegment::new("Note", 1)
            ]
        );
    }
}
