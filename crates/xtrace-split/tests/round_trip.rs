//! Instrumenting a program and splitting its traced output must give back
//! exactly what the plain program produces.

use std::path::Path;

use proptest::prelude::*;
use xtrace_instrument::{MarkerFormat, instrument_source};
use xtrace_split::split_traced_output;

const HEADER: &str = "<xsl:stylesheet version=\"2.0\" xmlns:xsl=\"http://www.w3.org/1999/XSL/Transform\" xmlns:cbc=\"urn:cbc\">\n  <xsl:template match=\"/\">\n";
const FOOTER: &str = "  </xsl:template>\n</xsl:stylesheet>\n";

/// Stand-in for an XSLT processor running a program whose template body
/// holds only literal result lines: the body is copied through and
/// comment instructions become comments.
fn execute(program: &str) -> String {
    let mut out = Vec::new();
    let mut inside = false;
    for line in program.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("<xsl:template") {
            inside = true;
            continue;
        }
        if trimmed.starts_with("</xsl:template") {
            inside = false;
            continue;
        }
        if !inside {
            continue;
        }
        match trimmed
            .strip_prefix("<xsl:comment>")
            .and_then(|rest| rest.strip_suffix("</xsl:comment>"))
        {
            Some(body) => {
                let indent = &line[..line.len() - trimmed.len()];
                out.push(format!("{indent}<!--{body}-->"));
            }
            None => out.push(line.to_string()),
        }
    }
    out.join("\n")
}

fn literal_line() -> impl Strategy<Value = String> {
    (
        0usize..4,
        prop::sample::select(vec!["Invoice", "cbc:ID", "cbc:Note", "cac:Party", "Name"]),
        prop::option::of("[A-Za-z0-9 ]{0,12}"),
    )
        .prop_map(|(depth, name, text)| {
            let indent = "  ".repeat(depth + 2);
            match text {
                Some(text) => format!("{indent}<{name}>{text}</{name}>"),
                None => format!("{indent}<{name}/>"),
            }
        })
}

proptest! {
    #[test]
    fn split_recovers_uninstrumented_output(body in prop::collection::vec(literal_line(), 0..20)) {
        let mut program = String::from(HEADER);
        for line in &body {
            program.push_str(line);
            program.push('\n');
        }
        program.push_str(FOOTER);

        let format = MarkerFormat::default();
        let instrumented = instrument_source(&program, Path::new("/tmp/gen.xsl"), &format).unwrap();
        let split = split_traced_output(&execute(&instrumented), &format);

        prop_assert_eq!(&split.clean_text, &execute(&program));
        prop_assert_eq!(split.entries.len(), body.len());

        let clean_lines: Vec<&str> = split.clean_text.split('\n').collect();
        let program_lines: Vec<&str> = program.lines().collect();
        for entry in &split.entries {
            let open = format!("<{}", entry.element_name);
            prop_assert!(clean_lines[entry.output_line - 1].trim_start().starts_with(&open));
            prop_assert!(program_lines[entry.source_line - 1].trim_start().starts_with(&open));
        }
    }
}

#[test]
fn one_entry_per_literal_line_in_order() {
    let program = format!("{HEADER}    <Invoice>\n      <cbc:ID>1</cbc:ID>\n    </Invoice>\n{FOOTER}");
    let format = MarkerFormat::default();
    let instrumented = instrument_source(&program, Path::new("/tmp/gen.xsl"), &format).unwrap();
    let split = split_traced_output(&execute(&instrumented), &format);

    assert_eq!(split.clean_text, "    <Invoice>\n      <cbc:ID>1</cbc:ID>\n    </Invoice>");
    let pairs: Vec<(usize, usize)> = split
        .entries
        .iter()
        .map(|entry| (entry.output_line, entry.source_line))
        .collect();
    assert_eq!(pairs, vec![(1, 3), (2, 4)]);
}
