//! Program rewriting.
//!
//! Works line by line on the stylesheet text without parsing it, so a
//! program that is not well-formed still gets a best-effort instrumented
//! copy. Only lines inside untyped `template` bodies are considered, and
//! only lines that begin with a literal (non-XSLT) start tag receive a
//! marker. A comment node in the result of a `function`, or of a template
//! declaring `as`, would fail the declared type, so those bodies are left
//! alone.

use std::path::Path;
use std::sync::LazyLock;
use std::time::Instant;

use quick_xml::escape::escape;
use regex::Regex;
use tracing::{debug, info};

use crate::error::InstrumentError;
use crate::marker::{DELIMITER, MarkerFormat};

const XSLT_NAMESPACE: &str = "http://www.w3.org/1999/XSL/Transform";

/// Elements whose bodies produce output.
const BLOCK_ELEMENTS: [&str; 2] = ["template", "function"];

/// `as` attribute inside a start tag.
static TYPE_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\sas\s*=").expect("Invalid as attribute regex"));

static PREFIXED_XSLT_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"xmlns:([A-Za-z_][\w.\-]*)\s*=\s*["']{}["']"#,
        regex::escape(XSLT_NAMESPACE)
    ))
    .expect("Invalid XSLT prefix regex")
});

static DEFAULT_XSLT_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"xmlns\s*=\s*["']{}["']"#,
        regex::escape(XSLT_NAMESPACE)
    ))
    .expect("Invalid XSLT default namespace regex")
});

/// Start tag at the beginning of a line; comments, PIs and end tags excluded.
static LEADING_START_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*<(?P<name>[^\s/>!?][^\s/>]*)").expect("Invalid start tag regex")
});

/// Instrument a program read from disk. The marker file field is the
/// canonical absolute path of `path`.
pub fn instrument_file(path: &Path, format: &MarkerFormat) -> Result<String, InstrumentError> {
    let text = std::fs::read_to_string(path).map_err(|source| InstrumentError::io(path, source))?;
    let absolute = std::fs::canonicalize(path).map_err(|source| InstrumentError::io(path, source))?;
    instrument_source(&text, &absolute, format)
}

/// Insert a marker-emitting comment instruction before every literal
/// output element line of `text`.
///
/// Each original line is kept byte for byte; markers are whole new lines
/// using the indentation and line ending of the line they precede.
pub fn instrument_source(
    text: &str,
    program_path: &Path,
    format: &MarkerFormat,
) -> Result<String, InstrumentError> {
    let start = Instant::now();
    let program_file = program_path.display().to_string();
    let directives = Directives::detect(text);
    debug!(prefix = ?directives.prefix, "detected XSLT prefix");

    let mut out = String::with_capacity(text.len() + text.len() / 4);
    // Whether each open block may receive markers.
    let mut blocks: Vec<bool> = Vec::new();
    let mut in_comment = false;
    let mut markers = 0usize;
    let mut offset = 0usize;

    for (idx, raw_line) in text.split_inclusive('\n').enumerate() {
        let line_number = idx + 1;
        let starts_in_comment = in_comment;
        in_comment = comment_state_after(raw_line, in_comment);

        let events = directives.block_events(&text[offset..]);
        if events.is_empty() && blocks.last() == Some(&true) && !starts_in_comment {
            if let Some(name) = directives.literal_element(raw_line) {
                if name.contains(DELIMITER) {
                    return Err(InstrumentError::DelimiterInName {
                        line: line_number,
                        name: name.to_string(),
                    });
                }
                let token = format.token(&program_file, line_number, name);
                out.push_str(&directives.marker_line(raw_line, &token));
                markers += 1;
            }
        }
        out.push_str(raw_line);
        for event in events {
            match event {
                BlockEvent::Open { traced } => {
                    if !traced {
                        debug!(line = line_number, "typed block left uninstrumented");
                    }
                    blocks.push(traced);
                }
                BlockEvent::Close => {
                    blocks.pop();
                }
            }
        }
        offset += raw_line.len();
    }

    info!(
        program = %program_file,
        markers,
        duration_ms = start.elapsed().as_millis(),
        "instrumented program"
    );
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockEvent {
    /// `traced` is false for bodies whose result carries a declared type.
    Open { traced: bool },
    Close,
}

/// XSLT directive naming for one stylesheet.
#[derive(Debug)]
struct Directives {
    /// `None` when XSLT is the default namespace.
    prefix: Option<String>,
}

impl Directives {
    fn detect(text: &str) -> Self {
        if let Some(caps) = PREFIXED_XSLT_DECL.captures(text) {
            return Self {
                prefix: Some(caps[1].to_string()),
            };
        }
        if DEFAULT_XSLT_DECL.is_match(text) {
            return Self { prefix: None };
        }
        Self {
            prefix: Some("xsl".to_string()),
        }
    }

    fn qualify(&self, local: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{local}"),
            None => local.to_string(),
        }
    }

    fn is_directive(&self, qualified: &str) -> bool {
        match (&self.prefix, qualified.split_once(':')) {
            (Some(prefix), Some((element_prefix, _))) => element_prefix == prefix,
            (Some(_), None) => false,
            (None, found) => found.is_none(),
        }
    }

    /// Qualified name of the literal element the line starts with.
    fn literal_element<'a>(&self, line: &'a str) -> Option<&'a str> {
        let name = LEADING_START_TAG.captures(line)?.name("name")?.as_str();
        (!self.is_directive(name)).then_some(name)
    }

    /// Block opens (not self-closing) and closes on the first line of
    /// `rest`, in document order. Start tags are read past the line end.
    fn block_events(&self, rest: &str) -> Vec<BlockEvent> {
        let line = rest.split_inclusive('\n').next().unwrap_or_default();
        let mut events = Vec::new();
        for local in BLOCK_ELEMENTS {
            let name = self.qualify(local);
            for (at, _) in line.match_indices(&format!("<{name}")) {
                let after = &rest[at + 1 + name.len()..];
                if !ends_name(after) {
                    continue;
                }
                let tag = start_tag_body(after);
                if tag.trim_end().ends_with('/') {
                    continue;
                }
                let traced = local == "template" && !TYPE_ATTRIBUTE.is_match(tag);
                events.push((at, BlockEvent::Open { traced }));
            }
            for (at, _) in line.match_indices(&format!("</{name}")) {
                if ends_name(&line[at + 2 + name.len()..]) {
                    events.push((at, BlockEvent::Close));
                }
            }
        }
        events.sort_by_key(|(at, _)| *at);
        events.into_iter().map(|(_, event)| event).collect()
    }

    fn marker_line(&self, line: &str, token: &str) -> String {
        let indent: String = line.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
        let eol = if line.ends_with("\r\n") { "\r\n" } else { "\n" };
        let comment = self.qualify("comment");
        format!("{indent}<{comment}>{}</{comment}>{eol}", escape(token))
    }
}

fn ends_name(rest: &str) -> bool {
    rest.chars()
        .next()
        .is_none_or(|c| c.is_whitespace() || c == '>' || c == '/')
}

/// Attributes of the start tag continuing in `rest`, up to its `>`.
fn start_tag_body(rest: &str) -> &str {
    rest.find('>').map_or(rest, |gt| &rest[..gt])
}

/// Whether an XML comment is still open at the end of `line`.
fn comment_state_after(line: &str, mut in_comment: bool) -> bool {
    let mut rest = line;
    loop {
        let needle = if in_comment { "-->" } else { "<!--" };
        match rest.find(needle) {
            Some(at) => {
                rest = &rest[at + needle.len()..];
                in_comment = !in_comment;
            }
            None => return in_comment,
        }
    }
}
