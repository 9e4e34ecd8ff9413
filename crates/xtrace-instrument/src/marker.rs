//! Position marker encoding.
//!
//! A marker is an XML comment written into the transformation output:
//!
//! ```text
//! <!--XTRACE|/abs/path/map.xsl|42|cbc:ID-->
//! ```
//!
//! The sentinel identifies the comment as a marker; the three `|`-separated
//! fields are the program file, the 1-indexed program line and the
//! qualified name of the literal element emitted from that line. This
//! encoding is read by other tools and must stay stable.

use std::ops::Range;

use crate::error::InstrumentError;

pub const DEFAULT_SENTINEL: &str = "XTRACE";

/// Field separator inside a marker.
pub const DELIMITER: char = '|';

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// Marker sentinel configuration shared by the instrumentor and splitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerFormat {
    sentinel: String,
}

impl Default for MarkerFormat {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }
}

impl MarkerFormat {
    /// A format with a custom sentinel prefix.
    ///
    /// The sentinel must be non-empty and must not contain whitespace, the
    /// field delimiter or `--` (which cannot appear inside an XML comment).
    pub fn new(sentinel: impl Into<String>) -> Result<Self, InstrumentError> {
        let sentinel = sentinel.into();
        let problem = if sentinel.is_empty() {
            Some("must not be empty")
        } else if sentinel.contains(DELIMITER) {
            Some("must not contain `|`")
        } else if sentinel.contains("--") {
            Some("must not contain `--`")
        } else if sentinel.chars().any(char::is_whitespace) {
            Some("must not contain whitespace")
        } else {
            None
        };
        match problem {
            Some(message) => Err(InstrumentError::InvalidSentinel {
                sentinel,
                message: message.to_string(),
            }),
            None => Ok(Self { sentinel }),
        }
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// Comment body for one marker, unescaped.
    pub fn token(&self, program_file: &str, program_line: usize, element_name: &str) -> String {
        format!(
            "{}{DELIMITER}{program_file}{DELIMITER}{program_line}{DELIMITER}{element_name}",
            self.sentinel
        )
    }

    /// Every marker comment on `line`, left to right.
    ///
    /// Comments that do not carry this format's sentinel or whose fields
    /// do not parse are ignored. An unterminated comment ends the scan.
    pub fn find_markers(&self, line: &str) -> Vec<FoundMarker> {
        let mut found = Vec::new();
        let mut from = 0usize;
        while let Some(rel) = line[from..].find(COMMENT_OPEN) {
            let start = from + rel;
            let body_start = start + COMMENT_OPEN.len();
            let Some(body_len) = line[body_start..].find(COMMENT_CLOSE) else {
                break;
            };
            let end = body_start + body_len + COMMENT_CLOSE.len();
            if let Some(marker) = self.parse_body(&line[body_start..body_start + body_len]) {
                found.push(FoundMarker {
                    span: start..end,
                    marker,
                });
            }
            from = end;
        }
        found
    }

    fn parse_body(&self, body: &str) -> Option<Marker> {
        let fields = body
            .trim()
            .strip_prefix(self.sentinel.as_str())?
            .strip_prefix(DELIMITER)?;
        // The element name never holds the delimiter, the file path might.
        let mut parts = fields.rsplitn(3, DELIMITER);
        let element_name = parts.next()?.trim();
        let program_line = parts.next()?.trim().parse::<usize>().ok()?;
        let program_file = parts.next()?;
        if element_name.is_empty() || program_file.is_empty() || program_line == 0 {
            return None;
        }
        Some(Marker {
            program_file: program_file.to_string(),
            program_line,
            element_name: element_name.to_string(),
        })
    }
}

/// Decoded marker fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub program_file: String,
    pub program_line: usize,
    pub element_name: String,
}

/// A marker and the byte range of its comment within the scanned line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundMarker {
    pub span: Range<usize>,
    pub marker: Marker,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_markers_and_their_spans() {
        let format = MarkerFormat::default();
        let line = "<!--XTRACE|/tmp/map.xsl|42|cbc:ID--><cbc:ID>1</cbc:ID><!-- XTRACE|/tmp/map.xsl|43|cbc:Note -->";
        let found = format.find_markers(line);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].span, 0..36);
        assert_eq!(found[0].marker.program_line, 42);
        assert_eq!(found[0].marker.element_name, "cbc:ID");
        assert_eq!(found[1].marker.element_name, "cbc:Note");
        assert_eq!(&line[found[1].span.end..], "");
    }

    #[test]
    fn file_paths_may_contain_the_delimiter() {
        let format = MarkerFormat::default();
        let found = format.find_markers("<!--XTRACE|/odd|dir/map.xsl|7|Invoice-->");
        assert_eq!(found[0].marker.program_file, "/odd|dir/map.xsl");
        assert_eq!(found[0].marker.program_line, 7);
    }

    #[test]
    fn foreign_and_broken_comments_are_ignored() {
        let format = MarkerFormat::new("TRACE").unwrap();
        assert!(format.find_markers("<!-- plain comment -->").is_empty());
        assert!(format.find_markers("<!--XTRACE|/a.xsl|1|x-->").is_empty());
        assert!(format.find_markers("<!--TRACE|/a.xsl|x|y-->").is_empty());
        assert!(format.find_markers("<!--TRACE|/a.xsl|3|y").is_empty());
        assert_eq!(format.find_markers("<!--TRACE|/a.xsl|3|y-->").len(), 1);
    }

    #[test]
    fn sentinel_is_validated() {
        assert!(MarkerFormat::new("").is_err());
        assert!(MarkerFormat::new("A|B").is_err());
        assert!(MarkerFormat::new("A--B").is_err());
        assert!(MarkerFormat::new("A B").is_err());
        assert_eq!(MarkerFormat::new("MARK").unwrap().sentinel(), "MARK");
    }

    #[test]
    fn token_layout() {
        let format = MarkerFormat::default();
        assert_eq!(
            format.token("/tmp/map.xsl", 42, "cbc:ID"),
            "XTRACE|/tmp/map.xsl|42|cbc:ID"
        );
    }
}
