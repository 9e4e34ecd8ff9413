//! Structural (SVRL) report parsing.
//!
//! Schematron validators describe their findings as `failed-assert` and
//! `successful-report` blocks, each carrying `id`, `flag` and `location`
//! attributes plus a `text` child. Namespace prefixes are ignored so both
//! `svrl:failed-assert` and an unprefixed `failed-assert` are accepted.

use std::path::Path;
use std::time::Instant;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, info, warn};

use xtrace_model::ViolationRecord;

use crate::error::ReportError;

const TEXT_ELEMENT: &[u8] = b"text";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    FailedAssert,
    SuccessfulReport,
}

impl BlockKind {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"failed-assert" => Some(Self::FailedAssert),
            b"successful-report" => Some(Self::SuccessfulReport),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::FailedAssert => "failed-assert",
            Self::SuccessfulReport => "successful-report",
        }
    }
}

/// A block whose end tag has not been read yet.
#[derive(Debug)]
struct OpenBlock {
    kind: BlockKind,
    rule_id: Option<String>,
    flag: String,
    location: String,
    /// Element depth below the block element.
    depth: usize,
    /// Text collected from the first `text` child, once it has closed.
    text: Option<String>,
    /// Text being collected while inside the first `text` child.
    capture: Option<String>,
}

impl OpenBlock {
    fn open(kind: BlockKind, start: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let mut rule_id = None;
        let mut flag = None;
        let mut role = None;
        let mut location = String::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let value = attr.unescape_value()?.trim().to_string();
            match attr.key.local_name().as_ref() {
                b"id" if !value.is_empty() => rule_id = Some(value),
                b"flag" => flag = Some(value),
                b"role" => role = Some(value),
                b"location" => location = value,
                _ => {}
            }
        }
        Ok(Self {
            kind,
            rule_id,
            // Some rule sets put the severity in `role` instead of `flag`.
            flag: flag.or(role).unwrap_or_default(),
            location,
            depth: 0,
            text: None,
            capture: None,
        })
    }

    fn enter(&mut self, local_name: &[u8]) {
        self.depth += 1;
        if self.depth == 1 && self.text.is_none() && local_name == TEXT_ELEMENT {
            self.capture = Some(String::new());
        }
    }

    fn leave(&mut self) {
        if self.depth == 1
            && let Some(captured) = self.capture.take()
        {
            self.text = Some(captured);
        }
        self.depth = self.depth.saturating_sub(1);
    }

    fn push_text(&mut self, text: &str) {
        if let Some(buffer) = self.capture.as_mut() {
            buffer.push_str(text);
        }
    }

    fn warn_dropped(&self) {
        warn!(
            block = self.kind.label(),
            rule_id = self.rule_id.as_deref().unwrap_or(""),
            location = %self.location,
            "dropping report block without message text"
        );
    }

    /// The finished record, or `None` when the block had no message text.
    fn finish(self) -> Option<ViolationRecord> {
        let message = collapse_whitespace(self.text.as_deref().unwrap_or_default());
        if message.is_empty() {
            self.warn_dropped();
            return None;
        }
        debug!(
            block = self.kind.label(),
            rule_id = self.rule_id.as_deref().unwrap_or(""),
            flag = %self.flag,
            "report block"
        );
        Some(ViolationRecord {
            rule_id: self.rule_id,
            severity_flag: self.flag,
            location_path: self.location,
            message_text: message,
        })
    }
}

/// Extract every violation record from an SVRL report.
///
/// Failed assertions come first, then successful reports, each group in
/// document order. Blocks without message text are dropped; malformed XML
/// aborts with [`ReportError::Xml`].
pub fn parse_report(text: &str) -> Result<Vec<ViolationRecord>, ReportError> {
    let start = Instant::now();
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text_start = false;
    reader.config_mut().trim_text_end = false;

    let mut failed_asserts = Vec::new();
    let mut successful_reports = Vec::new();
    let mut current: Option<OpenBlock> = None;

    loop {
        let position = reader.buffer_position();
        let event = reader.read_event().map_err(|source| ReportError::Xml {
            position: reader.error_position(),
            source,
        })?;
        let xml_error = |source: quick_xml::Error| ReportError::Xml { position, source };

        match event {
            Event::Start(e) => {
                let local = e.local_name();
                if let Some(block) = current.as_mut() {
                    block.enter(local.as_ref());
                } else if let Some(kind) = BlockKind::from_local_name(local.as_ref()) {
                    current = Some(OpenBlock::open(kind, &e).map_err(xml_error)?);
                }
            }
            Event::Empty(e) => {
                if current.is_none()
                    && let Some(kind) = BlockKind::from_local_name(e.local_name().as_ref())
                {
                    // A self-closed block has no text child.
                    OpenBlock::open(kind, &e).map_err(xml_error)?.warn_dropped();
                }
            }
            Event::Text(e) => {
                if let Some(block) = current.as_mut() {
                    let unescaped = e.unescape().map_err(xml_error)?;
                    block.push_text(&unescaped);
                }
            }
            Event::CData(e) => {
                if let Some(block) = current.as_mut() {
                    block.push_text(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::End(_) => {
                if let Some(mut block) = current.take() {
                    if block.depth == 0 {
                        let kind = block.kind;
                        if let Some(record) = block.finish() {
                            match kind {
                                BlockKind::FailedAssert => failed_asserts.push(record),
                                BlockKind::SuccessfulReport => successful_reports.push(record),
                            }
                        }
                    } else {
                        block.leave();
                        current = Some(block);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(block) = current {
        warn!(
            block = block.kind.label(),
            "report ended inside an unterminated block"
        );
    }

    info!(
        failed_asserts = failed_asserts.len(),
        successful_reports = successful_reports.len(),
        duration_ms = start.elapsed().as_millis(),
        "parsed structural report"
    );

    failed_asserts.extend(successful_reports);
    Ok(failed_asserts)
}

/// Read and parse an SVRL report file.
pub fn read_report(path: &Path) -> Result<Vec<ViolationRecord>, ReportError> {
    let text = std::fs::read_to_string(path).map_err(|source| ReportError::io(path, source))?;
    parse_report(&text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
