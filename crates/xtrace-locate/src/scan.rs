//! Line-oriented tag scanning.
//!
//! Tags are recognised by pattern, not parsed, so truncated or otherwise
//! non-well-formed buffers still scan.

use regex::Regex;

const NAME_CHARS: &str = r"[A-Za-z_][\w.\-]*";

/// Open/close patterns for one element name, namespace prefix ignored.
#[derive(Debug, Clone)]
pub struct TagPattern {
    open: Regex,
    close: Regex,
}

impl TagPattern {
    /// Patterns for a local element name; `*` matches any element.
    ///
    /// Returns `None` only if the name cannot be turned into a pattern.
    pub fn for_local_name(local: &str) -> Option<Self> {
        let name = if local == "*" {
            NAME_CHARS.to_string()
        } else {
            regex::escape(local)
        };
        let open = format!(r"<(?:{NAME_CHARS}:)?(?P<name>{name})(?:[\s/>]|$)");
        let close = format!(r"</(?:{NAME_CHARS}:)?{name}\s*>");
        Some(Self {
            open: Regex::new(&open).ok()?,
            close: Regex::new(&close).ok()?,
        })
    }

    /// Local name of the first matching open tag on the line.
    pub fn first_open<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.open
            .captures(line)
            .and_then(|caps| caps.name("name"))
            .map(|m| m.as_str())
    }

    pub fn opens_on(&self, line: &str) -> bool {
        self.open.is_match(line)
    }

    /// Net nesting change contributed by `lines[idx]`: non-self-closing
    /// opens minus closes. Tags whose `>` lies on a later line are
    /// followed forward to see whether they self-close.
    pub fn balance(&self, lines: &[&str], idx: usize) -> isize {
        let line = lines[idx];
        let mut net = 0isize;
        for caps in self.open.captures_iter(line) {
            let Some(name) = caps.name("name") else {
                continue;
            };
            if !tag_self_closes(lines, idx, name.end()) {
                net += 1;
            }
        }
        net - self.close.find_iter(line).count() as isize
    }
}

/// Whether the tag whose name ends at `name_end` on `lines[idx]` is
/// written as `<name ... />`.
fn tag_self_closes(lines: &[&str], idx: usize, name_end: usize) -> bool {
    let mut rest = &lines[idx][name_end..];
    let mut line_idx = idx;
    loop {
        if let Some(gt) = rest.find('>') {
            return rest[..gt].trim_end().ends_with('/');
        }
        line_idx += 1;
        if line_idx >= lines.len() {
            return false;
        }
        rest = lines[line_idx];
    }
}
