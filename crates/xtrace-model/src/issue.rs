//! Validation issue types.
//!
//! A [`ViolationRecord`] is what a structured validation report says; a
//! [`ValidationIssue`] is that record placed on a line of the clean output;
//! a [`TracedIssue`] additionally names the program line that produced it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::trace::ProducingLocation;

/// Issue severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Map a report flag token to a severity.
    ///
    /// Unknown or empty flags map to [`Severity::Error`] so that an
    /// unexpected token never hides a failure.
    pub fn from_flag(flag: &str) -> Self {
        match flag.trim().to_lowercase().as_str() {
            "fatal" | "error" => Self::Error,
            "warning" => Self::Warning,
            "information" | "info" => Self::Info,
            _ => Self::Error,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::Info => "Info",
        }
    }
}

/// Which validator produced an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueSource {
    /// XSD schema validation.
    Schema,
    /// Core business rule set (e.g. EN 16931).
    BusinessRules,
    /// Profile-specific rule set layered on top of the business rules.
    ProfileRules,
}

impl IssueSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::BusinessRules => "business",
            Self::ProfileRules => "profile",
        }
    }

    /// Parse a CLI/config label.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "schema" | "xsd" => Some(Self::Schema),
            "business" | "business-rules" => Some(Self::BusinessRules),
            "profile" | "profile-rules" => Some(Self::ProfileRules),
            _ => None,
        }
    }
}

/// One failed assertion or flagged report entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationRecord {
    pub rule_id: Option<String>,
    /// Free-text severity token as written in the report.
    pub severity_flag: String,
    /// Location path; empty when the report gave none.
    pub location_path: String,
    pub message_text: String,
}

impl ViolationRecord {
    pub fn severity(&self) -> Severity {
        Severity::from_flag(&self.severity_flag)
    }
}

/// A violation placed on a line of the clean output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// 1-indexed line in the clean output buffer.
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub severity: Severity,
    pub rule_id: Option<String>,
    pub source: IssueSource,
}

/// A validation issue correlated with the program line that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracedIssue {
    #[serde(flatten)]
    pub issue: ValidationIssue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producing_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producing_line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producing_element: Option<String>,
}

impl TracedIssue {
    pub fn untraced(issue: ValidationIssue) -> Self {
        Self {
            issue,
            producing_file: None,
            producing_line: None,
            producing_element: None,
        }
    }

    #[must_use]
    pub fn with_producer(mut self, producer: ProducingLocation) -> Self {
        self.producing_file = Some(producer.file);
        self.producing_line = Some(producer.line);
        self.producing_element = Some(producer.element);
        self
    }

    pub fn is_traced(&self) -> bool {
        self.producing_file.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_flags_map_with_error_default() {
        assert_eq!(Severity::from_flag("fatal"), Severity::Error);
        assert_eq!(Severity::from_flag("ERROR"), Severity::Error);
        assert_eq!(Severity::from_flag(" warning "), Severity::Warning);
        assert_eq!(Severity::from_flag("information"), Severity::Info);
        assert_eq!(Severity::from_flag("info"), Severity::Info);
        assert_eq!(Severity::from_flag("critical"), Severity::Error);
        assert_eq!(Severity::from_flag(""), Severity::Error);
    }

    #[test]
    fn issue_source_parses_labels() {
        assert_eq!(IssueSource::parse("XSD"), Some(IssueSource::Schema));
        assert_eq!(
            IssueSource::parse("business"),
            Some(IssueSource::BusinessRules)
        );
        assert_eq!(
            IssueSource::parse("profile-rules"),
            Some(IssueSource::ProfileRules)
        );
        assert_eq!(IssueSource::parse("other"), None);
    }
}
