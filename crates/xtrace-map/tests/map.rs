use std::path::PathBuf;

use xtrace_map::{MapperOptions, map_issues};
use xtrace_model::{IssueSource, Severity, TraceEntry, ValidationIssue};

const CLEAN: &str = "\
<Invoice xmlns:cac=\"urn:cac\" xmlns:cbc=\"urn:cbc\">
  <cbc:ID>INV-1</cbc:ID>
  <cac:AccountingSupplierParty>
    <cac:Party>
      <cac:PartyLegalEntity>
        <cbc:RegistrationName>Seller</cbc:RegistrationName>
      </cac:PartyLegalEntity>
    </cac:Party>
  </cac:AccountingSupplierParty>
  <cbc:Note>free text</cbc:Note>
  <cac:InvoiceLine>
    <cbc:ID>1</cbc:ID>
  </cac:InvoiceLine>
  <cac:InvoiceLine>
    <cbc:ID>2</cbc:ID>
  </cac:InvoiceLine>
</Invoice>";

fn entry(output_line: usize, source_line: usize, element: &str) -> TraceEntry {
    TraceEntry {
        output_line,
        source_file: PathBuf::from("/work/map.xsl"),
        source_line,
        element_name: element.to_string(),
    }
}

/// Every literal element except `cbc:Note`, which the program copies from
/// the input rather than writing literally.
fn entries() -> Vec<TraceEntry> {
    vec![
        entry(1, 4, "Invoice"),
        entry(2, 5, "cbc:ID"),
        entry(3, 6, "cac:AccountingSupplierParty"),
        entry(4, 7, "cac:Party"),
        entry(5, 8, "cac:PartyLegalEntity"),
        entry(6, 9, "cbc:RegistrationName"),
        entry(11, 14, "cac:InvoiceLine"),
        entry(12, 15, "cbc:ID"),
        entry(14, 14, "cac:InvoiceLine"),
        entry(15, 15, "cbc:ID"),
    ]
}

fn issue(line: usize, message: &str, rule_id: Option<&str>) -> ValidationIssue {
    ValidationIssue {
        line,
        column: 0,
        message: message.to_string(),
        severity: Severity::Error,
        rule_id: rule_id.map(str::to_string),
        source: IssueSource::BusinessRules,
    }
}

#[test]
fn rule_table_hit_adopts_trace_entry() {
    let traced = map_issues(
        &[issue(1, "[BR-06]-The Seller name (BT-27) shall be provided.", Some("BR-06"))],
        &entries(),
        CLEAN,
        &MapperOptions::default(),
    );
    assert_eq!(traced[0].issue.line, 6);
    assert_eq!(traced[0].producing_line, Some(9));
    assert_eq!(traced[0].producing_element.as_deref(), Some("cbc:RegistrationName"));
    assert_eq!(traced[0].producing_file, Some(PathBuf::from("/work/map.xsl")));
}

#[test]
fn repeated_elements_use_the_occurrence_before_the_issue() {
    let traced = map_issues(
        &[issue(15, "Line amount missing", Some("BR-21"))],
        &entries(),
        CLEAN,
        &MapperOptions::default(),
    );
    assert_eq!(traced[0].issue.line, 14);
    assert_eq!(traced[0].producing_line, Some(14));
}

#[test]
fn untraced_element_is_found_in_clean_text_then_nearest_entry() {
    let traced = map_issues(
        &[issue(
            1,
            "Element '{urn:cbc}Note': This element is not expected.",
            None,
        )],
        &entries(),
        CLEAN,
        &MapperOptions::default(),
    );
    assert_eq!(traced[0].issue.line, 10);
    // Nearest preceding entry is the RegistrationName on line 6.
    assert_eq!(traced[0].producing_line, Some(9));
}

#[test]
fn no_name_keeps_line_and_uses_nearest_entry() {
    let traced = map_issues(
        &[issue(13, "Something is wrong here", None)],
        &entries(),
        CLEAN,
        &MapperOptions::default(),
    );
    assert_eq!(traced[0].issue.line, 13);
    assert_eq!(traced[0].producing_line, Some(15));
    assert_eq!(traced[0].producing_element.as_deref(), Some("cbc:ID"));
}

#[test]
fn degenerate_line_without_name_has_no_correlation() {
    let traced = map_issues(
        &[issue(1, "Something is wrong here", None)],
        &entries(),
        CLEAN,
        &MapperOptions::default(),
    );
    assert_eq!(traced[0].issue.line, 1);
    assert!(!traced[0].is_traced());
}

#[test]
fn root_only_messages_do_not_jump_to_the_root_entry() {
    let traced = map_issues(
        &[issue(1, "cvc-elt.1.a: Cannot find the declaration of element 'Invoice'.", None)],
        &entries(),
        CLEAN,
        &MapperOptions::default(),
    );
    assert!(!traced[0].is_traced());
}

#[test]
fn no_entries_still_relocates_by_text() {
    let traced = map_issues(
        &[issue(1, "cbc:Note must not be empty", None)],
        &[],
        CLEAN,
        &MapperOptions::default(),
    );
    assert_eq!(traced[0].issue.line, 10);
    assert!(!traced[0].is_traced());
}

#[test]
fn single_line_output_still_correlates_text_matches() {
    let clean = "<Invoice><cbc:ID>1</cbc:ID><cbc:Note>copied</cbc:Note></Invoice>";
    let entries = vec![entry(1, 4, "Invoice"), entry(1, 5, "cbc:ID")];
    let traced = map_issues(
        &[ValidationIssue {
            source: IssueSource::Schema,
            ..issue(1, "Element '{urn:cbc}Note': This element is not expected.", None)
        }],
        &entries,
        clean,
        &MapperOptions::default(),
    );
    assert_eq!(traced[0].issue.line, 1);
    assert_eq!(traced[0].producing_line, Some(5));
    assert_eq!(traced[0].producing_element.as_deref(), Some("cbc:ID"));
}
