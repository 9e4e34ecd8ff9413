//! Built-in rule identifier to target element table.
//!
//! Covers the EN 16931 core rules and the PEPPOL BIS rules that most often
//! fire on generated UBL invoices. Targets are UBL local names, most
//! specific first.

use std::collections::BTreeMap;

const RULE_TARGETS: &[(&str, &[&str])] = &[
    ("BR-01", &["CustomizationID"]),
    ("BR-02", &["ID"]),
    ("BR-03", &["IssueDate"]),
    ("BR-04", &["InvoiceTypeCode", "CreditNoteTypeCode"]),
    ("BR-05", &["DocumentCurrencyCode"]),
    ("BR-06", &["RegistrationName"]),
    ("BR-07", &["RegistrationName"]),
    ("BR-08", &["PostalAddress"]),
    ("BR-09", &["IdentificationCode"]),
    ("BR-10", &["PostalAddress"]),
    ("BR-11", &["IdentificationCode"]),
    ("BR-12", &["LineExtensionAmount"]),
    ("BR-13", &["TaxExclusiveAmount"]),
    ("BR-14", &["TaxInclusiveAmount"]),
    ("BR-15", &["PayableAmount"]),
    ("BR-16", &["InvoiceLine", "CreditNoteLine"]),
    ("BR-17", &["PayeeParty"]),
    ("BR-18", &["TaxRepresentativeParty"]),
    ("BR-19", &["PostalAddress"]),
    ("BR-20", &["IdentificationCode"]),
    ("BR-21", &["InvoiceLine", "CreditNoteLine"]),
    ("BR-22", &["InvoicedQuantity", "CreditedQuantity"]),
    ("BR-23", &["InvoicedQuantity", "CreditedQuantity"]),
    ("BR-24", &["LineExtensionAmount"]),
    ("BR-25", &["Item"]),
    ("BR-26", &["PriceAmount"]),
    ("BR-27", &["PriceAmount"]),
    ("BR-28", &["BaseAmount"]),
    ("BR-29", &["InvoicePeriod"]),
    ("BR-30", &["InvoicePeriod"]),
    ("BR-31", &["AllowanceCharge"]),
    ("BR-32", &["TaxCategory"]),
    ("BR-33", &["AllowanceChargeReason", "AllowanceChargeReasonCode"]),
    ("BR-36", &["AllowanceCharge"]),
    ("BR-37", &["TaxCategory"]),
    ("BR-38", &["AllowanceChargeReason", "AllowanceChargeReasonCode"]),
    ("BR-45", &["TaxableAmount"]),
    ("BR-46", &["TaxAmount"]),
    ("BR-47", &["TaxCategory"]),
    ("BR-48", &["Percent"]),
    ("BR-49", &["PaymentMeansCode"]),
    ("BR-50", &["PayeeFinancialAccount"]),
    ("BR-CO-10", &["LineExtensionAmount"]),
    ("BR-CO-13", &["TaxExclusiveAmount"]),
    ("BR-CO-15", &["TaxInclusiveAmount"]),
    ("BR-CO-16", &["PayableAmount"]),
    ("BR-CO-17", &["TaxAmount"]),
    ("BR-CO-18", &["TaxSubtotal"]),
    ("BR-CO-25", &["PaymentDueDate", "PaymentTerms"]),
    ("BR-CO-26", &["PartyTaxScheme", "PartyIdentification", "PartyLegalEntity"]),
    ("PEPPOL-EN16931-R001", &["ProfileID"]),
    ("PEPPOL-EN16931-R004", &["CustomizationID"]),
    ("PEPPOL-EN16931-R007", &["ProfileID"]),
    ("PEPPOL-EN16931-R010", &["EndpointID"]),
    ("PEPPOL-EN16931-R020", &["EndpointID"]),
    ("PEPPOL-EN16931-R053", &["TaxTotal"]),
];

/// The built-in table keyed by upper-cased rule id.
pub fn builtin_rule_targets() -> BTreeMap<String, Vec<String>> {
    RULE_TARGETS
        .iter()
        .map(|(id, targets)| {
            (
                normalize_rule_id(id),
                targets.iter().map(|target| (*target).to_string()).collect(),
            )
        })
        .collect()
}

/// Rule ids compare case-insensitively.
pub fn normalize_rule_id(id: &str) -> String {
    id.trim().to_uppercase()
}
