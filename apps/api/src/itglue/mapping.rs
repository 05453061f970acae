//! Maps an organization profile onto the policy form's field names so the picker
//! can pre-fill the form.
//!
//! Every rule is a substring match over lower-cased text. Tables are ordered and
//! evaluated first-match; reordering entries changes results.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::itglue::profile::{OrganizationProfile, TechnologyStack};

/// Field name to suggested value. Fields with no detection are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormPrefill(BTreeMap<&'static str, String>);

impl FormPrefill {
    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn set(&mut self, field: &'static str, value: impl Into<String>) {
        self.0.insert(field, value.into());
    }
}

// ──────────────────────────────────────────────
// Organization fields
// ──────────────────────────────────────────────

const INDUSTRY_RULES: &[(&[&str], &str)] = &[
    (&["healthcare", "medical", "hospital", "clinic"], "Healthcare"),
    (&["financial", "bank", "investment"], "Financial Services"),
    (&["manufacturing", "factory"], "Manufacturing"),
    (&["retail", "store", "shop"], "Retail"),
    (&["technology", "software", "saas"], "Technology"),
    (&["education", "school", "university"], "Education"),
    (&["legal", "law", "attorney"], "Legal"),
];

pub fn map_industry(organization_type: &str) -> &'static str {
    let lower = organization_type.to_lowercase();
    INDUSTRY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, industry)| *industry)
        .unwrap_or("Other")
}

/// Company size guessed from how many configuration items the organization has.
pub fn estimate_company_size(configuration_count: usize) -> &'static str {
    match configuration_count {
        0..=19 => "Small (1-50 employees)",
        20..=74 => "Medium (51-250 employees)",
        75..=199 => "Large (251-1000 employees)",
        _ => "Enterprise (1000+ employees)",
    }
}

fn map_compliance(profile: &OrganizationProfile) -> String {
    profile
        .compliance_frameworks
        .iter()
        .next()
        .map(|framework| framework.form_option().to_string())
        .unwrap_or_default()
}

// ──────────────────────────────────────────────
// Technology fields
// ──────────────────────────────────────────────

/// Matches when every group has at least one keyword present.
type Condition = &'static [&'static [&'static str]];

struct FieldRule {
    field: &'static str,
    cases: &'static [(Condition, &'static str)],
    default: Option<&'static str>,
}

const MDM_CASES: &[(Condition, &str)] = &[
    (&[&["intune"]], "Microsoft Intune"),
    (&[&["jamf", "airwatch"]], "Other MDM"),
];

const TECHNOLOGY_RULES: &[FieldRule] = &[
    FieldRule {
        field: "platform_choice",
        cases: &[
            (&[&["microsoft 365", "office 365", "azure", "o365"]], "Microsoft 365 / Azure"),
            (&[&["google workspace", "gmail", "gsuite"]], "Google Workspace"),
        ],
        default: Some("Microsoft 365 / Azure"),
    },
    FieldRule {
        field: "mdr_solution",
        cases: &[
            (&[&["sophos"]], "Sophos MDR"),
            (&[&["crowdstrike", "sentinel"]], "Other MDR"),
            (&[&["antivirus", "defender"]], "Traditional Antivirus Only"),
        ],
        default: Some("Sophos MDR"),
    },
    FieldRule {
        field: "email_security",
        cases: &[
            (&[&["avanan"]], "Avanan Email Security"),
            (&[&["defender", "atp"]], "Microsoft Defender"),
            (&[&["proofpoint", "mimecast"]], "Other Email Security"),
        ],
        default: None,
    },
    FieldRule {
        field: "siem_solution",
        cases: &[
            (&[&["siem", "splunk", "sentinel"]], "SIEM with SOC monitoring"),
            (&[&["log"], &["monitor"]], "Basic log collection"),
        ],
        default: None,
    },
    FieldRule {
        field: "pam_solution",
        cases: &[
            (&[&["senhasegura"]], "Senhasegura PAM"),
            (&[&["cyberark", "thycotic", "beyondtrust"]], "Other PAM"),
        ],
        default: None,
    },
    FieldRule {
        field: "disk_encryption",
        cases: &[
            (&[&["bitlocker"], &["filevault"]], "Both BitLocker and FileVault"),
            (&[&["bitlocker"]], "BitLocker (Windows)"),
            (&[&["filevault"]], "FileVault (macOS)"),
        ],
        default: None,
    },
    FieldRule {
        field: "mdm_computers",
        cases: MDM_CASES,
        default: None,
    },
    FieldRule {
        field: "mdm_mobile",
        cases: MDM_CASES,
        default: None,
    },
    FieldRule {
        field: "security_training",
        cases: &[
            (&[&["knowbe4"], &["monthly"]], "KnowBe4 Monthly Training"),
            (&[&["knowbe4"]], "KnowBe4 Quarterly Training"),
        ],
        default: None,
    },
    FieldRule {
        field: "phishing_tests",
        cases: &[(&[&["knowbe4", "phishing"]], "Monthly Phishing Tests")],
        default: None,
    },
    FieldRule {
        field: "vulnerability_scans",
        cases: &[
            (
                &[&["vulnerability", "nessus", "qualys"], &["monthly"]],
                "Monthly Vulnerability Scans",
            ),
            (
                &[&["vulnerability", "nessus", "qualys"]],
                "Quarterly Vulnerability Scans",
            ),
        ],
        default: None,
    },
    FieldRule {
        field: "dark_web_monitoring",
        cases: &[
            (&[&["darkwebid", "dark web"]], "DarkWebID Monitoring"),
            (&[&["breach"], &["monitor"]], "Other Dark Web Monitoring"),
        ],
        default: None,
    },
    FieldRule {
        field: "mfa_solution",
        cases: &[
            (&[&["microsoft"], &["mfa", "authenticator"]], "Microsoft MFA"),
            (&[&["duo"]], "Duo Security"),
            (&[&["mfa", "two-factor", "2fa"]], "Other MFA"),
        ],
        default: None,
    },
    FieldRule {
        field: "password_manager",
        cases: &[
            (&[&["lastpass"]], "LastPass Business"),
            (&[&["1password", "dashlane", "keeper"]], "Other Password Manager"),
        ],
        default: None,
    },
    FieldRule {
        field: "intrusion_detection",
        cases: &[
            (&[&["ids", "ips", "intrusion"]], "Network Intrusion Detection System"),
            (
                &[&["firewall"], &["sonicwall", "fortinet", "palo alto"]],
                "Firewall with IDS/IPS",
            ),
            (&[&["firewall", "meraki"]], "Basic Firewall"),
        ],
        default: None,
    },
];

fn matches(condition: &[&[&str]], text: &str) -> bool {
    condition
        .iter()
        .all(|group| group.iter().any(|keyword| text.contains(keyword)))
}

impl FieldRule {
    fn evaluate(&self, text: &str) -> Option<&'static str> {
        self.cases
            .iter()
            .find(|(condition, _)| matches(condition, text))
            .map(|(_, value)| *value)
            .or(self.default)
    }
}

/// Lower-cased configuration names joined by single spaces, in category order.
fn configuration_text(stack: &TechnologyStack) -> String {
    stack
        .items()
        .map(|item| item.name.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Technology-field suggestions from configuration names alone.
pub fn map_technology_stack(stack: &TechnologyStack) -> FormPrefill {
    let text = configuration_text(stack);
    let mut prefill = FormPrefill::default();
    for rule in TECHNOLOGY_RULES {
        if let Some(value) = rule.evaluate(&text) {
            prefill.set(rule.field, value);
        }
    }
    prefill
}

pub fn map_profile_to_form(profile: &OrganizationProfile) -> FormPrefill {
    let organization = &profile.organization;
    let mut prefill = map_technology_stack(&profile.technology_stack);
    prefill.set("client_name", organization.name.as_str());
    prefill.set("industry", map_industry(&organization.organization_type));
    prefill.set(
        "company_size",
        estimate_company_size(profile.total_configurations),
    );
    prefill.set("compliance_requirements", map_compliance(profile));
    prefill
}
