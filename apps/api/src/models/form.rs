use serde::Deserialize;

use crate::errors::AppError;

/// Used when no technology field carries a value.
pub const DEFAULT_TECH_STACK: &str = "Standard business technology stack";

/// Technology-selection fields, in the order they are folded into `tech_stack`.
pub const TECH_FIELDS: &[&str] = &[
    "platform_choice",
    "mdr_solution",
    "email_security",
    "siem_solution",
    "pam_solution",
    "disk_encryption",
    "mdm_computers",
    "mdm_mobile",
    "security_training",
    "phishing_tests",
    "vulnerability_scans",
    "dark_web_monitoring",
    "mfa_solution",
    "password_manager",
    "intrusion_detection",
    "additional_tech",
];

/// Raw `POST /generate_policy` submission. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PolicyForm {
    pub client_name: String,
    pub industry: String,
    pub company_size: String,
    pub policy_type: String,
    pub compliance_requirements: String,
    pub additional_requirements: String,

    pub platform_choice: String,
    pub mdr_solution: String,
    pub email_security: String,
    pub siem_solution: String,
    pub pam_solution: String,
    pub disk_encryption: String,
    pub mdm_computers: String,
    pub mdm_mobile: String,
    pub security_training: String,
    pub phishing_tests: String,
    pub vulnerability_scans: String,
    pub dark_web_monitoring: String,
    pub mfa_solution: String,
    pub password_manager: String,
    pub intrusion_detection: String,
    pub additional_tech: String,
}

impl PolicyForm {
    /// Value of one technology field by wire name.
    fn tech_value(&self, field: &str) -> Option<&str> {
        let value = match field {
            "platform_choice" => &self.platform_choice,
            "mdr_solution" => &self.mdr_solution,
            "email_security" => &self.email_security,
            "siem_solution" => &self.siem_solution,
            "pam_solution" => &self.pam_solution,
            "disk_encryption" => &self.disk_encryption,
            "mdm_computers" => &self.mdm_computers,
            "mdm_mobile" => &self.mdm_mobile,
            "security_training" => &self.security_training,
            "phishing_tests" => &self.phishing_tests,
            "vulnerability_scans" => &self.vulnerability_scans,
            "dark_web_monitoring" => &self.dark_web_monitoring,
            "mfa_solution" => &self.mfa_solution,
            "password_manager" => &self.password_manager,
            "intrusion_detection" => &self.intrusion_detection,
            "additional_tech" => &self.additional_tech,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Joins the selected technologies, skipping blanks and the literal `"None"`.
    pub fn tech_stack_summary(&self) -> String {
        let selected: Vec<&str> = TECH_FIELDS
            .iter()
            .filter_map(|field| self.tech_value(field))
            .map(str::trim)
            .filter(|v| !v.is_empty() && *v != "None")
            .collect();

        if selected.is_empty() {
            DEFAULT_TECH_STACK.to_string()
        } else {
            selected.join(", ")
        }
    }
}

/// Validated, trimmed form values consumed by the prompt builder and renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct FormData {
    pub client_name: String,
    pub industry: String,
    pub company_size: String,
    pub policy_type: String,
    pub compliance_requirements: String,
    pub additional_requirements: String,
    pub tech_stack: String,
}

impl TryFrom<PolicyForm> for FormData {
    type Error = AppError;

    fn try_from(form: PolicyForm) -> Result<Self, Self::Error> {
        let data = FormData {
            client_name: form.client_name.trim().to_string(),
            industry: form.industry.trim().to_string(),
            company_size: form.company_size.trim().to_string(),
            policy_type: form.policy_type.trim().to_string(),
            compliance_requirements: form.compliance_requirements.trim().to_string(),
            additional_requirements: form.additional_requirements.trim().to_string(),
            tech_stack: form.tech_stack_summary(),
        };

        let missing = data.missing_fields();
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        Ok(data)
    }
}

impl FormData {
    /// Required fields that are empty, in declaration order.
    fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("client_name", &self.client_name),
            ("industry", &self.industry),
            ("company_size", &self.company_size),
            ("policy_type", &self.policy_type),
            ("tech_stack", &self.tech_stack),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}
