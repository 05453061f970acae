// LLM prompt text for policy generation.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{FORMATTING_INSTRUCTION, FRAMEWORK_ALIGNMENT};
use crate::models::form::FormData;
use crate::policy::PROVIDER_NAME;

/// System persona sent with every generation request.
pub const POLICY_SYSTEM: &str = "You are an expert cybersecurity policy writer with deep \
    knowledge of NIST frameworks, SOC 2, ISO 27001, CMMC, and industry best practices.";

/// Shown in the prompt when the client named no compliance framework.
const DEFAULT_COMPLIANCE: &str = "General best practices";

/// Builds the generation instruction. Form values are embedded verbatim.
pub fn build_policy_prompt(form: &FormData) -> String {
    let compliance = if form.compliance_requirements.is_empty() {
        DEFAULT_COMPLIANCE
    } else {
        form.compliance_requirements.as_str()
    };

    format!(
        "You are a cybersecurity policy generator trained to write business-grade IT and security \
policies aligned with industry frameworks such as {FRAMEWORK_ALIGNMENT}. Your policies must follow this format:
- A clear section heading for each topic
- A short introductory paragraph explaining the purpose or intent of that section
- A mix of both: lists of actionable bullet points or paragraphs that reflect standards and expected behaviors

The language should be professional, clear, and non-technical. Avoid legal jargon or redundant statements.

{FORMATTING_INSTRUCTION}

Generate a comprehensive {policy_type} for the following organization:

Client: {client_name}
Industry: {industry}
Company Size: {company_size}
Technology Stack: {tech_stack}
Compliance Requirements: {compliance}
Managed Service Provider (MSP): {PROVIDER_NAME}
Managed Security Service Provider (MSSP): {PROVIDER_NAME}
Additional Requirements: {additional}

The policy should be specifically tailored to this organization's context and include:
1. Purpose and scope
2. Roles and responsibilities
3. Policy statements with specific controls
4. Implementation guidelines
5. Compliance and monitoring requirements
6. References to applicable frameworks

Make sure to reference {PROVIDER_NAME} as the designated MSP and MSSP throughout the policy where appropriate.",
        policy_type = form.policy_type,
        client_name = form.client_name,
        industry = form.industry,
        company_size = form.company_size,
        tech_stack = form.tech_stack,
        additional = form.additional_requirements,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> FormData {
        FormData {
            client_name: "Acme Dental".into(),
            industry: "Healthcare".into(),
            company_size: "Small (1-50 employees)".into(),
            policy_type: "Acceptable Use Policy".into(),
            compliance_requirements: "HIPAA".into(),
            additional_requirements: "Cover remote work".into(),
            tech_stack: "Microsoft 365 / Azure, Sophos MDR".into(),
        }
    }

    #[test]
    fn test_prompt_embeds_every_field() {
        let prompt = build_policy_prompt(&form());
        assert!(prompt.contains("Generate a comprehensive Acceptable Use Policy"));
        assert!(prompt.contains("Client: Acme Dental"));
        assert!(prompt.contains("Industry: Healthcare"));
        assert!(prompt.contains("Company Size: Small (1-50 employees)"));
        assert!(prompt.contains("Technology Stack: Microsoft 365 / Azure, Sophos MDR"));
        assert!(prompt.contains("Compliance Requirements: HIPAA"));
        assert!(prompt.contains("Additional Requirements: Cover remote work"));
    }

    #[test]
    fn test_prompt_names_provider_as_msp_and_mssp() {
        let prompt = build_policy_prompt(&form());
        assert!(prompt.contains("Managed Service Provider (MSP): Crimson IT"));
        assert!(prompt.contains("Managed Security Service Provider (MSSP): Crimson IT"));
        assert!(prompt.contains("reference Crimson IT as the designated MSP and MSSP"));
    }

    #[test]
    fn test_empty_compliance_falls_back_to_best_practices() {
        let mut data = form();
        data.compliance_requirements.clear();
        let prompt = build_policy_prompt(&data);
        assert!(prompt.contains("Compliance Requirements: General best practices"));
    }

    #[test]
    fn test_placeholder_like_values_are_embedded_verbatim() {
        let mut data = form();
        data.client_name = "{industry} Corp".into();
        let prompt = build_policy_prompt(&data);
        assert!(prompt.contains("Client: {industry} Corp"));
    }

    #[test]
    fn test_prompt_carries_formatting_rules() {
        let prompt = build_policy_prompt(&form());
        assert!(prompt.contains("Use ONLY H1 and H2 headings"));
        assert!(prompt.contains("CIS Controls"));
    }
}
