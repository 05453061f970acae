// Shared prompt fragments. Each service that needs LLM calls defines its own
// prompts.rs alongside it; this file holds the cross-cutting pieces.

/// Frameworks every generated policy is expected to align with.
pub const FRAMEWORK_ALIGNMENT: &str = "NIST 800-53 Rev. 5, SOC 2, SEC Cyber Risk Guidance, and CIS Controls";

/// Output-hygiene rules shared by every document-producing prompt.
/// The sanitizer still runs afterwards; the model does not always comply.
pub const FORMATTING_INSTRUCTION: &str = "IMPORTANT FORMATTING REQUIREMENTS:
- Do NOT include any conversational responses like \"Certainly\", \"Here is\", etc.
- Use ONLY H1 and H2 headings, no bold text (**text**)
- Do NOT use em dashes (\u{2014}), use regular hyphens (-) instead
- Start directly with the policy content, no introductory text
- Use simple bullet points with hyphens (-) not special characters
- Keep formatting clean and professional";
