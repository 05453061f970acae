//! Document layout: turns sanitized policy text into an ordered block list.
//!
//! # Line classification (checked in this order, first match wins)
//! - blank → closes the open paragraph (emitting a spacer if one was open)
//! - `##…` → heading 2, every `##` removed
//! - `#…` → heading 1, every `#` removed
//! - trailing `:` or upper-case longer than 10 chars → heading 2, trailing colons removed
//! - `-`, `•`, `* ` → bullet
//! - `1`–`9` with `". "` or `") "` in the first five chars → numbered item, verbatim
//! - anything else → appended to the open paragraph with a single space
//!
//! These heuristics are the visual contract of the generated documents; keep them exact.

use chrono::NaiveDate;

use crate::models::form::FormData;
use crate::policy::sanitizer::{PolicyText, RULE_LINE};
use crate::policy::PROVIDER_NAME;

/// Minimum char count for a shouted line to become a heading.
const SHOUTED_HEADING_MIN_CHARS: usize = 10;
/// Window in which a numbered-item delimiter must appear.
const NUMBER_DELIMITER_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Center,
    Right,
}

/// A formatted span inside a cover or footer paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    /// Start this run on a new line within the same paragraph.
    pub line_break_before: bool,
}

impl Run {
    fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            italic: false,
            line_break_before: false,
        }
    }

    fn italic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: true,
            line_break_before: false,
        }
    }

    pub(crate) fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
            line_break_before: false,
        }
    }

    fn on_new_line(mut self) -> Self {
        self.line_break_before = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Bullet { text: String },
    Numbered { text: String },
    Paragraph { text: String },
    /// Empty paragraph used for vertical spacing.
    Spacer,
    /// Fixed-layout paragraph used by the cover and footer.
    Styled { alignment: Alignment, runs: Vec<Run> },
}

/// Everything the docx writer needs: cover, line-driven body, footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub title: String,
    pub cover: Vec<Block>,
    pub body: Vec<Block>,
    pub footer: Vec<Block>,
}

impl RenderedDocument {
    /// Lays out the cover page, body and footer for one policy.
    pub fn build(form: &FormData, policy: &PolicyText, generated_on: NaiveDate) -> Self {
        Self {
            title: format!("{} {}", form.client_name, form.policy_type),
            cover: cover_blocks(form, generated_on),
            body: layout_body(policy),
            footer: footer_blocks(),
        }
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.cover.iter().chain(&self.body).chain(&self.footer)
    }
}

fn cover_blocks(form: &FormData, generated_on: NaiveDate) -> Vec<Block> {
    vec![
        Block::Styled {
            alignment: Alignment::Right,
            runs: vec![Run::bold(PROVIDER_NAME.to_uppercase())],
        },
        Block::Styled {
            alignment: Alignment::Center,
            runs: vec![Run::bold(form.client_name.to_uppercase())],
        },
        Block::Styled {
            alignment: Alignment::Center,
            runs: vec![Run::bold(form.policy_type.clone())],
        },
        Block::Styled {
            alignment: Alignment::Center,
            runs: vec![
                Run::italic(format!(
                    "Document Generated: {}",
                    generated_on.format("%B %d, %Y")
                )),
                Run::italic(format!("Managed by: {PROVIDER_NAME} (MSP/MSSP)")).on_new_line(),
            ],
        },
        Block::Styled {
            alignment: Alignment::Center,
            runs: vec![Run::plain(RULE_LINE)],
        },
        Block::Spacer,
    ]
}

fn footer_blocks() -> Vec<Block> {
    vec![
        Block::Spacer,
        Block::Styled {
            alignment: Alignment::Center,
            runs: vec![
                Run::italic(format!(
                    "This document was generated by {PROVIDER_NAME}'s AI-powered policy generator."
                )),
                Run::italic(format!(
                    "For questions or updates, contact your {PROVIDER_NAME} representative."
                ))
                .on_new_line(),
            ],
        },
    ]
}

/// Classification of a single trimmed, non-blank body line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Heading { level: u8, text: String },
    Bullet(String),
    Numbered(String),
    Text(String),
}

pub fn classify_line(line: &str) -> LineKind {
    if line.starts_with("##") {
        return LineKind::Heading {
            level: 2,
            text: line.replace("##", "").trim().to_string(),
        };
    }
    if line.starts_with('#') {
        return LineKind::Heading {
            level: 1,
            text: line.replace('#', "").trim().to_string(),
        };
    }
    if line.ends_with(':') || is_shouted(line) {
        return LineKind::Heading {
            level: 2,
            text: line.trim_end_matches(':').to_string(),
        };
    }
    if line.starts_with('-') {
        return LineKind::Bullet(skip_chars(line, 1));
    }
    if line.starts_with('\u{2022}') || line.starts_with("* ") {
        return LineKind::Bullet(skip_chars(line, 2));
    }
    if is_numbered(line) {
        return LineKind::Numbered(line.to_string());
    }
    LineKind::Text(line.to_string())
}

/// Upper-case in the str.isupper() sense: at least one cased char and every
/// cased char upper-case. Lower-case and titlecase (`ǅ`) chars both disqualify.
fn is_shouted(line: &str) -> bool {
    line.chars().count() > SHOUTED_HEADING_MIN_CHARS
        && line.chars().any(char::is_uppercase)
        && !line.chars().any(|c| c.is_lowercase() || is_titlecase(c))
}

/// Cased but neither upper- nor lower-case.
fn is_titlecase(c: char) -> bool {
    !c.is_uppercase() && !c.is_lowercase() && !c.to_lowercase().eq(std::iter::once(c))
}

fn is_numbered(line: &str) -> bool {
    let starts_with_digit = line
        .chars()
        .next()
        .is_some_and(|c| ('1'..='9').contains(&c));
    if !starts_with_digit {
        return false;
    }
    let head: String = line.chars().take(NUMBER_DELIMITER_WINDOW).collect();
    head.contains(". ") || head.contains(") ")
}

fn skip_chars(line: &str, n: usize) -> String {
    line.chars().skip(n).collect::<String>().trim().to_string()
}

/// Single pass over the policy lines with an open-paragraph accumulator.
pub fn layout_body(policy: &PolicyText) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut open: Option<String> = None;

    for raw in policy.lines() {
        let line = raw.trim();

        if line.is_empty() {
            if let Some(text) = open.take() {
                blocks.push(Block::Paragraph { text });
                blocks.push(Block::Spacer);
            }
            continue;
        }

        let kind = classify_line(line);
        if !matches!(kind, LineKind::Text(_)) {
            if let Some(text) = open.take() {
                blocks.push(Block::Paragraph { text });
            }
        }

        match kind {
            LineKind::Heading { level, text } => blocks.push(Block::Heading { level, text }),
            LineKind::Bullet(text) => blocks.push(Block::Bullet { text }),
            LineKind::Numbered(text) => blocks.push(Block::Numbered { text }),
            LineKind::Text(text) => match open.as_mut() {
                Some(paragraph) => {
                    if !paragraph.is_empty() {
                        paragraph.push(' ');
                    }
                    paragraph.push_str(&text);
                }
                None => open = Some(text),
            },
        }
    }

    if let Some(text) = open {
        blocks.push(Block::Paragraph { text });
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::sanitizer::sanitize;

    fn heading(level: u8, text: &str) -> Block {
        Block::Heading {
            level,
            text: text.to_string(),
        }
    }

    fn bullet(text: &str) -> Block {
        Block::Bullet {
            text: text.to_string(),
        }
    }

    fn paragraph(text: &str) -> Block {
        Block::Paragraph {
            text: text.to_string(),
        }
    }

    /// Body layout without running the sanitizer (which would drop blank lines).
    fn layout_raw(text: &str) -> Vec<Block> {
        layout_body(&PolicyText::from_trusted(text))
    }

    fn form() -> FormData {
        FormData {
            client_name: "Acme Dental".into(),
            industry: "Healthcare".into(),
            company_size: "Small (1-50 employees)".into(),
            policy_type: "Information Security Policy".into(),
            compliance_requirements: String::new(),
            additional_requirements: String::new(),
            tech_stack: "Standard business technology stack".into(),
        }
    }

    #[test]
    fn test_reference_document_layout() {
        let blocks = layout_raw("# A\n\nSome body.\n\n- item one\n- item two\n1. first\n");
        assert_eq!(
            blocks,
            vec![
                heading(1, "A"),
                paragraph("Some body."),
                Block::Spacer,
                bullet("item one"),
                bullet("item two"),
                Block::Numbered {
                    text: "1. first".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_shouted_line_becomes_subheading() {
        assert_eq!(layout_raw("TOTAL BUDGET"), vec![heading(2, "TOTAL BUDGET")]);
    }

    #[test]
    fn test_titlecase_char_disqualifies_shouted_line() {
        assert!(is_shouted("DŽ SECURITY POLICY"));
        assert!(!is_shouted("ǅ SECURITY POLICY"));
        assert!(!is_titlecase('A'));
        assert!(!is_titlecase('7'));
        assert!(is_titlecase('ǅ'));
    }

    #[test]
    fn test_short_shouted_line_stays_paragraph() {
        assert_eq!(layout_raw("SCOPE"), vec![paragraph("SCOPE")]);
        // exactly 10 chars is not enough
        assert_eq!(layout_raw("ABCDE FGHI"), vec![paragraph("ABCDE FGHI")]);
    }

    #[test]
    fn test_trailing_colon_promotes_and_is_stripped() {
        assert_eq!(
            layout_raw("Roles and responsibilities:"),
            vec![heading(2, "Roles and responsibilities")]
        );
    }

    #[test]
    fn test_colon_check_precedes_bullet_check() {
        assert_eq!(layout_raw("- Requirements:"), vec![heading(2, "- Requirements")]);
    }

    #[test]
    fn test_heading_markers_removed_everywhere_in_line() {
        assert_eq!(layout_raw("## Scope ## notes"), vec![heading(2, "Scope  notes")]);
        assert_eq!(layout_raw("# C# usage"), vec![heading(1, "C usage")]);
    }

    #[test]
    fn test_bullet_marker_variants() {
        assert_eq!(layout_raw("-no space"), vec![bullet("no space")]);
        assert_eq!(layout_raw("* starred item"), vec![bullet("starred item")]);
        assert_eq!(layout_raw("\u{2022} dotted item"), vec![bullet("dotted item")]);
    }

    #[test]
    fn test_numbered_item_detection() {
        assert_eq!(
            layout_raw("2) Review access quarterly"),
            vec![Block::Numbered {
                text: "2) Review access quarterly".to_string()
            }]
        );
        assert_eq!(
            layout_raw("12. Twelfth control"),
            vec![Block::Numbered {
                text: "12. Twelfth control".to_string()
            }]
        );
        // zero is not a list start
        assert_eq!(layout_raw("0. Zero"), vec![paragraph("0. Zero")]);
        // delimiter outside the five-char window
        assert_eq!(layout_raw("2026 was. a year"), vec![paragraph("2026 was. a year")]);
    }

    #[test]
    fn test_consecutive_lines_merge_into_one_paragraph() {
        assert_eq!(
            layout_raw("First line\nsecond line\n## Next"),
            vec![paragraph("First line second line"), heading(2, "Next")]
        );
    }

    #[test]
    fn test_blank_without_open_paragraph_emits_nothing() {
        assert_eq!(
            layout_raw("# Title\n\n\n- item"),
            vec![heading(1, "Title"), bullet("item")]
        );
    }

    #[test]
    fn test_sanitized_text_flows_through_layout() {
        let policy = sanitize("Certainly! # Purpose\n**Intro** text\n\u{2022} item");
        assert_eq!(
            layout_body(&policy),
            vec![heading(1, "Purpose"), paragraph("Intro text"), bullet("item")]
        );
    }

    #[test]
    fn test_cover_layout() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        let doc = RenderedDocument::build(&form(), &sanitize("# Body"), date);

        assert_eq!(doc.title, "Acme Dental Information Security Policy");
        let Block::Styled { alignment, runs } = &doc.cover[0] else {
            panic!("expected brand mark");
        };
        assert_eq!(*alignment, Alignment::Right);
        assert_eq!(runs[0].text, "CRIMSON IT");
        assert!(runs[0].bold);

        let Block::Styled { runs, .. } = &doc.cover[1] else {
            panic!("expected client title");
        };
        assert_eq!(runs[0].text, "ACME DENTAL");

        let Block::Styled { runs, alignment } = &doc.cover[3] else {
            panic!("expected info block");
        };
        assert_eq!(*alignment, Alignment::Center);
        assert_eq!(runs[0].text, "Document Generated: March 04, 2026");
        assert!(runs[0].italic);
        assert_eq!(runs[1].text, "Managed by: Crimson IT (MSP/MSSP)");
        assert!(runs[1].line_break_before);
    }

    #[test]
    fn test_block_order_is_cover_body_footer() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let doc = RenderedDocument::build(&form(), &sanitize("# Body"), date);
        let blocks: Vec<&Block> = doc.blocks().collect();
        assert_eq!(blocks.len(), doc.cover.len() + 1 + doc.footer.len());
        assert_eq!(*blocks[doc.cover.len()], heading(1, "Body"));
        let Some(Block::Styled { runs, .. }) = blocks.last() else {
            panic!("expected footer");
        };
        assert!(runs[0].text.contains("AI-powered policy generator"));
    }
}
