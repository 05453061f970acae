//! Content Sanitizer: strips assistant chatter and formatting noise from model output.
//!
//! Pure and infallible. Steps run in a fixed order because later steps assume the
//! earlier normalization (bullet glyphs are rewritten before line filtering, so a
//! lone glyph line that was normalized to `-` survives the artifact filter).

/// Openers stripped from the very start of the response. First match wins; case-sensitive.
pub const CONVERSATIONAL_PREFIXES: &[&str] = &[
    "Certainly!",
    "Certainly,",
    "Certainly.",
    "Sure!",
    "Sure,",
    "Of course!",
    "Of course,",
    "Here is",
    "Here's",
    "Below is",
    "I'll",
    "I can",
    "Let me",
    "I'd be happy to",
    "Here you go",
    "Absolutely!",
    "Absolutely,",
    "No problem!",
    "No problem,",
    "I have aligned",
    "I have created",
    "This policy",
    "The following",
];

/// Lowercase phrases that mark a line as assistant commentary.
pub const CHATTER_PHRASES: &[&str] = &[
    "if you'd like",
    "would you like",
    "let me know if",
    "feel free to",
    "i can also",
    "i'd be happy to",
    "please let me know",
    "if you need",
    "would you prefer",
    "shall i",
    "do you want",
    "comprehensive information security policy",
    "tailored to the organization",
    "i have aligned",
    "aligned it with",
    "below is a",
    "here is a",
];

/// Separator used by the models and by the cover page.
pub const RULE_LINE: &str = "____________________________________________________________";

/// Lines dropped when they consist of exactly one of these.
const ARTIFACT_LINES: &[&str] = &["--", RULE_LINE, "\u{2022}", "\u{25E6}", "\u{25AA}"];

const BULLET_GLYPHS: &[char] = &['\u{2022}', '\u{25E6}', '\u{25AA}'];
const DASHES: &[char] = &['\u{2014}', '\u{2013}'];

/// Duplicate-title guard: a title line naming this client is dropped.
const DUPLICATE_TITLE_CLIENT: &str = "abilityfirst";
const DUPLICATE_TITLE_PHRASE: &str = "information security policy";

/// Sanitized, line-oriented policy body. Produced only by [`sanitize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyText(String);

impl PolicyText {
    /// Wraps text without sanitizing it, for layout tests that need blank lines.
    #[cfg(test)]
    pub(crate) fn from_trusted(text: &str) -> Self {
        Self(text.to_string())
    }

    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn lines(&self) -> std::str::Lines<'_> {
        self.0.lines()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for PolicyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Runs the full cleanup pipeline over raw model output.
pub fn sanitize(raw: &str) -> PolicyText {
    let text = strip_conversational_prefix(raw);
    let text = text.replace(DASHES, "-");
    let text = text.replace("**", "");
    let text = text.replace(BULLET_GLYPHS, "-");

    let cleaned: Vec<&str> = text
        .split('\n')
        .map(str::trim)
        .filter(|line| keep_line(line))
        .collect();

    PolicyText(cleaned.join("\n"))
}

/// Removes at most one enumerated opener from the trimmed text.
/// When nothing matches the text is returned as-is.
fn strip_conversational_prefix(raw: &str) -> &str {
    let trimmed = raw.trim();
    CONVERSATIONAL_PREFIXES
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .map(str::trim)
        .unwrap_or(raw)
}

fn keep_line(line: &str) -> bool {
    if line.is_empty() {
        return false;
    }

    let lower = line.to_lowercase();

    if CHATTER_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
        return false;
    }
    if ARTIFACT_LINES.contains(&line) {
        return false;
    }
    if lower.starts_with(DUPLICATE_TITLE_CLIENT) && lower.contains(DUPLICATE_TITLE_PHRASE) {
        return false;
    }

    true
}
