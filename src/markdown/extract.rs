//! Title and author extraction from a piece's Markdown source.
//!
//! The first level-one heading is the title and the first level-two heading
//! is the author (with any leading "by" removed). Later headings of either
//! level are ignored.

use std::sync::LazyLock;

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use regex::Regex;

use crate::error::MissingField;

use super::render::{parser_options, replace_symbols};

static BY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^by(\s+|$)").expect("by-prefix pattern is valid")
});

/// Title and author of a piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceFields {
    pub title: String,
    pub author: String,
}

/// Which heading, if any, the scanner is collecting text for.
enum Scan {
    Outside,
    Capturing(HeadingLevel, String),
}

/// Extract the title and author from a piece's Markdown.
///
/// Both headings are looked for before reporting, so a piece missing both
/// yields both [`MissingField`]s. A heading with no text counts as missing.
///
/// # Examples
///
/// ```
/// use magbind::markdown::extract_fields;
///
/// let fields = extract_fields("# The Lighthouse\n\n## By Ada Quill\n\nIt was dark.").unwrap();
/// assert_eq!(fields.title, "The Lighthouse");
/// assert_eq!(fields.author, "Ada Quill");
/// ```
pub fn extract_fields(markdown: &str) -> Result<PieceFields, Vec<MissingField>> {
    let mut title: Option<String> = None;
    let mut author: Option<String> = None;
    let mut scan = Scan::Outside;

    for event in Parser::new_ext(markdown, parser_options()) {
        scan = match (scan, event) {
            (Scan::Outside, Event::Start(Tag::Heading { level, .. }))
                if (level == HeadingLevel::H1 && title.is_none())
                    || (level == HeadingLevel::H2 && author.is_none()) =>
            {
                Scan::Capturing(level, String::new())
            }
            (Scan::Capturing(level, mut text), Event::Text(t) | Event::Code(t)) => {
                text.push_str(&replace_symbols(&t));
                Scan::Capturing(level, text)
            }
            (Scan::Capturing(level, mut text), Event::SoftBreak | Event::HardBreak) => {
                text.push(' ');
                Scan::Capturing(level, text)
            }
            (Scan::Capturing(level, text), Event::End(TagEnd::Heading(_))) => {
                let text = collapse_whitespace(&text);
                if level == HeadingLevel::H1 {
                    title = Some(text);
                } else {
                    author = Some(strip_by_prefix(&text));
                }
                Scan::Outside
            }
            (scan, _) => scan,
        };

        if title.is_some() && author.is_some() {
            break;
        }
    }

    let title = title.filter(|t| !t.is_empty());
    let author = author.filter(|a| !a.is_empty());

    match (title, author) {
        (Some(title), Some(author)) => Ok(PieceFields { title, author }),
        (title, author) => {
            let mut missing = Vec::new();
            if title.is_none() {
                missing.push(MissingField::Title);
            }
            if author.is_none() {
                missing.push(MissingField::Author);
            }
            Err(missing)
        }
    }
}

/// Remove a leading "by " (any case) from an author line.
pub fn strip_by_prefix(author: &str) -> String {
    BY_PREFIX.replace(author.trim(), "").trim().to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
