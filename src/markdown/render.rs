//! Markdown → XHTML rendering.
//!
//! All rendering goes through pulldown-cmark with smart punctuation enabled
//! (curly quotes, dashes, ellipses), plus a handful of symbol replacements
//! applied to text runs. Output is well-formed XHTML: void elements are
//! self-closed and text is entity-escaped.

use std::borrow::Cow;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};

use super::escape::escape_block_start;

/// Symbol replacements applied to every text run.
const REPLACEMENTS: &[(&str, &str)] = &[
    ("(c)", "©"),
    ("(C)", "©"),
    ("(r)", "®"),
    ("(R)", "®"),
    ("(tm)", "™"),
    ("(TM)", "™"),
    ("+-", "±"),
];

/// Parser options shared by every renderer and by the field extractor.
pub(crate) fn parser_options() -> Options {
    Options::ENABLE_SMART_PUNCTUATION
}

/// Apply symbol replacements such as `(c)` → `©`.
pub fn replace_symbols(text: &str) -> Cow<'_, str> {
    if !REPLACEMENTS.iter().any(|(from, _)| text.contains(from)) {
        return Cow::Borrowed(text);
    }
    let mut out = text.to_string();
    for (from, to) in REPLACEMENTS {
        if out.contains(from) {
            out = out.replace(from, to);
        }
    }
    Cow::Owned(out)
}

fn typographic(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Text(text) => match replace_symbols(&text) {
            Cow::Borrowed(_) => Event::Text(text),
            Cow::Owned(replaced) => Event::Text(CowStr::from(replaced)),
        },
        other => other,
    }
}

fn events(text: &str) -> impl Iterator<Item = Event<'_>> {
    Parser::new_ext(text, parser_options()).map(typographic)
}

/// Render a Markdown document to block-level XHTML.
///
/// # Examples
///
/// ```
/// use magbind::markdown::render_markdown;
///
/// assert_eq!(render_markdown("Hello _there_."), "<p>Hello <em>there</em>.</p>\n");
/// ```
pub fn render_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 2);
    html::push_html(&mut out, events(text));
    out
}

/// Render prose: stories and reprints.
///
/// A thematic break directly followed by a paragraph is a scene break: the
/// rule is dropped and the paragraph gets the `noindent` class.
pub fn render_story(text: &str) -> String {
    let mut rewritten = Vec::new();
    let mut iter = events(text).peekable();

    while let Some(event) = iter.next() {
        if matches!(event, Event::Rule) && matches!(iter.peek(), Some(Event::Start(Tag::Paragraph)))
        {
            iter.next();
            rewritten.push(Event::Html(CowStr::Borrowed("<p class=\"noindent\">")));
            continue;
        }
        rewritten.push(event);
    }

    let mut out = String::with_capacity(text.len() + text.len() / 2);
    html::push_html(&mut out, rewritten.into_iter());
    out
}

/// Render a single line with inline formatting only.
///
/// Block syntax at the start of the line is treated as literal text, so
/// `# word` stays `# word` rather than becoming a heading. Leading spaces
/// are kept as-is.
///
/// # Examples
///
/// ```
/// use magbind::markdown::render_inline;
///
/// assert_eq!(render_inline("**second** line"), "<strong>second</strong> line");
/// assert_eq!(render_inline("# not a heading"), "# not a heading");
/// ```
pub fn render_inline(line: &str) -> String {
    let content = line.trim_start_matches(' ');
    let indent = &line[..line.len() - content.len()];
    let escaped = escape_block_start(content);

    let inline = events(&escaped).filter(|event| {
        !matches!(
            event,
            Event::Start(Tag::Paragraph) | Event::End(TagEnd::Paragraph)
        )
    });

    let mut out = String::with_capacity(line.len() + 16);
    out.push_str(indent);
    html::push_html(&mut out, inline);
    let trimmed = out.trim_end_matches('\n').len();
    out.truncate(trimmed);
    out
}
