//! Line-by-line formatting for verse.
//!
//! Poems keep their line structure: every source line after the leading
//! headings becomes its own `<div class="poem">` block, blank lines included.
//! A line holding only a thematic break (`---`, `* * *`) becomes `<hr />`.

use std::fmt;

use super::escape::is_rule;
use super::render::render_inline;

/// Deepest heading level a poem may open with.
const MAX_HEADING_LEVEL: usize = 6;
/// Deepest tab indent a poem line may use (`tab1`..`tab4`).
const MAX_INDENT: usize = 4;

/// Non-breaking space appended to each line so readers keep blank lines.
const LINE_END: &str = "&#160;";

/// A poem line that can't be formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoemError {
    /// 1-based line number in the source.
    pub line: usize,
    pub reason: String,
}

impl fmt::Display for PoemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

impl std::error::Error for PoemError {}

/// Where the formatter is in the poem.
///
/// The only transition is `Headings` → `Lines`, taken at the first
/// non-blank line that is not a heading. It is never reversed: a later
/// line starting with `#` is verse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Headings,
    Lines,
}

/// Formatted poem markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoemMarkup {
    /// Heading blocks from before the first verse line.
    pub headings: String,
    /// One `<div class="poem">` per verse line.
    pub lines: String,
}

impl PoemMarkup {
    pub fn into_html(self) -> String {
        let mut html = self.headings;
        html.push_str(&self.lines);
        html
    }
}

/// Format a poem's Markdown source.
///
/// # Examples
///
/// ```
/// use magbind::markdown::format_poem;
///
/// let poem = format_poem("# Tide\n\nfirst line\n\nlast line\n").unwrap();
/// assert_eq!(poem.headings, "<h1>Tide</h1>\n\n");
/// assert_eq!(
///     poem.lines,
///     "<div class=\"poem\">first line&#160;</div>\n\
///      <div class=\"poem\">&#160;</div>\n\
///      <div class=\"poem\">last line&#160;</div>\n"
/// );
/// ```
pub fn format_poem(source: &str) -> Result<PoemMarkup, PoemError> {
    let mut markup = PoemMarkup::default();
    let mut phase = Phase::Headings;

    for (idx, line) in source.lines().enumerate() {
        let line_no = idx + 1;

        if phase == Phase::Headings {
            if line.trim().is_empty() {
                continue;
            }
            let hashes = line.bytes().take_while(|&b| b == b'#').count();
            if hashes > 0 {
                markup.headings.push_str(&format_heading(line, hashes, line_no)?);
                continue;
            }
            phase = Phase::Lines;
        }

        markup.lines.push_str(&format_line(line, line_no)?);
    }

    Ok(markup)
}

fn format_heading(line: &str, level: usize, line_no: usize) -> Result<String, PoemError> {
    if level > MAX_HEADING_LEVEL {
        return Err(PoemError {
            line: line_no,
            reason: format!("too many hash marks ({level}) in heading"),
        });
    }
    let text = render_inline(line[level..].trim());
    Ok(format!("<h{level}>{text}</h{level}>\n\n"))
}

fn format_line(line: &str, line_no: usize) -> Result<String, PoemError> {
    if line.trim().is_empty() {
        return Ok(format!("<div class=\"poem\">{LINE_END}</div>\n"));
    }
    if is_rule(line.trim_matches([' ', '\t'])) {
        return Ok("<hr />\n".to_string());
    }

    let tabs = line.bytes().take_while(|&b| b == b'\t').count();
    if tabs > MAX_INDENT {
        return Err(PoemError {
            line: line_no,
            reason: format!("too many tabs ({tabs}) in line"),
        });
    }

    let text = render_inline(&line[tabs..]);
    if tabs == 0 {
        Ok(format!("<div class=\"poem\">{text}{LINE_END}</div>\n"))
    } else {
        Ok(format!(
            "<div class=\"poem tab{tabs}\">{text}{LINE_END}</div>\n"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn html(source: &str) -> String {
        format_poem(source).unwrap().into_html()
    }

    #[test]
    fn test_wraps_lines_in_divs() {
        assert_eq!(
            html("first line\nsecond line\n"),
            "<div class=\"poem\">first line&#160;</div>\n\
             <div class=\"poem\">second line&#160;</div>\n"
        );
    }

    #[test]
    fn test_parses_markdown_in_a_given_line() {
        assert_eq!(
            html("_first_ line\n**second** line\n"),
            "<div class=\"poem\"><em>first</em> line&#160;</div>\n\
             <div class=\"poem\"><strong>second</strong> line&#160;</div>\n"
        );
    }

    #[test]
    fn test_renders_blank_lines_as_div_with_non_breaking_space() {
        assert_eq!(
            html("start line\n\nend line\n"),
            "<div class=\"poem\">start line&#160;</div>\n\
             <div class=\"poem\">&#160;</div>\n\
             <div class=\"poem\">end line&#160;</div>\n"
        );
    }

    #[test]
    fn test_skips_leading_blank_lines() {
        assert_eq!(
            html("\n\n\nstart line\nend line\n"),
            "<div class=\"poem\">start line&#160;</div>\n\
             <div class=\"poem\">end line&#160;</div>\n"
        );
    }

    #[test]
    fn test_converts_hashes_to_headings() {
        assert_eq!(html("# Title"), "<h1>Title</h1>\n\n");
        assert_eq!(html("##Title _Italics_"), "<h2>Title <em>Italics</em></h2>\n\n");
        assert_eq!(html("######Deep"), "<h6>Deep</h6>\n\n");
    }

    #[test]
    fn test_headings_then_lines() {
        let poem = format_poem("# Title\n\n## by Poet\n\n\nverse\n").unwrap();
        assert_eq!(poem.headings, "<h1>Title</h1>\n\n<h2>by Poet</h2>\n\n");
        assert_eq!(poem.lines, "<div class=\"poem\">verse&#160;</div>\n");
    }

    #[test]
    fn test_hash_after_content_is_verse() {
        let poem = format_poem("# Title\nverse\n# not a heading\n").unwrap();
        assert_eq!(
            poem.lines,
            "<div class=\"poem\">verse&#160;</div>\n\
             <div class=\"poem\"># not a heading&#160;</div>\n"
        );
    }

    #[test]
    fn test_honors_horizontal_rules() {
        assert_eq!(
            html("first line\n\n---\n\nsecond line\n"),
            "<div class=\"poem\">first line&#160;</div>\n\
             <div class=\"poem\">&#160;</div>\n\
             <hr />\n\
             <div class=\"poem\">&#160;</div>\n\
             <div class=\"poem\">second line&#160;</div>\n"
        );
    }

    #[test]
    fn test_stanza_rules() {
        assert_eq!(
            html("first stanza\n\t* * *\nsecond stanza\n___\n"),
            "<div class=\"poem\">first stanza&#160;</div>\n\
             <hr />\n\
             <div class=\"poem\">second stanza&#160;</div>\n\
             <hr />\n"
        );
        // Two dashes are verse, not a rule
        assert_eq!(html("--\n"), "<div class=\"poem\">–&#160;</div>\n");
    }

    #[test]
    fn test_raises_error_on_seven_hashes() {
        let err = format_poem("\n#######Nope").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_adds_indent_class_on_tabs() {
        assert_eq!(
            html("\tIndent one\n\t\tIndent two"),
            "<div class=\"poem tab1\">Indent one&#160;</div>\n\
             <div class=\"poem tab2\">Indent two&#160;</div>\n"
        );
    }

    #[test]
    fn test_raises_error_on_five_tabs() {
        let err = format_poem("\t\t\t\t\tNope").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.reason.contains("tabs"));
    }

    proptest! {
        #[test]
        fn prop_one_block_per_line_after_headings(
            lines in prop::collection::vec("[a-z][a-z ,.#]{0,30}|", 1..20),
        ) {
            // First line must be verse so the heading phase ends immediately.
            let mut source = String::from("# Title\n\nopening line\n");
            for line in &lines {
                source.push_str(line);
                source.push('\n');
            }
            let poem = format_poem(&source).unwrap();
            prop_assert_eq!(poem.lines.matches("<div class=\"poem\">").count(), lines.len() + 1);
            prop_assert_eq!(poem.lines.lines().count(), lines.len() + 1);
        }
    }
}
