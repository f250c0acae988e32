//! Pure escaping utilities for line-at-a-time Markdown rendering.
//!
//! Poem lines are rendered one at a time with only inline formatting. A
//! CommonMark parser would otherwise read some lines as block constructs
//! (`# heading`, `- item`, `1. item`, `---`, `> quote`, fenced code), so the
//! marker that would open the block is backslash-escaped first.

use std::borrow::Cow;

/// Escape the character that would make `line` open a Markdown block.
///
/// Leading whitespace is expected to have been removed by the caller.
/// Lines that cannot start a block are returned unchanged.
///
/// # Examples
///
/// ```
/// use magbind::markdown::escape_block_start;
///
/// assert_eq!(escape_block_start("# not a heading"), "\\# not a heading");
/// assert_eq!(escape_block_start("1. not a list"), "1\\. not a list");
/// assert_eq!(escape_block_start("*just emphasis*"), "*just emphasis*");
/// ```
pub fn escape_block_start(line: &str) -> Cow<'_, str> {
    let Some(first) = line.chars().next() else {
        return Cow::Borrowed(line);
    };

    let needs_prefix = match first {
        '#' | '>' => true,
        '-' | '+' | '*' => is_thematic_break(line, first) || followed_by_space(line, 1),
        '_' => is_thematic_break(line, first),
        '`' | '~' => line.chars().take_while(|&c| c == first).count() >= 3,
        _ => false,
    };

    if needs_prefix {
        return Cow::Owned(format!("\\{line}"));
    }

    if let Some(delim) = ordered_list_delimiter(line) {
        let mut escaped = String::with_capacity(line.len() + 1);
        escaped.push_str(&line[..delim]);
        escaped.push('\\');
        escaped.push_str(&line[delim..]);
        return Cow::Owned(escaped);
    }

    Cow::Borrowed(line)
}

/// Whether `line` on its own is a Markdown thematic break (`---`, `* * *`).
pub(crate) fn is_rule(line: &str) -> bool {
    match line.chars().next() {
        Some(marker @ ('-' | '*' | '_')) => is_thematic_break(line, marker),
        _ => false,
    }
}

/// Three or more of the same marker, optionally separated by spaces.
fn is_thematic_break(line: &str, marker: char) -> bool {
    let mut count = 0;
    for c in line.trim_end().chars() {
        if c == marker {
            count += 1;
        } else if c != ' ' && c != '\t' {
            return false;
        }
    }
    count >= 3
}

fn followed_by_space(line: &str, at: usize) -> bool {
    match line.as_bytes().get(at) {
        None => true,
        Some(b) => b.is_ascii_whitespace(),
    }
}

/// Byte offset of the `.`/`)` in an ordered list marker like `12. `.
fn ordered_list_delimiter(line: &str) -> Option<usize> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || digits > 9 {
        return None;
    }
    match line.as_bytes().get(digits) {
        Some(b'.') | Some(b')') if followed_by_space(line, digits + 1) => Some(digits),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_and_quotes_are_escaped() {
        assert_eq!(escape_block_start("#hash"), "\\#hash");
        assert_eq!(escape_block_start("> quoted"), "\\> quoted");
    }

    #[test]
    fn test_list_markers_need_following_space() {
        assert_eq!(escape_block_start("- item"), "\\- item");
        assert_eq!(escape_block_start("+ item"), "\\+ item");
        assert_eq!(escape_block_start("-dash"), "-dash");
        assert_eq!(escape_block_start("**bold** start"), "**bold** start");
    }

    #[test]
    fn test_rules() {
        assert!(is_rule("---"));
        assert!(is_rule("* * *"));
        assert!(is_rule("___  "));
        assert!(!is_rule("--"));
        assert!(!is_rule("__strong__"));
        assert!(!is_rule("- - x"));
        assert!(!is_rule(""));
    }

    #[test]
    fn test_ordered_list_markers() {
        assert_eq!(escape_block_start("3) three"), "3\\) three");
        assert_eq!(escape_block_start("1984 was a year"), "1984 was a year");
        assert_eq!(escape_block_start("3.14 is pi"), "3.14 is pi");
    }

    #[test]
    fn test_fences() {
        assert_eq!(escape_block_start("```"), "\\```");
        assert_eq!(escape_block_start("``code``"), "``code``");
    }

    #[test]
    fn test_plain_lines_are_borrowed() {
        assert!(matches!(escape_block_start("plain line"), Cow::Borrowed(_)));
        assert!(matches!(escape_block_start(""), Cow::Borrowed(_)));
    }
}
