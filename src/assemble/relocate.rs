//! Splitting a rendered reprint into its piece body and its own endmatter.
//!
//! Reprints carry their original copyright notice at the end of the source.
//! The rendered markup is split once, at the first copyright paragraph, so
//! the assembler never has to search finished section markup again.

use memchr::memmem;

/// Opening of the rendered paragraph that starts a reprint's endmatter.
pub const COPYRIGHT_MARKER: &str = "<p>Copyright ©";

/// A reprint body with its trailing copyright block split off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocated {
    /// Markup before the copyright paragraph.
    pub body: String,
    /// The copyright paragraph and everything after it, if found.
    pub endmatter: Option<String>,
}

/// Split rendered reprint markup at the first copyright paragraph.
///
/// Without a marker the body is returned untouched and `endmatter` is
/// `None`; the caller decides how to report that.
pub fn split_copyright(mut rendered: String) -> Relocated {
    match memmem::find(rendered.as_bytes(), COPYRIGHT_MARKER.as_bytes()) {
        Some(pos) => {
            let endmatter = rendered.split_off(pos);
            Relocated {
                body: rendered,
                endmatter: Some(endmatter),
            }
        }
        None => Relocated {
            body: rendered,
            endmatter: None,
        },
    }
}
