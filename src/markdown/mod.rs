//! Markdown handling for issue content.
//!
//! - [`extract`]: title and author extraction from a piece's headings
//! - [`render`]: Markdown → XHTML for stories, front matter and bios
//! - [`poem`]: line-preserving formatting for verse
//! - [`escape`]: helpers for rendering a single line without block syntax
//!
//! Everything here is pure string transformation; reading files is left to
//! the [`issue`](crate::issue) layer.

mod escape;
mod extract;
mod poem;
mod render;

pub use escape::escape_block_start;
pub use extract::{PieceFields, extract_fields, strip_by_prefix};
pub use poem::{PoemError, PoemMarkup, format_poem};
pub use render::{render_inline, render_markdown, render_story, replace_symbols};
