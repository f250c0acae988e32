//! The EPUB package writer, its cover page and a reader for checking output.

mod cover;
mod reader;
mod writer;

pub use cover::{COVER_PAGE_HREF, COVER_PAGE_ID, cover_page};
pub use reader::{EpubContents, ManifestItem, read_epub, read_epub_from_reader};
pub use writer::{EpubConfig, EpubWriter, PackageWriter, write_epub, write_epub_to_writer};
