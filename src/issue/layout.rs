//! Conventional file names for an issue's inputs.
//!
//! ```text
//! <root>/
//!   stylesheet.css
//!   content/
//!     0a-about.md  0b-cover-artist.md  0c-keyhole.md
//!     1a-story.md  1b-author.md   ...   9a-reprint.md  9b-author.md
//!     editors.txt  description.html
//!   images/
//!     cover.jpg  1-author.jpg ... 9-author.jpg
//! ```

use std::path::{Path, PathBuf};

use super::PieceKind;

/// Number of pieces in an issue.
pub const PIECE_COUNT: usize = 9;

/// Front matter files in reading order, with their display titles.
pub const FRONT_MATTER: [(&str, &str); 3] = [
    ("0a-about.md", "Title Page & Copyright"),
    ("0b-cover-artist.md", "About the Cover Artist"),
    ("0c-keyhole.md", "Thru the Keyhole"),
];

/// Locations of every input file, relative to an issue root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn content_dir(&self) -> PathBuf {
        self.root.join("content")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    /// Front matter paths paired with their display titles.
    pub fn front_matter(&self) -> impl Iterator<Item = (PathBuf, &'static str)> + '_ {
        FRONT_MATTER
            .iter()
            .map(|(name, title)| (self.content_dir().join(name), *title))
    }

    /// The front matter file holding the issue number.
    pub fn about_path(&self) -> PathBuf {
        self.content_dir().join(FRONT_MATTER[0].0)
    }

    /// `content/{n}a-{kind}.md`
    pub fn piece_path(&self, ordinal: usize) -> PathBuf {
        let kind = PieceKind::for_ordinal(ordinal);
        self.content_dir()
            .join(format!("{ordinal}a-{}.md", kind.file_suffix()))
    }

    /// `content/{n}b-author.md`
    pub fn bio_path(&self, ordinal: usize) -> PathBuf {
        self.content_dir().join(format!("{ordinal}b-author.md"))
    }

    /// `images/{n}-author.jpg`
    pub fn headshot_path(&self, ordinal: usize) -> PathBuf {
        self.images_dir().join(format!("{ordinal}-author.jpg"))
    }

    pub fn cover_path(&self) -> PathBuf {
        self.images_dir().join("cover.jpg")
    }

    pub fn editors_path(&self) -> PathBuf {
        self.content_dir().join("editors.txt")
    }

    pub fn description_path(&self) -> PathBuf {
        self.content_dir().join("description.html")
    }

    pub fn stylesheet_path(&self) -> PathBuf {
        self.root.join("stylesheet.css")
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(".")
    }
}
