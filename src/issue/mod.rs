//! The issue being built and everything read from its input directory.

mod layout;
mod series;

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::error::{Error, ExtractionReport, Result};
use crate::markdown::{PieceFields, extract_fields};
use crate::util::{read_required_bytes, read_required_text};

pub use layout::{FRONT_MATTER, Layout, PIECE_COUNT};
pub use series::Series;

static ISSUE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Issue +(\d+)").expect("issue number pattern is valid")
});

/// The kind of creative work a piece is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Story,
    Poem,
    Reprint,
}

impl PieceKind {
    /// Kinds repeat in this order, starting with ordinal 1.
    pub const CYCLE: [PieceKind; 3] = [PieceKind::Story, PieceKind::Poem, PieceKind::Reprint];

    /// `kind(ordinal) = CYCLE[(ordinal - 1) % 3]` for 1-based ordinals.
    pub fn for_ordinal(ordinal: usize) -> Self {
        Self::CYCLE[ordinal.saturating_sub(1) % Self::CYCLE.len()]
    }

    pub fn file_suffix(self) -> &'static str {
        match self {
            PieceKind::Story => "story",
            PieceKind::Poem => "poem",
            PieceKind::Reprint => "reprint",
        }
    }
}

/// An introductory page with an externally supplied title.
#[derive(Debug, Clone)]
pub struct FrontMatter {
    pub path: PathBuf,
    pub title: String,
    pub source: String,
}

/// An encoded image read from disk.
#[derive(Debug, Clone)]
pub struct Image {
    pub path: PathBuf,
    pub data: Vec<u8>,
}

/// One story, poem or reprint with its author's bio and headshot.
#[derive(Debug, Clone)]
pub struct Piece {
    /// 1-based position in the issue.
    pub ordinal: usize,
    pub kind: PieceKind,
    pub path: PathBuf,
    pub source: String,
    pub title: String,
    pub author: String,
    pub bio: String,
    pub headshot: Image,
}

impl Piece {
    /// File stem of the piece source, e.g. `1a-story`.
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}a-{}", self.ordinal, self.kind.file_suffix()))
    }
}

/// Everything needed to assemble one issue.
#[derive(Debug, Clone)]
pub struct Issue {
    pub number: u32,
    pub editors: Vec<String>,
    /// Marked-up description (a single HTML paragraph).
    pub description: String,
    pub front_matter: Vec<FrontMatter>,
    pub pieces: Vec<Piece>,
    pub cover: Image,
    pub stylesheet: String,
}

impl Issue {
    /// Read and validate every input under `layout`.
    ///
    /// Missing files abort immediately. Title/author extraction runs over
    /// all pieces first and reports every failing file together.
    pub fn load(layout: &Layout) -> Result<Self> {
        info!("Loading issue from {}", layout.root().display());

        let front_matter = layout
            .front_matter()
            .map(|(path, title)| {
                let source = read_required_text(&path)?;
                Ok(FrontMatter {
                    path,
                    title: title.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let number = parse_issue_number(&front_matter[0].source, &layout.about_path())?;

        let sources = (1..=PIECE_COUNT)
            .map(|ordinal| {
                let path = layout.piece_path(ordinal);
                let source = read_required_text(&path)?;
                Ok((path, source))
            })
            .collect::<Result<Vec<_>>>()?;

        let fields = extract_all(&sources)?;

        let mut pieces = Vec::with_capacity(PIECE_COUNT);
        for (idx, ((path, source), PieceFields { title, author })) in
            sources.into_iter().zip(fields).enumerate()
        {
            let ordinal = idx + 1;
            let bio = read_required_text(&layout.bio_path(ordinal))?;
            let headshot = read_image(&layout.headshot_path(ordinal))?;
            debug!(ordinal, %title, %author, "Loaded piece");
            pieces.push(Piece {
                ordinal,
                kind: PieceKind::for_ordinal(ordinal),
                path,
                source,
                title,
                author,
                bio,
                headshot,
            });
        }

        let editors = parse_editors(&read_required_text(&layout.editors_path())?);
        let description = read_required_text(&layout.description_path())?;
        let cover = read_image(&layout.cover_path())?;
        let stylesheet = read_required_text(&layout.stylesheet_path())?;

        info!(
            "Loaded issue {number}: {} front matter pages, {} pieces, {} editors",
            front_matter.len(),
            pieces.len(),
            editors.len()
        );

        Ok(Self {
            number,
            editors,
            description,
            front_matter,
            pieces,
            cover,
            stylesheet,
        })
    }

    /// Piece authors in piece order, each name listed once.
    pub fn distinct_authors(&self) -> Vec<&str> {
        let mut authors: Vec<&str> = Vec::new();
        for piece in &self.pieces {
            if !authors.contains(&piece.author.as_str()) {
                authors.push(&piece.author);
            }
        }
        authors
    }
}

/// Extract title and author from every piece, collecting all failures.
pub fn extract_all(sources: &[(PathBuf, String)]) -> Result<Vec<PieceFields>> {
    let mut report = ExtractionReport::default();
    let mut fields = Vec::with_capacity(sources.len());

    for (path, source) in sources {
        match extract_fields(source) {
            Ok(f) => fields.push(f),
            Err(missing) => report.push(path.clone(), missing),
        }
    }

    report.into_result()?;
    Ok(fields)
}

/// The first "Issue <N>" number in the text read from `path`.
///
/// No match is `MissingIssueNumber`. A number that overflows `u32` is
/// `InvalidIssueNumber`.
pub fn parse_issue_number(text: &str, path: &Path) -> Result<u32> {
    let digits = ISSUE_NUMBER
        .captures(text)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| Error::MissingIssueNumber {
            path: path.to_path_buf(),
        })?
        .as_str();
    digits.parse().map_err(|_| Error::InvalidIssueNumber {
        path: path.to_path_buf(),
        digits: digits.to_string(),
    })
}

/// One editor per line; surrounding whitespace and blank lines are dropped.
pub fn parse_editors(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_image(path: &Path) -> Result<Image> {
    Ok(Image {
        path: path.to_path_buf(),
        data: read_required_bytes(path)?,
    })
}
