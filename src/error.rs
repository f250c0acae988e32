//! Error types for magbind operations.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can abort an issue build.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Missing required input file: {}", path.display())]
    MissingInputFile { path: PathBuf },

    #[error("Couldn't find issue number (\"Issue <N>\") in {}", path.display())]
    MissingIssueNumber { path: PathBuf },

    #[error("Issue number {digits} in {} is out of range", path.display())]
    InvalidIssueNumber { path: PathBuf, digits: String },

    #[error("{0}")]
    Extraction(ExtractionReport),

    #[error("Invalid poem {} at line {line}: {reason}", path.display())]
    InvalidPoem {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Invalid image {}: {source}", path.display())]
    InvalidImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid package: {0}")]
    InvalidPackage(String),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A heading the field extractor could not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Title,
    Author,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingField::Title => {
                f.write_str("missing title (no `#` Markdown heading found)")
            }
            MissingField::Author => {
                f.write_str("missing author (no `##` Markdown heading found)")
            }
        }
    }
}

/// Extraction problems for a single piece file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceProblem {
    pub path: PathBuf,
    pub missing: Vec<MissingField>,
}

/// Every piece that failed title/author extraction in one run.
///
/// Pieces are all checked before the report is raised, so one run lists
/// every file that needs fixing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    pub problems: Vec<PieceProblem>,
}

impl ExtractionReport {
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn push(&mut self, path: impl Into<PathBuf>, missing: Vec<MissingField>) {
        self.problems.push(PieceProblem {
            path: path.into(),
            missing,
        });
    }

    /// Convert into an error if any problems were recorded.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Extraction(self))
        }
    }
}

impl fmt::Display for ExtractionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Issues finding titles/authors.")?;
        for problem in &self.problems {
            write!(f, "\n  {}:", problem.path.display())?;
            for field in &problem.missing {
                write!(f, " {field}.")?;
            }
        }
        Ok(())
    }
}
