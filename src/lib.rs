//! # magbind
//!
//! Assembles one issue of a periodical from a directory of Markdown, text
//! and image files into a single EPUB package.
//!
//! ## Pipeline
//!
//! 1. [`Issue::load`] reads every input named by a [`Layout`] and extracts
//!    each piece's title and author, reporting all bad pieces at once.
//! 2. [`assemble_package`] renders the navigation page, the front matter
//!    and the nine pieces into ordered [`Section`]s, registers the
//!    stylesheet, cover and headshots as [`Asset`]s, and fixes spine and
//!    table of contents to section order.
//! 3. A [`PackageWriter`] (by default [`EpubWriter`]) serializes the
//!    [`Package`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use magbind::{BuildOptions, build_issue};
//!
//! let report = build_issue(&BuildOptions::new("issue-12"))?;
//! println!("wrote {}", report.output_path.display());
//! for warning in &report.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! # Ok::<(), magbind::Error>(())
//! ```

pub mod assemble;
pub mod book;
pub mod build;
pub mod epub;
pub mod error;
pub mod issue;
pub mod markdown;
pub mod media;
pub(crate) mod util;

pub use assemble::{SectionAssembler, Warning};
pub use book::{Asset, Cover, Metadata, Package, Section, SectionKind, SpineItem, TocEntry};
pub use build::{BuildOptions, BuildReport, assemble_package, build_issue, collect_metadata};
pub use epub::{EpubWriter, PackageWriter, read_epub, write_epub};
pub use error::{Error, ExtractionReport, MissingField, Result};
pub use issue::{Issue, Layout, Piece, PieceKind, Series};
