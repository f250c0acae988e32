//! Section assembly: turning loaded inputs into rendered package sections.
//!
//! Every section gets its identity from an explicit position index: index 0
//! is the navigation document, later indices become `body{NN}`.

mod relocate;

use std::fmt;
use std::path::PathBuf;

use tracing::debug;

use crate::book::{Asset, Section, SectionKind};
use crate::error::{Error, Result};
use crate::issue::{FrontMatter, Piece, PieceKind};
use crate::markdown::{format_poem, render_markdown, render_story};
use crate::media::detect_media_format;
use crate::util::escape_xml;

pub use relocate::{COPYRIGHT_MARKER, Relocated, split_copyright};

/// Href of the generated navigation document.
pub const NAV_HREF: &str = "nav.xhtml";

/// A recoverable problem found while assembling. The build still completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A reprint without a `Copyright ©` paragraph to relocate.
    MissingReprintCopyright { path: PathBuf },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingReprintCopyright { path } => write!(
                f,
                "Couldn't find copyright statement in {}",
                path.display()
            ),
        }
    }
}

/// A piece section plus the headshot it references.
#[derive(Debug, Clone)]
pub struct AssembledPiece {
    pub section: Section,
    pub headshot: Asset,
    pub warning: Option<Warning>,
}

/// Section id for a position in assembly order.
pub fn section_id(index: usize) -> String {
    if index == 0 {
        "nav".to_string()
    } else {
        format!("body{index:02}")
    }
}

/// Section href for a position in assembly order.
pub fn section_href(index: usize) -> String {
    if index == 0 {
        NAV_HREF.to_string()
    } else {
        format!("body{index:02}.xhtml")
    }
}

/// Builds sections that all link one shared stylesheet.
#[derive(Debug, Clone)]
pub struct SectionAssembler {
    stylesheet_href: String,
    copyright_year: i32,
}

impl SectionAssembler {
    pub fn new(stylesheet_href: impl Into<String>, copyright_year: i32) -> Self {
        Self {
            stylesheet_href: stylesheet_href.into(),
            copyright_year,
        }
    }

    fn section(&self, index: usize, title: &str, kind: SectionKind, body: String) -> Section {
        Section {
            id: section_id(index),
            href: section_href(index),
            title: title.to_string(),
            kind,
            body,
            stylesheets: vec![self.stylesheet_href.clone()],
            images: Vec::new(),
        }
    }

    /// The navigation document. Its body is generated by the package writer
    /// from the table of contents.
    pub fn navigation(&self, index: usize, title: &str) -> Section {
        self.section(index, title, SectionKind::Navigation, String::new())
    }

    /// A front matter page wrapped in a `frontmatter` container.
    pub fn front_matter(&self, index: usize, page: &FrontMatter) -> Section {
        let body = format!(
            "<div class=\"frontmatter\">{}</div>",
            render_markdown(&page.source)
        );
        debug!(index, title = %page.title, "Assembled front matter");
        self.section(index, &page.title, SectionKind::FrontMatter, body)
    }

    /// A piece followed by its endmatter, headshot and author bio.
    ///
    /// Stories and poems get a generated copyright line. Reprints keep the
    /// copyright paragraph from their source, moved into the endmatter
    /// container together with the author block.
    pub fn piece(&self, index: usize, piece: &Piece) -> Result<AssembledPiece> {
        let stem = piece.file_stem();
        let image_href = format!("{stem}.jpg");
        let author_block = format!(
            "<p class=\"author-pic\"><img class=\"author\" src=\"{}\" alt=\"{}\"/></p>\n\n{}",
            escape_xml(&image_href),
            escape_xml(&piece.author),
            render_markdown(&piece.bio)
        );

        let mut warning = None;
        let body = match piece.kind {
            PieceKind::Story | PieceKind::Poem => {
                let rendered = self.render_piece(piece)?;
                format!(
                    "<div class=\"piece\">\n{rendered}</div>\n\n\
                     <div class=\"endmatter\">\n<p>Copyright © {} by {}</p>\n</div>\n\n\
                     {author_block}",
                    self.copyright_year,
                    escape_xml(&piece.author)
                )
            }
            PieceKind::Reprint => {
                let Relocated { body, endmatter } = split_copyright(self.render_piece(piece)?);
                match endmatter {
                    Some(endmatter) => format!(
                        "<div class=\"piece\">\n{body}</div>\n\
                         <div class=\"endmatter\">\n{endmatter}{author_block}</div>\n\n"
                    ),
                    None => {
                        warning = Some(Warning::MissingReprintCopyright {
                            path: piece.path.clone(),
                        });
                        format!("<div class=\"piece\">\n{body}</div>\n\n{author_block}")
                    }
                }
            }
        };

        let mut section = self.section(index, &piece.title, SectionKind::Piece, body);
        section.images.push(image_href.clone());

        let headshot = Asset {
            id: format!("{}-author", piece.ordinal),
            href: image_href,
            media_type: detect_media_format(
                &piece.headshot.path.to_string_lossy(),
                &piece.headshot.data,
            )
                .mime_type()
                .to_string(),
            data: piece.headshot.data.clone(),
        };

        debug!(
            index,
            ordinal = piece.ordinal,
            title = %piece.title,
            author = %piece.author,
            "Assembled piece"
        );

        Ok(AssembledPiece {
            section,
            headshot,
            warning,
        })
    }

    fn render_piece(&self, piece: &Piece) -> Result<String> {
        match piece.kind {
            PieceKind::Poem => format_poem(&piece.source)
                .map(|markup| markup.into_html())
                .map_err(|e| Error::InvalidPoem {
                    path: piece.path.clone(),
                    line: e.line,
                    reason: e.reason,
                }),
            PieceKind::Story | PieceKind::Reprint => Ok(render_story(&piece.source)),
        }
    }
}
