use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::media::detect_media_format;

/// Everything the package writer needs to produce one issue's EPUB.
///
/// Sections are kept in assembly order; `spine` and `toc` are explicit so
/// the writer never has to infer reading or navigation order.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub metadata: Metadata,
    pub sections: Vec<Section>,
    pub assets: Vec<Asset>,
    pub spine: Vec<SpineItem>,
    pub toc: Vec<TocEntry>,
    pub cover: Option<Cover>,
}

/// Package metadata (Dublin Core)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub identifier: String,
    pub title: String,
    pub language: String,
    pub publisher: Option<String>,
    pub creators: Vec<String>,
    pub contributors: Vec<String>,
    /// Publication date, `YYYY-MM-DD`.
    pub date: Option<String>,
    /// Last-modified timestamp, `YYYY-MM-DDThh:mm:ssZ`.
    pub modified: Option<String>,
    pub description: Option<String>,
    pub subjects: Vec<String>,
}

/// What a section holds, which decides how the writer wraps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// The navigation document; its body is generated from the TOC.
    Navigation,
    FrontMatter,
    Piece,
}

/// One rendered content document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: String,
    pub href: String,
    pub title: String,
    pub kind: SectionKind,
    /// XHTML body markup (without the surrounding document).
    pub body: String,
    /// Hrefs of stylesheets linked from the document head.
    pub stylesheets: Vec<String>,
    /// Hrefs of images referenced from `body`.
    pub images: Vec<String>,
}

/// A binary resource (image, stylesheet) embedded in the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: String,
    pub href: String,
    pub media_type: String,
    pub data: Vec<u8>,
}

/// An item in the reading order (spine)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineItem {
    pub idref: String,
    pub linear: bool,
}

/// A table of contents entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub title: String,
    pub href: String,
}

/// The designated cover image and the non-linear page that shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cover {
    /// Id of the cover image asset.
    pub asset_id: String,
    pub page_title: String,
    pub width: u32,
    pub height: u32,
}

impl Package {
    pub fn new(metadata: Metadata) -> Self {
        Self {
            metadata,
            ..Default::default()
        }
    }

    /// Add an asset, keeping the first registration of a given href.
    pub fn add_asset(&mut self, asset: Asset) {
        if self.assets.iter().any(|a| a.href == asset.href) {
            return;
        }
        self.assets.push(asset);
    }

    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Check that every cross-reference resolves.
    ///
    /// Spine entries must name sections, TOC entries must point at section
    /// documents, section images and stylesheets must be registered assets,
    /// and the cover must name an image asset.
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for id in self
            .sections
            .iter()
            .map(|s| &s.id)
            .chain(self.assets.iter().map(|a| &a.id))
        {
            if !ids.insert(id.as_str()) {
                return Err(Error::InvalidPackage(format!("duplicate item id '{id}'")));
            }
        }

        for item in &self.spine {
            if self.section(&item.idref).is_none() {
                return Err(Error::InvalidPackage(format!(
                    "spine references unknown section '{}'",
                    item.idref
                )));
            }
        }

        for entry in &self.toc {
            if !self.sections.iter().any(|s| s.href == entry.href) {
                return Err(Error::InvalidPackage(format!(
                    "TOC entry '{}' points at unknown document '{}'",
                    entry.title, entry.href
                )));
            }
        }

        let asset_hrefs: HashSet<&str> = self.assets.iter().map(|a| a.href.as_str()).collect();
        for section in &self.sections {
            for href in section.images.iter().chain(&section.stylesheets) {
                if !asset_hrefs.contains(href.as_str()) {
                    return Err(Error::InvalidPackage(format!(
                        "section '{}' references missing asset '{href}'",
                        section.id
                    )));
                }
            }
        }

        if let Some(cover) = &self.cover {
            match self.asset(&cover.asset_id) {
                None => {
                    return Err(Error::InvalidPackage(format!(
                        "cover references missing asset '{}'",
                        cover.asset_id
                    )));
                }
                Some(asset) if !detect_media_format(&asset.href, &asset.data).is_image() => {
                    return Err(Error::InvalidPackage(format!(
                        "cover asset '{}' is not an image",
                        asset.href
                    )));
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

impl Metadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creators.push(creator.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Add a contributor unless one with the same name is already listed.
    pub fn add_contributor(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.contributors.contains(&name) {
            self.contributors.push(name);
        }
    }
}

impl TocEntry {
    pub fn new(title: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            href: href.into(),
        }
    }
}
