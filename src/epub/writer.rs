//! EPUB 3 package writer (with an EPUB 2 NCX for older readers).

use std::io::{Seek, Write};
use std::path::Path;

use tracing::debug;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::book::{Package, Section, SectionKind, TocEntry};
use crate::error::{Error, Result};
use crate::media::MediaFormat;
use crate::util::escape_xml;

use super::cover::{COVER_PAGE_HREF, COVER_PAGE_ID, cover_page};

/// Directory inside the archive holding the package document and content.
const CONTENT_DIR: &str = "OEBPS";

/// Container.xml template.
const CONTAINER_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// Serializes a [`Package`] into a document container.
///
/// The writer can be:
/// - `std::fs::File` for disk output
/// - `std::io::Cursor<Vec<u8>>` for seekable in-memory output
/// - Any other type implementing `Write + Seek`
pub trait PackageWriter {
    fn write_package<W: Write + Seek>(&self, package: &Package, writer: &mut W) -> Result<()>;
}

/// Configuration for EPUB output.
#[derive(Debug, Clone, Default)]
pub struct EpubConfig {
    /// Compression level for deflate (0-9, default 6).
    pub compression_level: Option<u32>,
}

/// EPUB format writer.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use magbind::book::{Metadata, Package};
/// use magbind::epub::{EpubWriter, PackageWriter};
///
/// let package = Package::new(Metadata::new("Empty").with_identifier("urn:uuid:0"));
/// let mut out = Cursor::new(Vec::new());
/// EpubWriter::new().write_package(&package, &mut out)?;
/// assert!(!out.into_inner().is_empty());
/// # Ok::<(), magbind::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct EpubWriter {
    config: EpubConfig,
}

impl EpubWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: EpubConfig) -> Self {
        self.config = config;
        self
    }
}

impl PackageWriter for EpubWriter {
    fn write_package<W: Write + Seek>(&self, package: &Package, writer: &mut W) -> Result<()> {
        package.validate()?;
        if package.section(COVER_PAGE_ID).is_some() || package.asset(COVER_PAGE_ID).is_some() {
            return Err(Error::InvalidPackage(format!(
                "item id '{COVER_PAGE_ID}' is reserved for the cover page"
            )));
        }

        let mut zip = ZipWriter::new(writer);

        let compression_level = self.config.compression_level.unwrap_or(6);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(compression_level as i64));

        // mimetype must be first and uncompressed
        zip.start_file("mimetype", stored)?;
        zip.write_all(b"application/epub+zip")?;

        zip.start_file("META-INF/container.xml", deflated)?;
        zip.write_all(CONTAINER_XML)?;

        zip.start_file(format!("{CONTENT_DIR}/content.opf"), deflated)?;
        zip.write_all(generate_opf(package).as_bytes())?;

        zip.start_file(format!("{CONTENT_DIR}/toc.ncx"), deflated)?;
        zip.write_all(generate_ncx(package).as_bytes())?;

        for section in &package.sections {
            let document = match section.kind {
                SectionKind::Navigation => {
                    let body = generate_nav_body(&package.metadata.title, &package.toc);
                    generate_document(section, &body, &package.metadata.language)
                }
                SectionKind::FrontMatter | SectionKind::Piece => {
                    generate_document(section, &section.body, &package.metadata.language)
                }
            };
            debug!(id = %section.id, href = %section.href, "Writing section");
            zip.start_file(format!("{CONTENT_DIR}/{}", section.href), deflated)?;
            zip.write_all(document.as_bytes())?;
        }

        if let Some(cover) = &package.cover
            && let Some(image) = package.asset(&cover.asset_id)
        {
            zip.start_file(format!("{CONTENT_DIR}/{COVER_PAGE_HREF}"), deflated)?;
            zip.write_all(cover_page(cover, &image.href).as_bytes())?;
        }

        for asset in &package.assets {
            debug!(id = %asset.id, href = %asset.href, bytes = asset.data.len(), "Writing asset");
            zip.start_file(format!("{CONTENT_DIR}/{}", asset.href), deflated)?;
            zip.write_all(&asset.data)?;
        }

        zip.finish()?;
        Ok(())
    }
}

/// Write a [`Package`] to an EPUB file on disk.
pub fn write_epub<P: AsRef<Path>>(package: &Package, path: P) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    EpubWriter::new().write_package(package, &mut file)
}

/// Write a [`Package`] to any [`Write`] + [`Seek`] destination.
pub fn write_epub_to_writer<W: Write + Seek>(package: &Package, mut writer: W) -> Result<()> {
    EpubWriter::new().write_package(package, &mut writer)
}

fn language(package: &Package) -> &str {
    if package.metadata.language.is_empty() {
        "en"
    } else {
        &package.metadata.language
    }
}

fn generate_opf(package: &Package) -> String {
    let metadata = &package.metadata;
    let lang = language(package);
    let mut opf = String::new();

    opf.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="BookId" xml:lang="{lang}">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
"#
    ));

    opf.push_str(&format!(
        "    <dc:identifier id=\"BookId\">{}</dc:identifier>\n",
        escape_xml(&metadata.identifier)
    ));
    opf.push_str(&format!(
        "    <dc:title>{}</dc:title>\n",
        escape_xml(&metadata.title)
    ));
    opf.push_str(&format!("    <dc:language>{}</dc:language>\n", escape_xml(lang)));

    for (i, creator) in metadata.creators.iter().enumerate() {
        opf.push_str(&format!(
            "    <dc:creator id=\"creator{}\">{}</dc:creator>\n",
            i + 1,
            escape_xml(creator)
        ));
    }
    for (i, contributor) in metadata.contributors.iter().enumerate() {
        opf.push_str(&format!(
            "    <dc:contributor id=\"contributor{}\">{}</dc:contributor>\n",
            i + 1,
            escape_xml(contributor)
        ));
    }

    if let Some(ref publisher) = metadata.publisher {
        opf.push_str(&format!(
            "    <dc:publisher>{}</dc:publisher>\n",
            escape_xml(publisher)
        ));
    }
    if let Some(ref date) = metadata.date {
        opf.push_str(&format!("    <dc:date>{}</dc:date>\n", escape_xml(date)));
    }
    if let Some(ref description) = metadata.description {
        opf.push_str(&format!(
            "    <dc:description>{}</dc:description>\n",
            escape_xml(description)
        ));
    }
    for subject in &metadata.subjects {
        opf.push_str(&format!(
            "    <dc:subject>{}</dc:subject>\n",
            escape_xml(subject)
        ));
    }
    if let Some(ref modified) = metadata.modified {
        opf.push_str(&format!(
            "    <meta property=\"dcterms:modified\">{}</meta>\n",
            escape_xml(modified)
        ));
    }
    if let Some(ref cover) = package.cover {
        opf.push_str(&format!(
            "    <meta name=\"cover\" content=\"{}\"/>\n",
            escape_xml(&cover.asset_id)
        ));
    }

    opf.push_str("  </metadata>\n  <manifest>\n");
    opf.push_str(
        "    <item id=\"ncx\" href=\"toc.ncx\" media-type=\"application/x-dtbncx+xml\"/>\n",
    );

    if package.cover.is_some() {
        push_item(
            &mut opf,
            COVER_PAGE_ID,
            COVER_PAGE_HREF,
            MediaFormat::Xhtml.mime_type(),
            Some("svg"),
        );
    }
    for section in &package.sections {
        let properties = match section.kind {
            SectionKind::Navigation => Some("nav"),
            _ => None,
        };
        push_item(
            &mut opf,
            &section.id,
            &section.href,
            MediaFormat::Xhtml.mime_type(),
            properties,
        );
    }
    for asset in &package.assets {
        let is_cover = package
            .cover
            .as_ref()
            .is_some_and(|c| c.asset_id == asset.id);
        push_item(
            &mut opf,
            &asset.id,
            &asset.href,
            &asset.media_type,
            is_cover.then_some("cover-image"),
        );
    }

    opf.push_str("  </manifest>\n  <spine toc=\"ncx\">\n");

    if package.cover.is_some() {
        opf.push_str(&format!(
            "    <itemref idref=\"{COVER_PAGE_ID}\" linear=\"no\"/>\n"
        ));
    }
    for item in &package.spine {
        if item.linear {
            opf.push_str(&format!(
                "    <itemref idref=\"{}\"/>\n",
                escape_xml(&item.idref)
            ));
        } else {
            opf.push_str(&format!(
                "    <itemref idref=\"{}\" linear=\"no\"/>\n",
                escape_xml(&item.idref)
            ));
        }
    }

    opf.push_str("  </spine>\n");

    if package.cover.is_some() {
        opf.push_str(&format!(
            "  <guide>\n    <reference type=\"cover\" title=\"Cover\" href=\"{COVER_PAGE_HREF}\"/>\n  </guide>\n"
        ));
    }

    opf.push_str("</package>\n");
    opf
}

fn push_item(opf: &mut String, id: &str, href: &str, media_type: &str, properties: Option<&str>) {
    opf.push_str(&format!(
        "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"",
        escape_xml(id),
        escape_xml(href),
        escape_xml(media_type)
    ));
    if let Some(properties) = properties {
        opf.push_str(&format!(" properties=\"{properties}\""));
    }
    opf.push_str("/>\n");
}

fn generate_ncx(package: &Package) -> String {
    let mut ncx = String::new();

    ncx.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE ncx PUBLIC "-//NISO//DTD ncx 2005-1//EN" "http://www.daisy.org/z3986/2005/ncx-2005-1.dtd">
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="{}"/>
    <meta name="dtb:depth" content="1"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle>
    <text>{}</text>
  </docTitle>
  <navMap>
"#,
        escape_xml(&package.metadata.identifier),
        escape_xml(&package.metadata.title)
    ));

    for (i, entry) in package.toc.iter().enumerate() {
        let play_order = i + 1;
        ncx.push_str(&format!(
            "    <navPoint id=\"navpoint-{play_order}\" playOrder=\"{play_order}\">\n"
        ));
        ncx.push_str(&format!(
            "      <navLabel>\n        <text>{}</text>\n      </navLabel>\n",
            escape_xml(&entry.title)
        ));
        ncx.push_str(&format!(
            "      <content src=\"{}\"/>\n",
            escape_xml(&entry.href)
        ));
        ncx.push_str("    </navPoint>\n");
    }

    ncx.push_str("  </navMap>\n</ncx>\n");
    ncx
}

/// Table of contents as one linked paragraph per entry.
fn generate_nav_body(title: &str, toc: &[TocEntry]) -> String {
    let mut body = String::new();
    body.push_str("<nav epub:type=\"toc\" id=\"toc\" role=\"doc-toc\">\n");
    body.push_str(&format!("  <h2>{}</h2>\n", escape_xml(title)));
    body.push_str("  <div class=\"toc\">\n");
    for entry in toc {
        body.push_str(&format!(
            "    <p><a href=\"{}\">{}</a></p>\n",
            escape_xml(&entry.href),
            escape_xml(&entry.title)
        ));
    }
    body.push_str("  </div>\n</nav>");
    body
}

/// Wrap section body markup in a complete XHTML document.
fn generate_document(section: &Section, body: &str, language: &str) -> String {
    let lang = if language.is_empty() { "en" } else { language };
    let mut doc = String::new();

    doc.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" lang="{lang}" xml:lang="{lang}">
<head>
  <title>{}</title>
"#,
        escape_xml(&section.title)
    ));
    for href in &section.stylesheets {
        doc.push_str(&format!(
            "  <link href=\"{}\" rel=\"stylesheet\" type=\"text/css\"/>\n",
            escape_xml(href)
        ));
    }
    doc.push_str("</head>\n<body>\n");
    doc.push_str(body);
    if !body.ends_with('\n') {
        doc.push('\n');
    }
    doc.push_str("</body>\n</html>\n");
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{Asset, Cover, Metadata, SpineItem};
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn section(id: &str, title: &str, kind: SectionKind, body: &str) -> Section {
        Section {
            id: id.to_string(),
            href: format!("{id}.xhtml"),
            title: title.to_string(),
            kind,
            body: body.to_string(),
            stylesheets: vec!["styles/stylesheet.css".to_string()],
            images: Vec::new(),
        }
    }

    fn package() -> Package {
        let mut package = Package::new(
            Metadata::new("Tales & Verse")
                .with_identifier("urn:uuid:1234")
                .with_language("en"),
        );
        package.add_asset(Asset {
            id: "base_stylesheet".to_string(),
            href: "styles/stylesheet.css".to_string(),
            media_type: "text/css".to_string(),
            data: b"p {}".to_vec(),
        });
        package.add_asset(Asset {
            id: "cover-img".to_string(),
            href: "cover.jpg".to_string(),
            media_type: "image/jpeg".to_string(),
            data: vec![0xFF, 0xD8, 0xFF],
        });
        package.sections = vec![
            section("nav", "Contents", SectionKind::Navigation, ""),
            section("body01", "Fish & Chips", SectionKind::Piece, "<p>Hi.</p>\n"),
        ];
        package.spine = package
            .sections
            .iter()
            .map(|s| SpineItem {
                idref: s.id.clone(),
                linear: true,
            })
            .collect();
        package.toc = package
            .sections
            .iter()
            .map(|s| TocEntry::new(s.title.clone(), s.href.clone()))
            .collect();
        package.cover = Some(Cover {
            asset_id: "cover-img".to_string(),
            page_title: "Tales & Verse".to_string(),
            width: 10,
            height: 20,
        });
        package
    }

    fn write(package: &Package) -> ZipArchive<Cursor<Vec<u8>>> {
        let mut out = Cursor::new(Vec::new());
        EpubWriter::new().write_package(package, &mut out).unwrap();
        ZipArchive::new(Cursor::new(out.into_inner())).unwrap()
    }

    fn read(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut text = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_mimetype_first_and_stored() {
        let mut archive = write(&package());
        let first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), CompressionMethod::Stored);
    }

    #[test]
    fn test_opf_marks_cover_and_nav() {
        let mut archive = write(&package());
        let opf = read(&mut archive, "OEBPS/content.opf");

        assert!(opf.contains("<dc:title>Tales &amp; Verse</dc:title>"));
        assert!(opf.contains(r#"<meta name="cover" content="cover-img"/>"#));
        assert!(opf.contains(
            r#"<item id="cover-img" href="cover.jpg" media-type="image/jpeg" properties="cover-image"/>"#
        ));
        assert!(opf.contains(r#"<item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>"#));
        assert!(opf.contains(r#"<itemref idref="cover" linear="no"/>"#));

        let cover = opf.find(r#"idref="cover""#).unwrap();
        let nav = opf.find(r#"idref="nav""#).unwrap();
        let body = opf.find(r#"idref="body01""#).unwrap();
        assert!(cover < nav && nav < body);
    }

    #[test]
    fn test_nav_lists_toc_as_paragraphs() {
        let mut archive = write(&package());
        let nav = read(&mut archive, "OEBPS/nav.xhtml");
        assert!(nav.contains("<nav epub:type=\"toc\""));
        assert!(nav.contains(
            "<div class=\"toc\">\n    <p><a href=\"nav.xhtml\">Contents</a></p>\n    <p><a href=\"body01.xhtml\">Fish &amp; Chips</a></p>\n  </div>"
        ));
        assert!(!nav.contains("cover.xhtml"));
    }

    #[test]
    fn test_sections_link_stylesheet() {
        let mut archive = write(&package());
        let doc = read(&mut archive, "OEBPS/body01.xhtml");
        assert!(doc.contains(
            r#"<link href="styles/stylesheet.css" rel="stylesheet" type="text/css"/>"#
        ));
        assert!(doc.contains("<body>\n<p>Hi.</p>\n</body>"));
        assert!(archive.by_name("OEBPS/cover.xhtml").is_ok());
        assert!(archive.by_name("OEBPS/styles/stylesheet.css").is_ok());
    }

    #[test]
    fn test_rejects_dangling_spine() {
        let mut package = package();
        package.spine.push(SpineItem {
            idref: "missing".to_string(),
            linear: true,
        });
        let mut out = Cursor::new(Vec::new());
        let err = EpubWriter::new().write_package(&package, &mut out).unwrap_err();
        assert!(matches!(err, Error::InvalidPackage(_)));
    }
}
