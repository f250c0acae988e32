//! Reading a written package back for inspection.
//!
//! Only what a build needs to be checked against is parsed: the package
//! metadata, the manifest, the spine (with `linear` flags) and the NCX
//! navigation order. Every archive entry is kept as raw bytes.

use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;

use crate::book::{Metadata, SpineItem, TocEntry};
use crate::error::{Error, Result};

/// One `<item>` of the package manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    pub href: String,
    pub media_type: String,
    pub properties: Option<String>,
}

impl ManifestItem {
    pub fn has_property(&self, property: &str) -> bool {
        self.properties
            .as_deref()
            .is_some_and(|props| props.split_ascii_whitespace().any(|p| p == property))
    }
}

/// A parsed EPUB package.
#[derive(Debug, Clone, Default)]
pub struct EpubContents {
    /// `version` attribute of the package document.
    pub version: String,
    pub metadata: Metadata,
    /// Manifest id named by `<meta name="cover">`.
    pub cover_id: Option<String>,
    /// Manifest items in document order.
    pub manifest: Vec<ManifestItem>,
    pub spine: Vec<SpineItem>,
    /// Navigation order from the NCX.
    pub toc: Vec<TocEntry>,
    /// Archive entries by full path.
    pub files: HashMap<String, Vec<u8>>,
    /// Archive entry names in stored order.
    pub entry_order: Vec<String>,
    /// Directory of the package document inside the archive.
    pub content_dir: String,
}

impl EpubContents {
    pub fn manifest_item(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.iter().find(|item| item.id == id)
    }

    /// Bytes of a manifest href, resolved against the package directory.
    pub fn resource(&self, href: &str) -> Option<&[u8]> {
        self.files
            .get(&resolve_path(&self.content_dir, href))
            .map(Vec::as_slice)
    }

    /// A resource decoded as UTF-8 text.
    pub fn resource_text(&self, href: &str) -> Option<String> {
        self.resource(href)
            .map(|bytes| String::from_utf8_lossy(strip_bom(bytes)).into_owned())
    }
}

/// Read an EPUB file from disk.
pub fn read_epub<P: AsRef<Path>>(path: P) -> Result<EpubContents> {
    let file = std::fs::File::open(path)?;
    read_epub_from_reader(file)
}

/// Read an EPUB from any [`Read`] + [`Seek`] source.
pub fn read_epub_from_reader<R: Read + Seek>(reader: R) -> Result<EpubContents> {
    let mut archive = ZipArchive::new(reader)?;

    let mut files = HashMap::new();
    let mut entry_order = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        entry_order.push(file.name().to_string());
        files.insert(file.name().to_string(), data);
    }

    let container = archive_text(&files, "META-INF/container.xml")?;
    let opf_path = find_opf_path(&container)?;
    let content_dir = Path::new(&opf_path)
        .parent()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default();

    let opf = archive_text(&files, &opf_path)?;
    let mut contents = parse_opf(&opf)?;

    let ncx_href = contents
        .manifest
        .iter()
        .find(|item| item.media_type == "application/x-dtbncx+xml")
        .map(|item| item.href.clone());
    if let Some(ncx_href) = ncx_href {
        let ncx = archive_text(&files, &resolve_path(&content_dir, &ncx_href))?;
        contents.toc = parse_ncx(&ncx)?;
    }

    contents.files = files;
    contents.entry_order = entry_order;
    contents.content_dir = content_dir;
    Ok(contents)
}

fn find_opf_path(container: &str) -> Result<String> {
    let mut reader = Reader::from_str(container);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"rootfile" => {
                if let Some(path) = attribute(&e, b"full-path")? {
                    return Ok(path);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Err(Error::InvalidPackage(
        "No rootfile found in container.xml".into(),
    ))
}

/// Metadata element whose text is being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Identifier,
    Title,
    Language,
    Creator,
    Contributor,
    Publisher,
    Date,
    Description,
    Subject,
    Modified,
}

impl Field {
    fn from_element(local: &[u8]) -> Option<Self> {
        Some(match local {
            b"identifier" => Field::Identifier,
            b"title" => Field::Title,
            b"language" => Field::Language,
            b"creator" => Field::Creator,
            b"contributor" => Field::Contributor,
            b"publisher" => Field::Publisher,
            b"date" => Field::Date,
            b"description" => Field::Description,
            b"subject" => Field::Subject,
            _ => return None,
        })
    }

    fn store(self, metadata: &mut Metadata, text: String) {
        match self {
            Field::Identifier => {
                if metadata.identifier.is_empty() {
                    metadata.identifier = text;
                }
            }
            Field::Title => metadata.title = text,
            Field::Language => metadata.language = text,
            Field::Creator => metadata.creators.push(text),
            Field::Contributor => metadata.contributors.push(text),
            Field::Publisher => metadata.publisher = Some(text),
            Field::Date => metadata.date = Some(text),
            Field::Description => metadata.description = Some(text),
            Field::Subject => metadata.subjects.push(text),
            Field::Modified => metadata.modified = Some(text),
        }
    }
}

fn parse_opf(content: &str) -> Result<EpubContents> {
    let mut reader = Reader::from_str(content);
    // Text is split around entity references; keep the surrounding spaces.
    reader.config_mut().trim_text(false);

    let mut contents = EpubContents::default();
    let mut in_metadata = false;
    let mut current: Option<Field> = None;
    let mut buf_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                match local {
                    b"package" => {
                        contents.version = attribute(&e, b"version")?.unwrap_or_default();
                    }
                    b"metadata" => in_metadata = true,
                    b"meta" if in_metadata => {
                        if attribute(&e, b"property")?.as_deref() == Some("dcterms:modified") {
                            current = Some(Field::Modified);
                            buf_text.clear();
                        }
                    }
                    _ if in_metadata => {
                        if let Some(field) = Field::from_element(local) {
                            current = Some(field);
                            buf_text.clear();
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"item" => {
                        let id = attribute(&e, b"id")?.unwrap_or_default();
                        if !id.is_empty() {
                            contents.manifest.push(ManifestItem {
                                id,
                                href: attribute(&e, b"href")?.unwrap_or_default(),
                                media_type: attribute(&e, b"media-type")?.unwrap_or_default(),
                                properties: attribute(&e, b"properties")?,
                            });
                        }
                    }
                    b"itemref" => {
                        if let Some(idref) = attribute(&e, b"idref")? {
                            let linear = attribute(&e, b"linear")?.as_deref() != Some("no");
                            contents.spine.push(SpineItem { idref, linear });
                        }
                    }
                    b"meta" => {
                        if attribute(&e, b"name")?.as_deref() == Some("cover") {
                            contents.cover_id = attribute(&e, b"content")?;
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if current.is_some() {
                    buf_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if current.is_some() {
                    buf_text.push_str(&resolve_entity(&String::from_utf8_lossy(e.as_ref())));
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                if local_name(name.as_ref()) == b"metadata" {
                    in_metadata = false;
                }
                if let Some(field) = current.take() {
                    field.store(&mut contents.metadata, std::mem::take(&mut buf_text));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Ok(contents)
}

fn parse_ncx(content: &str) -> Result<Vec<TocEntry>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);

    let mut entries = Vec::new();
    let mut in_nav_point = false;
    let mut in_text = false;
    let mut text = String::new();
    let mut src: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match local_name(e.name().as_ref()) {
                b"navPoint" => {
                    in_nav_point = true;
                    text.clear();
                    src = None;
                }
                b"text" if in_nav_point => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if in_nav_point && local_name(e.name().as_ref()) == b"content" {
                    src = attribute(&e, b"src")?;
                }
            }
            Ok(Event::Text(e)) => {
                if in_text {
                    text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if in_text {
                    text.push_str(&resolve_entity(&String::from_utf8_lossy(e.as_ref())));
                }
            }
            Ok(Event::End(e)) => match local_name(e.name().as_ref()) {
                b"text" => in_text = false,
                b"navPoint" => {
                    in_nav_point = false;
                    if let Some(src) = src.take() {
                        entries.push(TocEntry::new(std::mem::take(&mut text), src));
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Ok(entries)
}

/// Unescaped value of an attribute, if present.
fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            let raw = String::from_utf8(attr.value.to_vec())?;
            return Ok(Some(unescape(&raw)));
        }
    }
    Ok(None)
}

/// Resolve the body of an entity reference (`amp`, `#160`, `#xA0`).
fn resolve_entity(entity: &str) -> String {
    let numeric = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
        .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()));
    if let Some(c) = numeric.and_then(char::from_u32) {
        return c.to_string();
    }

    match entity {
        "apos" => "'",
        "quot" => "\"",
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        _ => "",
    }
    .to_string()
}

fn unescape(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        match rest[start..].find(';') {
            Some(end) => {
                out.push_str(&resolve_entity(&rest[start + 1..start + end]));
                rest = &rest[start + end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn archive_text(files: &HashMap<String, Vec<u8>>, path: &str) -> Result<String> {
    let bytes = match files.get(path) {
        Some(bytes) => bytes,
        None => {
            // Fallback: try percent-decoded path (handles malformed EPUBs)
            let decoded = percent_encoding::percent_decode_str(path)
                .decode_utf8()
                .map_err(|_| Error::InvalidPackage(format!("Invalid UTF-8 in path: {path}")))?;
            files.get(decoded.as_ref()).ok_or_else(|| {
                Error::InvalidPackage(format!("missing archive entry '{path}'"))
            })?
        }
    };
    Ok(String::from_utf8(strip_bom(bytes).to_vec())?)
}

/// Strip UTF-8 BOM (byte order mark) if present
fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data)
}

fn resolve_path(base: &str, href: &str) -> String {
    if base.is_empty() {
        href.to_string()
    } else {
        format!("{base}/{href}")
    }
}

/// Extract local name from potentially namespaced XML name
fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}
