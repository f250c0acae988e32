//! Metadata collection, package assembly and the top-level build.

use std::io::Cursor;
use std::path::PathBuf;

use chrono::{DateTime, Datelike, Local, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::assemble::{SectionAssembler, Warning};
use crate::book::{Asset, Cover, Metadata, Package, SpineItem, TocEntry};
use crate::epub::{EpubWriter, PackageWriter};
use crate::error::Result;
use crate::issue::{Issue, Layout, Series};
use crate::media::{MediaFormat, detect_media_format, image_dimensions};

pub const STYLESHEET_ID: &str = "base_stylesheet";
pub const STYLESHEET_HREF: &str = "styles/stylesheet.css";
pub const COVER_IMAGE_ID: &str = "cover-img";
pub const COVER_IMAGE_HREF: &str = "cover.jpg";
/// Title of the navigation document and its TOC entry.
pub const NAV_TITLE: &str = "Contents";

/// Where to read an issue from and where to write it.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub layout: Layout,
    pub series: Series,
    /// Defaults to the layout root.
    pub output_dir: Option<PathBuf>,
}

impl BuildOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            layout: Layout::new(root),
            ..Default::default()
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.layout.root().to_path_buf())
    }
}

/// Outcome of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub issue_number: u32,
    pub output_path: PathBuf,
    pub section_count: usize,
    pub asset_count: usize,
    pub warnings: Vec<Warning>,
}

/// Bibliographic metadata for one issue.
///
/// Creators are the editors in file order; contributors are the piece
/// authors, each listed once.
pub fn collect_metadata(issue: &Issue, series: &Series, now: DateTime<Local>) -> Metadata {
    let mut metadata = Metadata::new(series.issue_title(issue.number))
        .with_identifier(format!("urn:uuid:{}", Uuid::new_v4()))
        .with_language(series.language.clone());

    metadata.publisher = Some(series.publisher.clone());
    metadata.creators = issue.editors.clone();
    for author in issue.distinct_authors() {
        metadata.add_contributor(author);
    }
    metadata.date = Some(now.format("%Y-%m-%d").to_string());
    metadata.modified = Some(
        now.with_timezone(&Utc)
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string(),
    );
    let description = issue.description.trim();
    if !description.is_empty() {
        metadata.description = Some(description.to_string());
    }
    metadata.subjects = series.subjects.clone();

    metadata
}

/// Assemble every section and asset of the issue into a package.
///
/// Sections are produced in a fixed order: navigation, the three front
/// matter pages, then the pieces by ordinal. Spine and TOC are both
/// copied from that order.
pub fn assemble_package(
    issue: &Issue,
    series: &Series,
    now: DateTime<Local>,
) -> Result<(Package, Vec<Warning>)> {
    let mut package = Package::new(collect_metadata(issue, series, now));
    let mut warnings = Vec::new();

    package.add_asset(Asset {
        id: STYLESHEET_ID.to_string(),
        href: STYLESHEET_HREF.to_string(),
        media_type: MediaFormat::Css.mime_type().to_string(),
        data: issue.stylesheet.clone().into_bytes(),
    });

    let (width, height) = image_dimensions(&issue.cover.path, &issue.cover.data)?;
    package.add_asset(Asset {
        id: COVER_IMAGE_ID.to_string(),
        href: COVER_IMAGE_HREF.to_string(),
        media_type: detect_media_format(&issue.cover.path.to_string_lossy(), &issue.cover.data)
            .mime_type()
            .to_string(),
        data: issue.cover.data.clone(),
    });
    package.cover = Some(Cover {
        asset_id: COVER_IMAGE_ID.to_string(),
        page_title: package.metadata.title.clone(),
        width,
        height,
    });

    let assembler = SectionAssembler::new(STYLESHEET_HREF, now.year());

    package.sections.push(assembler.navigation(0, NAV_TITLE));
    for page in &issue.front_matter {
        let index = package.sections.len();
        package.sections.push(assembler.front_matter(index, page));
    }
    for piece in &issue.pieces {
        let index = package.sections.len();
        let assembled = assembler.piece(index, piece)?;
        package.sections.push(assembled.section);
        package.add_asset(assembled.headshot);
        if let Some(warning) = assembled.warning {
            warn!("{warning}");
            warnings.push(warning);
        }
    }

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

    Ok((package, warnings))
}

/// Build the issue described by `options` as an EPUB.
pub fn build_issue(options: &BuildOptions) -> Result<BuildReport> {
    build_issue_with(options, &EpubWriter::new())
}

/// Build the issue with a specific package writer.
///
/// The package is written to memory first; the output file is only
/// created once serialization has succeeded.
pub fn build_issue_with<P: PackageWriter>(
    options: &BuildOptions,
    writer: &P,
) -> Result<BuildReport> {
    let issue = Issue::load(&options.layout)?;
    let (package, warnings) = assemble_package(&issue, &options.series, Local::now())?;

    let mut buffer = Cursor::new(Vec::new());
    writer.write_package(&package, &mut buffer)?;

    let output_path = options
        .output_dir()
        .join(options.series.output_file_name(issue.number));
    std::fs::write(&output_path, buffer.into_inner())?;

    info!(
        "Wrote {} ({} sections, {} assets)",
        output_path.display(),
        package.sections.len(),
        package.assets.len()
    );

    Ok(BuildReport {
        issue_number: issue.number,
        output_path,
        section_count: package.sections.len(),
        asset_count: package.assets.len(),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{FrontMatter, Image, Piece, PieceKind};
    use chrono::TimeZone;

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image::RgbImage::new(width, height)
            .write_to(&mut out, image::ImageFormat::Jpeg)
            .unwrap();
        out.into_inner()
    }

    fn issue(authors: &[&str]) -> Issue {
        let pieces = authors
            .iter()
            .enumerate()
            .map(|(idx, author)| {
                let ordinal = idx + 1;
                let kind = PieceKind::for_ordinal(ordinal);
                let source = match kind {
                    PieceKind::Reprint => format!(
                        "# Piece {ordinal}\n\n## by {author}\n\nText.\n\nCopyright © 2001 by {author}\n"
                    ),
                    _ => format!("# Piece {ordinal}\n\n## by {author}\n\nText.\n"),
                };
                Piece {
                    ordinal,
                    kind,
                    path: PathBuf::from(format!("{ordinal}a-{}.md", kind.file_suffix())),
                    source,
                    title: format!("Piece {ordinal}"),
                    author: author.to_string(),
                    bio: String::new(),
                    headshot: Image {
                        path: PathBuf::from(format!("{ordinal}-author.jpg")),
                        data: jpeg(4, 4),
                    },
                }
            })
            .collect();

        Issue {
            number: 12,
            editors: vec!["Ed One".to_string(), "Ed Two".to_string()],
            description: "<p>An issue.</p>\n".to_string(),
            front_matter: ["About", "Artist", "Keyhole"]
                .iter()
                .map(|title| FrontMatter {
                    path: PathBuf::from(format!("{title}.md")),
                    title: title.to_string(),
                    source: format!("{title} text"),
                })
                .collect(),
            pieces,
            cover: Image {
                path: PathBuf::from("cover.jpg"),
                data: jpeg(30, 40),
            },
            stylesheet: "p { margin: 0 }".to_string(),
        }
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap()
    }

    const AUTHORS: [&str; 9] = ["A", "B", "C", "D", "E", "F", "G", "H", "I"];

    #[test]
    fn test_metadata() {
        let metadata = collect_metadata(&issue(&AUTHORS), &Series::default(), now());
        assert_eq!(metadata.title, "Small Wonders Issue 12");
        assert!(metadata.identifier.starts_with("urn:uuid:"));
        assert_eq!(metadata.language, "en");
        assert_eq!(metadata.publisher.as_deref(), Some("Small Wonders LLC"));
        assert_eq!(metadata.creators, vec!["Ed One", "Ed Two"]);
        assert_eq!(metadata.contributors.len(), 9);
        assert_eq!(metadata.date.as_deref(), Some("2024-03-09"));
        assert_eq!(metadata.description.as_deref(), Some("<p>An issue.</p>"));
        assert_eq!(metadata.subjects, Series::default().subjects);
    }

    #[test]
    fn test_identifier_is_fresh_per_run() {
        let issue = issue(&AUTHORS);
        let a = collect_metadata(&issue, &Series::default(), now());
        let b = collect_metadata(&issue, &Series::default(), now());
        assert_ne!(a.identifier, b.identifier);
    }

    #[test]
    fn test_shared_author_listed_once() {
        let authors = ["A", "B", "C", "A", "E", "F", "G", "H", "B"];
        let metadata = collect_metadata(&issue(&authors), &Series::default(), now());
        assert_eq!(metadata.contributors, vec!["A", "B", "C", "E", "F", "G", "H"]);
    }

    #[test]
    fn test_section_order_drives_spine_and_toc() {
        let (package, warnings) =
            assemble_package(&issue(&AUTHORS), &Series::default(), now()).unwrap();
        assert!(warnings.is_empty());

        let ids: Vec<_> = package.sections.iter().map(|s| s.id.as_str()).collect();
        let expected: Vec<String> = std::iter::once("nav".to_string())
            .chain((1..=12).map(|i| format!("body{i:02}")))
            .collect();
        assert_eq!(ids, expected);

        let titles: Vec<_> = package.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(&titles[..4], ["Contents", "About", "Artist", "Keyhole"]);
        assert_eq!(titles[4], "Piece 1");
        assert_eq!(titles[12], "Piece 9");

        let spine: Vec<_> = package.spine.iter().map(|i| i.idref.as_str()).collect();
        assert_eq!(spine, ids);
        assert!(package.spine.iter().all(|i| i.linear));

        let toc: Vec<_> = package.toc.iter().map(|e| e.href.as_str()).collect();
        let hrefs: Vec<_> = package.sections.iter().map(|s| s.href.as_str()).collect();
        assert_eq!(toc, hrefs);

        package.validate().unwrap();
    }

    #[test]
    fn test_assets_and_cover() {
        let (package, _) = assemble_package(&issue(&AUTHORS), &Series::default(), now()).unwrap();
        let ids: Vec<_> = package.assets.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(&ids[..3], [STYLESHEET_ID, COVER_IMAGE_ID, "1-author"]);
        assert_eq!(package.assets.len(), 11);

        let cover = package.cover.unwrap();
        assert_eq!((cover.width, cover.height), (30, 40));
        assert_eq!(cover.page_title, "Small Wonders Issue 12");

        assert!(
            package
                .sections
                .iter()
                .all(|s| s.stylesheets == [STYLESHEET_HREF])
        );
    }

    #[test]
    fn test_reprint_without_copyright_is_a_warning() {
        let mut issue = issue(&AUTHORS);
        issue.pieces[5].source = "# Piece 6\n\n## by F\n\nNo notice.\n".to_string();
        let (_, warnings) = assemble_package(&issue, &Series::default(), now()).unwrap();
        assert_eq!(
            warnings,
            vec![Warning::MissingReprintCopyright {
                path: PathBuf::from("6a-reprint.md")
            }]
        );
    }
}
