//! Shared fixture: a complete, minimal issue directory.

#![allow(dead_code)]

use std::fs;
use std::io::Cursor;
use std::path::Path;

use tempfile::TempDir;

pub const AUTHORS: [&str; 9] = [
    "Ada Quill",
    "Basil Rhyme",
    "Cora Page",
    "Dmitri Vale",
    "Esme Stanza",
    "Farid Noon",
    "Gwen Harrow",
    "Hal Meter",
    "Iris Fable",
];

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image::RgbImage::new(width, height)
        .write_to(&mut out, image::ImageFormat::Jpeg)
        .unwrap();
    out.into_inner()
}

pub fn piece_source(ordinal: usize, author: &str) -> String {
    match ordinal % 3 {
        // poem
        2 => format!("# Poem {ordinal}\n## by {author}\n\nfirst line\n\tindented line\n\nlast line\n"),
        // reprint
        0 => format!(
            "# Reprint {ordinal}\n\n## by {author}\n\nAn older tale.\n\n\
             Copyright © 1998 by {author}\n\nFirst published in *Elsewhere*.\n"
        ),
        // story
        _ => format!(
            "# Story {ordinal}\n\n## By {author}\n\nIt began.\n\n***\n\nIt ended.\n"
        ),
    }
}

pub fn piece_file(ordinal: usize) -> String {
    let kind = ["story", "poem", "reprint"][(ordinal - 1) % 3];
    format!("{ordinal}a-{kind}.md")
}

fn write(path: &Path, contents: impl AsRef<[u8]>) {
    fs::write(path, contents).unwrap();
}

/// Write a complete issue (number 12) using `authors` for the nine pieces.
pub fn write_issue_with(dir: &Path, authors: &[&str; 9]) {
    let content = dir.join("content");
    let images = dir.join("images");
    fs::create_dir_all(&content).unwrap();
    fs::create_dir_all(&images).unwrap();

    write(
        &content.join("0a-about.md"),
        "# Small Wonders\n\nIssue 12, Autumn\n\nAll stories (c) their authors.\n",
    );
    write(&content.join("0b-cover-artist.md"), "# About the Artist\n\nPaints small.\n");
    write(&content.join("0c-keyhole.md"), "# Thru the Keyhole\n\nA note from the editors.\n");

    for (idx, author) in authors.iter().enumerate() {
        let ordinal = idx + 1;
        write(&content.join(piece_file(ordinal)), piece_source(ordinal, author));
        write(
            &content.join(format!("{ordinal}b-author.md")),
            format!("{author} lives by the sea.\n"),
        );
        write(&images.join(format!("{ordinal}-author.jpg")), jpeg(8, 8));
    }

    write(&content.join("editors.txt"), "Cecilia Ward\nDev Patel\n");
    write(
        &content.join("description.html"),
        "<p>Nine small wonders for autumn.</p>\n",
    );
    write(&images.join("cover.jpg"), jpeg(60, 90));
    write(&dir.join("stylesheet.css"), "p { text-indent: 1em; }\n");
}

pub fn issue_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_issue_with(dir.path(), &AUTHORS);
    dir
}
