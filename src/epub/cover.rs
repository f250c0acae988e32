//! The cover page: a full-screen SVG wrapper around the cover image.

use crate::book::Cover;
use crate::util::escape_xml;

/// Manifest id of the generated cover page.
pub const COVER_PAGE_ID: &str = "cover";
/// Href of the generated cover page.
pub const COVER_PAGE_HREF: &str = "cover.xhtml";

/// Render the cover page for `cover`, whose image lives at `image_href`.
///
/// The SVG `viewBox` is the image's pixel size, so the image scales to the
/// reader's screen without being cropped or stretched.
pub fn cover_page(cover: &Cover, image_href: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" lang="en" xml:lang="en">
<head>
  <title>{title}</title>
  <style type="text/css">
    body {{ margin: 0em; padding: 0em; }}
    svg {{ max-width: 100%; max-height: 100%; }}
  </style>
</head>
<body>
  <div class="cover">
    <svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" version="1.1" width="100%" height="100%" viewBox="0 0 {width} {height}" preserveAspectRatio="xMidYMid meet">
      <image width="{width}" height="{height}" xlink:href="{href}"/>
    </svg>
  </div>
</body>
</html>
"#,
        title = escape_xml(&cover.page_title),
        width = cover.width,
        height = cover.height,
        href = escape_xml(image_href),
    )
}
