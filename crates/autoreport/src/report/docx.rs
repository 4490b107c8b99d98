//! Paper document writer.
//!
//! Emits a minimal WordprocessingML package: a single `document.xml` with
//! direct run formatting (no styles part), plus inline PNG media. Sections
//! map to a title block, heading-plus-paragraph blocks, and centered
//! captioned images.

use super::ooxml::{scaled_image_emu, xml_escape, PackageBuilder};
use super::Section;
use crate::error::Result;
use std::path::{Path, PathBuf};

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>";

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

/// Font sizes in half-points.
const TITLE_SIZE: u32 = 48;
const HEADING_SIZE: u32 = 32;
const CAPTION_SIZE: u32 = 24;
const BODY_SIZE: u32 = 22;

/// Write the sections as a `.docx` at `path`.
///
/// `max_image_width_in` caps the displayed width of embedded charts.
pub fn write_docx(sections: &[Section], path: &Path, max_image_width_in: f64) -> Result<PathBuf> {
    let mut blocks = String::new();
    let mut media: Vec<(String, Vec<u8>)> = Vec::new();

    for section in sections {
        match section {
            Section::Title { text } => {
                blocks.push_str(&text_paragraph(text, TITLE_SIZE, true, true));
                blocks.push_str(&empty_paragraph());
            }
            Section::Text { heading, lines } => {
                blocks.push_str(&text_paragraph(heading, HEADING_SIZE, true, false));
                for line in lines {
                    blocks.push_str(&text_paragraph(line, BODY_SIZE, false, false));
                }
                blocks.push_str(&empty_paragraph());
            }
            Section::Image { title, chart } => {
                blocks.push_str(&text_paragraph(title, CAPTION_SIZE, true, true));

                let media_name = format!("image{}.png", media.len() + 1);
                let rel_id = format!("rId{}", media.len() + 1);
                let (width, height) = scaled_image_emu(&chart.png, max_image_width_in, 8.0)?;
                blocks.push_str(&image_paragraph(
                    &rel_id,
                    media.len() as u32 + 1,
                    &chart.label,
                    width,
                    height,
                ));
                blocks.push_str(&empty_paragraph());

                media.push((media_name, chart.png.clone()));
            }
        }
    }

    let mut package = PackageBuilder::new();
    package.add_part("[Content_Types].xml", content_types().as_bytes())?;
    package.add_part("_rels/.rels", root_rels().as_bytes())?;
    package.add_part("word/document.xml", document(&blocks).as_bytes())?;
    package.add_part(
        "word/_rels/document.xml.rels",
        document_rels(&media).as_bytes(),
    )?;
    for (name, bytes) in &media {
        package.add_part(&format!("word/media/{}", name), bytes)?;
    }

    let bytes = package.finish()?;
    super::ooxml::write_package(path, &bytes)?;
    Ok(path.to_path_buf())
}

fn document(blocks: &str) -> String {
    format!(
        "{}<w:document xmlns:w=\"{}\" xmlns:r=\"{}\" xmlns:wp=\"{}\" xmlns:a=\"{}\" xmlns:pic=\"{}\">\
         <w:body>{}\
         <w:sectPr><w:pgSz w:w=\"12240\" w:h=\"15840\"/>\
         <w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\"/></w:sectPr>\
         </w:body></w:document>",
        XML_HEADER, NS_W, NS_R, NS_WP, NS_A, NS_PIC, blocks
    )
}

fn text_paragraph(text: &str, size: u32, bold: bool, centered: bool) -> String {
    let bold_tag = if bold { "<w:b/>" } else { "" };
    let align = if centered {
        "<w:jc w:val=\"center\"/>"
    } else {
        ""
    };
    format!(
        "<w:p><w:pPr>{}<w:rPr>{}<w:sz w:val=\"{}\"/></w:rPr></w:pPr>\
         <w:r><w:rPr>{}<w:sz w:val=\"{}\"/></w:rPr>\
         <w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
        align,
        bold_tag,
        size,
        bold_tag,
        size,
        xml_escape(text)
    )
}

fn empty_paragraph() -> String {
    "<w:p/>".to_string()
}

fn image_paragraph(rel_id: &str, doc_pr_id: u32, name: &str, width: i64, height: i64) -> String {
    format!(
        "<w:p><w:pPr><w:jc w:val=\"center\"/></w:pPr><w:r><w:drawing>\
         <wp:inline distT=\"0\" distB=\"0\" distL=\"0\" distR=\"0\">\
         <wp:extent cx=\"{w}\" cy=\"{h}\"/>\
         <wp:docPr id=\"{id}\" name=\"{name}\"/>\
         <a:graphic><a:graphicData uri=\"{pic_ns}\">\
         <pic:pic><pic:nvPicPr><pic:cNvPr id=\"{id}\" name=\"{name}\"/><pic:cNvPicPr/></pic:nvPicPr>\
         <pic:blipFill><a:blip r:embed=\"{rel}\"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>\
         <pic:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"{w}\" cy=\"{h}\"/></a:xfrm>\
         <a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></pic:spPr></pic:pic>\
         </a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>",
        w = width,
        h = height,
        id = doc_pr_id,
        name = xml_escape(name),
        rel = rel_id,
        pic_ns = NS_PIC
    )
}

fn content_types() -> String {
    format!(
        "{}<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Default Extension=\"png\" ContentType=\"image/png\"/>\
         <Override PartName=\"/word/document.xml\" \
          ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>\
         </Types>",
        XML_HEADER
    )
}

fn root_rels() -> String {
    format!(
        "{}<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
         <Relationship Id=\"rId1\" \
          Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" \
          Target=\"word/document.xml\"/></Relationships>",
        XML_HEADER
    )
}

fn document_rels(media: &[(String, Vec<u8>)]) -> String {
    let mut entries = String::new();
    for (index, (name, _)) in media.iter().enumerate() {
        entries.push_str(&format!(
            "<Relationship Id=\"rId{}\" \
             Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/image\" \
             Target=\"media/{}\"/>",
            index + 1,
            name
        ));
    }
    format!(
        "{}<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">{}</Relationships>",
        XML_HEADER, entries
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChartImage;
    use std::io::{Cursor, Read};

    fn png_fixture() -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(64, 32));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageOutputFormat::Png).unwrap();
        buf.into_inner()
    }

    fn sections_fixture() -> Vec<Section> {
        vec![
            Section::Title {
                text: "Data Analysis Report: sales".into(),
            },
            Section::Text {
                heading: "Dataset Summary".into(),
                lines: vec!["Total Rows: 2".into(), "price: 0".into()],
            },
            Section::Image {
                title: "Distribution of price".into(),
                chart: ChartImage::new("price", png_fixture()),
            },
        ]
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut content = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_write_docx_package_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales_summary.docx");
        let written = write_docx(&sections_fixture(), &path, 6.0).unwrap();
        assert_eq!(written, path);

        let bytes = std::fs::read(&path).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.clone())).unwrap();
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/_rels/document.xml.rels",
            "word/media/image1.png",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing part {}", name);
        }
    }

    #[test]
    fn test_document_carries_text_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.docx");
        write_docx(&sections_fixture(), &path, 6.0).unwrap();

        let doc = read_part(&std::fs::read(&path).unwrap(), "word/document.xml");
        let title_pos = doc.find("Data Analysis Report: sales").unwrap();
        let summary_pos = doc.find("Dataset Summary").unwrap();
        let rows_pos = doc.find("Total Rows: 2").unwrap();
        let caption_pos = doc.find("Distribution of price").unwrap();
        assert!(title_pos < summary_pos);
        assert!(summary_pos < rows_pos);
        assert!(rows_pos < caption_pos);
        assert!(doc.contains("r:embed=\"rId1\""));
    }

    #[test]
    fn test_text_only_document_has_no_media() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.docx");
        let sections: Vec<Section> = sections_fixture()
            .into_iter()
            .filter(|s| !s.is_image())
            .collect();
        write_docx(&sections, &path, 6.0).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.clone())).unwrap();
        assert!(archive.by_name("word/media/image1.png").is_err());
        let rels = read_part(&bytes, "word/_rels/document.xml.rels");
        assert!(!rels.contains("Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/image\""));
    }

    #[test]
    fn test_text_is_xml_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.docx");
        let sections = vec![Section::Text {
            heading: "A&B".into(),
            lines: vec!["x < y".into()],
        }];
        write_docx(&sections, &path, 6.0).unwrap();

        let doc = read_part(&std::fs::read(&path).unwrap(), "word/document.xml");
        assert!(doc.contains("A&amp;B"));
        assert!(doc.contains("x &lt; y"));
    }

    #[test]
    fn test_write_docx_unwritable_path() {
        let err = write_docx(&sections_fixture(), Path::new("/nonexistent-dir/report.docx"), 6.0)
            .unwrap_err();
        assert_eq!(err.error_code(), "OUTPUT_WRITE_ERROR");
    }
}
