//! Slide deck writer.
//!
//! Emits a minimal PresentationML package: one slide per section on a
//! 10 x 7.5 inch canvas, with a single master/layout/theme chain. Body text
//! carries explicit `a:buNone` so lines render as plain paragraphs rather
//! than bullets.

use super::ooxml::{inches_to_emu, scaled_image_emu, xml_escape, PackageBuilder};
use super::Section;
use crate::error::Result;
use std::path::{Path, PathBuf};

const SLIDE_WIDTH_EMU: i64 = 9_144_000;
const SLIDE_HEIGHT_EMU: i64 = 6_858_000;

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>";

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

/// Font sizes in hundredths of a point.
const TITLE_SIZE: u32 = 4800;
const HEADING_SIZE: u32 = 3200;
const IMAGE_TITLE_SIZE: u32 = 3600;
const BODY_SIZE: u32 = 1800;

struct SlidePart {
    xml: String,
    rels: String,
    media: Option<(String, Vec<u8>)>,
}

/// Write one slide per section to a `.pptx` at `path`.
///
/// `max_image_width_in` caps the displayed width of embedded charts; height
/// is additionally capped so pictures stay clear of the slide title.
pub fn write_pptx(sections: &[Section], path: &Path, max_image_width_in: f64) -> Result<PathBuf> {
    let mut slides = Vec::with_capacity(sections.len());
    for (index, section) in sections.iter().enumerate() {
        slides.push(build_slide(section, index + 1, max_image_width_in)?);
    }

    let mut package = PackageBuilder::new();
    package.add_part("[Content_Types].xml", content_types(slides.len()).as_bytes())?;
    package.add_part("_rels/.rels", root_rels().as_bytes())?;
    package.add_part("ppt/presentation.xml", presentation(slides.len()).as_bytes())?;
    package.add_part(
        "ppt/_rels/presentation.xml.rels",
        presentation_rels(slides.len()).as_bytes(),
    )?;
    package.add_part("ppt/slideMasters/slideMaster1.xml", slide_master().as_bytes())?;
    package.add_part(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        slide_master_rels().as_bytes(),
    )?;
    package.add_part("ppt/slideLayouts/slideLayout1.xml", slide_layout().as_bytes())?;
    package.add_part(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        slide_layout_rels().as_bytes(),
    )?;
    package.add_part("ppt/theme/theme1.xml", theme().as_bytes())?;

    for (index, slide) in slides.iter().enumerate() {
        let n = index + 1;
        package.add_part(&format!("ppt/slides/slide{}.xml", n), slide.xml.as_bytes())?;
        package.add_part(
            &format!("ppt/slides/_rels/slide{}.xml.rels", n),
            slide.rels.as_bytes(),
        )?;
        if let Some((name, bytes)) = &slide.media {
            package.add_part(&format!("ppt/media/{}", name), bytes)?;
        }
    }

    let bytes = package.finish()?;
    super::ooxml::write_package(path, &bytes)?;
    Ok(path.to_path_buf())
}

fn build_slide(section: &Section, n: usize, max_image_width_in: f64) -> Result<SlidePart> {
    let mut shapes = String::new();
    let mut media = None;
    let mut rels = vec![relationship(
        "rId1",
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout",
        "../slideLayouts/slideLayout1.xml",
    )];

    match section {
        Section::Title { text } => {
            let paragraph = paragraph(text, TITLE_SIZE, true, true);
            shapes.push_str(&text_box(
                2,
                "Title",
                inches_to_emu(0.5),
                inches_to_emu(2.875),
                inches_to_emu(9.0),
                inches_to_emu(1.75),
                &paragraph,
            ));
        }
        Section::Text { heading, lines } => {
            shapes.push_str(&text_box(
                2,
                "Heading",
                inches_to_emu(0.5),
                inches_to_emu(0.3),
                inches_to_emu(9.0),
                inches_to_emu(1.25),
                &paragraph(heading, HEADING_SIZE, true, false),
            ));
            let body: String = lines
                .iter()
                .map(|line| paragraph(line, BODY_SIZE, false, false))
                .collect();
            shapes.push_str(&text_box(
                3,
                "Body",
                inches_to_emu(0.5),
                inches_to_emu(1.75),
                inches_to_emu(9.0),
                inches_to_emu(5.25),
                &body,
            ));
        }
        Section::Image { title, chart } => {
            shapes.push_str(&text_box(
                2,
                "Heading",
                inches_to_emu(0.5),
                inches_to_emu(0.3),
                inches_to_emu(9.0),
                inches_to_emu(1.25),
                &paragraph(title, IMAGE_TITLE_SIZE, true, true),
            ));

            // Keep the picture below the heading and above the bottom edge.
            let top = inches_to_emu(1.6);
            let max_height_in = (SLIDE_HEIGHT_EMU - top) as f64 / super::ooxml::EMU_PER_INCH - 0.3;
            let (width, height) = scaled_image_emu(&chart.png, max_image_width_in, max_height_in)?;
            let left = (SLIDE_WIDTH_EMU - width) / 2;
            shapes.push_str(&picture(3, &chart.label, "rId2", left, top, width, height));

            let media_name = format!("image{}.png", n);
            rels.push(relationship(
                "rId2",
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image",
                &format!("../media/{}", media_name),
            ));
            media = Some((media_name, chart.png.clone()));
        }
    }

    let xml = format!(
        "{}<p:sld xmlns:a=\"{}\" xmlns:r=\"{}\" xmlns:p=\"{}\">\
         <p:cSld><p:spTree>\
         <p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
         <p:grpSpPr/>{}</p:spTree></p:cSld>\
         <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>",
        XML_HEADER, NS_A, NS_R, NS_P, shapes
    );

    Ok(SlidePart {
        xml,
        rels: relationships(&rels),
        media,
    })
}

fn text_box(id: u32, name: &str, x: i64, y: i64, w: i64, h: i64, paragraphs: &str) -> String {
    format!(
        "<p:sp><p:nvSpPr><p:cNvPr id=\"{}\" name=\"{}\"/><p:cNvSpPr txBox=\"1\"/><p:nvPr/></p:nvSpPr>\
         <p:spPr><a:xfrm><a:off x=\"{}\" y=\"{}\"/><a:ext cx=\"{}\" cy=\"{}\"/></a:xfrm>\
         <a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></p:spPr>\
         <p:txBody><a:bodyPr wrap=\"square\"><a:normAutofit/></a:bodyPr><a:lstStyle/>{}</p:txBody></p:sp>",
        id,
        xml_escape(name),
        x,
        y,
        w,
        h,
        paragraphs
    )
}

fn paragraph(text: &str, size: u32, bold: bool, centered: bool) -> String {
    let align = if centered { " algn=\"ctr\"" } else { "" };
    let bold_attr = if bold { " b=\"1\"" } else { "" };
    format!(
        "<a:p><a:pPr{}><a:buNone/></a:pPr>\
         <a:r><a:rPr lang=\"en-US\" sz=\"{}\"{} dirty=\"0\"/><a:t>{}</a:t></a:r></a:p>",
        align,
        size,
        bold_attr,
        xml_escape(text)
    )
}

fn picture(id: u32, name: &str, rel_id: &str, x: i64, y: i64, w: i64, h: i64) -> String {
    format!(
        "<p:pic><p:nvPicPr><p:cNvPr id=\"{}\" name=\"{}\"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr>\
         <p:blipFill><a:blip r:embed=\"{}\"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>\
         <p:spPr><a:xfrm><a:off x=\"{}\" y=\"{}\"/><a:ext cx=\"{}\" cy=\"{}\"/></a:xfrm>\
         <a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></p:spPr></p:pic>",
        id,
        xml_escape(name),
        rel_id,
        x,
        y,
        w,
        h
    )
}

fn relationship(id: &str, rel_type: &str, target: &str) -> String {
    format!(
        "<Relationship Id=\"{}\" Type=\"{}\" Target=\"{}\"/>",
        id, rel_type, target
    )
}

fn relationships(entries: &[String]) -> String {
    format!(
        "{}<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">{}</Relationships>",
        XML_HEADER,
        entries.concat()
    )
}

fn content_types(slide_count: usize) -> String {
    let mut overrides = String::new();
    for n in 1..=slide_count {
        overrides.push_str(&format!(
            "<Override PartName=\"/ppt/slides/slide{}.xml\" \
             ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>",
            n
        ));
    }
    format!(
        "{}<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Default Extension=\"png\" ContentType=\"image/png\"/>\
         <Override PartName=\"/ppt/presentation.xml\" \
          ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml\"/>\
         <Override PartName=\"/ppt/slideMasters/slideMaster1.xml\" \
          ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml\"/>\
         <Override PartName=\"/ppt/slideLayouts/slideLayout1.xml\" \
          ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml\"/>\
         <Override PartName=\"/ppt/theme/theme1.xml\" \
          ContentType=\"application/vnd.openxmlformats-officedocument.theme+xml\"/>{}</Types>",
        XML_HEADER, overrides
    )
}

fn root_rels() -> String {
    relationships(&[relationship(
        "rId1",
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
        "ppt/presentation.xml",
    )])
}

fn presentation(slide_count: usize) -> String {
    let mut slide_ids = String::new();
    for n in 1..=slide_count {
        slide_ids.push_str(&format!(
            "<p:sldId id=\"{}\" r:id=\"rId{}\"/>",
            255 + n,
            n + 1
        ));
    }
    format!(
        "{}<p:presentation xmlns:a=\"{}\" xmlns:r=\"{}\" xmlns:p=\"{}\">\
         <p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"rId1\"/></p:sldMasterIdLst>\
         <p:sldIdLst>{}</p:sldIdLst>\
         <p:sldSz cx=\"{}\" cy=\"{}\"/>\
         <p:notesSz cx=\"6858000\" cy=\"9144000\"/></p:presentation>",
        XML_HEADER, NS_A, NS_R, NS_P, slide_ids, SLIDE_WIDTH_EMU, SLIDE_HEIGHT_EMU
    )
}

fn presentation_rels(slide_count: usize) -> String {
    let mut entries = vec![relationship(
        "rId1",
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster",
        "slideMasters/slideMaster1.xml",
    )];
    for n in 1..=slide_count {
        entries.push(relationship(
            &format!("rId{}", n + 1),
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide",
            &format!("slides/slide{}.xml", n),
        ));
    }
    relationships(&entries)
}

fn slide_master() -> String {
    format!(
        "{}<p:sldMaster xmlns:a=\"{}\" xmlns:r=\"{}\" xmlns:p=\"{}\">\
         <p:cSld><p:spTree>\
         <p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
         <p:grpSpPr/></p:spTree></p:cSld>\
         <p:clrMap bg1=\"lt1\" tx1=\"dk1\" bg2=\"lt2\" tx2=\"dk2\" accent1=\"accent1\" \
          accent2=\"accent2\" accent3=\"accent3\" accent4=\"accent4\" accent5=\"accent5\" \
          accent6=\"accent6\" hlink=\"hlink\" folHlink=\"folHlink\"/>\
         <p:sldLayoutIdLst><p:sldLayoutId id=\"2147483649\" r:id=\"rId1\"/></p:sldLayoutIdLst>\
         </p:sldMaster>",
        XML_HEADER, NS_A, NS_R, NS_P
    )
}

fn slide_master_rels() -> String {
    relationships(&[
        relationship(
            "rId1",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout",
            "../slideLayouts/slideLayout1.xml",
        ),
        relationship(
            "rId2",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme",
            "../theme/theme1.xml",
        ),
    ])
}

fn slide_layout() -> String {
    format!(
        "{}<p:sldLayout xmlns:a=\"{}\" xmlns:r=\"{}\" xmlns:p=\"{}\">\
         <p:cSld><p:spTree>\
         <p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
         <p:grpSpPr/></p:spTree></p:cSld>\
         <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>",
        XML_HEADER, NS_A, NS_R, NS_P
    )
}

fn slide_layout_rels() -> String {
    relationships(&[relationship(
        "rId1",
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster",
        "../slideMasters/slideMaster1.xml",
    )])
}

fn theme() -> String {
    format!(
        "{}<a:theme xmlns:a=\"{}\" name=\"Office\"><a:themeElements>\
         <a:clrScheme name=\"Office\">\
         <a:dk1><a:sysClr val=\"windowText\" lastClr=\"000000\"/></a:dk1>\
         <a:lt1><a:sysClr val=\"window\" lastClr=\"FFFFFF\"/></a:lt1>\
         <a:dk2><a:srgbClr val=\"44546A\"/></a:dk2>\
         <a:lt2><a:srgbClr val=\"E7E6E6\"/></a:lt2>\
         <a:accent1><a:srgbClr val=\"4472C4\"/></a:accent1>\
         <a:accent2><a:srgbClr val=\"ED7D31\"/></a:accent2>\
         <a:accent3><a:srgbClr val=\"A5A5A5\"/></a:accent3>\
         <a:accent4><a:srgbClr val=\"FFC000\"/></a:accent4>\
         <a:accent5><a:srgbClr val=\"5B9BD5\"/></a:accent5>\
         <a:accent6><a:srgbClr val=\"70AD47\"/></a:accent6>\
         <a:hlink><a:srgbClr val=\"0563C1\"/></a:hlink>\
         <a:folHlink><a:srgbClr val=\"954F72\"/></a:folHlink>\
         </a:clrScheme>\
         <a:fontScheme name=\"Office\">\
         <a:majorFont><a:latin typeface=\"Calibri Light\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:majorFont>\
         <a:minorFont><a:latin typeface=\"Calibri\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:minorFont>\
         </a:fontScheme>\
         <a:fmtScheme name=\"Office\">\
         <a:fillStyleLst>{fill}{fill}{fill}</a:fillStyleLst>\
         <a:lnStyleLst>{line}{line}{line}</a:lnStyleLst>\
         <a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle>\
         <a:effectStyle><a:effectLst/></a:effectStyle>\
         <a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>\
         <a:bgFillStyleLst>{fill}{fill}{fill}</a:bgFillStyleLst>\
         </a:fmtScheme></a:themeElements></a:theme>",
        XML_HEADER,
        NS_A,
        fill = "<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>",
        line = "<a:ln><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:ln>"
    )
}
