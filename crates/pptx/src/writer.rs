//! PPTX deck writer.

use crate::media::load_image;
use crate::parts::{self, Rel, REL_IMAGE, REL_SLIDE_LAYOUT};
use crate::xml::{emu, escape_text};
use deck_core::projection::{Align, BulletList, Frame, ImagePlacement, TextBlock};
use deck_core::{DeckWriter, Error, Result};
use std::collections::HashMap;
use std::fmt::Write as FmtWrite;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const BULLET_MARGIN: i64 = 285_750;

/// Writes a projected deck as an Office Open XML presentation.
#[derive(Debug, Default)]
pub struct PptxWriter {
    base_dir: Option<PathBuf>,
    title: String,
    author: String,
    slides: Vec<SlidePart>,
    media: Vec<MediaPart>,
    /// Image reference to media part index, so repeated pictures are stored once.
    media_by_url: HashMap<String, usize>,
}

#[derive(Debug)]
struct SlidePart {
    background: String,
    shapes: String,
    /// Media part index per picture, in relationship order.
    images: Vec<usize>,
    next_shape_id: u32,
}

#[derive(Debug)]
struct MediaPart {
    name: String,
    bytes: Vec<u8>,
}

impl PptxWriter {
    /// Create a new PPTX writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative image paths against `dir`.
    pub fn with_base_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.base_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    fn current_slide(&mut self) -> Result<&mut SlidePart> {
        self.slides
            .last_mut()
            .ok_or_else(|| Error::DeckWriter("no slide has been started".to_string()))
    }

    fn media_index(&mut self, url: &str) -> Result<usize> {
        if let Some(&index) = self.media_by_url.get(url) {
            return Ok(index);
        }
        let (bytes, format) = load_image(url, self.base_dir.as_deref())?;
        let index = self.media.len();
        self.media.push(MediaPart {
            name: format!("image{}.{}", index + 1, format.extension()),
            bytes,
        });
        self.media_by_url.insert(url.to_string(), index);
        Ok(index)
    }

    fn slide_xml(slide: &SlidePart) -> String {
        let mut xml = String::with_capacity(1024 + slide.shapes.len());
        parts::root_open(&mut xml, "sld", "");
        xml.push_str("<p:cSld><p:bg><p:bgPr>");
        let _ = write!(
            xml,
            r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/>"#,
            escape_text(&slide.background)
        );
        xml.push_str("</p:bgPr></p:bg>");
        parts::sp_tree_open(&mut xml);
        xml.push_str(&slide.shapes);
        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");
        xml
    }

    fn slide_rels(&self, slide: &SlidePart) -> String {
        let mut rels: Vec<Rel> = vec![(
            "rId1".to_string(),
            REL_SLIDE_LAYOUT,
            "../slideLayouts/slideLayout1.xml".to_string(),
        )];
        for (i, &media) in slide.images.iter().enumerate() {
            rels.push((
                format!("rId{}", i + 2),
                REL_IMAGE,
                format!("../media/{}", self.media[media].name),
            ));
        }
        parts::relationships(&rels)
    }

    fn write_package(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut add = |name: &str, data: &[u8]| -> Result<()> {
            zip.start_file(name, options)
                .map_err(|e| Error::ZipError(format!("Failed to start {}: {}", name, e)))?;
            zip.write_all(data)?;
            Ok(())
        };

        let count = self.slides.len();
        add("[Content_Types].xml", parts::content_types(count).as_bytes())?;
        add("_rels/.rels", parts::package_rels().as_bytes())?;
        add(
            "docProps/core.xml",
            parts::core_properties(&self.title, &self.author).as_bytes(),
        )?;
        add("ppt/presentation.xml", parts::presentation(count).as_bytes())?;
        add(
            "ppt/_rels/presentation.xml.rels",
            parts::presentation_rels(count).as_bytes(),
        )?;
        add("ppt/slideMasters/slideMaster1.xml", parts::slide_master().as_bytes())?;
        add(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            parts::slide_master_rels().as_bytes(),
        )?;
        add("ppt/slideLayouts/slideLayout1.xml", parts::slide_layout().as_bytes())?;
        add(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            parts::slide_layout_rels().as_bytes(),
        )?;
        add("ppt/theme/theme1.xml", parts::theme().as_bytes())?;

        for (i, slide) in self.slides.iter().enumerate() {
            add(
                &format!("ppt/slides/slide{}.xml", i + 1),
                Self::slide_xml(slide).as_bytes(),
            )?;
            add(
                &format!("ppt/slides/_rels/slide{}.xml.rels", i + 1),
                self.slide_rels(slide).as_bytes(),
            )?;
        }

        for media in &self.media {
            add(&format!("ppt/media/{}", media.name), &media.bytes)?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

impl SlidePart {
    fn next_id(&mut self) -> u32 {
        let id = self.next_shape_id;
        self.next_shape_id += 1;
        id
    }

    fn open_text_box(&mut self, frame: &Frame) {
        let id = self.next_id();
        let _ = write!(
            self.shapes,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{0}" name="TextBox {0}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#,
            id
        );
        self.shapes.push_str("<p:spPr>");
        push_xfrm(&mut self.shapes, frame);
        self.shapes
            .push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#);
        self.shapes
            .push_str(r#"<p:txBody><a:bodyPr wrap="square" rtlCol="0"/><a:lstStyle/>"#);
    }

    fn close_text_box(&mut self) {
        self.shapes.push_str("</p:txBody></p:sp>");
    }
}

fn push_xfrm(xml: &mut String, frame: &Frame) {
    let _ = write!(
        xml,
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        emu(frame.x),
        emu(frame.y),
        emu(frame.w),
        emu(frame.h)
    );
}

fn push_run(xml: &mut String, text: &str, font_size: u32, bold: bool, color: &str) {
    let _ = write!(
        xml,
        r#"<a:r><a:rPr lang="en-US" sz="{}"{} dirty="0"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:rPr><a:t>{}</a:t></a:r>"#,
        font_size * 100,
        if bold { r#" b="1""# } else { "" },
        escape_text(color),
        escape_text(text)
    );
}

impl DeckWriter for PptxWriter {
    fn set_properties(&mut self, title: &str, author: &str) {
        self.title = title.to_string();
        self.author = author.to_string();
    }

    fn begin_slide(&mut self, background: &str) -> Result<()> {
        self.slides.push(SlidePart {
            background: background.to_string(),
            shapes: String::new(),
            images: Vec::new(),
            next_shape_id: 2,
        });
        Ok(())
    }

    fn add_text(&mut self, block: &TextBlock) -> Result<()> {
        let slide = self.current_slide()?;
        slide.open_text_box(&block.frame);
        slide.shapes.push_str("<a:p>");
        if block.align == Align::Center {
            slide.shapes.push_str(r#"<a:pPr algn="ctr"/>"#);
        }
        push_run(&mut slide.shapes, &block.text, block.font_size, block.bold, &block.color);
        slide.shapes.push_str("</a:p>");
        slide.close_text_box();
        Ok(())
    }

    fn add_bullets(&mut self, list: &BulletList) -> Result<()> {
        let slide = self.current_slide()?;
        slide.open_text_box(&list.frame);
        for item in &list.items {
            let _ = write!(
                slide.shapes,
                r#"<a:p><a:pPr marL="{}" indent="-{}"><a:buFont typeface="Arial"/><a:buChar char="•"/></a:pPr>"#,
                BULLET_MARGIN, BULLET_MARGIN
            );
            push_run(&mut slide.shapes, item, list.font_size, false, &list.color);
            slide.shapes.push_str("</a:p>");
        }
        slide.close_text_box();
        Ok(())
    }

    fn add_image(&mut self, image: &ImagePlacement) -> Result<()> {
        self.current_slide()?;
        let media = self.media_index(&image.url)?;

        let slide = self.current_slide()?;
        slide.images.push(media);
        let rel_id = slide.images.len() + 1;
        let id = slide.next_id();

        let _ = write!(
            slide.shapes,
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{0}" name="Picture {0}" descr="{1}"/>"#,
            id,
            escape_text(image.alt.as_deref().unwrap_or_default())
        );
        slide.shapes.push_str(
            r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
        );
        let _ = write!(
            slide.shapes,
            r#"<p:blipFill><a:blip r:embed="rId{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
            rel_id
        );
        slide.shapes.push_str("<p:spPr>");
        push_xfrm(&mut slide.shapes, &image.frame);
        slide
            .shapes
            .push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>> {
        let bytes = self.write_package()?;
        log::debug!(
            "Wrote deck {:?}: {} slides, {} media parts, {} bytes",
            self.title,
            self.slides.len(),
            self.media.len(),
            bytes.len()
        );

        self.title.clear();
        self.author.clear();
        self.slides.clear();
        self.media.clear();
        self.media_by_url.clear();
        Ok(bytes)
    }
}
