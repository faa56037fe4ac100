//! Paginated PDF canvas over `lopdf`.
//!
//! Callers draw in top-left page coordinates (points); the canvas flips them
//! into PDF user space and buffers one operation list per page until
//! [`Canvas::finish`] writes the document.

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::DynamicImage;
use lopdf::{
    Dictionary, Document, Object, ObjectId, Stream, StringFormat,
    content::{Content, Operation},
    dictionary,
    xref::XrefType,
};
use std::io::Write;
use time::OffsetDateTime;

use crate::error::ReportResult;

/// Star outline in a 50x47 box, traced clockwise from the top point.
const STAR: [(f32, f32); 10] = [
    (25.0, 1.0),
    (31.0, 18.0),
    (49.0, 18.0),
    (35.0, 29.0),
    (40.0, 46.0),
    (25.0, 36.0),
    (10.0, 46.0),
    (15.0, 29.0),
    (1.0, 18.0),
    (19.0, 18.0),
];

/// Built-in Type1 fonts used by the worksheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    TimesBold,
    TimesRoman,
    HelveticaBoldOblique,
}

impl Font {
    const ALL: [Font; 3] = [Font::TimesBold, Font::TimesRoman, Font::HelveticaBoldOblique];

    fn resource(self) -> &'static str {
        match self {
            Font::TimesBold => "F1",
            Font::TimesRoman => "F2",
            Font::HelveticaBoldOblique => "F3",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            Font::TimesBold => "Times-Bold",
            Font::TimesRoman => "Times-Roman",
            Font::HelveticaBoldOblique => "Helvetica-BoldOblique",
        }
    }

    /// AFM ascender per unit of font size.
    fn ascender(self) -> f32 {
        match self {
            Font::TimesBold => 0.683,
            Font::TimesRoman => 0.683,
            Font::HelveticaBoldOblique => 0.718,
        }
    }
}

/// Title, creator and timestamps for the document Info dictionary.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub title: String,
    pub creator: String,
    pub created: OffsetDateTime,
}

pub struct Canvas {
    doc: Document,
    width: f32,
    height: f32,
    pages: Vec<Vec<Operation>>,
    xobjects: Dictionary,
    image_count: usize,
}

/// Encode text for a WinAnsiEncoding font; unmappable characters become `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            c if (' '..='~').contains(&c) || ('\u{A0}'..='\u{FF}').contains(&c) => c as u8,
            _ => b'?',
        })
        .collect()
}

fn deflate(data: &[u8]) -> ReportResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn image_stream(width: u32, height: u32, color_space: &str, data: &[u8]) -> ReportResult<Stream> {
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };
    Ok(Stream::new(dict, deflate(data)?))
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        let mut doc = Document::with_version("1.4");
        doc.reference_table.cross_reference_type = XrefType::CrossReferenceTable;
        Canvas {
            doc,
            width,
            height,
            pages: vec![Vec::new()],
            xobjects: Dictionary::new(),
            image_count: 0,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn pdf_y(&self, y: f32) -> f32 {
        self.height - y
    }

    fn ops(&mut self) -> &mut Vec<Operation> {
        // `pages` always holds at least the first page.
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    pub fn new_page(&mut self) {
        self.pages.push(Vec::new());
    }

    /// Embed an image XObject and return its resource name.
    ///
    /// Alpha is carried as a soft mask; grayscale stays single-channel.
    pub fn add_image(&mut self, image: &DynamicImage) -> ReportResult<String> {
        let (width, height) = (image.width(), image.height());
        let color = image.color();
        let stream = if color.has_alpha() {
            let rgba = image.to_rgba8();
            let mut rgb = Vec::with_capacity((width * height * 3) as usize);
            let mut alpha = Vec::with_capacity((width * height) as usize);
            for pixel in rgba.pixels() {
                rgb.extend_from_slice(&pixel.0[..3]);
                alpha.push(pixel.0[3]);
            }
            let smask_id = self
                .doc
                .add_object(image_stream(width, height, "DeviceGray", &alpha)?);
            let mut stream = image_stream(width, height, "DeviceRGB", &rgb)?;
            stream.dict.set("SMask", smask_id);
            stream
        } else if !color.has_color() {
            image_stream(width, height, "DeviceGray", image.to_luma8().as_raw())?
        } else {
            image_stream(width, height, "DeviceRGB", image.to_rgb8().as_raw())?
        };

        let id = self.doc.add_object(stream);
        let name = format!("Im{}", self.image_count);
        self.image_count += 1;
        self.xobjects.set(name.as_str(), id);
        Ok(name)
    }

    /// Single-line text whose top edge sits at `y`.
    pub fn text(&mut self, font: Font, size: f32, text: &str, x: f32, y: f32) {
        let baseline = self.pdf_y(y + font.ascender() * size);
        let ops = self.ops();
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("rg", vec![0.0.into(), 0.0.into(), 0.0.into()]));
        ops.push(Operation::new("Tf", vec![font.resource().into(), size.into()]));
        ops.push(Operation::new(
            "Tm",
            vec![1.0.into(), 0.0.into(), 0.0.into(), 1.0.into(), x.into(), baseline.into()],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(win_ansi(text), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));
    }

    /// Straight stroke with round caps; `dash` is `(on, off)` in points.
    pub fn stroke(&mut self, from: (f32, f32), to: (f32, f32), width: f32, dash: Option<(f32, f32)>) {
        let (x0, y0) = (from.0, self.pdf_y(from.1));
        let (x1, y1) = (to.0, self.pdf_y(to.1));
        let pattern: Vec<Object> = match dash {
            Some((on, off)) => vec![on.into(), off.into()],
            None => vec![],
        };
        let ops = self.ops();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("w", vec![width.into()]));
        ops.push(Operation::new("J", vec![1.into()]));
        ops.push(Operation::new("d", vec![pattern.into(), 0.into()]));
        ops.push(Operation::new("RG", vec![0.0.into(), 0.0.into(), 0.0.into()]));
        ops.push(Operation::new("m", vec![x0.into(), y0.into()]));
        ops.push(Operation::new("l", vec![x1.into(), y1.into()]));
        ops.push(Operation::new("S", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    /// White rectangle, filled and stroked with round joins so it grows by
    /// half of `bleed` on every side.
    pub fn backdrop(&mut self, x: f32, y: f32, width: f32, height: f32, bleed: f32) {
        let bottom = self.pdf_y(y + height);
        let ops = self.ops();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("w", vec![bleed.into()]));
        ops.push(Operation::new("j", vec![1.into()]));
        ops.push(Operation::new("rg", vec![1.0.into(), 1.0.into(), 1.0.into()]));
        ops.push(Operation::new("RG", vec![1.0.into(), 1.0.into(), 1.0.into()]));
        ops.push(Operation::new(
            "re",
            vec![x.into(), bottom.into(), width.into(), height.into()],
        ));
        ops.push(Operation::new("B", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    /// Place a previously added image into the box with top-left `(x, y)`.
    pub fn image(&mut self, name: &str, x: f32, y: f32, width: f32, height: f32) {
        let bottom = self.pdf_y(y + height);
        let ops = self.ops();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![width.into(), 0.0.into(), 0.0.into(), height.into(), x.into(), bottom.into()],
        ));
        ops.push(Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]));
        ops.push(Operation::new("Q", vec![]));
    }

    /// Outlined white star with its bounding box at `(x, y)`.
    pub fn star(&mut self, x: f32, y: f32, scale: f32) {
        let points: Vec<(f32, f32)> = STAR
            .iter()
            .map(|&(px, py)| (x + px * scale, self.pdf_y(y + py * scale)))
            .collect();
        let ops = self.ops();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("w", vec![(0.5 * scale).into()]));
        ops.push(Operation::new("rg", vec![1.0.into(), 1.0.into(), 1.0.into()]));
        ops.push(Operation::new("RG", vec![0.0.into(), 0.0.into(), 0.0.into()]));
        if let Some((&(x0, y0), rest)) = points.split_first() {
            ops.push(Operation::new("m", vec![x0.into(), y0.into()]));
            for &(px, py) in rest {
                ops.push(Operation::new("l", vec![px.into(), py.into()]));
            }
        }
        ops.push(Operation::new("h", vec![]));
        ops.push(Operation::new("B", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    /// Write the document and return its bytes.
    pub fn finish(mut self, info: &DocumentInfo) -> ReportResult<Vec<u8>> {
        let id_pages = self.doc.new_object_id();

        let mut fonts = Dictionary::new();
        for font in Font::ALL {
            let id = self.doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource(), id);
        }
        let id_resources = self.doc.add_object(dictionary! {
            "Font" => fonts,
            "XObject" => std::mem::take(&mut self.xobjects),
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for operations in std::mem::take(&mut self.pages) {
            let content = Content { operations };
            let id_content = self
                .doc
                .add_object(Stream::new(dictionary! {}, content.encode()?));
            let id_page: ObjectId = self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => id_pages,
                "Contents" => id_content,
                "Resources" => id_resources,
            });
            kids.push(id_page.into());
        }

        let pdf_pages = dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
            "MediaBox" => vec![0.into(), 0.into(), self.width.into(), self.height.into()],
        };
        self.doc.set_object(id_pages, pdf_pages);

        let id_catalog = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => id_pages,
        });
        self.doc.trailer.set("Root", id_catalog);

        let date = info.created;
        let s_date = format!(
            "D:{:04}{:02}{:02}{:02}{:02}{:02}Z",
            date.year(),
            u8::from(date.month()),
            date.day(),
            date.hour(),
            date.minute(),
            date.second(),
        );
        let id_info = self.doc.add_object(dictionary! {
            "Title" => Object::String(win_ansi(&info.title), StringFormat::Literal),
            "Creator" => Object::string_literal(info.creator.as_str()),
            "CreationDate" => Object::string_literal(s_date.as_str()),
            "ModDate" => Object::string_literal(s_date),
        });
        self.doc.trailer.set("Info", id_info);

        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer)?;
        Ok(buffer)
    }
}
