//! Report rendering.
//!
//! A render runs in three strict phases: every symbol and image is resolved,
//! the layout plan is compiled into positioned draw operations with the
//! record's values bound in, and only then is anything written to the canvas.

use std::collections::HashMap;

use image::DynamicImage;
use qrcode::EcLevel;
use time::OffsetDateTime;

use crate::assets::{self, Fetch, ImageBytes};
use crate::canvas::{Canvas, DocumentInfo, Font};
use crate::config::Config;
use crate::error::ReportResult;
use crate::plan::{Content, Field, Instruction, LayoutPlan, Orientation, Slot, TextStyle};
use crate::record::{FieldRecord, display_number, display_text};
use crate::symbol::{self, Symbol};

const LINE_WIDTH: f32 = 0.5;
const SEPARATOR_WIDTH: f32 = 1.5;
const SEPARATOR_DASH: (f32, f32) = (2.0, 10.0);
const STAR_SCALE: f32 = 0.3;
/// Distance between star origins before scaling.
const STAR_PITCH: f32 = 60.0;

pub fn signature() -> String {
    format!("Created with Nest Notes {}", env!("CARGO_PKG_VERSION"))
}

/// A finished PDF as an ordered list of byte chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub chunks: Vec<Vec<u8>>,
    pub pages: usize,
}

impl RenderedDocument {
    pub fn from_bytes(bytes: &[u8], chunk_size: usize, pages: usize) -> Self {
        RenderedDocument {
            chunks: bytes.chunks(chunk_size.max(1)).map(<[u8]>::to_vec).collect(),
            pages,
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.chunks.concat()
    }
}

/// A positioned drawing call, in top-left page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        font: Font,
        size: f32,
        text: String,
    },
    Stroke {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        dash: Option<(f32, f32)>,
    },
    Backdrop {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        bleed: f32,
    },
    Image {
        slot: Slot,
        x: f32,
        y: f32,
        size: f32,
    },
    Star {
        x: f32,
        y: f32,
        scale: f32,
    },
    PageBreak,
}

/// Everything a render needs before the first drawing call.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub listing: Symbol,
    pub map: Symbol,
    pub photo: Option<ImageBytes>,
    pub icon: ImageBytes,
}

fn font_for(style: TextStyle) -> (Font, f32) {
    match style {
        TextStyle::Label => (Font::TimesBold, 12.0),
        TextStyle::Body => (Font::TimesRoman, 10.0),
        TextStyle::Price => (Font::HelveticaBoldOblique, 16.0),
        TextStyle::Identifier => (Font::HelveticaBoldOblique, 18.0),
    }
}

fn bind(content: Content, record: &FieldRecord) -> String {
    let field = match content {
        Content::Literal(text) => return text.to_string(),
        Content::Field(field) => field,
    };
    match field {
        Field::City => display_text(record.city.as_deref()),
        Field::Address => display_text(record.address.as_deref()),
        Field::BuildYear => display_text(record.build_year.as_deref()),
        Field::Sqft => display_text(record.sqft.as_deref()),
        Field::LotSize => display_text(record.lot_size.as_deref()),
        Field::Beds => display_number(record.num_beds.as_deref()),
        Field::Baths => display_number(record.num_baths.as_deref()),
        Field::GarageSpaces => display_number(record.garage_space_num.as_deref()),
        Field::Price => record.price_or_placeholder().to_string(),
        Field::Identifier => record.identifier(),
    }
}

/// Flatten `plan` into draw operations for `record`.
///
/// Pages are separated by [`DrawOp::PageBreak`]. The listing-photo slot is
/// left out entirely when `has_photo` is false; blank bound values draw nothing.
pub fn compile(plan: &LayoutPlan, record: &FieldRecord, has_photo: bool) -> Vec<DrawOp> {
    let grid = plan.grid;
    let mut ops = Vec::new();
    for (index, page) in plan.pages.iter().enumerate() {
        if index > 0 {
            ops.push(DrawOp::PageBreak);
        }
        for instruction in page.sections.iter().flat_map(|s| s.instructions.iter()) {
            match *instruction {
                Instruction::Label { at, text } => {
                    let (x, y) = grid.resolve(at);
                    let (font, size) = font_for(TextStyle::Label);
                    ops.push(DrawOp::Text {
                        x,
                        y,
                        font,
                        size,
                        text: text.to_string(),
                    });
                }
                Instruction::Text { at, content, style } => {
                    let text = bind(content, record);
                    if text.is_empty() {
                        continue;
                    }
                    let (x, y) = grid.resolve(at);
                    let (font, size) = font_for(style);
                    ops.push(DrawOp::Text { x, y, font, size, text });
                }
                Instruction::Line { at, width } => {
                    let (x, y) = grid.resolve(at);
                    ops.push(DrawOp::Stroke {
                        from: (x, y),
                        to: (x + width, y),
                        width: LINE_WIDTH,
                        dash: None,
                    });
                }
                Instruction::Separator {
                    at,
                    length,
                    orientation,
                } => {
                    let (x, y) = grid.resolve(at);
                    let to = match orientation {
                        Orientation::Horizontal => (x + length, y),
                        Orientation::Vertical => (x, y + length),
                    };
                    ops.push(DrawOp::Stroke {
                        from: (x, y),
                        to,
                        width: SEPARATOR_WIDTH,
                        dash: Some(SEPARATOR_DASH),
                    });
                }
                Instruction::Backdrop {
                    at,
                    width,
                    height,
                    bleed,
                } => {
                    let (x, y) = grid.resolve(at);
                    ops.push(DrawOp::Backdrop {
                        x,
                        y,
                        width,
                        height,
                        bleed,
                    });
                }
                Instruction::Image { at, size, slot } => {
                    if slot == Slot::ListingPhoto && !has_photo {
                        continue;
                    }
                    let (x, y) = grid.resolve(at);
                    ops.push(DrawOp::Image { slot, x, y, size });
                }
                Instruction::StarRow { at, count } => {
                    let (x, y) = grid.resolve(at);
                    for k in 1..=count {
                        ops.push(DrawOp::Star {
                            x: x + STAR_PITCH * STAR_SCALE * f32::from(k),
                            y,
                            scale: STAR_SCALE,
                        });
                    }
                }
            }
        }
    }
    ops
}

/// Write compiled operations onto a fresh canvas and return the PDF bytes and page count.
pub fn draw(
    plan: &LayoutPlan,
    ops: &[DrawOp],
    resolved: &Resolved,
    info: &DocumentInfo,
) -> ReportResult<(Vec<u8>, usize)> {
    let mut canvas = Canvas::new(plan.width, plan.height);

    let mut images: HashMap<Slot, String> = HashMap::new();
    images.insert(
        Slot::ListingSymbol,
        canvas.add_image(&DynamicImage::ImageLuma8(resolved.listing.image.clone()))?,
    );
    images.insert(
        Slot::MapSymbol,
        canvas.add_image(&DynamicImage::ImageLuma8(resolved.map.image.clone()))?,
    );
    images.insert(Slot::Icon, canvas.add_image(&resolved.icon.decode()?)?);
    if let Some(photo) = &resolved.photo {
        images.insert(Slot::ListingPhoto, canvas.add_image(&photo.decode()?)?);
    }

    for op in ops {
        match op {
            DrawOp::Text {
                x,
                y,
                font,
                size,
                text,
            } => canvas.text(*font, *size, text, *x, *y),
            DrawOp::Stroke {
                from,
                to,
                width,
                dash,
            } => canvas.stroke(*from, *to, *width, *dash),
            DrawOp::Backdrop {
                x,
                y,
                width,
                height,
                bleed,
            } => canvas.backdrop(*x, *y, *width, *height, *bleed),
            DrawOp::Image { slot, x, y, size } => {
                if let Some(name) = images.get(slot) {
                    canvas.image(name, *x, *y, *size, *size);
                }
            }
            DrawOp::Star { x, y, scale } => canvas.star(*x, *y, *scale),
            DrawOp::PageBreak => canvas.new_page(),
        }
    }

    let pages = canvas.page_count();
    Ok((canvas.finish(info)?, pages))
}

/// Renders worksheets for one deployment's settings.
pub struct Reporter<F> {
    fetcher: F,
    config: Config,
}

impl<F: Fetch> Reporter<F> {
    pub fn new(fetcher: F, config: Config) -> Self {
        Reporter { fetcher, config }
    }

    /// Generate both symbols, then fetch the photo and icon concurrently.
    pub async fn resolve(&self, record: &FieldRecord) -> ReportResult<Resolved> {
        let listing_payload = record
            .url
            .as_deref()
            .unwrap_or(&self.config.listing_fallback);
        let listing = symbol::generate_symbol("listing", listing_payload, EcLevel::M)?;
        let map_url = symbol::map_directions_url(&self.config.map_base, record.address.as_deref())?;
        let map = symbol::generate_symbol("map", &map_url, EcLevel::H)?;
        log::debug!(
            "Symbols encode {:?} ({:?}) and {:?} ({:?})",
            listing.payload,
            listing.level,
            map.payload,
            map.level
        );

        let photo = async {
            match record.img_url.as_deref() {
                Some(url) => assets::resolve(&self.fetcher, url).await.map(Some),
                None => Ok(None),
            }
        };
        let icon = assets::resolve_icon(&self.fetcher, &self.config.icon);
        let (photo, icon) = tokio::try_join!(photo, icon)?;

        Ok(Resolved {
            listing,
            map,
            photo,
            icon,
        })
    }

    pub async fn render(
        &self,
        record: &FieldRecord,
        plan: &LayoutPlan,
        created: OffsetDateTime,
    ) -> ReportResult<RenderedDocument> {
        log::info!(
            "Rendering report #{} ({} pages)",
            record.num_str,
            plan.page_count()
        );
        let resolved = self.resolve(record).await?;

        let ops = compile(plan, record, resolved.photo.is_some());
        log::debug!("Compiled {} draw operations", ops.len());

        let info = DocumentInfo {
            title: format!("House Review #{}", record.num_str),
            creator: signature(),
            created,
        };
        let (bytes, pages) = draw(plan, &ops, &resolved, &info)?;
        let document = RenderedDocument::from_bytes(&bytes, self.config.chunk_size, pages);
        log::info!(
            "Rendered report #{} ({} pages, {} bytes in {} chunks)",
            record.num_str,
            document.pages,
            document.len(),
            document.chunks.len()
        );
        Ok(document)
    }
}
