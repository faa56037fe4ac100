//! Remote and bundled images for the report.
//!
//! Listing photos are fetched over HTTP(S) and normalized to PNG or JPEG, the
//! two formats the canvas embeds. WebP is decoded and re-encoded as JPEG before
//! it leaves this module.

use std::future::Future;
use std::io::Cursor;
use std::time::Duration;

use image::ImageFormat;
use image::codecs::jpeg::JpegEncoder;

use crate::error::{ReportError, ReportResult};

/// Decorative car icon drawn inside the map symbol.
pub static EMBEDDED_ICON: &[u8] = include_bytes!("../assets/car.png");

const JPEG_QUALITY: u8 = 90;

/// Raster formats the canvas accepts without conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
}

impl RasterFormat {
    pub fn image_format(self) -> ImageFormat {
        match self {
            RasterFormat::Png => ImageFormat::Png,
            RasterFormat::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// Allow-listed source formats, keyed by URL extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Png,
    Jpeg,
    Webp,
}

impl SourceFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(SourceFormat::Png),
            "jpg" | "jpeg" => Some(SourceFormat::Jpeg),
            "webp" => Some(SourceFormat::Webp),
            _ => None,
        }
    }
}

/// Image bytes in a format the canvas embeds natively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBytes {
    pub format: RasterFormat,
    pub bytes: Vec<u8>,
}

impl ImageBytes {
    pub fn decode(&self) -> ReportResult<image::DynamicImage> {
        Ok(image::load_from_memory_with_format(
            &self.bytes,
            self.format.image_format(),
        )?)
    }
}

/// Extension of the last path segment of `url`, ignoring query and fragment.
pub fn url_extension(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let last = path.rsplit('/').next().unwrap_or_default();
    match last.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => "",
    }
}

/// Check `url` against the allow-list without touching the network.
pub fn source_format(url: &str) -> ReportResult<SourceFormat> {
    let ext = url_extension(url);
    SourceFormat::from_extension(ext).ok_or_else(|| ReportError::UnsupportedFormat(ext.to_string()))
}

/// Network seam: a single unauthenticated GET.
pub trait Fetch: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = ReportResult<Vec<u8>>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Option<Duration>) -> ReportResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(HttpFetcher {
            client: builder.build()?,
        })
    }
}

impl Fetch for HttpFetcher {
    async fn get(&self, url: &str) -> ReportResult<Vec<u8>> {
        log::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::Fetch {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await?;
        log::debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

/// Re-encode a WebP image as JPEG.
pub fn webp_to_jpeg(webp: &[u8]) -> ReportResult<Vec<u8>> {
    let transcode = || -> Result<Vec<u8>, image::ImageError> {
        let decoded = image::load_from_memory_with_format(webp, ImageFormat::WebP)?;
        let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());
        let mut out = Vec::new();
        rgb.write_with_encoder(JpegEncoder::new_with_quality(
            Cursor::new(&mut out),
            JPEG_QUALITY,
        ))?;
        Ok(out)
    };
    transcode().map_err(|e| {
        log::error!("WebP to JPEG conversion failed: {}", e);
        ReportError::Transcode(e)
    })
}

/// The format the bytes actually carry. Listing hosts often serve PNG under a
/// `.jpg` path, so the extension only gates the request.
fn sniff(bytes: &[u8], declared: SourceFormat) -> SourceFormat {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => SourceFormat::Png,
        Ok(ImageFormat::Jpeg) => SourceFormat::Jpeg,
        Ok(ImageFormat::WebP) => SourceFormat::Webp,
        _ => declared,
    }
}

/// Resolve a listing photo URL to embeddable image bytes.
///
/// The extension is checked before any request is made.
pub async fn resolve<F: Fetch>(fetcher: &F, url: &str) -> ReportResult<ImageBytes> {
    let declared = source_format(url)?;
    let bytes = fetcher.get(url).await?;
    let format = sniff(&bytes, declared);
    if format != declared {
        log::debug!("{} is {:?}, not {:?}", url, format, declared);
    }
    match format {
        SourceFormat::Png => Ok(ImageBytes {
            format: RasterFormat::Png,
            bytes,
        }),
        SourceFormat::Jpeg => Ok(ImageBytes {
            format: RasterFormat::Jpeg,
            bytes,
        }),
        SourceFormat::Webp => Ok(ImageBytes {
            format: RasterFormat::Jpeg,
            bytes: webp_to_jpeg(&bytes)?,
        }),
    }
}

/// Where the decorative icon comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconSource {
    Embedded,
    Remote(String),
}

/// Resolve the decorative icon. A remote icon is a required asset.
pub async fn resolve_icon<F: Fetch>(fetcher: &F, source: &IconSource) -> ReportResult<ImageBytes> {
    match source {
        IconSource::Embedded => Ok(ImageBytes {
            format: RasterFormat::Png,
            bytes: EMBEDDED_ICON.to_vec(),
        }),
        IconSource::Remote(url) => resolve(fetcher, url).await,
    }
}
