use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::assets::Fetch;
use crate::error::{ReportError, ReportResult};

/// Canned responses keyed by URL; unknown URLs answer 404.
#[derive(Clone, Default)]
pub struct MockFetcher {
    responses: Arc<HashMap<String, Result<Vec<u8>, u16>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn with_body(mut self, url: &str, body: Vec<u8>) -> Self {
        Arc::make_mut(&mut self.responses).insert(url.to_string(), Ok(body));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        Arc::make_mut(&mut self.responses).insert(url.to_string(), Err(status));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Fetch for MockFetcher {
    async fn get(&self, url: &str) -> ReportResult<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.responses.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(ReportError::Fetch {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(ReportError::Fetch {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| Rgb([(x * 30) as u8, (y * 40) as u8, 128]))
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(gradient(width, height))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(gradient(width, height))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .unwrap();
    buf
}

pub fn webp_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(gradient(width, height))
        .write_with_encoder(WebPEncoder::new_lossless(Cursor::new(&mut buf)))
        .unwrap();
    buf
}
