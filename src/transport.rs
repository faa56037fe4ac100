//! Binary-safe transport of a rendered document over a JSON response.
//!
//! Each chunk is base64 encoded on its own; the browser decodes them one by
//! one and concatenates the results into a `application/pdf` blob.

use base64::prelude::*;
use serde::{Deserialize, Serialize};

use crate::render::RenderedDocument;

pub fn encode_chunks(chunks: &[Vec<u8>]) -> Vec<String> {
    chunks.iter().map(|c| BASE64_STANDARD.encode(c)).collect()
}

#[cfg(test)]
pub fn decode_chunks(encoded: &[String]) -> Result<Vec<Vec<u8>>, base64::DecodeError> {
    encoded.iter().map(|c| BASE64_STANDARD.decode(c)).collect()
}

/// JSON body returned by the submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    pub file_name: String,
    pub pages: usize,
    pub chunks: Vec<String>,
}

impl ReportPayload {
    pub fn new(file_name: String, document: &RenderedDocument) -> Self {
        ReportPayload {
            file_name,
            pages: document.pages,
            chunks: encode_chunks(&document.chunks),
        }
    }

    /// Reassemble the document bytes, as the browser does.
    #[cfg(test)]
    pub fn to_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        Ok(decode_chunks(&self.chunks)?.concat())
    }
}
