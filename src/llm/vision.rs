// ABOUTME: Label OCR and barcode reading through a vision-capable chat model
// ABOUTME: Sends the photo as a base64 data URL and validates barcodes by check digit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use tracing::{debug, instrument};

use super::prompts::{BARCODE_READ_PROMPT, LABEL_OCR_PROMPT};
use super::{ChatMessage, ChatRequest, LlmProvider};
use crate::errors::{AppError, AppResult};
use crate::external::gtin;
use crate::external::{BarcodeDecoder, TextRecognizer};

/// Guess the image MIME type from magic bytes, defaulting to JPEG
#[must_use]
pub fn detect_image_mime(image: &[u8]) -> &'static str {
    match image {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "image/jpeg",
    }
}

/// OCR and barcode reading backed by a vision chat model
pub struct VisionOcrClient {
    provider: Arc<dyn LlmProvider>,
}

impl VisionOcrClient {
    /// Wrap a provider whose default model accepts images
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    async fn ask(&self, prompt: &str, image: &[u8]) -> AppResult<String> {
        if image.is_empty() {
            return Err(AppError::invalid_input("Image is empty"));
        }
        let data_url = format!(
            "data:{};base64,{}",
            detect_image_mime(image),
            general_purpose::STANDARD.encode(image)
        );
        let request = ChatRequest::new(vec![ChatMessage::user(prompt).with_image(data_url)])
            .with_temperature(0.0)
            .with_max_tokens(2000);
        Ok(self.provider.complete(&request).await?.content)
    }
}

#[async_trait]
impl TextRecognizer for VisionOcrClient {
    #[instrument(skip(self, image), fields(bytes = image.len()))]
    async fn recognize(&self, image: &[u8]) -> AppResult<String> {
        let text = self.ask(LABEL_OCR_PROMPT, image).await?;
        // Models sometimes fence the transcription
        let text = text
            .trim()
            .trim_start_matches("```text")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
            .to_owned();
        debug!(chars = text.len(), "Label text recognized");
        Ok(text)
    }
}

#[async_trait]
impl BarcodeDecoder for VisionOcrClient {
    #[instrument(skip(self, image), fields(bytes = image.len()))]
    async fn decode(&self, image: &[u8]) -> AppResult<Option<String>> {
        let reply = self.ask(BARCODE_READ_PROMPT, image).await?;
        let barcode = gtin::find_in_text(&reply);
        debug!(found = barcode.is_some(), "Barcode read");
        Ok(barcode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_image_mime() {
        assert_eq!(detect_image_mime(&[0x89, b'P', b'N', b'G', 0x0d]), "image/png");
        assert_eq!(detect_image_mime(b"RIFF\x00\x00\x00\x00WEBPVP8"), "image/webp");
        assert_eq!(detect_image_mime(&[0xff, 0xd8, 0xff]), "image/jpeg");
    }
}
