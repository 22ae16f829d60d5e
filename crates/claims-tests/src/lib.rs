//! Shared fixtures and test doubles for the integration tests.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use claims_core::error::{ClaimsError, Result};
use claims_core::{ClaimExtractor, ImagePayload};

pub const MULTIPART_BOUNDARY: &str = "claims-test-boundary";

/// Deterministic extractor: returns a fixed reply, or fails when the front
/// image's bytes contain a marker.
pub struct StubExtractor {
    reply: String,
    fail_marker: Option<String>,
    pair_calls: AtomicUsize,
    single_calls: AtomicUsize,
    fronts: Mutex<Vec<String>>,
}

impl StubExtractor {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            fail_marker: None,
            pair_calls: AtomicUsize::new(0),
            single_calls: AtomicUsize::new(0),
            fronts: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call whose front image contains `marker`.
    pub fn failing_on(mut self, marker: impl Into<String>) -> Self {
        self.fail_marker = Some(marker.into());
        self
    }

    pub fn pair_calls(&self) -> usize {
        self.pair_calls.load(Ordering::SeqCst)
    }

    pub fn single_calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
    }

    /// Front images seen so far, as text, sorted.
    pub fn fronts_seen(&self) -> Vec<String> {
        let mut fronts = self.fronts.lock().unwrap().clone();
        fronts.sort();
        fronts
    }

    fn check(&self, image: &ImagePayload) -> Result<()> {
        let text = String::from_utf8_lossy(&image.bytes);
        match &self.fail_marker {
            Some(marker) if text.contains(marker.as_str()) => Err(ClaimsError::Extraction(
                format!("provider rejected request for {text}"),
            )),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ClaimExtractor for StubExtractor {
    async fn extract_pair(&self, front: &ImagePayload, _back: &ImagePayload) -> Result<String> {
        self.pair_calls.fetch_add(1, Ordering::SeqCst);
        self.fronts
            .lock()
            .unwrap()
            .push(String::from_utf8_lossy(&front.bytes).into_owned());
        self.check(front)?;
        Ok(self.reply.clone())
    }

    async fn extract_single(&self, image: &ImagePayload) -> Result<String> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        self.check(image)?;
        Ok(self.reply.clone())
    }
}

/// Create each file in `dir` with its own name as content.
pub fn write_images(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), name.as_bytes()).unwrap();
    }
}

/// One part of a multipart body: field name, file name, content type, bytes.
pub struct Part<'a> {
    pub field: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn image(field: &'a str, file_name: &'a str, bytes: &'a [u8]) -> Self {
        Self {
            field,
            file_name: Some(file_name),
            content_type: "image/jpeg",
            bytes,
        }
    }
}

/// Encode `parts` as a `multipart/form-data` body using `MULTIPART_BOUNDARY`.
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        let disposition = match part.file_name {
            Some(file_name) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{file_name}\"\r\n",
                part.field
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.field),
        };
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes());
        body.extend_from_slice(part.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
}
