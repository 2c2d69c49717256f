//! Text extraction gateway.
//!
//! Every backend implements [`TextExtractor`]: give it the bytes of a
//! single-page PDF, get back the plain text. The pipeline never looks behind
//! the trait, which keeps tests free of a running Tika server.
//!
//! ## Error contract
//!
//! * [`ExtractionError::BackendUnavailable`] — nothing answered (connection
//!   refused, timeout, pdfium library missing). Usually worth retrying later.
//! * [`ExtractionError::BackendFailure`] — the backend answered and said no
//!   (malformed PDF, HTTP error, garbage response).
//! * `Ok(String::new())` — the backend found no text. Not an error.
//!
//! No backend retries; that decision belongs to the caller.

use crate::error::ExtractionError;
use crate::pipeline::render::bind_pdfium;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Default Tika server address.
pub const DEFAULT_TIKA_URL: &str = "http://localhost:9998";

/// Metadata key under which Tika returns the extracted body text.
const TIKA_CONTENT_KEY: &str = "X-TIKA:content";

/// Extracts plain text from a PDF held in memory.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Short backend name used in errors and logs.
    fn name(&self) -> &str;

    /// Extract the text of `pdf`. Empty text is a valid result.
    async fn extract(&self, pdf: &[u8]) -> Result<String, ExtractionError>;
}

/// Apache Tika server client (`PUT /rmeta/text`).
#[derive(Debug, Clone)]
pub struct TikaExtractor {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl Default for TikaExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_TIKA_URL, 60)
    }
}

impl TikaExtractor {
    /// Client for the Tika server at `base_url`; each request is abandoned
    /// after `timeout_secs`.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn unavailable(&self, detail: impl Into<String>) -> ExtractionError {
        ExtractionError::BackendUnavailable {
            backend: self.name().to_string(),
            detail: detail.into(),
        }
    }

    fn failure(&self, detail: impl Into<String>) -> ExtractionError {
        ExtractionError::BackendFailure {
            backend: self.name().to_string(),
            detail: detail.into(),
        }
    }
}

#[async_trait]
impl TextExtractor for TikaExtractor {
    fn name(&self) -> &str {
        "tika"
    }

    async fn extract(&self, pdf: &[u8]) -> Result<String, ExtractionError> {
        let url = format!("{}/rmeta/text", self.base_url);

        let response = self
            .client
            .put(&url)
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .body(pdf.to_vec())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.unavailable(format!(
                        "request to {url} timed out after {}s",
                        self.timeout.as_secs()
                    ))
                } else if e.is_connect() {
                    self.unavailable(format!("cannot connect to {url}: {e}"))
                } else {
                    self.failure(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.failure(format!("HTTP {status} from {url}")));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                self.unavailable(format!("reading response from {url} timed out"))
            } else {
                self.failure(format!("failed to read response body: {e}"))
            }
        })?;

        let text = parse_rmeta(&body).map_err(|e| self.failure(e))?;
        debug!("tika extracted {} chars", text.chars().count());
        Ok(text)
    }
}

/// Pull the body text out of a `/rmeta/text` response.
///
/// The response is a JSON array of metadata records, the first describing
/// the container document. A record without content means "no text".
fn parse_rmeta(body: &str) -> Result<String, String> {
    let records: Vec<Map<String, Value>> =
        serde_json::from_str(body).map_err(|e| format!("unparseable Tika response: {e}"))?;

    Ok(records
        .first()
        .and_then(|r| r.get(TIKA_CONTENT_KEY))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string())
}

/// Local extraction through pdfium's text layer.
#[derive(Debug, Clone, Default)]
pub struct PdfiumExtractor {
    library: Option<PathBuf>,
}

impl PdfiumExtractor {
    pub fn with_library(path: impl Into<PathBuf>) -> Self {
        Self {
            library: Some(path.into()),
        }
    }
}

#[async_trait]
impl TextExtractor for PdfiumExtractor {
    fn name(&self) -> &str {
        "pdfium"
    }

    async fn extract(&self, pdf: &[u8]) -> Result<String, ExtractionError> {
        let bytes = pdf.to_vec();
        let library = self.library.clone();

        tokio::task::spawn_blocking(move || -> Result<String, ExtractionError> {
            let pdfium = bind_pdfium(library.as_deref()).map_err(|e| {
                ExtractionError::BackendUnavailable {
                    backend: "pdfium".into(),
                    detail: e.to_string(),
                }
            })?;
            let failure = |detail: String| ExtractionError::BackendFailure {
                backend: "pdfium".into(),
                detail,
            };

            let document = pdfium
                .load_pdf_from_byte_slice(&bytes, None)
                .map_err(|e| failure(format!("failed to load PDF: {e:?}")))?;

            let mut text = String::new();
            for page in document.pages().iter() {
                let page_text = page
                    .text()
                    .map_err(|e| failure(format!("failed to read text layer: {e:?}")))?;
                text.push_str(&page_text.all());
            }
            Ok(text)
        })
        .await
        .map_err(|e| ExtractionError::BackendFailure {
            backend: "pdfium".into(),
            detail: format!("extraction task panicked: {e}"),
        })?
    }
}
