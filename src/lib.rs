//! # certsplit
//!
//! Split a multi-page certificate PDF into one PDF per recipient, each named
//! after the recipient, and deliver them as a single ZIP archive.
//!
//! ## How names are found
//!
//! Certificates in a batch share a layout, so the recipient's name starts at
//! the same position in every page's extracted text. A human picks that
//! position once (the *name offset*) with the help of [`calibrate()`], and
//! [`split()`] then reads each page's name from that offset up to the next
//! newline.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ calibrate   page 1 → text + suggested offset + PNG preview
//!  │                 (a human confirms or corrects the offset)
//!  └─ split       for each page, in order:
//!                    cut page (lopdf) → extract text (Tika) →
//!                    name = text[offset..newline] → sanitise → dedupe →
//!                    write <name>[_N].pdf
//!                 then zip the job directory and remove it
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use certsplit::{calibrate, split, SourceDocument, SplitterConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SplitterConfig::builder().media_root("media").build()?;
//!     let document = SourceDocument::from_bytes(std::fs::read("batch.pdf")?)?;
//!
//!     let calibration = calibrate(&document, &config).await?;
//!     println!("name starts at: {:?}", calibration.text_from_offset());
//!
//!     let archive = split(&document, calibration.auto_offset, &config).await?;
//!     println!("{} certificates in {}", archive.entry_count(), archive.path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `certsplit` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! certsplit = { version = "0.1", default-features = false }
//! ```
//!
//! ## Backends
//!
//! | Concern | Default | Alternative |
//! |---------|---------|-------------|
//! | Text extraction | [`TikaExtractor`] (Apache Tika server) | [`PdfiumExtractor`] (in-process) |
//! | Preview rendering | [`PdfiumRenderer`] | any [`PageRenderer`] |
//!
//! Both pdfium-backed types need the pdfium shared library at runtime.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod calibrate;
pub mod config;
pub mod error;
pub mod observe;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod split;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use calibrate::{calibrate, calibrate_sync};
pub use config::{SplitterConfig, SplitterConfigBuilder};
pub use error::{
    CalibrationError, ConfigError, DocumentError, ExtractionError, PageFailure, RenderError,
    SplitError,
};
pub use output::{CalibrationResult, NamedPage, SplitArchive};
pub use pipeline::extract::{PdfiumExtractor, TextExtractor, TikaExtractor};
pub use pipeline::filename::{first_alphabetic_index, resolve_collision, sanitize, trim_to_newline};
pub use pipeline::pages::{PageDocument, SourceDocument};
pub use pipeline::render::{PageRenderer, PdfiumRenderer};
pub use progress::{NoopProgressCallback, ProgressCallback, SplitProgressCallback};
pub use split::{split, split_sync};
