//! Pipeline stages shared by calibration and splitting.
//!
//! Each submodule implements one step. Extraction and rendering sit behind
//! traits so a backend can be swapped (or replaced by a test double) without
//! touching the other stages.
//!
//! ## Data Flow
//!
//! ```text
//!            ┌─▶ extract ──▶ filename ──▶ (write page) ──▶ archive
//! pages ─────┤   (Tika)      (name/dedupe)                 (zip)
//! (lopdf)    └─▶ render ──▶ encode
//!                (pdfium)    (png)        calibration preview only
//! ```
//!
//! 1. [`pages`]    — validate the upload and cut it into single-page PDFs
//! 2. [`extract`]  — page text through an external backend; network I/O
//! 3. [`filename`] — offset slicing, sanitising and collision numbering
//! 4. [`render`]   — rasterise a page; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 5. [`encode`]   — PNG-encode the rendered preview
//! 6. [`archive`]  — pack a job's pages into one ZIP, in page order

pub mod archive;
pub mod encode;
pub mod extract;
pub mod filename;
pub mod pages;
pub mod render;
