//! Calibration: suggest where the recipient name starts on page 1.
//!
//! Runs once per uploaded document. The suggested offset is only a guess
//! (the first letter on the page); a person looks at the preview image and
//! the text from that offset, then confirms or corrects it before calling
//! [`crate::split()`].

use crate::config::SplitterConfig;
use crate::error::{CalibrationError, DocumentError};
use crate::observe::log_failure;
use crate::output::CalibrationResult;
use crate::pipeline::encode::{encode_png, PREVIEW_EXTENSION};
use crate::pipeline::filename::{desired_path, first_alphabetic_index, resolve_collision};
use crate::pipeline::pages::SourceDocument;
use crate::pipeline::render;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Analyse page 1 of `document`.
///
/// 1. Extract page 1's text through the configured [`crate::TextExtractor`].
/// 2. Suggest the char index of its first alphabetic character.
/// 3. Render page 1 to a PNG under [`SplitterConfig::calibration_dir`].
///
/// The preview image belongs to the caller. If anything fails, no image is
/// left behind.
///
/// # Errors
/// - [`CalibrationError::Document`] — the document has no pages
/// - [`CalibrationError::Extraction`] — the backend failed
/// - [`CalibrationError::NoAlphabeticContent`] — nothing name-like on page 1
/// - [`CalibrationError::RenderFailure`] / [`CalibrationError::Io`] — preview
///   could not be produced
pub async fn calibrate(
    document: &SourceDocument,
    config: &SplitterConfig,
) -> Result<CalibrationResult, CalibrationError> {
    log_failure("calibrate", calibrate_inner(document, config)).await
}

/// Blocking wrapper around [`calibrate`].
///
/// Creates a temporary tokio runtime internally, so it must not be called
/// from inside another runtime.
pub fn calibrate_sync(
    document: &SourceDocument,
    config: &SplitterConfig,
) -> Result<CalibrationResult, CalibrationError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CalibrationError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(calibrate(document, config))
}

async fn calibrate_inner(
    document: &SourceDocument,
    config: &SplitterConfig,
) -> Result<CalibrationResult, CalibrationError> {
    if document.page_count() == 0 {
        return Err(DocumentError::Empty.into());
    }
    info!(
        "Calibrating on page 1 of {} (extractor: {})",
        document.page_count(),
        config.extractor.name()
    );

    let first = document.page_async(0).await?;
    let full_text = config.extractor.extract(&first.bytes).await?;
    let auto_offset =
        first_alphabetic_index(&full_text).ok_or(CalibrationError::NoAlphabeticContent)?;
    debug!("Suggested name offset: {}", auto_offset);

    let image = render::render_page(
        Arc::clone(&config.renderer),
        first.bytes,
        0,
        config.max_rendered_pixels,
    )
    .await?;
    let png = encode_png(&image).map_err(|e| CalibrationError::RenderFailure {
        detail: format!("PNG encoding failed: {e}"),
    })?;

    let preview_image_path = write_preview(&config.calibration_dir(), &png).await?;
    info!("Calibration preview written to {}", preview_image_path.display());

    Ok(CalibrationResult {
        full_text,
        auto_offset,
        preview_image_path,
    })
}

/// Write `png` under `dir` as `<uuid>.png`, collision-checked.
async fn write_preview(dir: &Path, png: &[u8]) -> Result<PathBuf, CalibrationError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| CalibrationError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

    let stem = Uuid::new_v4().to_string();
    let wanted = desired_path(dir, &stem, PREVIEW_EXTENSION);
    let path = resolve_collision(&wanted, dir, &stem, PREVIEW_EXTENSION);

    if let Err(e) = tokio::fs::write(&path, png).await {
        if let Err(cleanup) = tokio::fs::remove_file(&path).await {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                warn!("Could not remove partial preview {}: {}", path.display(), cleanup);
            }
        }
        return Err(CalibrationError::Io { path, source: e });
    }
    Ok(path)
}
