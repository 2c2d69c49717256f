//! Page rasterisation for calibration previews.
//!
//! ## Why a trait?
//!
//! pdfium is a native library that may not be installed where the pipeline
//! is tested or deployed. [`PageRenderer`] is the seam: production code uses
//! [`PdfiumRenderer`], tests plug in anything that returns a `DynamicImage`.
//!
//! ## Why spawn_blocking?
//!
//! pdfium is CPU-bound and keeps thread-local state; it must never run on a
//! Tokio worker thread. [`render_page`] moves every call onto the blocking
//! pool.

use crate::error::RenderError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Rasterises one page of a PDF held in memory.
pub trait PageRenderer: Send + Sync {
    /// Render page `page_index` (0-based) of `pdf`, capping the longest edge
    /// at `max_pixels`.
    fn render_page(
        &self,
        pdf: &[u8],
        page_index: usize,
        max_pixels: u32,
    ) -> Result<DynamicImage, RenderError>;
}

/// [`PageRenderer`] backed by the pdfium library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRenderer {
    /// Explicit path to `libpdfium`; when `None` the working directory and
    /// then the system library path are searched.
    library: Option<PathBuf>,
}

impl PdfiumRenderer {
    pub fn with_library(path: impl Into<PathBuf>) -> Self {
        Self {
            library: Some(path.into()),
        }
    }
}

impl PageRenderer for PdfiumRenderer {
    fn render_page(
        &self,
        pdf: &[u8],
        page_index: usize,
        max_pixels: u32,
    ) -> Result<DynamicImage, RenderError> {
        let pdfium = bind_pdfium(self.library.as_deref())
            .map_err(|e| RenderError(format!("failed to bind pdfium: {e}")))?;

        let document = pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| RenderError(format!("failed to load PDF: {e:?}")))?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        if page_index >= total_pages {
            return Err(RenderError(format!(
                "page {page_index} is out of range (document has {total_pages} pages)"
            )));
        }

        let render_config = PdfRenderConfig::new()
            .set_target_width(max_pixels as i32)
            .set_maximum_height(max_pixels as i32);

        let page = pages
            .get(page_index as u16)
            .map_err(|e| RenderError(format!("{e:?}")))?;
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| RenderError(format!("{e:?}")))?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            page_index + 1,
            image.width(),
            image.height()
        );
        Ok(image)
    }
}

/// Bind to pdfium: an explicit library path wins, then `./`, then the system.
pub(crate) fn bind_pdfium(library: Option<&Path>) -> Result<Pdfium, PdfiumError> {
    let bindings = match library {
        Some(path) => Pdfium::bind_to_library(library_file(path))?,
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())?,
    };
    Ok(Pdfium::new(bindings))
}

/// `path` itself if it names the library file, or the platform library
/// name (`libpdfium.so`, `pdfium.dll`, …) inside it if it is a directory.
fn library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}

/// Run `renderer` on the blocking pool.
pub async fn render_page(
    renderer: Arc<dyn PageRenderer>,
    pdf: Vec<u8>,
    page_index: usize,
    max_pixels: u32,
) -> Result<DynamicImage, RenderError> {
    tokio::task::spawn_blocking(move || renderer.render_page(&pdf, page_index, max_pixels))
        .await
        .map_err(|e| RenderError(format!("Render task panicked: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    struct Solid;

    impl PageRenderer for Solid {
        fn render_page(
            &self,
            _pdf: &[u8],
            page_index: usize,
            max_pixels: u32,
        ) -> Result<DynamicImage, RenderError> {
            if page_index > 0 {
                return Err(RenderError("only one page".into()));
            }
            Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                max_pixels,
                max_pixels / 2,
                Rgba([0, 0, 255, 255]),
            )))
        }
    }

    #[tokio::test]
    async fn render_page_runs_renderer_off_thread() {
        let img = render_page(Arc::new(Solid), Vec::new(), 0, 200)
            .await
            .unwrap();
        assert_eq!((img.width(), img.height()), (200, 100));
    }

    #[tokio::test]
    async fn render_page_propagates_renderer_error() {
        let err = render_page(Arc::new(Solid), Vec::new(), 3, 200)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "only one page");
    }

    #[test]
    fn library_dir_resolves_to_platform_library_name() {
        let tmp = tempfile::TempDir::new().unwrap();
        let resolved = library_file(tmp.path());
        assert_eq!(
            resolved,
            Pdfium::pdfium_platform_library_name_at_path(tmp.path())
        );
        assert_eq!(resolved.parent(), Some(tmp.path()));
    }

    #[test]
    fn library_file_path_is_used_as_given() {
        let tmp = tempfile::TempDir::new().unwrap();
        let lib = tmp.path().join("libpdfium-custom.so");
        std::fs::write(&lib, b"").unwrap();
        assert_eq!(library_file(&lib), lib);
    }
}
