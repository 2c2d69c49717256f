//! Configuration for calibration and split jobs.
//!
//! Everything a job needs beyond its input document lives in
//! [`SplitterConfig`]: where artifacts are written, which text-extraction
//! backend to call, how page 1 is rasterised, and who gets progress events.
//! Build it with [`SplitterConfig::builder()`] and share it freely; it is
//! cheap to clone and every backend is behind an `Arc`.

use crate::error::ConfigError;
use crate::pipeline::extract::{TextExtractor, TikaExtractor};
use crate::pipeline::render::{PageRenderer, PdfiumRenderer};
use crate::progress::SplitProgressCallback;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default sub-directory (under the media root) for calibration previews.
pub const DEFAULT_CALIBRATION_DIR: &str = "tmp/calibration_images";

/// Default sub-directory (under the media root) for split archives.
pub const DEFAULT_ARCHIVE_DIR: &str = "tmp/certificates";

/// Configuration shared by [`crate::calibrate()`] and [`crate::split()`].
///
/// # Example
/// ```rust
/// use certsplit::SplitterConfig;
///
/// let config = SplitterConfig::builder()
///     .media_root("/var/lib/certsplit")
///     .extract_concurrency(8)
///     .build()
///     .unwrap();
/// assert!(config.archive_dir().ends_with("tmp/certificates"));
/// ```
#[derive(Clone)]
pub struct SplitterConfig {
    /// Root under which all artifacts are written. Default: `media`.
    pub media_root: PathBuf,

    /// Calibration preview directory, relative to `media_root` unless absolute.
    pub calibration_dir: PathBuf,

    /// Archive directory, relative to `media_root` unless absolute. Each
    /// split job creates its scratch directory inside it.
    pub archive_dir: PathBuf,

    /// Longest edge of the calibration preview in pixels. Default: 2000.
    pub max_rendered_pixels: u32,

    /// How many pages may have extraction in flight at once. Default: 4.
    ///
    /// Only extraction runs ahead; pages are still named and written one at
    /// a time, in page order.
    pub extract_concurrency: usize,

    /// Text-extraction backend. Default: [`TikaExtractor`] on localhost.
    pub extractor: Arc<dyn TextExtractor>,

    /// Page rasteriser for calibration previews. Default: [`PdfiumRenderer`].
    pub renderer: Arc<dyn PageRenderer>,

    /// Optional split progress observer.
    pub progress_callback: Option<Arc<dyn SplitProgressCallback>>,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("media"),
            calibration_dir: PathBuf::from(DEFAULT_CALIBRATION_DIR),
            archive_dir: PathBuf::from(DEFAULT_ARCHIVE_DIR),
            max_rendered_pixels: 2000,
            extract_concurrency: 4,
            extractor: Arc::new(TikaExtractor::default()),
            renderer: Arc::new(PdfiumRenderer::default()),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SplitterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitterConfig")
            .field("media_root", &self.media_root)
            .field("calibration_dir", &self.calibration_dir)
            .field("archive_dir", &self.archive_dir)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("extract_concurrency", &self.extract_concurrency)
            .field("extractor", &self.extractor.name())
            .field("renderer", &"<dyn PageRenderer>")
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn SplitProgressCallback>"),
            )
            .finish()
    }
}

impl SplitterConfig {
    /// Create a new builder for `SplitterConfig`.
    pub fn builder() -> SplitterConfigBuilder {
        SplitterConfigBuilder {
            config: Self::default(),
        }
    }

    /// Absolute-or-media-relative directory for calibration previews.
    pub fn calibration_dir(&self) -> PathBuf {
        under_root(&self.media_root, &self.calibration_dir)
    }

    /// Absolute-or-media-relative directory for split archives.
    pub fn archive_dir(&self) -> PathBuf {
        under_root(&self.media_root, &self.archive_dir)
    }
}

fn under_root(root: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        root.join(dir)
    }
}

/// Builder for [`SplitterConfig`].
pub struct SplitterConfigBuilder {
    config: SplitterConfig,
}

impl fmt::Debug for SplitterConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitterConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl SplitterConfigBuilder {
    pub fn media_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.media_root = root.into();
        self
    }

    pub fn calibration_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.calibration_dir = dir.into();
        self
    }

    pub fn archive_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.archive_dir = dir.into();
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn extract_concurrency(mut self, n: usize) -> Self {
        self.config.extract_concurrency = n.max(1);
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.config.extractor = extractor;
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.config.renderer = renderer;
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn SplitProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SplitterConfig, ConfigError> {
        let c = &self.config;
        if c.media_root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("media root must not be empty".into()));
        }
        if c.calibration_dir() == c.archive_dir() {
            return Err(ConfigError::Invalid(format!(
                "calibration and archive directories must differ, both are {}",
                c.archive_dir().display()
            )));
        }
        if c.extract_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "extract concurrency must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
