//! Progress-callback trait for split jobs.
//!
//! Inject an [`Arc<dyn SplitProgressCallback>`] via
//! [`crate::config::SplitterConfigBuilder::progress_callback`] to hear about
//! each page as it lands on disk. Pages are written strictly in page order,
//! so events arrive in order too, but extraction for later pages may already
//! be running on other tasks; implementations must still be `Send + Sync`.
//!
//! # Example
//!
//! ```rust
//! use certsplit::{SplitProgressCallback, SplitterConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct Counter(AtomicUsize);
//!
//! impl SplitProgressCallback for Counter {
//!     fn on_page_written(&self, page_index: usize, total_pages: usize, file_name: &str) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} → {}", page_index + 1, total_pages, file_name);
//!     }
//! }
//!
//! let config = SplitterConfig::builder()
//!     .progress_callback(Arc::new(Counter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by [`crate::split()`] as the job advances. All methods default to
/// no-ops.
pub trait SplitProgressCallback: Send + Sync {
    /// Called once, after the document is loaded and before any page.
    fn on_split_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after page `page_index` (0-based) was written as `file_name`.
    fn on_page_written(&self, page_index: usize, total_pages: usize, file_name: &str) {
        let _ = (page_index, total_pages, file_name);
    }

    /// Called when a page aborts the job.
    fn on_page_error(&self, page_index: usize, total_pages: usize, error: &str) {
        let _ = (page_index, total_pages, error);
    }

    /// Called once the archive exists and the scratch directory is gone.
    fn on_archive_complete(&self, archive: &Path, entries: usize) {
        let _ = (archive, entries);
    }
}

/// A callback that ignores every event.
pub struct NoopProgressCallback;

impl SplitProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SplitterConfig`].
pub type ProgressCallback = Arc<dyn SplitProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl SplitProgressCallback for Recorder {
        fn on_split_start(&self, total_pages: usize) {
            self.events.lock().unwrap().push(format!("start {total_pages}"));
        }

        fn on_page_written(&self, page_index: usize, _total: usize, file_name: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("page {page_index} {file_name}"));
        }

        fn on_archive_complete(&self, _archive: &Path, entries: usize) {
            self.events.lock().unwrap().push(format!("done {entries}"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_split_start(3);
        cb.on_page_written(0, 3, "Ibrahim.pdf");
        cb.on_page_error(1, 3, "tika down");
        cb.on_archive_complete(Path::new("/tmp/x.zip"), 3);
    }

    #[test]
    fn overridden_methods_receive_events() {
        let rec = Recorder::default();
        let cb: &dyn SplitProgressCallback = &rec;
        cb.on_split_start(2);
        cb.on_page_written(0, 2, "Ibrahim.pdf");
        cb.on_page_error(1, 2, "ignored by default");
        cb.on_page_written(1, 2, "Yusuf.pdf");
        cb.on_archive_complete(Path::new("a.zip"), 2);

        assert_eq!(
            *rec.events.lock().unwrap(),
            ["start 2", "page 0 Ibrahim.pdf", "page 1 Yusuf.pdf", "done 2"]
        );
    }
}
