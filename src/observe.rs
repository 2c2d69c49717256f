//! Failure logging around public entry points.
//!
//! [`log_failure`] wraps an entry point's future. On `Err` it emits exactly
//! one `error!` event carrying the operation name and the full source chain,
//! then returns the error untouched. It never converts, swallows or retries.
//! Inner pipeline code does not log errors itself; this is the only place.

use crate::error::error_chain;
use std::future::Future;
use tracing::error;

/// Await `fut`; if it fails, log the failure once under `operation` and
/// return it unchanged.
pub async fn log_failure<T, E, F>(operation: &'static str, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: std::error::Error + 'static,
{
    let result = fut.await;
    if let Err(ref e) = result {
        error!(
            operation,
            error = %error_chain(e),
            details = ?e,
            "{operation} failed"
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CalibrationError, ExtractionError};
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn with_capture<R>(f: impl FnOnce() -> R) -> (R, String) {
        let sink = Captured::default();
        let writer = sink.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let out = tracing::subscriber::with_default(subscriber, f);
        (out, sink.text())
    }

    #[test]
    fn success_passes_through_without_logging() {
        let (out, logs) = with_capture(|| {
            tokio_test::block_on(log_failure("calibrate", async {
                Ok::<_, CalibrationError>(5usize)
            }))
        });
        assert_eq!(out.unwrap(), 5);
        assert!(logs.is_empty(), "unexpected logs: {logs}");
    }

    #[test]
    fn failure_is_logged_once_and_returned_unchanged() {
        let (out, logs) = with_capture(|| {
            tokio_test::block_on(log_failure("calibrate", async {
                Err::<(), _>(CalibrationError::Extraction(
                    ExtractionError::BackendUnavailable {
                        backend: "tika".into(),
                        detail: "connection refused".into(),
                    },
                ))
            }))
        });

        assert!(matches!(
            out,
            Err(CalibrationError::Extraction(
                ExtractionError::BackendUnavailable { .. }
            ))
        ));
        assert_eq!(logs.matches("calibrate failed").count(), 1, "logs: {logs}");
        assert!(logs.contains("connection refused"), "logs: {logs}");
        assert!(logs.contains("ERROR"), "logs: {logs}");
    }
}
