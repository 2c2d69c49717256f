//! CLI binary for certsplit.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `SplitterConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use certsplit::{
    calibrate, split, PdfiumExtractor, PdfiumRenderer, ProgressCallback, SourceDocument,
    SplitProgressCallback, SplitterConfig, TextExtractor, TikaExtractor,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per written page.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl SplitProgressCallback for CliProgressCallback {
    fn on_split_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Splitting");
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Splitting {total_pages} pages…"))
        ));
    }

    fn on_page_written(&self, page_index: usize, total_pages: usize, file_name: &str) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_index + 1,
            total_pages,
            dim(file_name),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_index: usize, total_pages: usize, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg = match error.char_indices().nth(79) {
            Some((cut, _)) => format!("{}\u{2026}", &error[..cut]),
            None => error.to_string(),
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_index + 1,
            total_pages,
            red(&msg),
        ));
        self.bar.abandon();
    }

    fn on_archive_complete(&self, archive: &Path, entries: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} certificates → {}",
            green("✔"),
            bold(&entries.to_string()),
            archive.display()
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # 1. Find where the recipient name starts (prints text, offset, preview)
  certsplit calibrate batch.pdf

  # 2. Split using the confirmed offset
  certsplit split batch.pdf --offset 5

  # Extract in-process instead of through a Tika server
  certsplit --extractor pdfium split batch.pdf --offset 5

  # Machine-readable output
  certsplit --json split batch.pdf --offset 5 > result.json

ENVIRONMENT VARIABLES:
  CERTSPLIT_MEDIA_ROOT     Root for preview images and archives
  CERTSPLIT_EXTRACTOR      tika (default) or pdfium
  CERTSPLIT_TIKA_URL       Tika server base URL (default http://localhost:9998)
  CERTSPLIT_TIKA_TIMEOUT   Tika request timeout in seconds
  PDFIUM_LIB_PATH          Path to libpdfium (directory or file)
  RUST_LOG                 Override the log filter

SETUP:
  A Tika server is the default extractor:
    docker run -p 9998:9998 apache/tika
  Calibration previews always need the pdfium shared library.
"#;

/// Split certificate PDFs into one file per recipient.
#[derive(Parser, Debug)]
#[command(
    name = "certsplit",
    version,
    about = "Split certificate PDFs into one named PDF per recipient",
    long_about = "Split a multi-page certificate PDF into one PDF per page, named after the \
recipient whose name starts at a fixed offset in each page's text, and pack them into a ZIP. \
Run `calibrate` first to find the offset.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Root directory for preview images and archives.
    #[arg(long, global = true, env = "CERTSPLIT_MEDIA_ROOT", default_value = "media")]
    media_root: PathBuf,

    /// Text extraction backend.
    #[arg(long, global = true, env = "CERTSPLIT_EXTRACTOR", value_enum, default_value = "tika")]
    extractor: ExtractorArg,

    /// Tika server base URL.
    #[arg(long, global = true, env = "CERTSPLIT_TIKA_URL", default_value = certsplit::pipeline::extract::DEFAULT_TIKA_URL)]
    tika_url: String,

    /// Tika request timeout in seconds.
    #[arg(long, global = true, env = "CERTSPLIT_TIKA_TIMEOUT", default_value_t = 60)]
    tika_timeout: u64,

    /// Path to the pdfium shared library (file or directory).
    #[arg(long, global = true, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Longest side of the calibration preview, in pixels.
    #[arg(long, global = true, env = "CERTSPLIT_MAX_PIXELS", default_value_t = 2000)]
    max_pixels: u32,

    /// Pages extracted ahead of the writer while splitting.
    #[arg(short, long, global = true, env = "CERTSPLIT_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Output structured JSON instead of text.
    #[arg(long, global = true, env = "CERTSPLIT_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, global = true, env = "CERTSPLIT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "CERTSPLIT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "CERTSPLIT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract page 1, suggest a name offset and render a preview.
    Calibrate {
        /// Certificate PDF.
        input: PathBuf,
    },
    /// Split into named single-page PDFs and zip them.
    Split {
        /// Certificate PDF.
        input: PathBuf,

        /// Char offset where the recipient name starts in each page's text.
        #[arg(long)]
        offset: usize,
    },
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ExtractorArg {
    Tika,
    Pdfium,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active.
    let splitting = matches!(cli.command, Command::Split { .. });
    let show_progress = splitting && !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn SplitProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    match &cli.command {
        Command::Calibrate { input } => {
            let document = load_document(input).await?;
            let result = calibrate(&document, &config)
                .await
                .context("Calibration failed")?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&result).context("Failed to serialise output")?
                );
            } else {
                println!("Preview:      {}", result.preview_image_path.display());
                println!("Offset:       {}", result.auto_offset);
                println!("From offset:  {:?}", first_line(result.text_from_offset()));
                if !cli.quiet {
                    eprintln!();
                    eprintln!("{}", dim("── page 1 text ──"));
                    eprintln!("{}", result.full_text);
                }
            }
        }
        Command::Split { input, offset } => {
            let document = load_document(input).await?;
            let archive = split(&document, *offset, &config)
                .await
                .context("Split failed")?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&archive).context("Failed to serialise output")?
                );
            } else {
                println!("{}", archive.path.display());
                if !cli.quiet && !show_progress {
                    eprintln!("Wrote {} certificates", archive.entry_count());
                }
            }
        }
    }

    Ok(())
}

/// Map CLI args to `SplitterConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<SplitterConfig> {
    let extractor: Arc<dyn TextExtractor> = match cli.extractor {
        ExtractorArg::Tika => Arc::new(TikaExtractor::new(&cli.tika_url, cli.tika_timeout)),
        ExtractorArg::Pdfium => match cli.pdfium_lib {
            Some(ref lib) => Arc::new(PdfiumExtractor::with_library(lib)),
            None => Arc::new(PdfiumExtractor::default()),
        },
    };
    let renderer = match cli.pdfium_lib {
        Some(ref lib) => PdfiumRenderer::with_library(lib),
        None => PdfiumRenderer::default(),
    };

    let mut builder = SplitterConfig::builder()
        .media_root(&cli.media_root)
        .max_rendered_pixels(cli.max_pixels)
        .extract_concurrency(cli.concurrency)
        .extractor(extractor)
        .renderer(Arc::new(renderer));

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

async fn load_document(path: &Path) -> Result<SourceDocument> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    SourceDocument::from_bytes(bytes).with_context(|| format!("{} is not a usable PDF", path.display()))
}

fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or_default()
}
