//! Viewer Capture CLI
//!
//! Captures a document from an online viewer into a single PDF.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use viewer_capture::browser::{BrowserConfig, BrowserSession};
use viewer_capture::config::CaptureOptionsBuilder;
use viewer_capture::{CaptureOptions, DocumentCapture, IdentifierMode, ImageFormat, ProgressEvent, Strategy};

/// Viewer Capture
#[derive(Parser, Debug)]
#[command(name = "vcap")]
#[command(version)]
#[command(about = "Capture a document from an online viewer into a single PDF")]
struct Args {
    /// Document or embed URL
    url: String,

    /// Capture strategy (vector or raster)
    #[arg(short, long, default_value = "vector")]
    strategy: Strategy,

    /// Directory for the final PDF and scratch files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Name the output after the document title or its id
    #[arg(long, value_enum)]
    name: Option<NameArg>,

    /// Screenshot encoding for the raster strategy
    #[arg(long, value_enum)]
    image_format: Option<FormatArg>,

    /// JSON file with capture options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to Chrome/Chromium executable
    #[arg(long)]
    chrome_path: Option<String>,

    /// Disable the Chromium sandbox
    #[arg(long)]
    no_sandbox: bool,

    /// Show the browser window
    #[arg(long)]
    headful: bool,

    /// Maximum scroll steps before capturing anyway
    #[arg(long)]
    max_steps: Option<u32>,

    /// Delay between scroll steps in milliseconds
    #[arg(long)]
    step_delay_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print a JSON report instead of the output path
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum NameArg {
    Title,
    Id,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
}

impl Args {
    fn capture_options(&self) -> anyhow::Result<CaptureOptions> {
        let base = match self.config {
            Some(ref path) => CaptureOptions::from_json_file(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => CaptureOptions::default(),
        };

        let mut builder = CaptureOptionsBuilder::from_options(base);
        if let Some(ref dir) = self.output_dir {
            builder = builder.output_dir(dir.clone());
        }
        if let Some(name) = self.name {
            builder = builder.identifier_mode(match name {
                NameArg::Title => IdentifierMode::Title,
                NameArg::Id => IdentifierMode::Id,
            });
        }
        if let Some(format) = self.image_format {
            builder = builder.raster_format(match format {
                FormatArg::Png => ImageFormat::Png,
                FormatArg::Jpeg => ImageFormat::Jpeg,
            });
        }
        if let Some(steps) = self.max_steps {
            builder = builder.max_steps(Some(steps));
        }
        if let Some(ms) = self.step_delay_ms {
            builder = builder.step_delay_ms(ms);
        }
        Ok(builder.build())
    }

    fn browser_config(&self) -> BrowserConfig {
        let mut builder = BrowserConfig::builder()
            .headless(!self.headful)
            .sandbox(!self.no_sandbox);
        if let Some(ref path) = self.chrome_path {
            builder = builder.chrome_path(path.clone());
        }
        builder.build()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = args.capture_options()?;
    let session = Arc::new(BrowserSession::new(args.browser_config()));
    let capture = DocumentCapture::new(session.clone(), options);

    let progress = |event: &ProgressEvent| info!("{}", event);
    let result = capture
        .capture_with_report(&args.url, args.strategy, &progress)
        .await;

    if let Err(e) = session.release().await {
        error!("Failed to shut down browser: {}", e);
    }

    let report = result.with_context(|| format!("capturing {}", args.url))?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.output.display());
    }

    Ok(())
}
