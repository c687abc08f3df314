//! YOLO11 → CoreML conversion CLI.
//!
//! Thin front-end over the `coreml-export` library: parses flags, builds an
//! export request, and delegates to the Ultralytics export backend. The
//! final export descriptor is printed on stdout; everything else goes
//! through tracing.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use coreml_export::config::PythonConfig;
use coreml_export::{
    CancellationToken, ExportBackend, ExportError, ExportRequest, SizeVariant, UltralyticsBackend,
};

#[derive(Parser, Debug)]
#[command(name = "yolo-coreml")]
#[command(about = "Export YOLO11 weights to CoreML (.mlpackage)")]
struct Args {
    /// YOLO11 size variant (n, s, m, l, x)
    #[arg(long, default_value = "l")]
    size: SizeVariant,

    /// Optional explicit path to .pt weights
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Inference image size (square)
    #[arg(long, default_value_t = 640)]
    imgsz: u32,

    /// Use FP16 (half-precision) export [default: on]
    #[arg(long, overrides_with = "no_half")]
    half: bool,

    /// Disable FP16 half precision
    #[arg(long, overrides_with = "half")]
    no_half: bool,

    /// Include NMS in the exported model [default: on]
    #[arg(long, overrides_with = "no_nms")]
    nms: bool,

    /// Exclude NMS from the exported model
    #[arg(long, overrides_with = "nms")]
    no_nms: bool,

    /// Optional output .mlpackage filename
    #[arg(long)]
    output: Option<String>,

    /// Python interpreter used to reach the Ultralytics library
    #[arg(long, default_value = PythonConfig::DEFAULT_INTERPRETER)]
    python: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn half(&self) -> bool {
        self.half || !self.no_half
    }

    fn nms(&self) -> bool {
        self.nms || !self.no_nms
    }

    fn request(&self) -> ExportRequest {
        ExportRequest {
            size: self.size,
            weights: self.weights.clone(),
            image_size: self.imgsz,
            half: self.half(),
            nms: self.nms(),
            output: self.output.clone(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let request = args.request();
    let backend = UltralyticsBackend::new(&args.python);

    // Kill the export subprocess cleanly on Ctrl-C
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, stopping export");
                cancel.cancel();
            }
        });
    }

    let outcome = backend.export(&request, &cancel).await.map_err(|err| {
        if matches!(err, ExportError::MissingDependency { .. }) {
            eprintln!("{}", PythonConfig::INSTALL_HINT);
        }
        err
    })?;

    info!("Export complete.");
    // Final descriptor on stdout (intentional, script-friendly)
    println!("{outcome}");

    Ok(())
}
