// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DocCrop — four-corner document rectification and multi-up PDF composition.
//
// Entry point. Initialises logging, loads settings, and dispatches the
// subcommand to the service layer.

mod manifest;
mod service;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use doccrop_core::error::{DocCropError, Result};
use doccrop_core::human_errors::humanize_error;
use doccrop_core::types::{Arrangement, CornerSet, ImagesPerPage, LayoutSpec, Orientation, ScaleMode};
use doccrop_core::AppConfig;

use manifest::ScanManifest;
use service::DocCropService;

#[derive(Parser)]
#[command(name = "doccrop")]
#[command(about = "Flatten photographed documents and pack them into A4 PDFs")]
#[command(version)]
struct Cli {
    /// Settings file (JSON). Missing files fall back to defaults.
    #[arg(long, global = true, default_value = "settings.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rectify one photo from four corners and write a PNG.
    Rectify(RectifyArgs),

    /// Compose rectified images into a multi-page PDF.
    Compose(ComposeArgs),

    /// Rectify every photo in a manifest, then compose them into a PDF.
    Scan(ScanArgs),

    /// Print page count and pixel size of each page of a PDF.
    Inspect(InspectArgs),
}

#[derive(Debug, Clone, Args)]
struct RectifyArgs {
    /// Path to the photo.
    #[arg(long)]
    image: PathBuf,

    /// Corner coordinates x1,y1,...,x4,y4 in TL, TR, BR, BL order.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    corners: Vec<f64>,

    /// Path to write the rectified PNG.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Clone, Args)]
struct ComposeArgs {
    /// Path to write the PDF.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    layout: LayoutArgs,

    /// Stamp the watermark on every page after the first.
    #[arg(long)]
    demo: bool,

    /// Rectified images, in page order.
    images: Vec<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct ScanArgs {
    /// JSON list of {"image": path, "corners": [8 numbers]}.
    #[arg(long)]
    manifest: PathBuf,

    /// Path to write the PDF.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    layout: LayoutArgs,

    /// Stamp the watermark on every page after the first.
    #[arg(long)]
    demo: bool,
}

#[derive(Debug, Clone, Args)]
struct InspectArgs {
    /// PDF to inspect.
    pdf: PathBuf,

    /// Resolution for pixel sizes (default: the configured target DPI).
    #[arg(long)]
    dpi: Option<f64>,
}

/// Layout overrides. Anything left unset comes from the settings file.
#[derive(Debug, Clone, Args, Default)]
struct LayoutArgs {
    /// Images per page: 1, 2 or 4. Other values mean 1.
    #[arg(long, allow_negative_numbers = true)]
    layout: Option<i64>,

    /// portrait or landscape.
    #[arg(long)]
    orientation: Option<String>,

    /// auto, vertical, horizontal or grid.
    #[arg(long)]
    arrangement: Option<String>,

    /// fit, original or percent.
    #[arg(long)]
    scale_mode: Option<String>,

    /// Scale for percent mode (100 = source size at source DPI).
    #[arg(long)]
    scale_percent: Option<f64>,
}

impl LayoutArgs {
    fn apply(&self, base: LayoutSpec) -> LayoutSpec {
        LayoutSpec {
            images_per_page: self
                .layout
                .map_or(base.images_per_page, ImagesPerPage::from_count),
            orientation: self
                .orientation
                .as_deref()
                .map_or(base.orientation, Orientation::parse_lossy),
            arrangement: self
                .arrangement
                .as_deref()
                .map_or(base.arrangement, Arrangement::parse_lossy),
            scale_mode: self
                .scale_mode
                .as_deref()
                .map_or(base.scale_mode, ScaleMode::parse_lossy),
            scale_percent: self
                .scale_percent
                .filter(|p| p.is_finite())
                .unwrap_or(base.scale_percent),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(kind = ?err.kind(), "{err}");
            let human = humanize_error(&err);
            eprintln!("{}", human.message);
            eprintln!("{}", human.suggestion);
            eprintln!("({err})");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(&cli.config)?;
    let service = DocCropService::new(config);

    match cli.command {
        Commands::Rectify(args) => run_rectify(&service, &args),
        Commands::Compose(args) => run_compose(&service, &args),
        Commands::Scan(args) => run_scan(&service, &args),
        Commands::Inspect(args) => run_inspect(&service, &args),
    }
}

// ── rectify ────────────────────────────────────────────────────────────

fn run_rectify(service: &DocCropService, args: &RectifyArgs) -> Result<()> {
    let corners = CornerSet::from_flat(&args.corners)?;
    let (width, height) = service.rectify_file(&args.image, &corners, &args.out)?;
    println!("{} ({}x{})", args.out.display(), width, height);
    Ok(())
}

// ── compose ────────────────────────────────────────────────────────────

fn run_compose(service: &DocCropService, args: &ComposeArgs) -> Result<()> {
    let layout = args.layout.apply(service.config().layout);
    let report = service.compose_files(&args.images, &layout, args.demo, &args.out)?;
    println!(
        "{}: {} page(s) at {}x{}",
        args.out.display(),
        report.pages,
        report.page_width,
        report.page_height
    );
    Ok(())
}

// ── scan ───────────────────────────────────────────────────────────────

fn run_scan(service: &DocCropService, args: &ScanArgs) -> Result<()> {
    let manifest = ScanManifest::load(&args.manifest)?;
    if manifest.is_empty() {
        return Err(DocCropError::EmptyInput);
    }
    let layout = args.layout.apply(service.config().layout);
    let report = service.scan_manifest(&manifest, &layout, args.demo, &args.out)?;
    println!(
        "{}: {} page(s) from {} photo(s)",
        args.out.display(),
        report.pages,
        manifest.len()
    );
    Ok(())
}

// ── inspect ────────────────────────────────────────────────────────────

fn run_inspect(service: &DocCropService, args: &InspectArgs) -> Result<()> {
    let dpi = args.dpi.unwrap_or(service.config().target_dpi);
    let sizes = service.inspect(&args.pdf, dpi)?;
    println!("{}: {} page(s)", args.pdf.display(), sizes.len());
    for (number, (width, height)) in sizes.iter().enumerate() {
        println!("  page {:>3}: {}x{} px at {} dpi", number + 1, width, height, dpi);
    }
    Ok(())
}
