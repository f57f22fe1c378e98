//! Analyze command - screen eye photos.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use eyescreen_adapters::{
    check_model_aspect, crop, decode_oriented, parse_crop, FsImageSource, ModelCatalog,
};
use eyescreen_core::inference::{select_device, DevicePreference, EyeModels};
use eyescreen_core::{
    AnalysisError, AnalysisReport, CropRegion, ImageSource, Orchestrator, ProgressEvent, ProgressSink,
    ResultOutput, SourceImage,
};
use tracing::{debug, info, warn};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonLayout, JsonOutput, ProgressBar, TextOutput};

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
    /// Human-readable summary with advice
    Text,
}

impl OutputFormat {
    fn from_config(s: &str) -> Option<Self> {
        match s {
            "json" => Some(Self::Json),
            "jsonl" => Some(Self::Jsonl),
            "text" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Parse a crop region given as `X,Y,W,H`.
fn parse_crop_arg(s: &str) -> Result<CropRegion, String> {
    parse_crop(s).map_err(|e| format!("{e:#}"))
}

/// Shared arguments for image analysis.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct AnalyzeArgs {
    /// Eye photos (JPEG/PNG) or directories to analyze
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Analyze only this region of every image: X,Y,WIDTH,HEIGHT in pixels.
    /// Keep the 320:280 model aspect ratio to avoid stretching the eye
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_crop_arg)]
    pub crop: Option<CropRegion>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    /// Eye detection weights (overrides the file in the models directory)
    #[arg(long, value_name = "FILE")]
    pub detection_model: Option<PathBuf>,

    /// Condition weights (overrides the file in the models directory)
    #[arg(long, value_name = "FILE")]
    pub condition_model: Option<PathBuf>,

    /// Run inference on the CPU even if a GPU is available
    #[arg(long)]
    pub cpu: bool,
}

impl AnalyzeArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_deref()
                .and_then(OutputFormat::from_config);
        }

        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        if args.models_dir.is_none() {
            args.models_dir.clone_from(&config.models.dir);
        }
        if args.detection_model.is_none() {
            args.detection_model.clone_from(&config.models.detection);
        }
        if args.condition_model.is_none() {
            args.condition_model.clone_from(&config.models.condition);
        }

        if !args.cpu {
            args.cpu = config.inference.device.as_deref() == Some("cpu");
        }

        args
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }

    fn device_preference(&self) -> DevicePreference {
        if self.cpu {
            DevicePreference::Cpu
        } else {
            DevicePreference::Auto
        }
    }

    fn catalog(&self) -> ModelCatalog {
        self.models_dir
            .clone()
            .map_or_else(ModelCatalog::default, ModelCatalog::new)
            .with_overrides(self.detection_model.clone(), self.condition_model.clone())
    }
}

/// Result of running the analyze command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzeSummary {
    /// Number of images analyzed.
    pub processed: usize,
    /// Number of images skipped (unreadable, undecodable, crop outside image).
    pub skipped: usize,
    /// Number of images whose verdict is not Healthy.
    pub needs_attention: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the analyze command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &AnalyzeArgs) -> Result<AnalyzeSummary> {
    info!("Running analyze command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    if let Some(region) = &args.crop {
        check_model_aspect(region);
    }

    let catalog = args.catalog();
    debug!("Models directory: {}", catalog.dir().display());

    // Load both models up front so a missing artifact fails before any image.
    let device = select_device(args.device_preference());
    let models = EyeModels::load(&catalog.paths(), &device)
        .context("Cannot start analysis")?;
    let orchestrator = Orchestrator::from_models(&models);

    let source = FsImageSource::new(args.paths.clone(), args.recursive);
    let total = source.count_hint();

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress = ProgressBar::new(total.map(|t| t as u64), args.quiet, show_progress);

    let output: Box<dyn ResultOutput> = match args.format() {
        OutputFormat::Jsonl => Box::new(JsonOutput::stdout(JsonLayout::Lines)),
        OutputFormat::Json => Box::new(JsonOutput::stdout(JsonLayout::Array {
            pretty: args.pretty,
        })),
        OutputFormat::Text => Box::new(TextOutput::stdout()),
    };

    process_images(&source, &orchestrator, output.as_ref(), &progress, args.crop)
}

/// Screen every image from `source`.
///
/// Images that cannot be read, decoded or cropped are reported as skipped.
/// Any model failure aborts the run.
pub fn process_images(
    source: &dyn ImageSource,
    orchestrator: &Orchestrator<'_>,
    output: &dyn ResultOutput,
    progress: &dyn ProgressSink,
    crop_region: Option<CropRegion>,
) -> Result<AnalyzeSummary> {
    let total = source.count_hint();
    let mut processed = 0usize;
    let mut skipped = 0usize;
    let mut needs_attention = 0usize;

    for (index, image_result) in source.images().enumerate() {
        let image = match image_result {
            Ok(img) => img,
            Err(e) => {
                // Note: error message contains the path via anyhow context
                progress.on_event(ProgressEvent::Skipped {
                    path: format!("image {index}"),
                    reason: format!("{e:#}"),
                });
                skipped += 1;
                continue;
            }
        };

        progress.on_event(ProgressEvent::Started {
            path: image.path.clone(),
            index,
            total,
        });

        match analyze_one(&image, orchestrator, crop_region) {
            Ok(report) => {
                if report.verdict.needs_attention() {
                    needs_attention += 1;
                }
                output.write(&report)?;
                progress.on_event(ProgressEvent::Completed {
                    report: Box::new(report),
                });
                processed += 1;
            }
            Err(e) if e.is_input_error() => {
                warn!("Skipping {}: {e}", image.path);
                progress.on_event(ProgressEvent::Skipped {
                    path: image.path,
                    reason: e.to_string(),
                });
                skipped += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Analysis failed for {}", image.path));
            }
        }
    }

    output.flush()?;

    progress.on_event(ProgressEvent::Finished { processed, skipped });

    let exit_code = if needs_attention > 0 {
        ExitCode::Attention
    } else {
        ExitCode::Success
    };

    Ok(AnalyzeSummary {
        processed,
        skipped,
        needs_attention,
        exit_code,
    })
}

/// Decodes, crops and screens one image.
fn analyze_one(
    image: &SourceImage,
    orchestrator: &Orchestrator<'_>,
    crop_region: Option<CropRegion>,
) -> Result<AnalysisReport, AnalysisError> {
    let decoded = decode_oriented(&image.raw)?;
    let dimensions = decoded.dimensions();

    let pixels = match crop_region {
        Some(region) => crop(&decoded, &region)?,
        None => decoded,
    };

    let outcome = orchestrator.analyze_image(&pixels)?;

    Ok(AnalysisReport {
        path: image.path.clone(),
        timestamp: iso_timestamp(),
        dimensions,
        crop: crop_region,
        verdict: outcome.verdict(),
        outcome,
    })
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
