//! CLI command definitions and handlers.

pub mod analyze;
pub mod models;

use clap::{Parser, Subcommand};

/// eyescreen - AI eye photo screening
///
/// Detects whether a photo shows an eye and, if so, screens it for
/// pinguecula, pterygium and conjunctivitis. Not a medical diagnosis.
#[derive(Parser)]
#[command(name = "eyescreen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared analyze arguments (paths, crop, output, models).
    #[command(flatten)]
    pub analyze: analyze::AnalyzeArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Screen eye photos
    Analyze(analyze::AnalyzeArgs),
    /// Inspect model artifacts
    Models(models::ModelsArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Every analyzed image looks healthy, or nothing was analyzed.
    Success = 0,
    /// At least one image needs attention (no eye, uncertain, or a finding).
    Attention = 1,
    /// Usage, model or inference error.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
