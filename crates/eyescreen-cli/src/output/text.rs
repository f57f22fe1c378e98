//! Human-readable output.

use anyhow::Result;
use eyescreen_core::{AnalysisReport, OcularCondition, ResultOutput, Verdict};
use std::io::{self, Write};
use std::sync::Mutex;

/// Plain-text report writer: one block per image.
pub struct TextOutput {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl TextOutput {
    /// Creates a text output writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Creates a text output writing to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

/// Short status marker shown before the headline.
#[must_use]
pub const fn marker(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Healthy => "[ OK ]",
        Verdict::NoEye => "[ -- ]",
        Verdict::Uncertain => "[ ?? ]",
        Verdict::Finding(OcularCondition::PterygiumStage2) => "[ !!! ]",
        Verdict::Finding(_) => "[ !! ]",
    }
}

/// What the user should do next.
#[must_use]
pub const fn advice(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::NoEye => {
            "No eye was found. Retake or re-crop the photo so the eye fills most of the frame."
        }
        Verdict::Uncertain => {
            "The result is ambiguous. Have the eye examined by a medical professional."
        }
        Verdict::Healthy | Verdict::Finding(OcularCondition::Healthy) => {
            "The eye appears healthy. Regular check-ups with an eye care professional are still recommended."
        }
        Verdict::Finding(OcularCondition::Pinguecula) => {
            "Possible pinguecula. Usually harmless; protect the eye from sun, wind and dust and mention it at your next eye exam."
        }
        Verdict::Finding(OcularCondition::PterygiumStage1) => {
            "Possible early pterygium. Consult an ophthalmologist for a diagnosis and treatment plan."
        }
        Verdict::Finding(OcularCondition::PterygiumStage2) => {
            "Possible advanced pterygium. See an ophthalmologist urgently."
        }
        Verdict::Finding(OcularCondition::RedEye) => {
            "Possible conjunctivitis. Consult a healthcare professional to find the cause of the redness."
        }
    }
}

/// Renders one report as lines of text.
#[must_use]
pub fn render(report: &AnalysisReport) -> String {
    let verdict = report.verdict;
    let headline = match verdict {
        Verdict::NoEye => "No eye detected".to_string(),
        Verdict::Healthy => "Healthy".to_string(),
        Verdict::Uncertain => "Uncertain".to_string(),
        Verdict::Finding(condition) => format!("Potential condition: {condition}"),
    };

    let detection = &report.outcome.detection;
    let mut out = format!("{} {}: {headline}\n", marker(verdict), report.path);
    out.push_str(&format!(
        "  detection: {} ({:.2}%)\n",
        detection.label,
        detection.confidence * 100.0
    ));
    if let Some(condition) = report.outcome.condition_result() {
        out.push_str(&format!(
            "  condition: {} ({:.2}%)\n",
            condition.label,
            condition.confidence * 100.0
        ));
    }
    if let Some(crop) = report.crop {
        out.push_str(&format!(
            "  crop: {}x{} at ({}, {})\n",
            crop.width, crop.height, crop.x, crop.y
        ));
    }
    out.push_str(&format!("  {}\n", advice(verdict)));
    out
}

impl ResultOutput for TextOutput {
    #[allow(clippy::significant_drop_tightening)]
    fn write(&self, report: &AnalysisReport) -> Result<()> {
        let text = render(report);
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writeln!(writer, "{text}")?;
        Ok(())
    }

    #[allow(clippy::significant_drop_tightening)]
    fn flush(&self) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writer.flush()?;
        Ok(())
    }
}
