//! Shared helpers for reading classifier output.

use crate::domain::AnalysisError;

/// Index and value of the largest probability. The first index wins ties.
#[must_use]
pub fn argmax(probs: &[f32]) -> Option<(usize, f32)> {
    probs
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (i, p)| match best {
            Some((_, best_p)) if best_p >= p => best,
            _ => Some((i, p)),
        })
}

/// The highest and second-highest probabilities.
#[must_use]
pub fn top_two(probs: &[f32]) -> Option<(f32, f32)> {
    if probs.len() < 2 {
        return None;
    }
    let mut sorted = probs.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    Some((sorted[0], sorted[1]))
}

/// Checks that a model produced one finite value per expected class.
///
/// # Errors
///
/// Returns [`AnalysisError::Inference`] if the length is wrong or a value is
/// NaN or infinite.
pub fn check_distribution(
    model: &'static str,
    probs: &[f32],
    expected: usize,
) -> Result<(), AnalysisError> {
    if probs.len() != expected {
        return Err(AnalysisError::inference(
            model,
            format!("expected {expected} probabilities, got {}", probs.len()),
        ));
    }
    if let Some(bad) = probs.iter().find(|p| !p.is_finite()) {
        return Err(AnalysisError::inference(
            model,
            format!("non-finite probability {bad}"),
        ));
    }
    Ok(())
}
