//! Layout detection: pick the pattern that fits a sample of lines best.
//!
//! Used when a file arrives without a configured layout. Each candidate
//! pattern is scored by the share of sample lines it recognizes as
//! record starts; continuation-heavy files still score well because the
//! threshold is deliberately low.

use crate::matcher::{LineMatch, LineMatcher};
use crate::pattern::LinePattern;

/// Minimum share of sample lines a pattern must start before it is
/// trusted. Multiline logs legitimately score far below 1.0.
pub const MIN_SELECTION_RATIO: f64 = 0.25;

/// A winning candidate and how well it scored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternChoice {
    /// Index into the candidate slice passed to [`select_pattern`].
    pub index: usize,
    /// Share of sample lines recognized as record starts, in `0.0..=1.0`.
    pub hit_ratio: f64,
}

/// Score every candidate against the sample and pick the best one.
///
/// Returns `None` when the sample is empty or no candidate reaches
/// [`MIN_SELECTION_RATIO`]. Ties go to the earlier candidate, so callers
/// should order candidates from most to least specific.
pub fn select_pattern(candidates: &[LinePattern], sample: &[&str]) -> Option<PatternChoice> {
    if sample.is_empty() {
        return None;
    }

    let mut best: Option<PatternChoice> = None;
    for (index, pattern) in candidates.iter().enumerate() {
        let hits = sample
            .iter()
            .filter(|line| matches!(pattern.match_line(line), LineMatch::Start(_)))
            .count();
        let hit_ratio = hits as f64 / sample.len() as f64;
        tracing::trace!(
            pattern = pattern.source(),
            hits,
            sample = sample.len(),
            "scored layout candidate"
        );

        let better = match best {
            Some(current) => hit_ratio > current.hit_ratio,
            None => true,
        };
        if better {
            best = Some(PatternChoice { index, hit_ratio });
        }
    }

    match best {
        Some(choice) if choice.hit_ratio >= MIN_SELECTION_RATIO => {
            tracing::debug!(
                pattern = candidates[choice.index].source(),
                hit_ratio = choice.hit_ratio,
                "selected layout pattern"
            );
            Some(choice)
        }
        _ => None,
    }
}
