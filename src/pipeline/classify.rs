//! Structural boilerplate classification.
//!
//! Each line accumulates a score from independent signals: where it sits on
//! the page, whether the profiler saw it repeat across pages, whether it
//! matches the shared pattern library, and how its font and width compare
//! to the document average. One weak signal never condemns a line; crossing
//! the threshold takes agreement between several.
//!
//! Why additive scoring instead of hard rules: a page number is short,
//! bottom-anchored and pattern-matched all at once, while a question that
//! merely happens to sit low on the page picks up a single +3 and stays
//! well under the threshold.

use tracing::trace;

use crate::output::{LineRole, RemovedLine};
use crate::patterns::match_boilerplate;
use crate::pipeline::lines::Line;
use crate::pipeline::profile::DocumentProfile;

/// A boilerplate filter over reconstructed lines.
///
/// Two implementations exist: [`StructuralDetector`] when position metadata
/// is available, and [`crate::pipeline::fallback::TextDetector`] for plain
/// text. Both return the same outcome shape so the rest of the pipeline
/// does not care which path ran.
pub trait BoilerplateDetector {
    fn filter(&self, lines: &[Line]) -> FilterOutcome;
}

/// Result of a filter pass: surviving lines plus the removal audit.
#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub kept: Vec<Line>,
    pub removed: Vec<RemovedLine>,
}

/// One classified line with its full evidence trail.
#[derive(Debug)]
pub struct ClassifiedLine {
    pub line: Line,
    pub is_boilerplate: bool,
    pub role: LineRole,
    pub score: i32,
    pub evidence: Vec<&'static str>,
    /// Rough confidence percentage, capped at 95.
    pub confidence: u8,
}

/// Position-aware classifier backed by a frozen [`DocumentProfile`].
#[derive(Debug)]
pub struct StructuralDetector {
    pub profile: DocumentProfile,
    pub threshold: i32,
}

impl StructuralDetector {
    pub fn new(profile: DocumentProfile, threshold: i32) -> Self {
        Self { profile, threshold }
    }
}

impl BoilerplateDetector for StructuralDetector {
    fn filter(&self, lines: &[Line]) -> FilterOutcome {
        let mut outcome = FilterOutcome::default();
        for line in lines {
            let classified = classify_line(line.clone(), &self.profile, self.threshold);
            if classified.is_boilerplate {
                trace!(
                    text = %classified.line.text,
                    score = classified.score,
                    evidence = ?classified.evidence,
                    "removed boilerplate line"
                );
                outcome.removed.push(RemovedLine {
                    text: classified.line.text,
                    role: classified.role,
                    score: classified.score,
                    evidence: classified.evidence.iter().map(|e| e.to_string()).collect(),
                    page: Some(classified.line.page),
                });
            } else {
                outcome.kept.push(classified.line);
            }
        }
        outcome
    }
}

/// Score one line against the profile. Lines without layout metadata are
/// kept untouched; they belong to the fallback path.
pub fn classify_line(line: Line, profile: &DocumentProfile, threshold: i32) -> ClassifiedLine {
    let Some(layout) = line.layout.clone() else {
        return ClassifiedLine {
            line,
            is_boilerplate: false,
            role: LineRole::Content,
            score: 0,
            evidence: Vec::new(),
            confidence: 0,
        };
    };

    let text = line.text.trim();
    let mut score = 0i32;
    let mut evidence: Vec<&'static str> = Vec::new();
    let mut role = LineRole::Content;

    // Position signal
    let rel_y = layout.relative_y;
    if rel_y < 0.08 {
        score += 5;
        evidence.push("top-margin position");
        role = LineRole::Header;
    } else if rel_y < 0.15 {
        score += 3;
        evidence.push("upper position");
        role = LineRole::Header;
    } else if rel_y > 0.92 {
        score += 5;
        evidence.push("bottom-margin position");
        role = LineRole::Footer;
    } else if rel_y > 0.85 {
        score += 3;
        evidence.push("lower position");
        role = LineRole::Footer;
    }

    // Cross-page repetition, the strongest single signal. Membership also
    // settles the role even when the position band alone did not.
    if profile.is_known_header(text) {
        score += 6;
        evidence.push("repeating header");
        role = LineRole::Header;
    } else if profile.is_known_footer(text) {
        score += 6;
        evidence.push("repeating footer");
        role = LineRole::Footer;
    }

    // Pattern library
    for (tag, weight) in match_boilerplate(text) {
        score += weight;
        evidence.push(tag);
    }

    // Font deviation from the document body
    if profile.avg_font_size > 0.0 {
        let ratio = layout.avg_font_size / profile.avg_font_size;
        if ratio < 0.7 {
            score += 2;
            evidence.push("small font");
        } else if ratio > 1.5 {
            score += 1;
            evidence.push("large font");
        }
    }

    // Width relative to the page
    if layout.page_width > 0.0 {
        let ratio = layout.width / layout.page_width;
        if ratio < 0.3 {
            score += 2;
            evidence.push("narrow line");
        } else if ratio > 0.9 {
            score += 1;
            evidence.push("full-width line");
        }
    }

    // Brevity only counts at the page extremes
    if text.len() < 50 && (rel_y < 0.15 || rel_y > 0.85) {
        score += 2;
        evidence.push("short text at page edge");
    }

    // All-caps stamps
    if text.len() > 5
        && text.chars().any(|c| c.is_alphabetic())
        && !text.chars().any(|c| c.is_lowercase())
    {
        score += 1;
        evidence.push("all uppercase");
    }

    let is_boilerplate = score >= threshold;
    let confidence = (score.saturating_mul(10)).min(95).max(0) as u8;

    ClassifiedLine { line, is_boilerplate, role, score, evidence, confidence }
}
