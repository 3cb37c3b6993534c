//! Top-level extraction entry points.
//!
//! [`extract`] drives the full structural pipeline against a
//! [`PageSource`]; when the positioned layer is unavailable or yields no
//! text it degrades to the plain-text path, which is also exposed directly
//! as [`extract_from_text`] for callers that only ever had a string. Both
//! paths converge on the same core once a boilerplate detector is chosen,
//! so everything downstream of filtering behaves identically.

use std::time::Instant;

use tracing::{info, warn};

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::output::{ExtractOutput, ExtractStats};
use crate::pipeline::answerkey::{excise_span, locate_answer_span};
use crate::pipeline::classify::{BoilerplateDetector, StructuralDetector};
use crate::pipeline::cleanup::split_mixed_lines;
use crate::pipeline::fallback::TextDetector;
use crate::pipeline::irregular::detect_irregular_options;
use crate::pipeline::lines::Line;
use crate::pipeline::parse::extract_questions;
use crate::session::DocumentSession;
use crate::source::PageSource;

/// Run the full extraction pipeline against a page source.
///
/// Tries the structural path first; if the source cannot provide
/// positioned fragments, or they contain no text at all, falls back to
/// [`PageSource::raw_text`] and the plain-text detectors.
pub async fn extract<S: PageSource>(
    source: &mut S,
    config: &ExtractConfig,
) -> Result<ExtractOutput, ExtractError> {
    let start = Instant::now();

    match DocumentSession::build(source, config).await {
        Ok(session) => {
            let (lines, profile) = session.into_lines();
            let detector = StructuralDetector::new(profile, config.boilerplate_threshold);
            match run_core(lines, &detector, config, start) {
                Err(ExtractError::NoExtractableText) => {
                    warn!("positioned layer produced no text, switching to raw-text path");
                    let raw = source.raw_text().await?;
                    extract_from_text_at(&raw, config, start)
                }
                other => other,
            }
        }
        Err(ExtractError::SourceUnavailable { detail }) => {
            warn!(%detail, "positioned layer unavailable, switching to raw-text path");
            let raw = source.raw_text().await?;
            extract_from_text_at(&raw, config, start)
        }
        Err(e) => Err(e),
    }
}

/// Run extraction over plain text, no position metadata involved.
pub fn extract_from_text(text: &str, config: &ExtractConfig) -> Result<ExtractOutput, ExtractError> {
    extract_from_text_at(text, config, Instant::now())
}

fn extract_from_text_at(
    text: &str,
    config: &ExtractConfig,
    start: Instant,
) -> Result<ExtractOutput, ExtractError> {
    let lines: Vec<Line> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .enumerate()
        .map(|(i, l)| Line::plain(l, i / config.lines_per_page + 1))
        .collect();
    let detector = TextDetector::new(config.lines_per_page, config.similarity_threshold);
    run_core(lines, &detector, config, start)
}

/// The shared back half of both paths: filter, clean, excise, parse.
fn run_core(
    lines: Vec<Line>,
    detector: &dyn BoilerplateDetector,
    config: &ExtractConfig,
    start: Instant,
) -> Result<ExtractOutput, ExtractError> {
    if lines.iter().all(|l| l.text.trim().is_empty()) {
        return Err(ExtractError::NoExtractableText);
    }
    let total_lines = lines.len();

    let outcome = detector.filter(&lines);
    let mut working = split_mixed_lines(outcome.kept, config);

    let answer_span = if config.detect_answer_key {
        let span = locate_answer_span(&working, config.answer_end_marker.as_deref());
        if let Some(span) = &span {
            excise_span(&mut working, span);
        }
        span
    } else {
        None
    };
    let answer_key_lines = answer_span
        .as_ref()
        .map(|s| s.end_index - s.start_index)
        .unwrap_or(0);

    let irregular_candidates = detect_irregular_options(&working, config);
    let questions = extract_questions(&working, config);

    let stats = ExtractStats {
        total_lines,
        boilerplate_lines: outcome.removed.len(),
        answer_key_lines,
        questions: questions.len(),
        options: questions.iter().map(|q| q.options.len()).sum(),
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        questions = stats.questions,
        options = stats.options,
        boilerplate = stats.boilerplate_lines,
        answer_key = stats.answer_key_lines,
        irregular = irregular_candidates.len(),
        elapsed_ms = stats.duration_ms,
        "extraction finished"
    );

    Ok(ExtractOutput {
        questions,
        answer_span,
        irregular_candidates,
        removed: outcome.removed,
        stats,
    })
}

// ── Text utilities ───────────────────────────────────────────────────────

/// Per-shape usage found by [`discover_shapes`].
#[derive(Debug, Clone)]
pub struct QuestionShapeStats {
    pub shape: crate::config::QuestionShape,
    pub count: usize,
    /// Up to three matching lines, in document order.
    pub examples: Vec<String>,
    /// Whether the matched numbers run consecutively from the first.
    pub progressive: bool,
}

/// Per-shape usage found by [`discover_shapes`].
#[derive(Debug, Clone)]
pub struct OptionShapeStats {
    pub shape: crate::config::OptionShape,
    pub count: usize,
    pub examples: Vec<String>,
}

/// What [`discover_shapes`] learned about a document's formats.
#[derive(Debug, Clone, Default)]
pub struct ShapeDiscovery {
    pub questions: Vec<QuestionShapeStats>,
    pub options: Vec<OptionShapeStats>,
}

/// Survey which prefix shapes a document actually uses.
///
/// Meant for interactive callers that let the user confirm formats before
/// the real pass: shapes with zero matches are omitted, and question
/// shapes whose numbers do not run consecutively are marked
/// non-progressive so the caller can warn about them.
pub fn discover_shapes(text: &str) -> ShapeDiscovery {
    use crate::config::{OptionShape, QuestionShape};

    static FIRST_NUMBER: once_cell::sync::Lazy<regex::Regex> =
        once_cell::sync::Lazy::new(|| regex::Regex::new(r"\d+").unwrap());

    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let mut discovery = ShapeDiscovery::default();
    for shape in QuestionShape::ALL {
        let matches: Vec<&str> = lines
            .iter()
            .copied()
            .filter(|l| shape.regex().is_match(l))
            .collect();
        if matches.is_empty() {
            continue;
        }
        let numbers: Vec<usize> = matches
            .iter()
            .filter_map(|l| FIRST_NUMBER.find(l))
            .filter_map(|m| m.as_str().parse().ok())
            .collect();
        let progressive = numbers.windows(2).all(|w| w[1] == w[0] + 1);
        discovery.questions.push(QuestionShapeStats {
            shape,
            count: matches.len(),
            examples: matches.iter().take(3).map(|l| l.to_string()).collect(),
            progressive,
        });
    }
    for shape in OptionShape::ALL {
        let matches: Vec<&str> = lines
            .iter()
            .copied()
            .filter(|l| shape.regex().is_match(l))
            .collect();
        if matches.is_empty() {
            continue;
        }
        discovery.options.push(OptionShapeStats {
            shape,
            count: matches.len(),
            examples: matches.iter().take(3).map(|l| l.to_string()).collect(),
        });
    }
    discovery
}

/// Light normalisation for pasted or re-encoded text.
///
/// Collapses runs of blank lines, trims trailing whitespace, and closes
/// the gap renderers leave between a number and its delimiter ("3 ." to
/// "3.").
pub fn tidy_text(text: &str) -> String {
    use once_cell::sync::Lazy;
    use regex::Regex;

    static SPACED_DELIM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\s+([.)])").unwrap());

    let mut out: Vec<String> = Vec::new();
    let mut blank_run = 0usize;
    for line in text.lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run == 1 {
                out.push(String::new());
            }
            continue;
        }
        blank_run = 0;
        out.push(SPACED_DELIM.replace(trimmed, "$1$2").into_owned());
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OptionShape, QuestionShape};

    #[test]
    fn discover_reports_only_shapes_in_use() {
        let text = "1. ¿Primera?\na) sí\nb) no\n2. ¿Segunda?\na) tal vez\nb) nunca\n";
        let d = discover_shapes(text);
        assert_eq!(d.questions.len(), 1);
        assert_eq!(d.questions[0].shape, QuestionShape::NumberDot);
        assert_eq!(d.questions[0].count, 2);
        assert!(d.questions[0].progressive);
        assert_eq!(d.options.len(), 1);
        assert_eq!(d.options[0].shape, OptionShape::LowerParen);
        assert_eq!(d.options[0].count, 4);
    }

    #[test]
    fn discover_marks_non_progressive_numbering() {
        let text = "1. ¿Primera?\n9. ¿Salto grande?\n";
        let d = discover_shapes(text);
        assert!(!d.questions[0].progressive);
    }

    #[test]
    fn tidy_closes_spaced_delimiters_and_blank_runs() {
        let text = "3 . ¿Pregunta?\n\n\n\na) sí   \n";
        let tidied = tidy_text(text);
        assert_eq!(tidied, "3. ¿Pregunta?\n\na) sí");
    }
}
