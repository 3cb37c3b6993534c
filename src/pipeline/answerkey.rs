//! Embedded answer-template location and excision.
//!
//! Exam documents often end with a fill-in answer sheet whose lines look
//! exactly like numbered questions ("1. ____", "2. ____"). Left in place
//! they would parse as a second run of empty questions, so the locator
//! finds the section before parsing starts and the whole span is excised.
//!
//! Two detection routes, tried in order: a known banner phrase anywhere in
//! a line, or a streak of at least three consecutive answer-shaped lines
//! (the sheet itself when its banner was lost with the page header).

use tracing::info;

use crate::output::AnswerTemplateSpan;
use crate::patterns::{ANSWER_KEY_START_KEYWORDS, ANSWER_LINE};
use crate::pipeline::lines::Line;

const MIN_STREAK: usize = 3;
const PREVIEW_LINES: usize = 12;

/// Locate the answer-template span, if any.
///
/// The span runs from the detected start to the line matching
/// `end_marker` (inclusive), or to the end of the document when no marker
/// is given or found. The caller decides whether to excise.
pub fn locate_answer_span(lines: &[Line], end_marker: Option<&str>) -> Option<AnswerTemplateSpan> {
    let start = find_start(lines)?;

    let end_index = match end_marker {
        Some(marker) if !marker.trim().is_empty() => {
            let needle = marker.trim().to_lowercase();
            lines[start..]
                .iter()
                .position(|l| l.text.to_lowercase().contains(&needle))
                .map(|off| start + off + 1)
                .unwrap_or(lines.len())
        }
        _ => lines.len(),
    };

    let preview = lines[start..end_index]
        .iter()
        .take(PREVIEW_LINES)
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let span = AnswerTemplateSpan {
        start_marker: lines[start].text.clone(),
        start_index: start,
        end_index,
        end_marker: end_marker
            .filter(|m| !m.trim().is_empty())
            .map(|m| m.trim().to_string()),
        preview,
    };
    info!(
        start = span.start_index,
        end = span.end_index,
        marker = %span.start_marker,
        "located answer-template section"
    );
    Some(span)
}

/// Remove the span from the working text.
pub fn excise_span(lines: &mut Vec<Line>, span: &AnswerTemplateSpan) {
    let end = span.end_index.min(lines.len());
    if span.start_index < end {
        lines.drain(span.start_index..end);
    }
}

fn find_start(lines: &[Line]) -> Option<usize> {
    // Route 1: banner phrase
    for (i, line) in lines.iter().enumerate() {
        let lower = line.text.to_lowercase();
        if ANSWER_KEY_START_KEYWORDS.iter().any(|k| lower.contains(k)) {
            return Some(i);
        }
    }

    // Route 2: a streak of answer-shaped lines
    let mut streak_start = None;
    let mut streak = 0usize;
    for (i, line) in lines.iter().enumerate() {
        if ANSWER_LINE.is_match(&line.text) {
            if streak == 0 {
                streak_start = Some(i);
            }
            streak += 1;
            if streak >= MIN_STREAK {
                return streak_start;
            }
        } else {
            streak = 0;
            streak_start = None;
        }
    }
    None
}
