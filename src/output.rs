//! Result types for an extraction pass.
//!
//! [`ExtractOutput`] is returned even when the document was messy: ambiguous
//! findings ride along as data (removed-line audit, irregular candidates,
//! the located answer span) instead of failing the pass, so callers can run
//! their confirmation round-trips and re-extract with an enriched
//! [`crate::ExtractConfig`].

use serde::{Deserialize, Serialize};

/// One answer option of a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Lowercased option letter, unique within its question.
    pub letter: char,
    pub text: String,
    /// Always `false`: correctness is not inferred by this engine.
    pub correct: bool,
}

/// One extracted question with its ordered options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// The number embedded in the question's prefix, e.g. the 7 of `7.`.
    pub number: usize,
    pub text: String,
    /// Never longer than the declared option count.
    pub options: Vec<QuestionOption>,
}

/// Location of an embedded answer-key section, excised before extraction.
///
/// `start_index..end_index` is the half-open range of working-text lines
/// that were removed. The preview snippet exists for caller confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerTemplateSpan {
    /// The line that opened the section (banner phrase or first answer line).
    pub start_marker: String,
    pub start_index: usize,
    pub end_index: usize,
    /// Caller-supplied end marker, when one bounded the span.
    pub end_marker: Option<String>,
    /// Up to 12 lines from the start of the span.
    pub preview: String,
}

/// A line that failed every declared option pattern but matches a near-miss
/// shape and is corroborated by regular options nearby.
///
/// Candidates are never auto-accepted: the caller confirms the batch via
/// [`crate::ExtractConfig::accept_irregular`] and re-runs extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrregularOptionCandidate {
    /// The offending line, trimmed.
    pub line: String,
    /// 1-based position in the working text.
    pub line_number: usize,
    /// The extracted leading letter, case preserved.
    pub letter: char,
    /// Human-readable description of the near-miss shape that matched.
    pub variant: &'static str,
    /// Canonical prefix the line should have had, e.g. `C)`.
    pub suggestion: String,
}

/// Role a removed line played in the page frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineRole {
    Header,
    Footer,
    Content,
}

/// Audit record for one line removed as boilerplate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovedLine {
    pub text: String,
    pub role: LineRole,
    /// Accumulated classifier score (structural path) or number of fallback
    /// detectors that flagged the line (text path).
    pub score: i32,
    pub evidence: Vec<String>,
    /// Source page, when position metadata was available.
    pub page: Option<usize>,
}

/// Counters for one extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractStats {
    /// Lines entering the filter (after line reconstruction / splitting).
    pub total_lines: usize,
    /// Lines removed as boilerplate.
    pub boilerplate_lines: usize,
    /// Lines removed as part of the answer-key span.
    pub answer_key_lines: usize,
    pub questions: usize,
    pub options: usize,
    pub duration_ms: u64,
}

/// Everything one extraction pass produced.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractOutput {
    /// Questions in document order.
    pub questions: Vec<Question>,
    /// The excised answer-key span, if one was located.
    pub answer_span: Option<AnswerTemplateSpan>,
    /// Irregular option lines awaiting caller confirmation.
    pub irregular_candidates: Vec<IrregularOptionCandidate>,
    /// Removed-boilerplate audit, in document order.
    pub removed: Vec<RemovedLine>,
    pub stats: ExtractStats,
}

impl ExtractOutput {
    /// Total number of options across all questions.
    pub fn option_count(&self) -> usize {
        self.questions.iter().map(|q| q.options.len()).sum()
    }
}
