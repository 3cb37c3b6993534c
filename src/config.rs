//! Configuration types for question/option extraction.
//!
//! All extraction behaviour is controlled through [`ExtractConfig`], built
//! via its [`ExtractConfigBuilder`]. Extraction is a pure function of
//! (lines, configuration): confirmation results such as accepted irregular
//! option shapes or an answer-key end marker extend the configuration and
//! trigger a fresh deterministic re-run, never an in-place patch of partial
//! results.
//!
//! Prefix shapes are a closed, enumerated table ([`QuestionShape`],
//! [`OptionShape`]): each variant carries both its matching regex and its
//! canonical rendering, so the classifier, the mixed-line splitter, and the
//! extractor all agree on what "a)" means.

use crate::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// ── Prefix shapes ────────────────────────────────────────────────────────

/// Supported question-prefix shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionShape {
    /// `1. ¿Pregunta?`
    NumberDot,
    /// `1) ¿Pregunta?`
    NumberParen,
    /// `1.- ¿Pregunta?`
    NumberDotDash,
    /// `Pregunta 1:` (case-insensitive)
    LabelColon,
    /// `PREGUNTA 1:` (uppercase only)
    LabelColonUpper,
}

static Q_NUMBER_DOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.").unwrap());
static Q_NUMBER_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\)").unwrap());
static Q_NUMBER_DOT_DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.-").unwrap());
static Q_LABEL_COLON: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^pregunta \d+:").unwrap());
static Q_LABEL_COLON_UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^PREGUNTA \d+:").unwrap());

impl QuestionShape {
    pub const ALL: [QuestionShape; 5] = [
        QuestionShape::NumberDot,
        QuestionShape::NumberParen,
        QuestionShape::NumberDotDash,
        QuestionShape::LabelColon,
        QuestionShape::LabelColonUpper,
    ];

    pub fn regex(&self) -> &'static Regex {
        match self {
            QuestionShape::NumberDot => &Q_NUMBER_DOT,
            QuestionShape::NumberParen => &Q_NUMBER_PAREN,
            QuestionShape::NumberDotDash => &Q_NUMBER_DOT_DASH,
            QuestionShape::LabelColon => &Q_LABEL_COLON,
            QuestionShape::LabelColonUpper => &Q_LABEL_COLON_UPPER,
        }
    }

    /// Short display label, matching what a caller would have clicked in a
    /// format-selection UI.
    pub fn label(&self) -> &'static str {
        match self {
            QuestionShape::NumberDot => "1.",
            QuestionShape::NumberParen => "1)",
            QuestionShape::NumberDotDash => "1.-",
            QuestionShape::LabelColon => "Pregunta 1:",
            QuestionShape::LabelColonUpper => "PREGUNTA 1:",
        }
    }

    /// Canonical rendering of the prefix for a given question number.
    pub fn render(&self, number: usize) -> String {
        match self {
            QuestionShape::NumberDot => format!("{number}."),
            QuestionShape::NumberParen => format!("{number})"),
            QuestionShape::NumberDotDash => format!("{number}.-"),
            QuestionShape::LabelColon => format!("Pregunta {number}:"),
            QuestionShape::LabelColonUpper => format!("PREGUNTA {number}:"),
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.label() == label)
    }
}

/// Supported option-prefix shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionShape {
    /// `a) texto`
    LowerParen,
    /// `A) texto`
    UpperParen,
    /// `a. texto`
    LowerDot,
    /// `A. texto`
    UpperDot,
    /// `(a) texto`
    LowerBracket,
    /// `(A) texto`
    UpperBracket,
}

static O_LOWER_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]\)").unwrap());
static O_UPPER_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]\)").unwrap());
static O_LOWER_DOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]\.").unwrap());
static O_UPPER_DOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]\.").unwrap());
static O_LOWER_BRACKET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\([a-z]\)").unwrap());
static O_UPPER_BRACKET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\([A-Z]\)").unwrap());

impl OptionShape {
    pub const ALL: [OptionShape; 6] = [
        OptionShape::LowerParen,
        OptionShape::UpperParen,
        OptionShape::LowerDot,
        OptionShape::UpperDot,
        OptionShape::LowerBracket,
        OptionShape::UpperBracket,
    ];

    pub fn regex(&self) -> &'static Regex {
        match self {
            OptionShape::LowerParen => &O_LOWER_PAREN,
            OptionShape::UpperParen => &O_UPPER_PAREN,
            OptionShape::LowerDot => &O_LOWER_DOT,
            OptionShape::UpperDot => &O_UPPER_DOT,
            OptionShape::LowerBracket => &O_LOWER_BRACKET,
            OptionShape::UpperBracket => &O_UPPER_BRACKET,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OptionShape::LowerParen => "a)",
            OptionShape::UpperParen => "A)",
            OptionShape::LowerDot => "a.",
            OptionShape::UpperDot => "A.",
            OptionShape::LowerBracket => "(a)",
            OptionShape::UpperBracket => "(A)",
        }
    }

    /// Canonical rendering of the prefix for a given option letter.
    pub fn render(&self, letter: char) -> String {
        match self {
            OptionShape::LowerParen => format!("{})", letter.to_ascii_lowercase()),
            OptionShape::UpperParen => format!("{})", letter.to_ascii_uppercase()),
            OptionShape::LowerDot => format!("{}.", letter.to_ascii_lowercase()),
            OptionShape::UpperDot => format!("{}.", letter.to_ascii_uppercase()),
            OptionShape::LowerBracket => format!("({})", letter.to_ascii_lowercase()),
            OptionShape::UpperBracket => format!("({})", letter.to_ascii_uppercase()),
        }
    }

    /// Whether this shape uses `)` as its delimiter (vs. `.`).
    pub fn uses_paren(&self) -> bool {
        matches!(
            self,
            OptionShape::LowerParen | OptionShape::UpperParen | OptionShape::LowerBracket | OptionShape::UpperBracket
        )
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.label() == label)
    }
}

// ── Irregular option formats ─────────────────────────────────────────────

/// Delimiter family of an accepted irregular option shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrregularDelimiter {
    Paren,
    Dot,
}

/// A caller-confirmed irregular option shape, e.g. `C )` for letter `C`.
///
/// Matches the exact letter with any run of whitespace before the
/// delimiter, so re-running extraction picks the line up as a regular
/// option.
#[derive(Debug, Clone)]
pub struct IrregularFormat {
    pub letter: char,
    pub delimiter: IrregularDelimiter,
    regex: Regex,
}

impl IrregularFormat {
    pub fn new(letter: char, delimiter: IrregularDelimiter) -> Self {
        let delim = match delimiter {
            IrregularDelimiter::Paren => r"\)",
            IrregularDelimiter::Dot => r"\.",
        };
        let regex = Regex::new(&format!(r"^{}\s*{delim}", regex::escape(&letter.to_string())))
            .expect("irregular format regex");
        Self { letter, delimiter, regex }
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

// ── Configuration ────────────────────────────────────────────────────────

/// Configuration for one extraction pass.
///
/// Built via [`ExtractConfig::builder()`] or [`ExtractConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2quiz::{ExtractConfig, OptionShape, QuestionShape};
///
/// let config = ExtractConfig::builder()
///     .question_shapes([QuestionShape::NumberDot])
///     .option_shapes([OptionShape::LowerParen])
///     .option_count(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Caller-declared question-prefix shapes. A line starts a new question
    /// only if it matches one of these AND passes the progressivity check.
    pub question_shapes: Vec<QuestionShape>,

    /// Caller-declared option-prefix shapes.
    pub option_shapes: Vec<OptionShape>,

    /// Options per question. Default: 4. Option lines past this bound are
    /// treated as continuation text, never appended as extra options.
    pub option_count: usize,

    /// Caller-confirmed irregular option shapes (from a previous pass's
    /// [`crate::output::IrregularOptionCandidate`] batch).
    pub irregular_formats: Vec<IrregularFormat>,

    /// Look for an embedded answer-key section and excise it. Default: true.
    pub detect_answer_key: bool,

    /// Optional end marker bounding the answer-key span. Without it the
    /// span runs to the end of the document.
    pub answer_end_marker: Option<String>,

    /// Pages sampled when building the document profile. Default: 10.
    ///
    /// The cap exists purely for speed on very long documents; below it,
    /// every page feeds the profile.
    pub sample_pages: usize,

    /// Vertical tolerance (page units) when merging fragments into one
    /// line. Default: 5.0.
    pub line_tolerance: f32,

    /// Estimated lines per page for the plain-text fallback, which has no
    /// real page boundaries to work with. Default: 40.
    pub lines_per_page: usize,

    /// Mean pairwise similarity at which cross-page near-duplicates are
    /// declared boilerplate. Default: 0.95.
    pub similarity_threshold: f64,

    /// Score at which the structural classifier declares a line
    /// boilerplate. Default: 4. Lines below stay content: a lost footer is
    /// recoverable, a destroyed question is not.
    pub boilerplate_threshold: i32,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            question_shapes: vec![QuestionShape::NumberDot],
            option_shapes: vec![OptionShape::LowerParen],
            option_count: 4,
            irregular_formats: Vec::new(),
            detect_answer_key: true,
            answer_end_marker: None,
            sample_pages: 10,
            line_tolerance: 5.0,
            lines_per_page: 40,
            similarity_threshold: 0.95,
            boilerplate_threshold: 4,
        }
    }
}

impl ExtractConfig {
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder { config: Self::default() }
    }

    /// Does the line start with any declared question prefix?
    pub fn matches_question(&self, line: &str) -> bool {
        self.question_shapes.iter().any(|s| s.regex().is_match(line))
    }

    /// The declared question shape matching the line, if any.
    pub fn question_shape_for(&self, line: &str) -> Option<QuestionShape> {
        self.question_shapes.iter().copied().find(|s| s.regex().is_match(line))
    }

    /// Does the line start with any declared or accepted-irregular option
    /// prefix?
    pub fn matches_option(&self, line: &str) -> bool {
        self.option_shapes.iter().any(|s| s.regex().is_match(line))
            || self.irregular_formats.iter().any(|f| f.regex().is_match(line))
    }

    /// Length of the option prefix at the start of the line, if present.
    /// Covers declared shapes and accepted irregular formats.
    pub fn option_prefix_len(&self, line: &str) -> Option<usize> {
        self.option_shapes
            .iter()
            .filter_map(|s| s.regex().find(line))
            .chain(self.irregular_formats.iter().filter_map(|f| f.regex().find(line)))
            .map(|m| m.end())
            .next()
    }

    /// Compile a batch of confirmed irregular candidates into additional
    /// option formats. The caller then re-runs extraction; results from
    /// the previous pass are discarded, never patched.
    pub fn accept_irregular(&mut self, candidates: &[crate::output::IrregularOptionCandidate]) {
        for cand in candidates {
            let delimiter = if cand.suggestion.ends_with(')') {
                IrregularDelimiter::Paren
            } else {
                IrregularDelimiter::Dot
            };
            if !self
                .irregular_formats
                .iter()
                .any(|f| f.letter == cand.letter && f.delimiter == delimiter)
            {
                self.irregular_formats.push(IrregularFormat::new(cand.letter, delimiter));
            }
        }
    }
}

/// Builder for [`ExtractConfig`].
#[derive(Debug)]
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    pub fn question_shapes(mut self, shapes: impl IntoIterator<Item = QuestionShape>) -> Self {
        self.config.question_shapes = shapes.into_iter().collect();
        self
    }

    pub fn option_shapes(mut self, shapes: impl IntoIterator<Item = OptionShape>) -> Self {
        self.config.option_shapes = shapes.into_iter().collect();
        self
    }

    pub fn option_count(mut self, n: usize) -> Self {
        self.config.option_count = n;
        self
    }

    pub fn irregular_formats(mut self, formats: impl IntoIterator<Item = IrregularFormat>) -> Self {
        self.config.irregular_formats = formats.into_iter().collect();
        self
    }

    pub fn detect_answer_key(mut self, v: bool) -> Self {
        self.config.detect_answer_key = v;
        self
    }

    pub fn answer_end_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.answer_end_marker = Some(marker.into());
        self
    }

    pub fn sample_pages(mut self, n: usize) -> Self {
        self.config.sample_pages = n.max(1);
        self
    }

    pub fn line_tolerance(mut self, tol: f32) -> Self {
        self.config.line_tolerance = tol.max(0.5);
        self
    }

    pub fn lines_per_page(mut self, n: usize) -> Self {
        self.config.lines_per_page = n.max(10);
        self
    }

    pub fn similarity_threshold(mut self, t: f64) -> Self {
        self.config.similarity_threshold = t.clamp(0.5, 1.0);
        self
    }

    pub fn boilerplate_threshold(mut self, t: i32) -> Self {
        self.config.boilerplate_threshold = t.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractConfig, ExtractError> {
        let c = &self.config;
        if c.question_shapes.is_empty() {
            return Err(ExtractError::InvalidConfig(
                "at least one question shape must be declared".into(),
            ));
        }
        if c.option_shapes.is_empty() {
            return Err(ExtractError::InvalidConfig(
                "at least one option shape must be declared".into(),
            ));
        }
        if c.option_count == 0 || c.option_count > 26 {
            return Err(ExtractError::InvalidConfig(format!(
                "option count must be 1–26, got {}",
                c.option_count
            )));
        }
        Ok(self.config)
    }
}
