//! # pdf2quiz
//!
//! Extraction engine that turns exam-style documents into structured
//! multiple-choice questions. The input is positioned text fragments from a
//! rendered document (or, failing that, plain text); the output is a list
//! of numbered questions with lettered options, plus an audit of everything
//! that was removed along the way.
//!
//! ```text
//!  PageSource (positioned fragments)          plain text
//!        │                                        │
//!        ▼                                        ▼
//!  line reconstruction                     line splitting
//!        │                                        │
//!  document profile ──▶ structural        fallback detectors
//!  (sampled pages)      classifier        (similarity, frequency,
//!        │                  │              statistics, patterns)
//!        └────────┬─────────┘─────────────────────┘
//!                 ▼
//!        mixed-line splitting and cleanup
//!                 ▼
//!        answer-template excision
//!                 ▼
//!        question/option state machine
//!                 ▼
//!        irregular-option candidates
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use pdf2quiz::{extract_from_text, ExtractConfig};
//!
//! let text = "1. ¿Capital de España?\na) Madrid\nb) Barcelona\nc) Valencia\nd) Sevilla\n";
//! let output = extract_from_text(text, &ExtractConfig::default()).unwrap();
//! assert_eq!(output.questions.len(), 1);
//! assert_eq!(output.questions[0].options.len(), 4);
//! ```
//!
//! ## Confirmation round-trips
//!
//! Ambiguity never fails a pass. Irregular option lines and the located
//! answer-template span come back as data in [`ExtractOutput`]; the caller
//! confirms what it wants ([`ExtractConfig::accept_irregular`], an
//! [`ExtractConfigBuilder::answer_end_marker`]) and re-runs extraction.
//! Re-running with the same input and configuration is deterministic.
//!
//! ## Errors
//!
//! Only conditions that prevent producing any output are errors, see
//! [`ExtractError`]. Everything else is a finding carried in the output.

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod patterns;
pub mod pipeline;
pub mod session;
pub mod source;

pub use config::{
    ExtractConfig, ExtractConfigBuilder, IrregularDelimiter, IrregularFormat, OptionShape,
    QuestionShape,
};
pub use error::ExtractError;
pub use extract::{
    discover_shapes, extract, extract_from_text, tidy_text, OptionShapeStats, QuestionShapeStats,
    ShapeDiscovery,
};
pub use output::{
    AnswerTemplateSpan, ExtractOutput, ExtractStats, IrregularOptionCandidate, LineRole, Question,
    QuestionOption, RemovedLine,
};
pub use pipeline::lines::{Line, LineLayout};
pub use session::{DocumentSession, PageLines};
pub use source::{decode_raw_bytes, FragmentSource, PageFragments, PageSource, TextFragment};
