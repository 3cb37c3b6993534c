//! The extraction pipeline, stage by stage.
//!
//! Data flows one way:
//!
//! ```text
//! fragments ──lines──▶ reading-order lines
//!               │
//!               ├─profile──▶ document profile (sampled pages)
//!               │
//!          classify / fallback ──▶ kept lines + removed audit
//!               │
//!            cleanup ──▶ split + stripped working text
//!               │
//!           answerkey ──▶ answer span excised
//!               │
//!            parse ──▶ questions + options
//!               │
//!           irregular ──▶ near-miss option candidates
//! ```
//!
//! Every stage is a pure function over its inputs except the profiler,
//! which accumulates per-page observations before freezing.

pub mod answerkey;
pub mod classify;
pub mod cleanup;
pub mod fallback;
pub mod irregular;
pub mod lines;
pub mod parse;
pub mod profile;
