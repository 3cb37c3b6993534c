//! Question and option extraction over filtered, cleaned lines.
//!
//! A small state machine walks the working text. The subtle part is not
//! matching prefixes but refusing them: exam bodies are full of lines that
//! merely look like question starts (statute references such as "15.3 del
//! convenio", stray page numbers welded mid-sentence), so a numeric prefix
//! only opens a new question when its number is progressive with respect to
//! everything accepted so far. A rejected prefix degrades to continuation
//! text of whatever is currently open.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::config::ExtractConfig;
use crate::output::{Question, QuestionOption};
use crate::pipeline::cleanup::clean_line;
use crate::pipeline::lines::Line;

static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
/// A letter or number followed by a block delimiter: looks like the start
/// of some other block even though no declared shape matched it.
static BLOCK_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[A-Za-z][.)]|\d+[.)])").unwrap());

/// Continuation lines longer than this rejoin the question, not the option.
const MAX_OPTION_CONTINUATION: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Idle,
    InQuestion,
    InOption,
}

#[derive(Debug, Default)]
struct Progress {
    seen: HashSet<usize>,
    max: usize,
}

impl Progress {
    /// A number is accepted when it is the very first, or unseen and either
    /// adjacent to a seen number or exactly one past the maximum. Duplicates
    /// always fail; a restarted numbering is an answer sheet, not a
    /// question.
    fn accepts(&self, n: usize) -> bool {
        if self.seen.is_empty() {
            return true;
        }
        if self.seen.contains(&n) {
            return false;
        }
        (n > 0 && self.seen.contains(&(n - 1))) || n == self.max + 1
    }

    fn record(&mut self, n: usize) {
        self.seen.insert(n);
        self.max = self.max.max(n);
    }
}

/// Walk the working text and extract questions with their options.
pub fn extract_questions(lines: &[Line], config: &ExtractConfig) -> Vec<Question> {
    let mut questions: Vec<Question> = Vec::new();
    let mut current: Option<Question> = None;
    let mut state = ParserState::Idle;
    let mut progress = Progress::default();

    for line in lines {
        let text = clean_line(&line.text, config);
        if text.is_empty() {
            continue;
        }

        // New question?
        if let Some(shape) = config.question_shape_for(&text) {
            let number = FIRST_NUMBER
                .find(&text)
                .and_then(|m| m.as_str().parse::<usize>().ok());
            if let Some(n) = number {
                if progress.accepts(n) {
                    if let Some(q) = current.take() {
                        questions.push(q);
                    }
                    let body = match shape.regex().find(&text) {
                        Some(m) => text[m.end()..].trim().to_string(),
                        None => text.clone(),
                    };
                    progress.record(n);
                    current = Some(Question { number: n, text: body, options: Vec::new() });
                    state = ParserState::InQuestion;
                    continue;
                }
                debug!(number = n, text = %text, "non-progressive number, treated as continuation");
                if let Some(q) = current.as_mut() {
                    append(&mut q.text, &text);
                }
                continue;
            }
        }

        // New option?
        if let Some(prefix_len) = config.option_prefix_len(&text) {
            if let Some(q) = current.as_mut() {
                if q.options.len() < config.option_count {
                    let letter = text[..prefix_len]
                        .chars()
                        .find(|c| c.is_ascii_alphabetic())
                        .map(|c| c.to_ascii_lowercase())
                        .unwrap_or((b'a' + q.options.len() as u8) as char);
                    let body = text[prefix_len..].trim();
                    if let Some(existing) =
                        q.options.iter_mut().find(|o| o.letter == letter)
                    {
                        // A letter never repeats within one question; a
                        // second "a)" is a re-render of the first.
                        debug!(%letter, text = %text, "repeated option letter, merged into existing");
                        append(&mut existing.text, body);
                    } else {
                        q.options.push(QuestionOption {
                            letter,
                            text: body.to_string(),
                            correct: false,
                        });
                    }
                    state = ParserState::InOption;
                } else if let Some(last) = q.options.last_mut() {
                    // Past the declared bound: continuation, never a fifth
                    // option.
                    debug!(text = %text, "option past declared bound, merged into previous");
                    append(&mut last.text, &text);
                }
                continue;
            }
            // Option before any question: preamble noise.
            continue;
        }

        // Continuation text.
        match state {
            ParserState::Idle => {}
            ParserState::InQuestion => {
                if BLOCK_LIKE.is_match(&text) {
                    // Undeclared prefix; leave it for the irregular scan.
                    continue;
                }
                if let Some(q) = current.as_mut() {
                    append(&mut q.text, &text);
                }
            }
            ParserState::InOption => {
                if BLOCK_LIKE.is_match(&text) {
                    continue;
                }
                if let Some(q) = current.as_mut() {
                    if text.len() > MAX_OPTION_CONTINUATION {
                        append(&mut q.text, &text);
                    } else if let Some(last) = q.options.last_mut() {
                        append(&mut last.text, &text);
                    }
                }
            }
        }
    }

    if let Some(q) = current.take() {
        questions.push(q);
    }
    questions
}

fn append(target: &mut String, extra: &str) {
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(extra);
}
