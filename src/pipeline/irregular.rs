//! Near-miss option detection with neighbourhood corroboration.
//!
//! A line like `C )  Texto` fails every declared option shape because of
//! the stray space, yet in the middle of a run of regular options it is
//! almost certainly an option with a typesetting accident. The scan flags
//! such lines as candidates only when at least two regular options sit
//! within ten lines on either side; an isolated near-miss in running prose
//! stays untouched. Candidates are reported, never auto-accepted: the
//! caller confirms the batch and re-runs extraction with the shapes added
//! to the configuration.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::config::ExtractConfig;
use crate::output::IrregularOptionCandidate;
use crate::pipeline::lines::Line;

const WINDOW: usize = 10;
const MIN_NEIGHBOURS: usize = 2;

struct NearMiss {
    regex: Regex,
    variant: &'static str,
    delimiter: char,
}

static NEAR_MISSES: Lazy<Vec<NearMiss>> = Lazy::new(|| {
    vec![
        NearMiss {
            regex: Regex::new(r"^([A-Za-z])[ \t]+\)").unwrap(),
            variant: "letter separated from ')' by whitespace",
            delimiter: ')',
        },
        NearMiss {
            regex: Regex::new(r"^([A-Za-z])[ \t]+\.").unwrap(),
            variant: "letter separated from '.' by whitespace",
            delimiter: '.',
        },
    ]
});

/// Scan the working text for corroborated near-miss option lines.
pub fn detect_irregular_options(
    lines: &[Line],
    config: &ExtractConfig,
) -> Vec<IrregularOptionCandidate> {
    let mut candidates = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let text = line.text.trim();
        if text.is_empty() || config.matches_option(text) || config.matches_question(text) {
            continue;
        }
        let Some((near, caps)) = NEAR_MISSES
            .iter()
            .find_map(|n| n.regex.captures(text).map(|c| (n, c)))
        else {
            continue;
        };

        let lo = i.saturating_sub(WINDOW);
        let hi = (i + WINDOW).min(lines.len().saturating_sub(1));
        let neighbours = (lo..=hi)
            .filter(|&j| j != i)
            .filter(|&j| config.matches_option(lines[j].text.trim()))
            .count();
        if neighbours < MIN_NEIGHBOURS {
            continue;
        }

        let letter = caps
            .get(1)
            .and_then(|m| m.as_str().chars().next())
            .unwrap_or('a');
        let suggestion = format!("{letter}{}", near.delimiter);
        debug!(line = %text, %suggestion, "irregular option candidate");
        candidates.push(IrregularOptionCandidate {
            line: text.to_string(),
            line_number: i + 1,
            letter,
            variant: near.variant,
            suggestion,
        });
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(texts: &[&str]) -> Vec<Line> {
        texts.iter().map(|t| Line::plain(*t, 1)).collect()
    }

    #[test]
    fn spaced_paren_amid_regular_options_is_flagged() {
        let lines = doc(&[
            "1. ¿Pregunta de prueba?",
            "a) primera",
            "b) segunda",
            "C )  tercera con hueco",
            "d) cuarta",
        ]);
        let cands = detect_irregular_options(&lines, &ExtractConfig::default());
        assert_eq!(cands.len(), 1);
        let c = &cands[0];
        assert_eq!(c.letter, 'C');
        assert_eq!(c.suggestion, "C)");
        assert_eq!(c.line_number, 4);
        assert!(c.variant.contains("')'"));
    }

    #[test]
    fn isolated_near_miss_in_prose_is_ignored() {
        let lines = doc(&[
            "El apartado B ) del artículo citado regula el descanso",
            "y no guarda relación con opciones de examen",
        ]);
        assert!(detect_irregular_options(&lines, &ExtractConfig::default()).is_empty());
    }

    #[test]
    fn accepted_candidate_parses_on_rerun() {
        let lines = doc(&[
            "1. ¿Pregunta de prueba?",
            "a) primera",
            "b) segunda",
            "C )  tercera con hueco",
            "d) cuarta",
        ]);
        let mut config = ExtractConfig::default();
        let cands = detect_irregular_options(&lines, &config);
        config.accept_irregular(&cands);

        // the line now matches and stops being a candidate
        assert!(config.matches_option("C )  tercera con hueco"));
        assert!(detect_irregular_options(&lines, &config).is_empty());

        let qs = crate::pipeline::parse::extract_questions(&lines, &config);
        assert_eq!(qs[0].options.len(), 4);
        assert_eq!(qs[0].options[2].letter, 'c');
        assert_eq!(qs[0].options[2].text, "tercera con hueco");
    }
}
