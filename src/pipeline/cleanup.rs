//! Mixed-line splitting and fragment stripping.
//!
//! Line reconstruction sometimes welds a header fragment onto real content,
//! usually because the renderer emitted both at almost the same height. The
//! cleaner works in two tiers of conservativeness: a line that carries a
//! declared option prefix is content beyond doubt, so only tail-anchored
//! fragments are stripped from it; any other line gets the broad sweep that
//! removes known fragments wherever they appear.

use tracing::debug;

use crate::config::ExtractConfig;
use crate::patterns::{matches_any_boilerplate, EMBEDDED_FRAGMENTS, TAIL_FRAGMENTS};
use crate::pipeline::lines::Line;

/// Separate welded boilerplate from content-bearing lines.
///
/// Option-prefixed lines keep their head and lose any recognised tail.
/// Short lines that are nothing but a library match are dropped outright;
/// the classifier missed them only because they sat at an unusual position.
pub fn split_mixed_lines(lines: Vec<Line>, config: &ExtractConfig) -> Vec<Line> {
    let mut out = Vec::with_capacity(lines.len());
    for mut line in lines {
        let trimmed = line.text.trim();
        if config.matches_option(trimmed) {
            let stripped = strip_tail(trimmed);
            if stripped != trimmed {
                debug!(before = %trimmed, after = %stripped, "stripped welded tail fragment");
            }
            line.text = stripped;
            out.push(line);
        } else if trimmed.len() < 50 && matches_any_boilerplate(trimmed) {
            debug!(text = %trimmed, "dropped residual boilerplate line");
        } else {
            line.text = trimmed.to_string();
            out.push(line);
        }
    }
    out
}

/// Per-line text cleanup applied by the parser.
///
/// Tier 1 (option-prefixed): tail fragments only. Tier 2 (everything
/// else): embedded fragments anywhere. Whitespace collapses either way.
pub fn clean_line(text: &str, config: &ExtractConfig) -> String {
    let trimmed = text.trim();
    let cleaned = if config.matches_option(trimmed) {
        strip_tail(trimmed)
    } else {
        let mut acc = trimmed.to_string();
        for re in EMBEDDED_FRAGMENTS.iter() {
            acc = re.replace_all(&acc, " ").into_owned();
        }
        acc
    };
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_tail(text: &str) -> String {
    let mut acc = text.to_string();
    // Repeat until stable; stripping one tail can expose another.
    loop {
        let mut changed = false;
        for re in TAIL_FRAGMENTS.iter() {
            let next = re.replace(&acc, "").into_owned();
            if next != acc {
                acc = next;
                changed = true;
            }
        }
        if !changed {
            return acc.trim_end().to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ExtractConfig {
        ExtractConfig::default()
    }

    fn plain(texts: &[&str]) -> Vec<Line> {
        texts.iter().map(|t| Line::plain(*t, 1)).collect()
    }

    #[test]
    fn option_line_keeps_head_loses_tail() {
        let lines = plain(&["b) Aurícula derecha 12 DE MARZO 2024"]);
        let out = split_mixed_lines(lines, &config());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "b) Aurícula derecha");
    }

    #[test]
    fn residual_short_boilerplate_is_dropped() {
        let lines = plain(&[
            "Página 4 de 12",
            "El resto del enunciado continúa aquí con más detalle",
        ]);
        let out = split_mixed_lines(lines, &config());
        assert_eq!(out.len(), 1);
        assert!(out[0].text.starts_with("El resto"));
    }

    #[test]
    fn long_line_with_incidental_match_survives_splitting() {
        // mentions a date but is clearly content; length protects it
        let text = "3. ¿Qué norma entró en vigor el 12 DE MARZO 2024 según el boletín oficial del estado?";
        let out = split_mixed_lines(plain(&[text]), &config());
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn tier_two_removes_embedded_unit_stamp() {
        let cleaned = clean_line("Texto del enunciado UNIDAD 3 continúa después", &config());
        assert_eq!(cleaned, "Texto del enunciado continúa después");
    }

    #[test]
    fn tier_one_never_touches_option_body() {
        let cleaned = clean_line("c) La UNIDAD 3 del temario", &config());
        assert_eq!(cleaned, "c) La UNIDAD 3 del temario");
    }

    #[test]
    fn trailing_stray_number_is_stripped_from_option() {
        let cleaned = clean_line("a) Ventrículo izquierdo 7", &config());
        assert_eq!(cleaned, "a) Ventrículo izquierdo");
    }
}
