//! Shared boilerplate pattern library.
//!
//! One table of known header/footer shapes, consulted by three different
//! consumers: the structural classifier (as weighted scoring signals), the
//! plain-text fallback detector (as boolean membership tests), and the
//! mixed-line cleaner (as tail/embedded fragment strippers). Keeping the
//! table in one place means a new stamp format is taught to all three at
//! once instead of drifting apart across modules.
//!
//! The concrete patterns target Spanish-language academy exams (institution
//! banners, "Página N" footers, month-name date stamps) because that is the
//! document family this engine was built against; every consumer goes
//! through the table, so widening the corpus is a data change, not a code
//! change.

use once_cell::sync::Lazy;
use regex::Regex;

/// A recognised boilerplate shape with its scoring weight and evidence tag.
pub struct BoilerplatePattern {
    pub regex: Regex,
    pub weight: i32,
    pub tag: &'static str,
}

const MONTHS: &str =
    "ENERO|FEBRERO|MARZO|ABRIL|MAYO|JUNIO|JULIO|AGOSTO|SEPTIEMBRE|OCTUBRE|NOVIEMBRE|DICIEMBRE";

/// The weighted pattern library; each match contributes 2 to 5 points.
pub static BOILERPLATE_PATTERNS: Lazy<Vec<BoilerplatePattern>> = Lazy::new(|| {
    let p = |re: &str, weight: i32, tag: &'static str| BoilerplatePattern {
        regex: Regex::new(re).unwrap(),
        weight,
        tag,
    };
    vec![
        // Exam banners and dates
        p(r"(?i)EXAMEN\s+(?:RE\s*)?PASO", 4, "exam banner"),
        p(r"(?i)EXAMEN\s+COMÚN", 4, "exam banner"),
        p(
            &format!(r"(?i)\b\d{{1,2}}\s+DE\s+(?:{MONTHS})\s+(?:DE\s+)?\d{{4}}\b"),
            5,
            "month-name date",
        ),
        p(r"\b\d{1,2}/\d{1,2}/\d{2,4}\b", 3, "numeric date"),
        // Institutions
        p(r"(?i)ACADEMIA\s+\w+\s+FORMACIÓN", 4, "institution name"),
        p(r"(?i)DOBLER\s+FORMACIÓN", 4, "institution name"),
        p(r"(?i)\b(?:SAS|SERGAS|SESPA)\b", 3, "health-service acronym"),
        // Page numbering
        p(r"(?i)Página\s+\d+\s*(?:de\s+\d+)?", 5, "page number"),
        p(r"(?i)Pág\.?\s*\d+", 5, "page number"),
        p(r"\b\d+\s*/\s*\d+\b", 2, "fraction numbering"),
        // Document identification
        p(r"(?i)CÓDIGO\s*:?\s*\w+", 3, "document code"),
        p(r"(?i)\bID\s*:?\s*\d+", 2, "identifier"),
        p(r"(?i)www\.\w+\.\w+", 4, "url"),
        p(r"@\w+\.\w+", 3, "email"),
        // Rights notices
        p(
            r"(?i)©|\bcopyright\b|todos\s+los\s+derechos\s+reservados",
            4,
            "copyright",
        ),
        p(r"(?i)prohibida\s+(?:la\s+)?reproducción", 4, "reproduction notice"),
        // Structural unit stamps
        p(r"(?i)\bUNIDAD\s+\d+", 3, "unit stamp"),
        p(r"(?i)\bTEMA\s+\d+", 3, "unit stamp"),
        p(r"(?i)\bCAPÍTULO\s+\d+", 3, "unit stamp"),
        p(r"(?i)\bSECCIÓN\s+\d+", 3, "unit stamp"),
        p(r"(?i)\bHOJA\s+\d+", 3, "page number"),
        p(r"(?i)\bFOLIO\s+\d+", 3, "page number"),
    ]
});

/// Keywords whose presence marks academic boilerplate; two or more on one
/// line is a strong signal even without a full pattern match.
pub const ACADEMIC_KEYWORDS: &[&str] = &[
    "EXAMEN", "UNIDAD", "TEMA", "CAPÍTULO", "SECCIÓN", "ACADEMIA", "FORMACIÓN", "DOBLER", "SAS",
    "ENERO", "FEBRERO", "MARZO", "ABRIL", "MAYO", "JUNIO", "JULIO", "AGOSTO", "SEPTIEMBRE",
    "OCTUBRE", "NOVIEMBRE", "DICIEMBRE", "PÁGINA", "PÁG", "HOJA", "FOLIO",
];

/// All pattern matches for a line, as (evidence tag, weight) pairs.
pub fn match_boilerplate(text: &str) -> Vec<(&'static str, i32)> {
    BOILERPLATE_PATTERNS
        .iter()
        .filter(|p| p.regex.is_match(text))
        .map(|p| (p.tag, p.weight))
        .collect()
}

/// Does the line match any library pattern at all?
pub fn matches_any_boilerplate(text: &str) -> bool {
    BOILERPLATE_PATTERNS.iter().any(|p| p.regex.is_match(text))
}

/// Does the line match a strong library pattern (weight 3 or more)?
///
/// Binary consumers with no other signal to weigh against use this
/// instead of [`matches_any_boilerplate`]: the weak shapes (bare
/// fractions, `ID: N`) are corroborating evidence for the scoring
/// classifier, not grounds for removal on their own.
pub fn matches_strong_boilerplate(text: &str) -> bool {
    BOILERPLATE_PATTERNS.iter().any(|p| p.weight >= 3 && p.regex.is_match(text))
}

/// Number of academic keywords contained in the line (case-insensitive).
pub fn academic_keyword_hits(text: &str) -> usize {
    let upper = text.to_uppercase();
    ACADEMIC_KEYWORDS.iter().filter(|k| upper.contains(*k)).count()
}

// ── Answer-key shapes ────────────────────────────────────────────────────

/// Header phrases that open an embedded answer-key section.
pub const ANSWER_KEY_START_KEYWORDS: &[&str] = &[
    "plantilla de respuestas",
    "hoja de respuestas",
    "respuestas:",
    "respuestas",
];

/// One line of an answer key: leading number, optional delimiter, then a
/// blank-fill or literal answer marker.
pub static ANSWER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*\d+\s*[.)-]?\s*(?:Respuesta:|R:|_{2,}|–{2,}|-{2,}|\[ ?\])").unwrap());

// ── Fragment strippers for the mixed-line cleaner ────────────────────────

/// Tail-anchored fragments: safe to strip even from lines that carry a
/// valid option, because they can only match at the very end.
pub static TAIL_FRAGMENTS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(&format!(
            r"(?i)\s+\d{{1,2}}\s+DE\s+(?:{MONTHS})\s+(?:DE\s+)?\d{{4}}\s*$"
        ))
        .unwrap(),
        Regex::new(r"(?i)\s+EXAMEN\s+(?:RE\s*)?PASO(?:\s+COMÚN)?(?:\s+SAS)?\s*$").unwrap(),
        Regex::new(r"(?i)\s+ACADEMIA\s+\w+\s+FORMACIÓN\s*$").unwrap(),
        Regex::new(r"(?i)\s+DOBLER\s+FORMACIÓN\s*$").unwrap(),
        Regex::new(r"\s+\d+\s*$").unwrap(),
    ]
});

/// Embedded fragments: stripped anywhere in the line, but only from lines
/// that do NOT carry a declared option prefix (broad sweep tier).
pub static EMBEDDED_FRAGMENTS: Lazy<Vec<Regex>> = Lazy::new(|| {
    let re = |s: &str| Regex::new(s).unwrap();
    vec![
        re(&format!(
            r"(?i)\s*\d*\s*EXAMEN\s+(?:RE\s*)?PASO(?:\s+COMÚN)?(?:\s+SAS)?(?:\s*\d{{1,2}}\s*DE\s+(?:{MONTHS})\s+(?:DE\s+)?\d{{4}})?"
        )),
        re(r"(?i)\s*\d*\s*ACADEMIA\s+\w+\s+FORMACIÓN"),
        re(r"(?i)\s*DOBLER\s+FORMACIÓN"),
        re(&format!(
            r"(?i)\s*\d{{1,2}}\s*DE\s+(?:{MONTHS})\s+(?:DE\s+)?\d{{4}}"
        )),
        re(r"(?i)\s*UNIDAD\s+\d+"),
        re(r"(?i)\s*TEMA\s+\d+"),
        re(r"(?i)\s*CAPÍTULO\s+\d+"),
        re(r"(?i)\s*SECCIÓN\s+\d+"),
        re(r"(?i)\s*PÁGINA\s+\d+"),
        re(r"(?i)\s*PÁG\.?\s*\d+"),
        re(r"(?i)\s*\bSAS\b"),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_and_date_both_match() {
        let line = "ACADEMIA X FORMACIÓN — EXAMEN PASO 12 DE MARZO 2024";
        let hits = match_boilerplate(line);
        let tags: Vec<&str> = hits.iter().map(|(t, _)| *t).collect();
        assert!(tags.contains(&"exam banner"), "tags: {tags:?}");
        assert!(tags.contains(&"institution name"), "tags: {tags:?}");
        assert!(tags.contains(&"month-name date"), "tags: {tags:?}");
        let total: i32 = hits.iter().map(|(_, w)| w).sum();
        assert!(total >= 13, "expected strong accumulation, got {total}");
    }

    #[test]
    fn page_number_variants() {
        assert!(matches_any_boilerplate("Página 3"));
        assert!(matches_any_boilerplate("Página 3 de 12"));
        assert!(matches_any_boilerplate("Pág. 7"));
        assert!(matches_any_boilerplate("pág 7"));
        assert!(!matches_any_boilerplate("La página web explica el tema"));
        // "Página web" has no digit, and a question body should not match
        assert!(!matches_any_boilerplate("¿Capital de España?"));
    }

    #[test]
    fn weak_patterns_are_excluded_from_the_strong_set() {
        // a dosage fraction matches the weight-2 shape but nothing strong
        assert!(matches_any_boilerplate("a) 1 / 2 de la dosis total"));
        assert!(!matches_strong_boilerplate("a) 1 / 2 de la dosis total"));
        assert!(matches_strong_boilerplate("Página 3 de 12"));
        assert!(matches_strong_boilerplate("EXAMEN PASO COMÚN"));
    }

    #[test]
    fn keyword_hits_counts_distinct_keywords() {
        assert_eq!(academic_keyword_hits("EXAMEN DE LA UNIDAD 3"), 2);
        assert_eq!(academic_keyword_hits("Madrid es la capital"), 0);
    }

    #[test]
    fn answer_line_shapes() {
        assert!(ANSWER_LINE.is_match("1. _______"));
        assert!(ANSWER_LINE.is_match("  12) Respuesta:"));
        assert!(ANSWER_LINE.is_match("3 - R: b"));
        assert!(ANSWER_LINE.is_match("4. [ ]"));
        assert!(!ANSWER_LINE.is_match("1. ¿Capital de España?"));
    }

    #[test]
    fn tail_fragment_strips_date_not_body() {
        let line = "a) Madrid capital 12 DE MARZO 2024";
        let stripped = TAIL_FRAGMENTS
            .iter()
            .fold(line.to_string(), |acc, re| re.replace(&acc, "").into_owned());
        assert_eq!(stripped, "a) Madrid capital");
    }
}
