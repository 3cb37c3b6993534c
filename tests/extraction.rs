//! End-to-end extraction scenarios over both pipeline paths.

use pdf2quiz::{
    extract, extract_from_text, ExtractConfig, ExtractError, FragmentSource, OptionShape,
    PageFragments, QuestionShape, TextFragment,
};

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ── Fixture builders ─────────────────────────────────────────────────────

const PAGE_W: f32 = 600.0;
const PAGE_H: f32 = 800.0;

fn frag(text: &str, y: f32) -> TextFragment {
    TextFragment {
        text: text.into(),
        x: 40.0,
        y,
        width: 300.0,
        font_size: 11.0,
        font: "Helvetica".into(),
    }
}

/// A page with the academy's usual frame: banner at the very top, page
/// number at the very bottom, content in the safe middle band.
fn framed_page(number: usize, total: usize, body: &[&str]) -> PageFragments {
    let mut fragments = vec![frag("ACADEMIA DOBLER FORMACIÓN EXAMEN PASO 12 DE MARZO 2024", 792.0)];
    let mut y = 640.0;
    for line in body {
        fragments.push(frag(line, y));
        y -= 24.0;
    }
    fragments.push(frag(&format!("Página {number} de {total}"), 10.0));
    PageFragments { number, width: PAGE_W, height: PAGE_H, fragments }
}

/// Ten questions with four options each, split over three framed pages.
fn three_page_exam() -> Vec<PageFragments> {
    let mut blocks: Vec<Vec<String>> = Vec::new();
    for n in 1..=10usize {
        blocks.push(vec![
            format!("{n}. ¿Enunciado de la pregunta número {n}?"),
            format!("a) Primera opción de la pregunta {n}"),
            format!("b) Segunda opción de la pregunta {n}"),
            format!("c) Tercera opción de la pregunta {n}"),
            format!("d) Cuarta opción de la pregunta {n}"),
        ]);
    }
    let pages: [&[Vec<String>]; 3] = [&blocks[0..4], &blocks[4..8], &blocks[8..10]];
    pages
        .iter()
        .enumerate()
        .map(|(i, qs)| {
            let body: Vec<&str> =
                qs.iter().flat_map(|b| b.iter().map(String::as_str)).collect();
            framed_page(i + 1, 3, &body)
        })
        .collect()
}

// ── Structural path ──────────────────────────────────────────────────────

#[tokio::test]
async fn structural_path_extracts_all_questions_and_strips_frame() {
    init_tracing();
    let mut source = FragmentSource::new(three_page_exam());
    let output = extract(&mut source, &ExtractConfig::default()).await.unwrap();

    assert_eq!(output.stats.questions, 10);
    assert_eq!(output.stats.options, 40);
    for (i, q) in output.questions.iter().enumerate() {
        assert_eq!(q.number, i + 1);
        assert_eq!(q.options.len(), 4);
        assert_eq!(q.options[0].letter, 'a');
        assert!(!q.text.contains("ACADEMIA"), "frame leaked into {:?}", q.text);
        assert!(!q.text.contains("Página"));
    }

    // the frame shows up in the audit with its evidence
    assert!(output.stats.boilerplate_lines >= 6);
    let banner = output
        .removed
        .iter()
        .find(|r| r.text.contains("ACADEMIA"))
        .expect("banner in removal audit");
    assert!(banner.score >= 4);
    assert!(!banner.evidence.is_empty());
    assert_eq!(banner.page, Some(1));
}

#[tokio::test]
async fn structural_classification_is_idempotent() {
    use pdf2quiz::pipeline::classify::{BoilerplateDetector, StructuralDetector};
    use pdf2quiz::{DocumentSession, ExtractConfig};

    let mut source = FragmentSource::new(three_page_exam());
    let config = ExtractConfig::default();
    let session = DocumentSession::build(&mut source, &config).await.unwrap();
    let (lines, profile) = session.into_lines();

    let detector = StructuralDetector::new(profile, config.boilerplate_threshold);
    let first = detector.filter(&lines);
    let second = detector.filter(&first.kept);
    assert!(second.removed.is_empty(), "second pass removed {:?}", second.removed);
    assert_eq!(second.kept.len(), first.kept.len());
}

// ── Irregular-option confirmation round-trip ─────────────────────────────

#[test]
fn irregular_candidate_confirmed_and_reparsed() {
    let text = "\
1. ¿Cuál es la opción con formato irregular?
a) Primera normal
b) Segunda normal
C )  Opción rara con espacio
d) Cuarta normal
2. ¿Segunda pregunta normal?
a) uno
b) dos
c) tres
d) cuatro
";
    let config = ExtractConfig::default();
    let first = extract_from_text(text, &config).unwrap();

    assert_eq!(first.irregular_candidates.len(), 1);
    let cand = &first.irregular_candidates[0];
    assert_eq!(cand.letter, 'C');
    assert_eq!(cand.suggestion, "C)");
    // the unconfirmed line is not an option yet
    assert_eq!(first.questions[0].options.len(), 3);

    let mut enriched = config.clone();
    enriched.accept_irregular(&first.irregular_candidates);
    let second = extract_from_text(text, &enriched).unwrap();

    assert!(second.irregular_candidates.is_empty());
    assert_eq!(second.questions[0].options.len(), 4);
    assert_eq!(second.questions[0].options[2].letter, 'c');
    assert_eq!(second.questions[0].options[2].text, "Opción rara con espacio");
}

// ── Plain-text fallback path ─────────────────────────────────────────────

/// 14 questions over two estimated pages of 40 lines. Each question gets
/// its own topic so body lines landing in the same page slot never look
/// like cross-page near-duplicates.
fn plain_text_exam() -> String {
    const TOPICS: [&str; 14] = [
        "anatomía cardiovascular",
        "farmacología oncológica",
        "legislación laboral básica",
        "microbiología hospitalaria",
        "cuidados paliativos domiciliarios",
        "nutrición enteral avanzada",
        "salud mental comunitaria",
        "urgencias extrahospitalarias",
        "bioética asistencial",
        "vacunación infantil sistemática",
        "diabetes gestacional",
        "rehabilitación neurológica",
        "epidemiología descriptiva",
        "gestión de residuos sanitarios",
    ];
    let mut lines: Vec<String> = Vec::new();
    for page in 1..=2usize {
        lines.push("DOBLER FORMACIÓN OPOSICIONES SANIDAD".to_string());
        for q in 0..7 {
            let n = (page - 1) * 7 + q + 1;
            let topic = TOPICS[n - 1];
            lines.push(format!("{n}. ¿Enunciado sobre {topic}?"));
            lines.push(format!("a) Primera opción sobre {topic}"));
            lines.push(format!("b) Segunda opción sobre {topic}"));
            lines.push(format!("c) Tercera opción sobre {topic}"));
            lines.push(format!("d) Cuarta opción sobre {topic}"));
        }
        while lines.len() % 40 != 39 {
            lines.push(format!("Aclaración adicional del temario en la página {page}"));
        }
        lines.push(format!("Página {page} de 2"));
    }
    lines.join("\n")
}

#[tokio::test]
async fn text_only_source_falls_back_to_raw_text() {
    init_tracing();
    let mut source = FragmentSource::text_only(plain_text_exam());
    let output = extract(&mut source, &ExtractConfig::default()).await.unwrap();

    assert_eq!(output.stats.questions, 14);
    for q in &output.questions {
        assert!(q.options.len() <= 4);
        assert!(!q.text.contains("Página"), "footer leaked: {:?}", q.text);
        assert!(!q.text.contains("DOBLER"));
    }
    let removed: Vec<&str> = output.removed.iter().map(|r| r.text.as_str()).collect();
    assert!(removed.iter().any(|t| t.starts_with("Página 1")), "removed: {removed:?}");
    assert!(removed.iter().any(|t| t.contains("DOBLER")));
}

#[test]
fn page_footers_with_varying_numbers_are_still_removed() {
    // "Página 1 de 2" vs "Página 2 de 2" sit below the 0.95 similarity
    // threshold; the pattern library has to carry the removal alone
    let output = extract_from_text(&plain_text_exam(), &ExtractConfig::default()).unwrap();
    let footers: Vec<_> = output
        .removed
        .iter()
        .filter(|r| r.text.starts_with("Página"))
        .collect();
    assert_eq!(footers.len(), 2);
    for f in &footers {
        assert!(f.evidence.iter().any(|e| e.contains("pattern")), "evidence: {:?}", f.evidence);
    }
}

// ── Answer-template excision ─────────────────────────────────────────────

#[test]
fn answer_template_lines_never_become_questions() {
    let text = "\
1. ¿Primera pregunta real?
a) uno
b) dos
2. ¿Segunda pregunta real?
a) tres
b) cuatro
PLANTILLA DE RESPUESTAS
1. ____
2. ____
";
    let output = extract_from_text(
        text,
        &ExtractConfig::builder().option_count(2).build().unwrap(),
    )
    .unwrap();

    let span = output.answer_span.as_ref().expect("answer span located");
    assert_eq!(span.start_marker, "PLANTILLA DE RESPUESTAS");
    assert_eq!(output.stats.answer_key_lines, 3);
    assert!(span.preview.contains("____"));

    assert_eq!(output.questions.len(), 2);
    for q in &output.questions {
        assert!(!q.text.contains("____"), "template leaked: {:?}", q.text);
        for o in &q.options {
            assert!(!o.text.contains("____"));
        }
    }
}

#[test]
fn end_marker_limits_excision() {
    let text = "\
1. ¿Única pregunta?
a) sí
b) no
Hoja de respuestas
1. ____
FIN DE LA HOJA
Anexo con bibliografía del temario completo
";
    let config = ExtractConfig::builder()
        .option_count(2)
        .answer_end_marker("FIN DE LA HOJA")
        .build()
        .unwrap();
    let output = extract_from_text(text, &config).unwrap();
    let span = output.answer_span.unwrap();
    assert_eq!(span.end_marker.as_deref(), Some("FIN DE LA HOJA"));
    assert_eq!(span.end_index - span.start_index, 3);
}

#[test]
fn answer_key_detection_can_be_disabled() {
    let text = "1. ¿Única?\na) sí\nb) no\nRespuestas:\n";
    let config = ExtractConfig::builder()
        .option_count(2)
        .detect_answer_key(false)
        .build()
        .unwrap();
    let output = extract_from_text(text, &config).unwrap();
    assert!(output.answer_span.is_none());
}

// ── Degenerate inputs ────────────────────────────────────────────────────

#[tokio::test]
async fn empty_raw_text_reports_no_extractable_text() {
    let mut source = FragmentSource::text_only("");
    let err = extract(&mut source, &ExtractConfig::default()).await.unwrap_err();
    assert!(matches!(err, ExtractError::NoExtractableText));
}

#[test]
fn document_without_questions_yields_empty_result() {
    let text = "Texto corrido sin estructura de examen.\nSolo prosa normal aquí.\n";
    let output = extract_from_text(text, &ExtractConfig::default()).unwrap();
    assert!(output.questions.is_empty());
    assert_eq!(output.stats.questions, 0);
}

// ── Cross-cutting properties ─────────────────────────────────────────────

#[test]
fn question_numbers_are_strictly_increasing() {
    let output = extract_from_text(&plain_text_exam(), &ExtractConfig::default()).unwrap();
    let numbers: Vec<usize> = output.questions.iter().map(|q| q.number).collect();
    assert!(numbers.windows(2).all(|w| w[0] < w[1]), "numbers: {numbers:?}");
}

#[test]
fn option_count_is_never_exceeded() {
    let config = ExtractConfig::builder()
        .question_shapes([QuestionShape::NumberDot])
        .option_shapes([OptionShape::LowerParen])
        .option_count(3)
        .build()
        .unwrap();
    let output = extract_from_text(&plain_text_exam(), &config).unwrap();
    assert!(output.questions.iter().all(|q| q.options.len() <= 3));
    // the fourth option's text survives as continuation of the third
    assert!(output.questions[0].options[2].text.contains("Cuarta opción"));
}

#[test]
fn correctness_is_never_inferred() {
    let output = extract_from_text(&plain_text_exam(), &ExtractConfig::default()).unwrap();
    assert!(output.questions.iter().flat_map(|q| &q.options).all(|o| !o.correct));
}
