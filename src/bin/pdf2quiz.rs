//! Command-line front end for the extraction engine.
//!
//! Reads a text file (decoding bytes lossily when it is not clean UTF-8),
//! runs the plain-text pipeline, and prints either a human-readable report
//! or JSON. Interactive confirmation flows from the library surface map to
//! flags: `--accept-irregular` plays the role of the caller confirming the
//! candidate batch and re-running.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pdf2quiz::{
    decode_raw_bytes, discover_shapes, extract_from_text, tidy_text, ExtractConfig, ExtractError,
    ExtractOutput, OptionShape, QuestionShape,
};

#[derive(Parser, Debug)]
#[command(
    name = "pdf2quiz",
    version,
    about = "Extract multiple-choice questions from exam-style documents"
)]
struct Cli {
    /// Input file (plain text; non-UTF-8 bytes are decoded lossily)
    input: PathBuf,

    /// Question prefix format, e.g. "1." or "Pregunta 1:" (repeatable)
    #[arg(long = "question-format", value_name = "FORMAT")]
    question_formats: Vec<String>,

    /// Option prefix format, e.g. "a)" or "(A)" (repeatable)
    #[arg(long = "option-format", value_name = "FORMAT")]
    option_formats: Vec<String>,

    /// Options per question
    #[arg(long, default_value_t = 4)]
    options: usize,

    /// Skip answer-template detection entirely
    #[arg(long)]
    no_answer_key: bool,

    /// Line bounding the answer-template section (inclusive)
    #[arg(long, value_name = "TEXT")]
    end_marker: Option<String>,

    /// Accept all irregular-option candidates and re-run automatically
    #[arg(long)]
    accept_irregular: bool,

    /// Normalise the input text before extraction
    #[arg(long)]
    tidy: bool,

    /// Only survey which prefix formats the document uses, then exit
    #[arg(long)]
    discover: bool,

    /// Emit JSON instead of the human-readable report
    #[arg(long)]
    json: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let bytes = fs::read(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let mut text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => decode_raw_bytes(e.as_bytes()),
    };
    if cli.tidy {
        text = tidy_text(&text);
    }

    if cli.discover {
        print_discovery(&text);
        return Ok(());
    }

    let config = build_config(&cli)?;
    let mut output = extract_from_text(&text, &config)?;

    if cli.accept_irregular && !output.irregular_candidates.is_empty() {
        info!(
            candidates = output.irregular_candidates.len(),
            "accepting irregular candidates and re-running"
        );
        let mut enriched = config.clone();
        enriched.accept_irregular(&output.irregular_candidates);
        output = extract_from_text(&text, &enriched)?;
    }

    let report = if cli.json {
        serde_json::to_string_pretty(&output).context("serialising output")?
    } else {
        render_report(&output, cli.verbose)
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, report).map_err(|e| ExtractError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;
            info!(path = %path.display(), "report written");
        }
        None => println!("{report}"),
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pdf2quiz={default}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> Result<ExtractConfig> {
    let mut builder = ExtractConfig::builder().option_count(cli.options);

    if !cli.question_formats.is_empty() {
        let shapes = cli
            .question_formats
            .iter()
            .map(|label| {
                QuestionShape::from_label(label).ok_or_else(|| unknown_format(label, true))
            })
            .collect::<Result<Vec<_>>>()?;
        builder = builder.question_shapes(shapes);
    }
    if !cli.option_formats.is_empty() {
        let shapes = cli
            .option_formats
            .iter()
            .map(|label| {
                OptionShape::from_label(label).ok_or_else(|| unknown_format(label, false))
            })
            .collect::<Result<Vec<_>>>()?;
        builder = builder.option_shapes(shapes);
    }
    if cli.no_answer_key {
        builder = builder.detect_answer_key(false);
    }
    if let Some(marker) = &cli.end_marker {
        builder = builder.answer_end_marker(marker.clone());
    }

    Ok(builder.build()?)
}

fn unknown_format(label: &str, question: bool) -> anyhow::Error {
    let known: Vec<&str> = if question {
        QuestionShape::ALL.iter().map(|s| s.label()).collect()
    } else {
        OptionShape::ALL.iter().map(|s| s.label()).collect()
    };
    anyhow::anyhow!("unknown format {label:?}, expected one of: {}", known.join(", "))
}

fn print_discovery(text: &str) {
    let d = discover_shapes(text);
    if d.questions.is_empty() && d.options.is_empty() {
        println!("No recognisable question or option formats found.");
        return;
    }
    println!("Question formats:");
    for q in &d.questions {
        let note = if q.progressive { "" } else { "  (numbering not consecutive)" };
        println!("  {:<14} {} lines{}", q.shape.label(), q.count, note);
        for ex in &q.examples {
            println!("      {ex}");
        }
    }
    println!("Option formats:");
    for o in &d.options {
        println!("  {:<14} {} lines", o.shape.label(), o.count);
        for ex in &o.examples {
            println!("      {ex}");
        }
    }
}

fn render_report(output: &ExtractOutput, verbose: u8) -> String {
    use std::fmt::Write;

    let mut s = String::new();
    let _ = writeln!(
        s,
        "{} questions, {} options ({} lines removed as boilerplate, {} as answer key, {} ms)",
        output.stats.questions,
        output.stats.options,
        output.stats.boilerplate_lines,
        output.stats.answer_key_lines,
        output.stats.duration_ms
    );

    for q in &output.questions {
        let _ = writeln!(s, "\n{}. {}", q.number, q.text);
        for o in &q.options {
            let _ = writeln!(s, "   {}) {}", o.letter, o.text);
        }
    }

    if let Some(span) = &output.answer_span {
        let _ = writeln!(
            s,
            "\nAnswer template detected at lines {}..{} (\"{}\")",
            span.start_index, span.end_index, span.start_marker
        );
    }

    if !output.irregular_candidates.is_empty() {
        let _ = writeln!(s, "\nIrregular option lines (re-run with --accept-irregular):");
        for c in &output.irregular_candidates {
            let _ = writeln!(
                s,
                "   line {}: {:?}, suggested prefix {:?}",
                c.line_number, c.line, c.suggestion
            );
        }
    }

    if verbose > 0 && !output.removed.is_empty() {
        let _ = writeln!(s, "\nRemoved lines:");
        for r in &output.removed {
            let _ = writeln!(s, "   [{:?} score {}] {} ({})", r.role, r.score, r.text, r.evidence.join(", "));
        }
    }

    s
}
