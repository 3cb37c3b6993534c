//! Plain-text boilerplate detection, no position metadata required.
//!
//! When the positioned layer is unavailable the engine only has a flat list
//! of lines, so page geometry is estimated: every `lines_per_page` lines
//! count as one page, and the first and last few lines of each estimated
//! page are the "boundary" where headers and footers live. Four detectors
//! run over this estimate and their verdicts are unioned:
//!
//! 1. cross-page similarity of boundary lines (near-identical text in the
//!    same boundary band on several pages),
//! 2. frequency of repeated boundary text,
//! 3. statistical features typical of frame furniture,
//! 4. the shared pattern library,
//!
//! plus a final context sweep that catches orphaned page numbers and
//! all-caps stamps sitting next to already-flagged lines.

use std::collections::{BTreeMap, HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::output::{LineRole, RemovedLine};
use crate::patterns::{academic_keyword_hits, matches_strong_boilerplate};
use crate::pipeline::classify::{BoilerplateDetector, FilterOutcome};
use crate::pipeline::lines::Line;

/// Lines within this many slots of an estimated page edge are "boundary".
const BOUNDARY_SLOTS: usize = 5;
/// Context sweep looks this many lines around each flagged line.
const CONTEXT_RADIUS: usize = 5;
/// Minimum feature score for the statistical detector.
const FEATURE_THRESHOLD: f64 = 3.0;

static BARE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d{1,2}\s*$").unwrap());
static ALL_CAPS_STAMP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-ZÁÉÍÓÚÑÜ\s]{5,}$").unwrap());

/// Boilerplate filter over layout-free lines.
#[derive(Debug)]
pub struct TextDetector {
    pub lines_per_page: usize,
    pub similarity_threshold: f64,
}

impl TextDetector {
    pub fn new(lines_per_page: usize, similarity_threshold: f64) -> Self {
        Self { lines_per_page: lines_per_page.max(1), similarity_threshold }
    }
}

/// Where a line falls within its estimated page.
#[derive(Debug, Clone, Copy)]
struct Slot {
    page: usize,
    /// 0-based position within the estimated page.
    pos: usize,
    top: bool,
    bottom: bool,
}

impl TextDetector {
    fn slot(&self, index: usize) -> Slot {
        let page = index / self.lines_per_page;
        let pos = index % self.lines_per_page;
        Slot {
            page,
            pos,
            top: pos < BOUNDARY_SLOTS,
            bottom: pos + BOUNDARY_SLOTS >= self.lines_per_page,
        }
    }
}

fn normalise(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Feature score of one line; frame furniture accumulates quickly.
fn feature_score(text: &str, boundary: bool) -> f64 {
    let mut score = 0.0;
    if boundary {
        score += 2.0;
    }
    if text.len() < 100 {
        score += 1.0;
    }
    if text.len() < 50 {
        score += 1.0;
    }
    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    if !letters.is_empty() {
        let upper = letters.iter().filter(|c| c.is_uppercase()).count();
        if upper as f64 / letters.len() as f64 > 0.3 {
            score += 1.0;
        }
    }
    if text.chars().any(|c| c.is_ascii_digit()) {
        score += 1.0;
    }
    score += academic_keyword_hits(text) as f64;
    if text.ends_with('.') && !text.contains(':') {
        score += 0.5;
    }
    score
}

impl BoilerplateDetector for TextDetector {
    fn filter(&self, lines: &[Line]) -> FilterOutcome {
        let slots: Vec<Slot> = (0..lines.len()).map(|i| self.slot(i)).collect();
        let page_count = lines.len().div_ceil(self.lines_per_page).max(1);

        // index → evidence tags, in detector order
        let mut flagged: BTreeMap<usize, Vec<&'static str>> = BTreeMap::new();
        let mut flag = |map: &mut BTreeMap<usize, Vec<&'static str>>, i: usize, tag: &'static str| {
            let tags = map.entry(i).or_default();
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        };

        // 1. Similarity: near-identical boundary text recurring across
        //    pages. Lines cluster greedily against a representative within
        //    their band (top or bottom), not against an exact slot, so a
        //    header that drifts by a line between estimated pages still
        //    groups with its siblings.
        let mut top_clusters: Vec<(String, Vec<usize>)> = Vec::new();
        let mut bottom_clusters: Vec<(String, Vec<usize>)> = Vec::new();
        for (i, slot) in slots.iter().enumerate() {
            if !(slot.top || slot.bottom) || lines[i].text.trim().len() < 10 {
                continue;
            }
            let norm = normalise(&lines[i].text);
            let clusters = if slot.top { &mut top_clusters } else { &mut bottom_clusters };
            match clusters.iter_mut().find(|(rep, _)| {
                strsim::normalized_levenshtein(rep, &norm) >= self.similarity_threshold
            }) {
                Some((_, members)) => members.push(i),
                None => clusters.push((norm, vec![i])),
            }
        }
        for (_, members) in top_clusters.iter().chain(bottom_clusters.iter()) {
            let pages: HashSet<usize> = members.iter().map(|&i| slots[i].page).collect();
            if pages.len() >= 2 {
                for &i in members {
                    flag(&mut flagged, i, "cross-page similarity");
                }
            }
        }

        // 2. Frequency: the same boundary text recurring across pages.
        let mut occurrences: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, slot) in slots.iter().enumerate() {
            if (slot.top || slot.bottom) && lines[i].text.trim().len() >= 10 {
                occurrences.entry(normalise(&lines[i].text)).or_default().push(i);
            }
        }
        for idxs in occurrences.values() {
            let pages: HashSet<usize> = idxs.iter().map(|&i| slots[i].page).collect();
            let positions: HashSet<usize> = idxs.iter().map(|&i| slots[i].pos).collect();
            let fixed_position = pages.len() >= 2 && positions.len() <= 2;
            // The majority rule also needs real recurrence: in a document
            // shorter than one estimated page, a single occurrence would
            // otherwise be "all pages".
            let most_pages = pages.len() >= 2 && pages.len() * 2 > page_count;
            if fixed_position || most_pages {
                for &i in idxs {
                    flag(&mut flagged, i, "boundary frequency");
                }
            }
        }

        // 3. Statistical features, demanded on at least two pages so a
        //    single odd line cannot condemn its repeats elsewhere.
        let mut feature_groups: HashMap<String, Vec<(usize, f64)>> = HashMap::new();
        for (i, slot) in slots.iter().enumerate() {
            let text = lines[i].text.trim();
            if text.is_empty() {
                continue;
            }
            let score = feature_score(text, slot.top || slot.bottom);
            if score >= FEATURE_THRESHOLD {
                feature_groups.entry(normalise(text)).or_default().push((i, score));
            }
        }
        for group in feature_groups.values() {
            let pages: HashSet<usize> = group.iter().map(|&(i, _)| slots[i].page).collect();
            let mean = group.iter().map(|&(_, s)| s).sum::<f64>() / group.len() as f64;
            if pages.len() >= 2 && mean >= FEATURE_THRESHOLD {
                for &(i, _) in group {
                    flag(&mut flagged, i, "statistical features");
                }
            }
        }

        // 4. Pattern library, position-independent. Only the strong shapes
        //    qualify here: a binary verdict with no position or repetition
        //    signal to back it up must not fire on a weak match like a
        //    fraction inside an option body.
        for (i, line) in lines.iter().enumerate() {
            let text = line.text.trim();
            if text.len() >= 5
                && (matches_strong_boilerplate(text) || academic_keyword_hits(text) >= 2)
            {
                flag(&mut flagged, i, "pattern library");
            }
        }

        // 5. Context sweep around everything flagged so far.
        let anchors: Vec<usize> = flagged.keys().copied().collect();
        for &anchor in &anchors {
            let lo = anchor.saturating_sub(CONTEXT_RADIUS);
            let hi = (anchor + CONTEXT_RADIUS).min(lines.len().saturating_sub(1));
            for i in lo..=hi {
                if flagged.contains_key(&i) {
                    continue;
                }
                let text = lines[i].text.trim();
                if BARE_NUMBER.is_match(text) || ALL_CAPS_STAMP.is_match(text) {
                    flag(&mut flagged, i, "context of removed line");
                }
            }
        }

        let mut outcome = FilterOutcome::default();
        for (i, line) in lines.iter().enumerate() {
            if let Some(tags) = flagged.get(&i) {
                let role = if slots[i].top {
                    LineRole::Header
                } else if slots[i].bottom {
                    LineRole::Footer
                } else {
                    LineRole::Content
                };
                trace!(text = %line.text, evidence = ?tags, "removed fallback boilerplate");
                outcome.removed.push(RemovedLine {
                    text: line.text.clone(),
                    role,
                    score: tags.len() as i32,
                    evidence: tags.iter().map(|t| t.to_string()).collect(),
                    page: None,
                });
            } else {
                outcome.kept.push(line.clone());
            }
        }
        outcome
    }
}
