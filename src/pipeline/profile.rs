//! Document profiling over a bounded page sample.
//!
//! Before any line is classified, the profiler observes up to the first
//! `sample_pages` pages and learns what "normal" looks like for this
//! document: the average body font size, the font census, and the texts
//! that repeat at the same vertical position across pages. A line that
//! recurs near the top of at least `max(3, 30% of sampled pages)` pages is
//! promoted to a header candidate; near the bottom, a footer candidate.
//! The profile is frozen before classification starts, so page order never
//! changes the verdicts.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::pipeline::lines::Line;
use crate::source::PageFragments;

/// Frozen document statistics consumed by the structural classifier.
#[derive(Debug, Clone, Default)]
pub struct DocumentProfile {
    /// Mean font size over all sampled fragments.
    pub avg_font_size: f32,
    /// Fragment count per font identifier.
    pub fonts: HashMap<String, u32>,
    /// Normalised texts promoted as repeating headers.
    pub header_candidates: HashSet<String>,
    /// Normalised texts promoted as repeating footers.
    pub footer_candidates: HashSet<String>,
    /// Number of pages that contributed observations.
    pub sampled_pages: usize,
}

impl DocumentProfile {
    /// Membership key for repeat detection: the first 20 characters,
    /// trimmed. Dates and page counters vary in their tail, not their head.
    pub fn repeat_key(text: &str) -> String {
        text.trim().chars().take(20).collect()
    }

    pub fn is_known_header(&self, text: &str) -> bool {
        self.header_candidates.contains(&Self::repeat_key(text))
    }

    pub fn is_known_footer(&self, text: &str) -> bool {
        self.footer_candidates.contains(&Self::repeat_key(text))
    }
}

/// Accumulates per-page observations; [`Profiler::finish`] freezes them.
#[derive(Debug, Default)]
pub struct Profiler {
    font_size_sum: f64,
    font_size_count: u64,
    fonts: HashMap<String, u32>,
    /// (vertical bucket, text head) → per-page relative positions.
    repeats: HashMap<(i32, String), Vec<f32>>,
    pages: usize,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one page's fragments and reconstructed lines into the sample.
    pub fn observe_page(&mut self, page: &PageFragments, lines: &[Line]) {
        self.pages += 1;

        for frag in &page.fragments {
            self.font_size_sum += f64::from(frag.font_size);
            self.font_size_count += 1;
            *self.fonts.entry(frag.font.clone()).or_insert(0) += 1;
        }

        for line in lines {
            let Some(layout) = &line.layout else { continue };
            let key = (
                (layout.relative_y * 100.0).round() as i32,
                DocumentProfile::repeat_key(&line.text),
            );
            self.repeats.entry(key).or_default().push(layout.relative_y);
        }
    }

    /// Freeze the sample into a [`DocumentProfile`].
    pub fn finish(self) -> DocumentProfile {
        let avg_font_size = if self.font_size_count > 0 {
            (self.font_size_sum / self.font_size_count as f64) as f32
        } else {
            0.0
        };

        // A text must recur on enough pages before it counts as frame
        // furniture rather than coincidence.
        let needed = promotion_threshold(self.pages);

        let mut header_candidates = HashSet::new();
        let mut footer_candidates = HashSet::new();
        for ((_bucket, head), positions) in self.repeats {
            if positions.len() < needed {
                continue;
            }
            let mean = positions.iter().sum::<f32>() / positions.len() as f32;
            if mean < 0.15 {
                debug!(text = %head, mean_rel_y = mean, "promoted header candidate");
                header_candidates.insert(head);
            } else if mean > 0.85 {
                debug!(text = %head, mean_rel_y = mean, "promoted footer candidate");
                footer_candidates.insert(head);
            }
        }

        DocumentProfile {
            avg_font_size,
            fonts: self.fonts,
            header_candidates,
            footer_candidates,
            sampled_pages: self.pages,
        }
    }
}

/// Minimum page recurrences before promotion: 30% of the sample, floored
/// at 3 so two-page coincidences never qualify.
fn promotion_threshold(pages: usize) -> usize {
    ((pages as f32 * 0.3).ceil() as usize).max(3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::lines::reconstruct_lines;
    use crate::source::TextFragment;

    fn page_with(number: usize, texts: &[(&str, f32)]) -> PageFragments {
        PageFragments {
            number,
            width: 600.0,
            height: 800.0,
            fragments: texts
                .iter()
                .map(|(t, y)| TextFragment {
                    text: (*t).into(),
                    x: 10.0,
                    y: *y,
                    width: 200.0,
                    font_size: 11.0,
                    font: "F1".into(),
                })
                .collect(),
        }
    }

    #[test]
    fn threshold_floors_at_three() {
        assert_eq!(promotion_threshold(2), 3);
        assert_eq!(promotion_threshold(5), 3);
        assert_eq!(promotion_threshold(10), 3);
        assert_eq!(promotion_threshold(20), 6);
    }

    #[test]
    fn repeating_top_text_becomes_header_candidate() {
        let mut profiler = Profiler::new();
        for n in 1..=4 {
            // banner near the top, footer near the bottom, body in between
            let page = page_with(
                n,
                &[
                    ("ACADEMIA X FORMACIÓN EXAMEN", 780.0),
                    ("1. ¿Pregunta de ejemplo?", 400.0),
                    ("Página 1", 20.0),
                ],
            );
            let lines = reconstruct_lines(&page, 5.0);
            profiler.observe_page(&page, &lines);
        }
        let profile = profiler.finish();
        assert!(profile.is_known_header("ACADEMIA X FORMACIÓN EXAMEN"));
        assert!(profile.is_known_footer("Página 1"));
        assert!(!profile.is_known_header("1. ¿Pregunta de ejemplo?"));
        assert_eq!(profile.sampled_pages, 4);
    }

    #[test]
    fn two_page_repeat_is_not_promoted() {
        let mut profiler = Profiler::new();
        for n in 1..=2 {
            let page = page_with(n, &[("EXAMEN PASO", 780.0)]);
            let lines = reconstruct_lines(&page, 5.0);
            profiler.observe_page(&page, &lines);
        }
        let profile = profiler.finish();
        assert!(profile.header_candidates.is_empty());
    }

    #[test]
    fn font_average_covers_all_fragments() {
        let mut profiler = Profiler::new();
        let mut page = page_with(1, &[("texto", 400.0)]);
        page.fragments[0].font_size = 10.0;
        page.fragments.push(TextFragment {
            text: "más".into(),
            x: 80.0,
            y: 400.0,
            width: 30.0,
            font_size: 14.0,
            font: "F2".into(),
        });
        let lines = reconstruct_lines(&page, 5.0);
        profiler.observe_page(&page, &lines);
        let profile = profiler.finish();
        assert!((profile.avg_font_size - 12.0).abs() < 1e-4);
        assert_eq!(profile.fonts.len(), 2);
    }
}
