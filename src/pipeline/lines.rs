//! Line reconstruction: positioned fragments → reading-order lines.
//!
//! Fragments cluster into vertical bands: walking fragments from the top
//! of the page down, each one joins the current band while it stays within
//! the configured tolerance of the band's running mean Y, otherwise it
//! opens a new band. Within a band, fragments run left to right; bands run
//! top to bottom. The renderer reports coordinates with the origin at the
//! bottom-left, so "top to bottom" means descending raw Y, and
//! `relative_y` flips the axis to the 0-at-top convention the rest of the
//! pipeline uses.

use crate::source::PageFragments;

/// One document line. Built once per page, never mutated afterwards.
///
/// Plain-text input produces lines with no [`LineLayout`]; the structural
/// classifier skips those and the fallback detectors take over.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    /// 1-based page number; for plain-text input, the estimated page.
    pub page: usize,
    pub layout: Option<LineLayout>,
}

/// Position metadata of a reconstructed line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineLayout {
    /// Average raw Y of the merged fragments (bottom-left origin).
    pub y: f32,
    /// Y normalised to page height, 0 = top of page.
    pub relative_y: f32,
    pub avg_font_size: f32,
    /// Sum of fragment widths.
    pub width: f32,
    pub page_width: f32,
}

impl Line {
    /// A layout-free line for the plain-text path.
    pub fn plain(text: impl Into<String>, page: usize) -> Self {
        Self { text: text.into(), page, layout: None }
    }
}

/// Group one page's fragments into ordered lines.
///
/// An empty fragment list yields an empty sequence; there are no error
/// conditions.
pub fn reconstruct_lines(page: &PageFragments, tolerance: f32) -> Vec<Line> {
    let mut order: Vec<usize> = (0..page.fragments.len()).collect();
    order.sort_by(|&a, &b| {
        page.fragments[b]
            .y
            .partial_cmp(&page.fragments[a].y)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Bands grow against their running mean, so two fragments that would
    // straddle a fixed grid cell still end up in the same visual row.
    let mut bands: Vec<Vec<usize>> = Vec::new();
    let mut mean_y = 0.0f32;
    for i in order {
        let y = page.fragments[i].y;
        match bands.last_mut() {
            Some(band) if (mean_y - y).abs() <= tolerance => {
                band.push(i);
                let n = band.len() as f32;
                mean_y += (y - mean_y) / n;
            }
            _ => {
                bands.push(vec![i]);
                mean_y = y;
            }
        }
    }

    let mut lines = Vec::with_capacity(bands.len());
    for mut idxs in bands {
        idxs.sort_by(|&a, &b| {
            page.fragments[a]
                .x
                .partial_cmp(&page.fragments[b].x)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let text = idxs
            .iter()
            .map(|&i| page.fragments[i].text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if text.is_empty() {
            continue;
        }

        let n = idxs.len() as f32;
        let avg_y = idxs.iter().map(|&i| page.fragments[i].y).sum::<f32>() / n;
        let avg_font = idxs.iter().map(|&i| page.fragments[i].font_size).sum::<f32>() / n;
        let width = idxs.iter().map(|&i| page.fragments[i].width).sum::<f32>();
        let relative_y = if page.height > 0.0 {
            (1.0 - avg_y / page.height).clamp(0.0, 1.0)
        } else {
            0.0
        };

        lines.push(Line {
            text,
            page: page.number,
            layout: Some(LineLayout {
                y: avg_y,
                relative_y,
                avg_font_size: avg_font,
                width,
                page_width: page.width,
            }),
        });
    }

    lines
}
