//! Document session: page loading plus profile construction.
//!
//! Pages are awaited strictly one at a time in ascending order and the
//! profile is frozen before any classification happens, so the same
//! document always produces the same profile regardless of how fast the
//! source serves its pages.

use tracing::debug;

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::pipeline::lines::{reconstruct_lines, Line};
use crate::pipeline::profile::{DocumentProfile, Profiler};
use crate::source::PageSource;

/// One loaded page, reduced to reading-order lines.
#[derive(Debug, Clone)]
pub struct PageLines {
    pub number: usize,
    pub width: f32,
    pub height: f32,
    pub lines: Vec<Line>,
}

/// All pages of a document plus the frozen profile.
#[derive(Debug)]
pub struct DocumentSession {
    pub pages: Vec<PageLines>,
    pub profile: DocumentProfile,
}

impl DocumentSession {
    /// Load every page sequentially and profile the leading sample.
    pub async fn build<S: PageSource>(
        source: &mut S,
        config: &ExtractConfig,
    ) -> Result<Self, ExtractError> {
        let count = source.page_count()?;
        let mut profiler = Profiler::new();
        let mut pages = Vec::with_capacity(count);

        for index in 0..count {
            let page = source.page(index).await?;
            let lines = reconstruct_lines(&page, config.line_tolerance);
            if index < config.sample_pages {
                profiler.observe_page(&page, &lines);
            }
            debug!(page = page.number, lines = lines.len(), "loaded page");
            pages.push(PageLines {
                number: page.number,
                width: page.width,
                height: page.height,
                lines,
            });
        }

        let profile = profiler.finish();
        debug!(
            sampled = profile.sampled_pages,
            headers = profile.header_candidates.len(),
            footers = profile.footer_candidates.len(),
            avg_font = profile.avg_font_size,
            "document profile frozen"
        );
        Ok(Self { pages, profile })
    }

    /// All lines of all pages, in document order.
    pub fn into_lines(self) -> (Vec<Line>, DocumentProfile) {
        let lines = self.pages.into_iter().flat_map(|p| p.lines).collect();
        (lines, self.profile)
    }
}
