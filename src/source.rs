//! The seam to the external rendering layer.
//!
//! The engine never parses PDF content streams itself: a [`PageSource`]
//! collaborator supplies positioned [`TextFragment`]s page by page. Pages
//! are requested strictly in ascending order and awaited one at a time, so
//! cross-page statistics are reproducible for identical input.
//!
//! When a source cannot supply fragments at all it reports
//! [`crate::ExtractError::SourceUnavailable`]; [`crate::extract`] then asks
//! the same source for [`PageSource::raw_text`] and switches wholesale to
//! the plain-text fallback path.

use crate::error::ExtractError;

/// A single positioned run of text as reported by the rendering layer.
///
/// Coordinates are in page units with the origin at the bottom-left corner,
/// the convention of PDF user space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
    /// Font identifier as reported by the renderer, opaque to the engine.
    pub font: String,
}

/// All fragments of one page plus the page geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PageFragments {
    /// 1-based page number.
    pub number: usize,
    pub width: f32,
    pub height: f32,
    pub fragments: Vec<TextFragment>,
}

/// The rendering collaborator interface.
///
/// Implementations wrap whatever actually renders the document (a PDF
/// library, a test fixture, a cache). The engine awaits `page` calls
/// sequentially; implementations never see concurrent requests.
pub trait PageSource {
    /// Total page count, or `SourceUnavailable` when the positioned layer
    /// cannot be used at all.
    fn page_count(&self) -> Result<usize, ExtractError>;

    /// Fragments for the 0-indexed page.
    fn page(
        &mut self,
        index: usize,
    ) -> impl std::future::Future<Output = Result<PageFragments, ExtractError>> + Send;

    /// Raw document text for the fallback path, typically a lossy decode
    /// of the underlying bytes.
    fn raw_text(
        &mut self,
    ) -> impl std::future::Future<Output = Result<String, ExtractError>> + Send;
}

/// An in-memory [`PageSource`] over pre-built pages.
///
/// The natural adapter for tests and for callers that already extracted
/// fragments through their own rendering stack.
#[derive(Debug, Clone, Default)]
pub struct FragmentSource {
    pages: Vec<PageFragments>,
    raw: Option<String>,
}

impl FragmentSource {
    pub fn new(pages: Vec<PageFragments>) -> Self {
        Self { pages, raw: None }
    }

    /// Attach raw text used if the caller forces the fallback path.
    pub fn with_raw_text(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// A source with no positioned data at all: `page_count` reports
    /// `SourceUnavailable` and only `raw_text` works. Exercises the
    /// fallback path end to end.
    pub fn text_only(raw: impl Into<String>) -> Self {
        Self { pages: Vec::new(), raw: Some(raw.into()) }
    }
}

impl PageSource for FragmentSource {
    fn page_count(&self) -> Result<usize, ExtractError> {
        if self.pages.is_empty() {
            return Err(ExtractError::SourceUnavailable {
                detail: "no positioned fragment data".into(),
            });
        }
        Ok(self.pages.len())
    }

    async fn page(&mut self, index: usize) -> Result<PageFragments, ExtractError> {
        self.pages.get(index).cloned().ok_or(ExtractError::PageOutOfRange {
            page: index + 1,
            total: self.pages.len(),
        })
    }

    async fn raw_text(&mut self) -> Result<String, ExtractError> {
        self.raw.clone().ok_or(ExtractError::SourceUnavailable {
            detail: "no raw text attached".into(),
        })
    }
}

/// Lossy decode of raw document bytes into fallback text.
///
/// Keeps printable ASCII and Latin letters, drops control bytes and
/// renderer garbage, and discards lines shorter than 3 characters; they
/// are binary debris far more often than content.
pub fn decode_raw_bytes(bytes: &[u8]) -> String {
    let decoded = String::from_utf8_lossy(bytes);
    decoded
        .lines()
        .map(|line| {
            line.chars()
                .filter(|&c| {
                    (' '..='~').contains(&c) || ('\u{00C0}'..='\u{017F}').contains(&c) || c == '¿' || c == '¡'
                })
                .collect::<String>()
        })
        .map(|l| l.trim().to_string())
        .filter(|l| l.len() >= 3)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_page() -> PageFragments {
        PageFragments {
            number: 1,
            width: 600.0,
            height: 800.0,
            fragments: vec![TextFragment {
                text: "hola".into(),
                x: 10.0,
                y: 400.0,
                width: 30.0,
                font_size: 11.0,
                font: "F1".into(),
            }],
        }
    }

    #[tokio::test]
    async fn fragment_source_serves_pages_in_order() {
        let mut src = FragmentSource::new(vec![one_page()]);
        assert_eq!(src.page_count().unwrap(), 1);
        let page = src.page(0).await.unwrap();
        assert_eq!(page.number, 1);
        assert!(matches!(
            src.page(5).await,
            Err(ExtractError::PageOutOfRange { page: 6, total: 1 })
        ));
    }

    #[tokio::test]
    async fn text_only_source_reports_unavailable() {
        let mut src = FragmentSource::text_only("1. ¿Pregunta?\na) sí");
        assert!(matches!(src.page_count(), Err(ExtractError::SourceUnavailable { .. })));
        let text = src.raw_text().await.unwrap();
        assert!(text.contains("Pregunta"));
    }

    #[test]
    fn decode_drops_binary_debris() {
        let bytes = b"1. \xc2\xbfCapital?\n\x01\x02\nab\na) Madrid\n";
        let text = decode_raw_bytes(bytes);
        assert!(text.contains("Capital"));
        assert!(text.contains("a) Madrid"));
        // the control-byte line and the 2-char line are gone
        assert_eq!(text.lines().count(), 2);
    }
}
