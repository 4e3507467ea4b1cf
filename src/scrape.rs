// Listing page scraping: HTML in, spreadsheet links out. No I/O happens here.
use crate::error::{Error, Result};
use crate::record::collapse_ws;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpreadsheetKind {
    Xls,
    Xlsx,
}

impl SpreadsheetKind {
    /// Infer the kind from the extension of a URL path, case-insensitively.
    pub fn from_path(path: &str) -> Option<Self> {
        let lower = path.to_ascii_lowercase();
        let ext = lower.rsplit_once('.')?.1;
        match ext {
            "xls" => Some(SpreadsheetKind::Xls),
            "xlsx" => Some(SpreadsheetKind::Xlsx),
            _ => None,
        }
    }
}

/// A spreadsheet linked from the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLink {
    pub url: String,
    pub kind: SpreadsheetKind,
    /// Anchor text, or the file name when the anchor has no text.
    pub title: String,
}

/// Extracts spreadsheet anchors from a parsed page relative to its URL.
pub struct LinkScraper {
    base: Url,
    anchors: Selector,
}

impl LinkScraper {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| Error::Parse(format!("invalid page URL {}: {}", base_url, e)))?;
        let anchors = Selector::parse("a[href]")
            .map_err(|e| Error::Parse(format!("anchor selector: {}", e)))?;
        Ok(Self { base, anchors })
    }

    /// Spreadsheet links of `doc` in document order, resolved lazily.
    pub fn links<'a>(&'a self, doc: &'a Html) -> impl Iterator<Item = SourceLink> + 'a {
        doc.select(&self.anchors)
            .filter_map(move |anchor| self.resolve(anchor))
    }

    fn resolve(&self, anchor: ElementRef<'_>) -> Option<SourceLink> {
        let href = anchor.value().attr("href")?.trim();
        if href.is_empty() {
            return None;
        }

        let url = self.base.join(href).ok()?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return None;
        }
        let kind = SpreadsheetKind::from_path(url.path())?;

        let text = collapse_ws(&anchor.text().collect::<String>());
        let title = if text.is_empty() {
            url.path_segments()
                .and_then(|mut segments| segments.next_back())
                .unwrap_or_default()
                .to_string()
        } else {
            text
        };

        Some(SourceLink {
            url: url.to_string(),
            kind,
            title,
        })
    }
}

/// Parse a listing page body and return its spreadsheet links.
///
/// Fails only when the body is not text at all; stray non-UTF-8 bytes are
/// replaced and broken markup still yields whatever anchors the HTML parser
/// recovers.
pub fn list_spreadsheet_links(body: &[u8], base_url: &str) -> Result<Vec<SourceLink>> {
    if body.contains(&0) {
        return Err(Error::Parse("listing page is binary, not text".to_string()));
    }
    let html = String::from_utf8_lossy(body);
    let scraper = LinkScraper::new(base_url)?;
    let doc = Html::parse_document(&html);
    Ok(scraper.links(&doc).collect())
}
