// Index builder: listing page -> spreadsheets -> bank / prefix index
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::index::{Index, SkippedFile};
use crate::record::{bank_key, collapse_ws};
use crate::scrape::{SourceLink, list_spreadsheet_links};
use crate::sheet::{SheetReport, read_first_sheet_blocking};
use std::collections::{BTreeSet, HashSet};
use std::time::Instant;

/// Progress callback: (current file, total files, link)
pub type BuildProgress<'a> = &'a (dyn Fn(usize, usize, &SourceLink) + Send + Sync);

/// Build a fresh index from the listing page.
pub async fn build_index(fetcher: &Fetcher, listing_url: &str) -> Result<Index> {
    build_index_with_progress(fetcher, listing_url, None).await
}

/// Build a fresh index, reporting each file as it is processed.
///
/// A file that cannot be fetched or read is logged, recorded in
/// `skipped_files` and skipped. The build only fails when the listing page is
/// unusable or no file produced any record.
pub async fn build_index_with_progress(
    fetcher: &Fetcher,
    listing_url: &str,
    progress: Option<BuildProgress<'_>>,
) -> Result<Index> {
    let start = Instant::now();
    log::info!("[Index] Fetching listing page {}", listing_url);

    let page = fetcher
        .fetch(listing_url)
        .await
        .map_err(|e| Error::Build(format!("listing page unavailable: {}", e)))?;
    let links = list_spreadsheet_links(&page, listing_url)
        .map_err(|e| Error::Build(format!("listing page unreadable: {}", e)))?;

    if links.is_empty() {
        return Err(Error::Build(format!("no spreadsheet links found on {}", listing_url)));
    }
    log::info!("[Index] Found {} spreadsheet links", links.len());

    let mut index = Index::new(listing_url);
    let mut processed = HashSet::new();

    for (i, link) in links.iter().enumerate() {
        if let Some(cb) = progress {
            cb(i + 1, links.len(), link);
        }

        // A link seen earlier in this build maps to identical content.
        if !processed.insert(link.url.clone()) {
            log::debug!("[Index] Duplicate link {}, already indexed", link.url);
            continue;
        }

        let report = match fetch_and_read(fetcher, link).await {
            Ok(report) => report,
            Err(e) => {
                log::warn!("[Index] Skipping {}: {}", link.url, e);
                index.skipped_files.push(SkippedFile {
                    url: link.url.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };

        if report.records.is_empty() {
            log::warn!("[Index] Skipping {}: no usable rows", link.url);
            index.skipped_files.push(SkippedFile {
                url: link.url.clone(),
                error: "no usable rows".to_string(),
            });
            continue;
        }

        if !report.skipped.is_empty() {
            log::debug!("[Index] {}: {} rows skipped", link.url, report.skipped.len());
        }

        merge_file(&mut index, link, &report);
        index.files_indexed += 1;
    }

    if index.files_indexed == 0 {
        return Err(Error::Build(format!(
            "none of the {} linked spreadsheets could be indexed",
            links.len()
        )));
    }

    log::info!(
        "[Index] Indexed {} banks / {} prefixes from {} files in {:?} ({} skipped)",
        index.banks.len(),
        index.prefixes.len(),
        index.files_indexed,
        start.elapsed(),
        index.skipped_files.len()
    );

    Ok(index)
}

async fn fetch_and_read(fetcher: &Fetcher, link: &SourceLink) -> Result<SheetReport> {
    let bytes = fetcher.fetch(&link.url).await?;
    read_first_sheet_blocking(bytes).await
}

/// Fold one file's banks and prefixes into the index, first file winning.
fn merge_file(index: &mut Index, link: &SourceLink, report: &SheetReport) {
    // (display name, key, prefixes) in row order
    let mut banks: Vec<(String, String, BTreeSet<String>)> = Vec::new();

    for record in &report.records {
        let Some(prefix) = record.prefix() else {
            continue;
        };
        index.insert_prefix(prefix, link);

        let name = collapse_ws(&record.bank);
        if name.is_empty() {
            continue;
        }
        let key = bank_key(&name);
        match banks.iter_mut().find(|(_, k, _)| *k == key) {
            Some((_, _, prefixes)) => {
                prefixes.insert(prefix.to_string());
            }
            None => banks.push((name, key, BTreeSet::from([prefix.to_string()]))),
        }
    }

    for (name, _, prefixes) in banks {
        if !index.insert_bank(&name, prefixes, link) {
            log::debug!("[Index] Bank '{}' already indexed from another file, ignoring {}", name, link.url);
        }
    }
}
