// src/lib.rs
//! IFSC lookup over the RBI bank branch spreadsheets.
//!
//! The listing page is scraped once to build an [`Index`] from bank name and
//! IFSC prefix to the spreadsheet holding that bank's branches. Queries then
//! fetch and parse only the one spreadsheet they need.

pub mod builder;
pub mod cache;
pub mod constants;
pub mod error;
pub mod fetch;
pub mod format;
pub mod index;
pub mod record;
pub mod runtime;
pub mod scrape;
pub mod service;
pub mod sheet;

#[cfg(feature = "server")]
pub mod server;

pub use builder::{BuildProgress, build_index, build_index_with_progress};
pub use error::{Error, Result};
pub use fetch::Fetcher;
pub use index::{BankIndexEntry, Index};
pub use record::BranchRecord;
pub use scrape::{SourceLink, SpreadsheetKind, list_spreadsheet_links};
pub use service::{IndexState, QueryService, ServiceConfig, ServiceStatus};
pub use sheet::{SheetReport, read_first_sheet};
