//! Global constants: upstream URLs, download limits, index file naming and HTTP defaults

/// Binary name used in user agents and startup output
pub const BINARY_NAME: &str = "rbi-ifsc";

/// Package version from Cargo.toml (set at compile time)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the user agent string for HTTP requests
pub fn user_agent() -> String {
    format!("{}/{}", BINARY_NAME, VERSION)
}

// ============================================================================
// Upstream
// ============================================================================

/// RBI page listing the per-bank IFSC spreadsheets
pub const DEFAULT_LISTING_URL: &str = "https://www.rbi.org.in/scripts/bs_viewcontent.aspx?Id=2009";

// ============================================================================
// Download limits
// ============================================================================

/// Maximum accepted size of a single download (25 MiB)
pub const MAX_DOWNLOAD_BYTES: u64 = 25 * 1024 * 1024;

/// Default HTTP request timeout
pub const HTTP_TIMEOUT_SECS: u64 = 60;

// ============================================================================
// Index
// ============================================================================

/// Default location of the persisted bank index
pub const DEFAULT_INDEX_FILE: &str = "in_banks.json";

/// On-disk index format version; files with any other version are rebuilt
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// Number of leading IFSC characters that identify the bank
pub const IFSC_PREFIX_LEN: usize = 4;

/// Full length of an IFSC code
pub const IFSC_LEN: usize = 11;

/// How many leading rows are searched for the header row
pub const HEADER_SCAN_ROWS: usize = 10;

/// Parsed sheets kept in memory between queries
pub const SHEET_CACHE_CAPACITY: usize = 8;

// ============================================================================
// Server
// ============================================================================

/// Default HTTP bind host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default HTTP bind port
pub const DEFAULT_PORT: u16 = 8000;
