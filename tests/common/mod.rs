#![allow(dead_code)]

use anyhow::Result;
use axum::Router;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use rbi_ifsc::{QueryService, ServiceConfig};
use rust_xlsxwriter::Workbook;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;

pub const RBI_HEADER: [&str; 9] = [
    "BANK", "IFSC", "BRANCH", "ADDRESS", "CITY1", "CITY2", "STATE", "STD CODE", "PHONE",
];

pub fn setup_temp_dir() -> Result<TempDir> {
    tempfile::tempdir().map_err(anyhow::Error::from)
}

/// Build an xlsx with the given rows on its first sheet.
pub fn workbook(rows: &[&[&str]]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            sheet.write_string(r as u32, c as u16, *cell).unwrap();
        }
    }
    workbook.save_to_buffer().unwrap()
}

/// Listing page and files mirroring the RBI layout:
///
/// - `sbi.xlsx`: State Bank of India, SBIN0000001 / SBIN0000002
/// - `hdfc.xlsx`: HDFC Bank with a differently worded header
/// - `broken.xls`: not a workbook
/// - `missing.xlsx`: linked but 404
/// - a second link to `sbi.xlsx`
/// - `sbi2.xlsx`: repeats State Bank of India (SBIN0009999) and adds
///   State Bank of Travancore (SBTR0000001)
pub fn rbi_fixture() -> Fixture {
    let sbi = workbook(&[
        &RBI_HEADER,
        &[
            "State Bank of India", "SBIN0000001", "Kolkata Main", "Samriddhi Bhawan",
            "Kolkata", "Kolkata", "West Bengal", "33", "22103001",
        ],
        &[
            "State Bank of India", "sbin0000002", "Chennai Main", "Rajaji Salai",
            "Chennai", "", "Tamil Nadu", "44", "25228240",
        ],
    ]);
    let hdfc = workbook(&[
        &["Bank Name", "IFSC Code", "Branch Name", "Address", "City", "District", "State", "STD Code", "Phone No."],
        &[
            "HDFC Bank", "HDFC0000001", "Kamala Mills", "Lower Parel",
            "Mumbai", "Mumbai", "Maharashtra", "22", "61606161",
        ],
    ]);
    let sbi2 = workbook(&[
        &["BANK", "IFSC", "BRANCH"],
        &["STATE BANK OF INDIA", "SBIN0009999", "Shadow"],
        &["State Bank of Travancore", "SBTR0000001", "Thiruvananthapuram"],
    ]);

    let listing = r#"<html><body>
        <h1>Bank-wise IFSC</h1>
        <table>
          <tr><td><a href="/files/sbi.xlsx">State Bank of India</a></td></tr>
          <tr><td><a href="files/hdfc.xlsx">HDFC Bank</a></td></tr>
          <tr><td><a href="/files/broken.xls">Broken</a></td></tr>
          <tr><td><a href="/files/missing.xlsx">Missing</a></td></tr>
          <tr><td><a href="/about.html">About</a></td></tr>
          <tr><td><a href="mailto:someone@example.org">Mail</a></td></tr>
          <tr><td><a href="/files/sbi.xlsx">State Bank of India (again)</a></td></tr>
          <tr><td><a href="/files/sbi2.xlsx">More SBI</a></td></tr>
        </table>
    </body></html>"#;

    Fixture::new(listing)
        .file("sbi.xlsx", sbi)
        .file("hdfc.xlsx", hdfc)
        .file("broken.xls", b"this is not a spreadsheet".to_vec())
        .file("sbi2.xlsx", sbi2)
}

pub struct Fixture {
    listing: String,
    files: HashMap<String, Vec<u8>>,
}

impl Fixture {
    pub fn new(listing: &str) -> Self {
        Self {
            listing: listing.to_string(),
            files: HashMap::new(),
        }
    }

    pub fn file(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(name.to_string(), bytes);
        self
    }

    pub async fn serve(self) -> Result<Upstream> {
        Upstream::start(self).await
    }
}

#[derive(Clone)]
struct FixtureState {
    listing: Arc<String>,
    files: Arc<HashMap<String, Vec<u8>>>,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl FixtureState {
    fn hit(&self, path: String) {
        *self.hits.lock().unwrap().entry(path).or_default() += 1;
    }
}

/// Local stand-in for the RBI site.
pub struct Upstream {
    pub base_url: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
    handle: JoinHandle<()>,
}

impl Upstream {
    async fn start(fixture: Fixture) -> Result<Self> {
        let state = FixtureState {
            listing: Arc::new(fixture.listing),
            files: Arc::new(fixture.files),
            hits: Arc::new(Mutex::new(HashMap::new())),
        };
        let hits = Arc::clone(&state.hits);

        let app = Router::new()
            .route("/listing", get(serve_listing))
            .route("/files/{name}", get(serve_file))
            .route("/stream/{kib}", get(serve_stream))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { base_url, hits, handle })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn listing_url(&self) -> String {
        self.url("/listing")
    }

    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for Upstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_listing(State(state): State<FixtureState>) -> Html<String> {
    state.hit("/listing".to_string());
    Html(state.listing.as_ref().clone())
}

async fn serve_file(State(state): State<FixtureState>, Path(name): Path<String>) -> Response {
    state.hit(format!("/files/{}", name));
    match state.files.get(&name) {
        Some(bytes) => (StatusCode::OK, bytes.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// `kib` one-KiB chunks with no Content-Length.
async fn serve_stream(Path(kib): Path<usize>) -> Response {
    let chunks = (0..kib).map(|_| Ok::<_, Infallible>(vec![b'x'; 1024]));
    Body::from_stream(futures_util::stream::iter(chunks)).into_response()
}

/// Service config pointing at `listing_url` with its index inside `dir`.
pub fn service_config(dir: &std::path::Path, listing_url: &str) -> ServiceConfig {
    ServiceConfig {
        listing_url: listing_url.to_string(),
        index_path: dir.join("in_banks.json"),
        http_timeout: Duration::from_secs(5),
        ..ServiceConfig::default()
    }
}

pub fn service(dir: &std::path::Path, listing_url: &str) -> QueryService {
    QueryService::new(service_config(dir, listing_url)).unwrap()
}

#[cfg(feature = "server")]
pub async fn start_test_server(service: Arc<QueryService>) -> Result<(String, JoinHandle<()>)> {
    let config = rbi_ifsc::server::ServerConfig {
        version: "test".to_string(),
        warm_index: false,
    };
    let server = rbi_ifsc::server::Server::new(service, config);
    let app = server.router();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Ok((base_url, handle))
}
