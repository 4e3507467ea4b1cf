// Root page handler

use crate::constants;
use crate::format::format_duration_verbose;
use crate::server::ServerState;
use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
};

pub async fn handle_root(State(state): State<ServerState>) -> impl IntoResponse {
    let status = state.service.status();
    let uptime = state.start_time.elapsed();

    let mut response = String::new();
    response.push_str(&format!("\n  {} server\n\n", constants::BINARY_NAME));
    response.push_str("IFSC lookup over the RBI bank branch spreadsheets.\n\n");

    response.push_str("Endpoints\n");
    response.push_str("━━━━━━━━━\n");
    response.push_str("  GET /health               Liveness check\n");
    response.push_str("  GET /status               Service and index status (JSON)\n");
    response.push_str("  GET /banks                Known bank names\n");
    response.push_str("  GET /by-bank?bank=<name>  All branches of a bank\n");
    response.push_str("  GET /by-ifsc?ifsc=<code>  Branch for an 11-character IFSC\n\n");

    response.push_str("Index\n");
    response.push_str("━━━━━\n");
    response.push_str(&format!("  State:         {}\n", status.state));
    response.push_str(&format!("  Source:        {}\n", status.listing_url));
    if let Some(built_at) = status.built_at {
        response.push_str(&format!("  Built:         {}\n", built_at.to_rfc3339()));
        response.push_str(&format!("  Banks:         {}\n", status.banks));
        response.push_str(&format!("  IFSC prefixes: {}\n", status.prefixes));
        response.push_str(&format!(
            "  Files:         {} indexed, {} skipped\n",
            status.files_indexed, status.skipped_files
        ));
    } else {
        response.push_str("  (built on first lookup)\n");
    }
    response.push('\n');

    response.push_str("Server Stats\n");
    response.push_str("━━━━━━━━━━━━\n");
    response.push_str(&format!("  Version:       {}\n", state.config.version));
    response.push_str(&format!("  Uptime:        {}\n", format_duration_verbose(uptime)));

    let mut headers = HeaderMap::new();
    headers.insert(
        "Content-Type",
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    (StatusCode::OK, headers, response)
}
