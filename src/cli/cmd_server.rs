// Server command - start HTTP server
use super::utils::GlobalArgs;
use anyhow::Result;
use clap::Args;
use rbi_ifsc::constants;

#[derive(Args)]
#[command(
    about = "Start HTTP server",
    long_about = "Start an HTTP server answering bank and IFSC lookups as JSON.

The index is loaded from --index-file when present and fresh, otherwise built
from the RBI listing page on the first lookup (or right away with --warm).
Individual bank spreadsheets are fetched only when a query needs them.",
    help_template = crate::clap_help!(
        examples: "  # Start server on default port (8000)\n  \
                   {bin} server\n\n  \
                   # Custom host and port\n  \
                   {bin} server --host 0.0.0.0 --port 3000\n\n  \
                   # Build the index in the background at startup\n  \
                   {bin} server --warm\n\n  \
                   # Rebuild the index once it is a week old\n  \
                   {bin} --index-max-age 7d server"
    )
)]
pub struct ServerCommand {
    /// HTTP server port
    #[arg(long, default_value_t = constants::DEFAULT_PORT, help_heading = "Server Options")]
    pub port: u16,

    /// HTTP server host
    #[arg(long, default_value = constants::DEFAULT_HOST, help_heading = "Server Options")]
    pub host: String,

    /// Load or build the index right after startup instead of on first lookup
    #[arg(long, help_heading = "Server Options")]
    pub warm: bool,
}

pub fn run(cmd: ServerCommand, global: &GlobalArgs) -> Result<()> {
    #[cfg(not(feature = "server"))]
    {
        let _ = (cmd, global);
        anyhow::bail!("Server feature is not enabled. Rebuild with --features server");
    }

    #[cfg(feature = "server")]
    {
        use rbi_ifsc::server::{StartupConfig, start_server};

        let rt = super::utils::runtime()?;
        let startup_config = StartupConfig {
            service: global.service_config(),
            host: cmd.host,
            port: cmd.port,
            warm_index: cmd.warm,
        };

        rt.block_on(start_server(startup_config))
    }
}
