// Bank index CLI commands
use super::progress::BuildProgressBar;
use super::utils::{self, GlobalArgs};
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use rbi_ifsc::format::{format_bytes, format_duration_verbose};
use rbi_ifsc::{BuildProgress, Index, QueryService, SourceLink};
use std::time::Instant;

#[derive(Args)]
#[command(
    about = "Bank index management",
    long_about = "Manage the bank index, which maps bank names and IFSC prefixes to the\nRBI spreadsheet holding their branches. The index is built once from the\nlisting page and persisted to --index-file.",
    after_help = "Examples:\n  \
            # Show the persisted index\n  \
            rbi-ifsc index status\n\n  \
            # Load the index, building it only if missing or stale\n  \
            rbi-ifsc index build\n\n  \
            # Rebuild from the listing page unconditionally\n  \
            rbi-ifsc index rebuild"
)]
pub struct IndexCommand {
    #[command(subcommand)]
    pub command: IndexCommands,
}

#[derive(Subcommand)]
pub enum IndexCommands {
    /// Show the persisted index without touching the network
    #[command(alias = "show")]
    Status {
        /// List skipped source files
        #[arg(long)]
        skipped: bool,
    },

    /// Load the persisted index or build it when missing or stale
    Build,

    /// Rebuild the index from the listing page and replace the persisted file
    Rebuild,
}

pub fn run(cmd: IndexCommand, global: &GlobalArgs) -> Result<()> {
    match cmd.command {
        IndexCommands::Status { skipped } => cmd_status(global, skipped),
        IndexCommands::Build => run_build(global, false),
        IndexCommands::Rebuild => run_build(global, true),
    }
}

fn run_build(global: &GlobalArgs, force: bool) -> Result<()> {
    let service = global.service()?;
    let rt = utils::runtime()?;
    let start = Instant::now();

    let bar = BuildProgressBar::new();
    let report = |current: usize, total: usize, link: &SourceLink| bar.update(current, total, link);
    let progress: Option<BuildProgress<'_>> = if global.quiet { None } else { Some(&report) };

    let result = if force {
        rt.block_on(service.rebuild_with_progress(progress))
    } else {
        rt.block_on(service.index_with_progress(progress))
    };
    bar.finish();

    let index = result?;
    print_summary(&service, &index, start);
    Ok(())
}

fn cmd_status(global: &GlobalArgs, show_skipped: bool) -> Result<()> {
    let path = &global.index_file;
    if !path.exists() {
        println!("No index at {}", path.display());
        println!("  Build one with: rbi-ifsc index build");
        return Ok(());
    }

    let size = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();
    let index = Index::load(path).with_context(|| format!("Failed to load {}", path.display()))?;

    println!("Index: {}", path.display());
    println!("  Size:          {}", format_bytes(size));
    println!("  Format:        v{}", index.version);
    println!("  Listing:       {}", index.listing_url);
    println!(
        "  Built:         {} ({} ago)",
        index.built_at.to_rfc3339(),
        format_duration_verbose(index.age())
    );
    println!("  Banks:         {}", index.banks.len());
    println!("  IFSC prefixes: {}", index.prefixes.len());
    println!(
        "  Files:         {} indexed, {} skipped",
        index.files_indexed,
        index.skipped_files.len()
    );

    if let Some(max_age) = global.service_config().index_max_age
        && index.age() > max_age
    {
        println!("  Stale: older than {}, next load rebuilds it", format_duration_verbose(max_age));
    }

    if show_skipped && !index.skipped_files.is_empty() {
        println!("\nSkipped files:");
        for skipped in &index.skipped_files {
            println!("  {}\n    {}", skipped.url, skipped.error);
        }
    }

    Ok(())
}

fn print_summary(service: &QueryService, index: &Index, start: Instant) {
    println!(
        "✓ Index ready in {}: {} banks, {} IFSC prefixes",
        format_duration_verbose(start.elapsed()),
        index.banks.len(),
        index.prefixes.len()
    );
    println!(
        "  {} files indexed, {} skipped",
        index.files_indexed,
        index.skipped_files.len()
    );
    println!("  Saved to {}", service.config().index_path.display());
}
