//! drivesync — mirror a local directory into a Google Drive folder.
//!
//! # Usage
//!
//! ```text
//! drivesync --credentials <KEY.json> --dir <PATH> --folder-id <ID>
//!           [--config <drive.json>] [--dry-run] [--no-delete | --confirm-deletes] [--json]
//! ```
//!
//! Local files missing from the folder are uploaded; files in the folder
//! whose name has no local counterpart are permanently deleted.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use drivesync_cloud::{
    DeletionGuard, DenyDeletes, DriveConfig, DriveSession, RemoteFile, SyncOptions, SyncReport,
};
use tracing::error;

#[derive(Parser, Debug)]
#[command(
    name = "drivesync",
    version,
    about = "Mirror a local directory into a Google Drive folder",
    long_about = None,
)]
struct Cli {
    /// Service-account JSON key file.
    #[arg(long, env = "DRIVESYNC_CREDENTIALS")]
    credentials: PathBuf,

    /// Local directory to mirror (direct children only).
    #[arg(long, env = "DRIVESYNC_DIR")]
    dir: PathBuf,

    /// Id of the destination Drive folder.
    #[arg(long, env = "DRIVESYNC_FOLDER_ID")]
    folder_id: String,

    /// JSON file with Drive endpoint and limit overrides.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show what would change without touching Drive.
    #[arg(long)]
    dry_run: bool,

    /// Never delete remote files.
    #[arg(long, conflicts_with = "confirm_deletes")]
    no_delete: bool,

    /// Ask before deleting each remote file.
    #[arg(long)]
    confirm_deletes: bool,

    /// Print the report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

/// Asks on the terminal before each deletion.
struct PromptDeletes;

impl DeletionGuard for PromptDeletes {
    fn confirm(&self, file: &RemoteFile) -> bool {
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "delete remote file {} ({})? [y/N] ", file.name, file.id);
        let _ = stderr.flush();

        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }

    fn is_interactive(&self) -> bool {
        true
    }
}

fn load_config(path: Option<&Path>) -> Result<DriveConfig> {
    let Some(path) = path else {
        return Ok(DriveConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

fn print_summary(report: &SyncReport) {
    if report.dry_run {
        println!(
            "dry run: {} to upload, {} to delete, {} kept, {} unchanged",
            report.would_upload.len(),
            report.would_delete.len(),
            report.skipped_deletes.len(),
            report.unchanged.len()
        );
        for name in &report.would_upload {
            println!("  + {name}");
        }
        for file in &report.would_delete {
            println!("  - {} ({})", file.name, file.id);
        }
        return;
    }

    println!(
        "{} uploaded, {} deleted, {} kept, {} unchanged",
        report.uploaded.len(),
        report.deleted.len(),
        report.skipped_deletes.len(),
        report.unchanged.len()
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let session = DriveSession::initialize(&cli.credentials, config)
        .context("failed to initialize Drive client")?;

    let mut reconciler = session
        .reconciler()
        .with_options(SyncOptions { dry_run: cli.dry_run });
    if cli.no_delete {
        reconciler = reconciler.with_guard(DenyDeletes);
    } else if cli.confirm_deletes {
        reconciler = reconciler.with_guard(PromptDeletes);
    }

    let report = match reconciler.sync_folder(&cli.dir, &cli.folder_id).await {
        Ok(report) => report,
        Err(e) => {
            error!("sync of {} failed: {e}", cli.dir.display());
            return Err(e).context("sync failed");
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}
