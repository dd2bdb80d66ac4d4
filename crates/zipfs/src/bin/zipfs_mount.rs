//! zipfs-mount: Expose a zip archive as a read-only filesystem.
//!
//! With a mount point the archive is mounted through FUSE (requires the
//! `fuse` feature); without one a local WebDAV server is started instead.
//!
//! # Usage
//!
//! ```bash
//! # Mount with FUSE
//! zipfs-mount site.zip /mnt/site --min-buf 1048576
//!
//! # Serve over WebDAV, then connect to http://localhost:4918
//! zipfs-mount site.zip
//! ```

use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};
use std::path::PathBuf;
use std::process;
use zipfs::{ZipFs, ZipFsConfig};

/// Expose a zip archive as a read-only filesystem.
#[derive(Parser, Debug)]
#[command(name = "zipfs-mount")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the zip archive
    #[arg(value_name = "ARCHIVE")]
    archive: PathBuf,

    /// Directory to mount the archive at (FUSE); omit to serve over WebDAV
    #[arg(value_name = "MOUNTPOINT")]
    mount_point: Option<PathBuf>,

    /// Minimal buffer size in bytes for reading zip entries
    #[arg(long = "min-buf", value_name = "BYTES")]
    min_buf: Option<usize>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// WebDAV port when no mount point is given
    #[arg(short, long, default_value = "4918")]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    if !args.archive.is_file() {
        error!("Archive not found: {}", args.archive.display());
        process::exit(1);
    }

    let mut config = match &args.config {
        Some(path) => match ZipFsConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load config {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => ZipFsConfig::default(),
    };
    if let Some(min_buf) = args.min_buf {
        config = config.with_min_buf_size(min_buf);
    }

    let fs = match ZipFs::open_archive(&args.archive, config) {
        Ok(fs) => fs,
        Err(e) => {
            error!("Failed to open archive: {}", e);
            process::exit(1);
        }
    };

    info!("Entries: {}", fs.catalog().len());
    if fs.catalog().is_truncated() {
        warn!(
            "Only the first {} entries are visible",
            fs.config().max_entries
        );
    }

    let result = match args.mount_point {
        Some(mount_point) => mount_fuse(fs, mount_point),
        None => serve_webdav(fs, args.port),
    };

    if let Err(e) = result {
        error!("{}", e);
        process::exit(1);
    }
}

#[cfg(feature = "fuse")]
fn mount_fuse(fs: ZipFs, mount_point: PathBuf) -> std::io::Result<()> {
    info!("Mounting at {}", mount_point.display());
    zipfs::fuse::mount(fs, mount_point)
}

#[cfg(not(feature = "fuse"))]
fn mount_fuse(_fs: ZipFs, mount_point: PathBuf) -> std::io::Result<()> {
    Err(std::io::Error::other(format!(
        "cannot mount at {}: built without the `fuse` feature",
        mount_point.display()
    )))
}

fn serve_webdav(fs: ZipFs, port: u16) -> std::io::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(zipfs::webdav::serve(fs, port))
}
