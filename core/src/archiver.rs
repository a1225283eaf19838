// SPDX-License-Identifier: MIT OR Apache-2.0

//! Match archive helper functions for the core crate

use anyhow::{Context, Result};
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::collection::Collection;

// Threshold for gzip compression (1 MiB)
const COMPRESSION_THRESHOLD: usize = 1024 * 1024;

/// Default archive directory for the platform
///
/// ~/Library/Application Support/gammon/finished on macOS,
/// ./finished_matches elsewhere.
pub fn default_archive_dir() -> Result<PathBuf> {
    match std::env::consts::OS {
        "macos" => {
            let mut path = PathBuf::from(
                std::env::var("HOME").map_err(|_| {
                    anyhow::anyhow!("HOME environment variable not set")
                })?,
            );
            path.push("Library");
            path.push("Application Support");
            path.push("gammon");
            path.push("finished");
            Ok(path)
        }
        _ => {
            let mut path = PathBuf::from(".");
            path.push("finished_matches");
            Ok(path)
        }
    }
}

/// Archives a finished match to the default directory
///
/// The filename format is: YYYY-MM-DD_vs_<opponent>.sgf(.gz); records
/// above 1 MiB are gzip compressed.
pub fn archive_finished_match(collection: &Collection, opponent: &str) -> Result<PathBuf> {
    archive_finished_match_to(&default_archive_dir()?, collection, opponent)
}

/// Archives a finished match below the given directory
pub fn archive_finished_match_to(
    archive_dir: &Path,
    collection: &Collection,
    opponent: &str,
) -> Result<PathBuf> {
    let date = Utc::now().format("%Y-%m-%d").to_string();

    std::fs::create_dir_all(archive_dir)?;

    let sanitized_opponent = opponent.replace(
        |c: char| !c.is_alphanumeric() && c != '-' && c != '_',
        "_",
    );
    let filename_base = format!("{}_vs_{}", date, sanitized_opponent);

    // Serialize the match record to SGF
    let mut sgf_data = Vec::new();
    collection
        .write(&mut sgf_data)
        .context("Failed to serialize match to SGF")?;

    let (final_data, extension) = if sgf_data.len() >= COMPRESSION_THRESHOLD {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&sgf_data)
            .context("Failed to compress match data")?;
        let compressed_data = encoder.finish().context("Failed to finish compression")?;

        tracing::info!(
            "Compressed match archive from {} bytes to {} bytes",
            sgf_data.len(),
            compressed_data.len()
        );

        (compressed_data, "sgf.gz")
    } else {
        (sgf_data, "sgf")
    };

    let filename = format!("{}.{}", filename_base, extension);
    let file_path = archive_dir.join(&filename);

    // Temporary file plus rename keeps the archive atomic.
    let tmp_path = archive_dir.join(format!(".tmp_{}", filename));
    {
        let mut file = std::fs::File::create(&tmp_path)
            .context("Failed to create temporary file")?;
        file.write_all(&final_data)
            .context("Failed to write archive data")?;
        file.flush().context("Failed to flush file buffer")?;
    }
    std::fs::rename(&tmp_path, &file_path).context("Failed to rename temporary file")?;

    tracing::info!("Match archived to {:?} ({} bytes)", file_path, final_data.len());

    Ok(file_path)
}

/// Read a match archive, handling both compressed and uncompressed formats
pub fn read_match_archive(path: &Path) -> Result<Collection> {
    use std::io::Read;

    let mut file =
        std::fs::File::open(path).context("Failed to open match archive file")?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)
        .context("Failed to read archive file")?;

    let sgf_bytes = if path.to_string_lossy().ends_with(".gz") {
        let mut decoder = flate2::read::GzDecoder::new(&buffer[..]);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .context("Failed to decompress archive data")?;
        decompressed
    } else {
        buffer
    };

    let mut collection = Collection::parse(&sgf_bytes[..])
        .into_result()
        .context("Failed to parse archived SGF data")?;
    collection
        .cook()
        .context("Failed to cook archived SGF data")?;
    Ok(collection)
}
