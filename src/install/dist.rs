//! Dist installs: archive fetch and extraction
//!
//! The archive is fetched over plain HTTP and buffered fully in memory
//! before being opened as a random-access zip reader. Ecosystem
//! archives wrap their contents in a single top-level folder, which is
//! stripped from every entry before writing under
//! `vendor/<module>/`.

use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::{Component, Path};
use std::time::Duration;

use zip::ZipArchive;

use crate::error::{Result, VendoError};
use crate::lock::Module;

/// Per-request deadline for archive fetches
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum buffered archive size (200 MB)
pub const MAX_ARCHIVE_SIZE: u64 = 200 * 1024 * 1024;

/// Build the blocking HTTP client shared by all workers
pub fn http_client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .unwrap_or_default()
}

/// Fetch and extract a module's zip dist into `<root>/vendor/<name>`
pub fn install(client: &reqwest::blocking::Client, root: &Path, module: &Module) -> Result<()> {
    let dist = module
        .dist
        .as_ref()
        .ok_or_else(|| VendoError::UnsupportedSourceKind {
            module: module.name.clone(),
        })?;

    let bytes = fetch(client, &module.name, &dist.url)?;
    let dest = root.join("vendor").join(&module.name);
    extract_zip(&bytes, &dest, &module.name)
}

/// Fetch a URL, buffering the full body in memory
fn fetch(client: &reqwest::blocking::Client, module: &str, url: &str) -> Result<Vec<u8>> {
    let fetch_err = |reason: String| VendoError::FetchFailed {
        module: module.to_string(),
        url: url.to_string(),
        reason,
    };

    let response = client.get(url).send().map_err(|e| fetch_err(e.to_string()))?;

    if !response.status().is_success() {
        return Err(fetch_err(format!("HTTP status {}", response.status())));
    }

    if let Some(len) = response.content_length() {
        if len > MAX_ARCHIVE_SIZE {
            return Err(fetch_err(format!(
                "archive too large: {len} bytes (max {MAX_ARCHIVE_SIZE})"
            )));
        }
    }

    let bytes = response.bytes().map_err(|e| fetch_err(e.to_string()))?;
    if bytes.len() as u64 > MAX_ARCHIVE_SIZE {
        return Err(fetch_err(format!(
            "archive too large: {} bytes (max {MAX_ARCHIVE_SIZE})",
            bytes.len()
        )));
    }

    Ok(bytes.to_vec())
}

/// Extract a zip archive into `dest`, stripping each entry's single
/// top-level directory component
pub fn extract_zip(bytes: &[u8], dest: &Path, module: &str) -> Result<()> {
    let extract_err = |reason: String| VendoError::ExtractFailed {
        module: module.to_string(),
        reason,
    };

    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| extract_err(e.to_string()))?;

    fs::create_dir_all(dest).map_err(|e| extract_err(e.to_string()))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| extract_err(e.to_string()))?;

        let Some(stripped) = strip_top_level(entry.name()) else {
            // The wrapping folder itself, or a bare top-level entry
            continue;
        };

        let relative = sanitize(&stripped).ok_or_else(|| {
            extract_err(format!("archive entry escapes destination: {}", entry.name()))
        })?;
        let target = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| extract_err(e.to_string()))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| extract_err(e.to_string()))?;
            }
            // Overwrites any file left behind by a previous run
            let mut out = File::create(&target).map_err(|e| extract_err(e.to_string()))?;
            io::copy(&mut entry, &mut out).map_err(|e| extract_err(e.to_string()))?;
        }
    }

    Ok(())
}

/// Drop the first path component of an archive entry name
///
/// Returns `None` for the top-level folder itself and for entries with
/// nothing below it.
fn strip_top_level(name: &str) -> Option<String> {
    let (_, rest) = name.split_once('/')?;
    if rest.is_empty() {
        return None;
    }
    Some(rest.to_string())
}

/// Reject absolute paths and parent-directory traversal
fn sanitize(relative: &str) -> Option<&Path> {
    let path = Path::new(relative);
    if path.is_absolute() {
        return None;
    }
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => return None,
        }
    }
    Some(path)
}
