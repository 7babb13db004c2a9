//! Source archive download
//!
//! One blocking GET, streamed to disk behind a progress bar. There is no
//! retry; any failure ends the run.

use crate::error::{RecipeError, Result};
use crate::output;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

const USER_AGENT: &str = concat!("create-ros-recipe/", env!("CARGO_PKG_VERSION"));

/// Download `url` to `dest`, returning the number of bytes written.
///
/// Non-2xx responses are reported as network errors, not written to disk.
pub fn download(url: &str, dest: &Path, timeout: Option<Duration>) -> Result<u64> {
    let filename = dest
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());

    let pb = output::create_spinner(&format!("downloading {}", filename));
    let result = download_with_progress(url, dest, timeout, &pb);
    pb.finish_and_clear();

    let total_bytes = result?;
    output::detail(&format!("downloaded {} ({} bytes)", filename, total_bytes));
    Ok(total_bytes)
}

fn download_with_progress(
    url: &str,
    dest: &Path,
    timeout: Option<Duration>,
    pb: &indicatif::ProgressBar,
) -> Result<u64> {
    let network = |reason: String| RecipeError::Network {
        url: url.to_string(),
        reason,
    };

    let mut request = ureq::get(url).set("User-Agent", USER_AGENT);
    if let Some(timeout) = timeout {
        request = request.timeout(timeout);
    }

    let response = request.call().map_err(|e| match e {
        ureq::Error::Status(code, resp) => {
            network(format!("HTTP {} {}", code, resp.status_text()))
        }
        ureq::Error::Transport(t) => network(t.to_string()),
    })?;

    if let Some(len) = response
        .header("content-length")
        .and_then(|s| s.parse().ok())
    {
        output::upgrade_to_bytes(pb, len);
    }

    let mut file = std::fs::File::create(dest).map_err(|e| RecipeError::io(dest, e))?;
    let mut reader = response.into_reader();
    let mut buffer = [0u8; 8192];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(network(format!("read error: {}", e))),
        };

        file.write_all(&buffer[..bytes_read])
            .map_err(|e| RecipeError::io(dest, e))?;

        total_bytes += bytes_read as u64;
        pb.set_position(total_bytes);
    }

    file.flush().map_err(|e| RecipeError::io(dest, e))?;
    Ok(total_bytes)
}
