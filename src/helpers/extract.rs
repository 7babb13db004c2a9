//! Source archive extraction
//!
//! Unpacks `.tar.gz` archives natively (no external tools). Entries that
//! would be written outside the destination, through `..`, absolute paths
//! or symlinked parents, are rejected. Links pointing outside the
//! destination are skipped with a warning.

use crate::error::{RecipeError, Result};
use crate::output;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path (no filesystem access).
fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    let mut has_root = false;

    for c in path.components() {
        match c {
            Component::Prefix(p) => {
                out.clear();
                out.push(p.as_os_str());
                has_root = true;
            }
            Component::RootDir => {
                out.push(Component::RootDir.as_os_str());
                has_root = true;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = out
                    .components()
                    .next_back()
                    .is_some_and(|last| matches!(last, Component::Normal(_)));
                if popped {
                    out.pop();
                } else if !has_root {
                    out.push("..");
                }
            }
            Component::Normal(seg) => out.push(seg),
        }
    }

    out
}

/// Reject writes through an existing symlink anywhere below `dest`.
fn ensure_no_symlink_components(dest: &Path, full_path: &Path) -> Result<(), String> {
    let rel = full_path
        .strip_prefix(dest)
        .map_err(|_| format!("path outside destination: {}", full_path.display()))?;

    let mut cur = dest.to_path_buf();
    for comp in rel.components() {
        cur.push(comp);
        if let Ok(md) = std::fs::symlink_metadata(&cur)
            && md.file_type().is_symlink()
        {
            return Err(format!("symlink in path component: {}", cur.display()));
        }
    }

    Ok(())
}

fn ensure_link_target_within_dest(
    dest: &Path,
    link_parent: &Path,
    link_name: &Path,
) -> Result<(), String> {
    if link_name.is_absolute()
        || link_name
            .components()
            .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
    {
        return Err(format!(
            "unsafe link target (absolute): {}",
            link_name.display()
        ));
    }

    let candidate = normalize_lexical(&link_parent.join(link_name));
    if candidate.strip_prefix(normalize_lexical(dest)).is_err() {
        return Err(format!(
            "unsafe link target (escapes dest): {} -> {}",
            link_parent.display(),
            link_name.display()
        ));
    }

    Ok(())
}

/// Unpack a tar stream into `dest`, returning its top-level entries in the
/// order they first appear.
fn extract_tar<R: Read>(reader: R, dest: &Path) -> Result<Vec<String>, String> {
    let mut archive = tar::Archive::new(reader);
    let mut roots: Vec<String> = Vec::new();

    for entry in archive.entries().map_err(|e| format!("tar read error: {}", e))? {
        let mut entry = entry.map_err(|e| format!("tar entry error: {}", e))?;

        // GitHub archives open with a pax header carrying the commit id
        let entry_type = entry.header().entry_type();
        if entry_type.is_pax_global_extensions() {
            continue;
        }

        let path = entry
            .path()
            .map_err(|e| format!("tar path error: {}", e))?
            .into_owned();

        if path.is_absolute() || path.components().any(|c| c == Component::ParentDir) {
            return Err(format!("unsafe path: {}", path.display()));
        }

        if path.as_os_str().is_empty() || path == Path::new(".") {
            continue;
        }

        if let Some(Component::Normal(first)) =
            path.components().find(|c| !matches!(c, Component::CurDir))
        {
            let first = first.to_string_lossy();
            if !roots.iter().any(|r| *r == first) {
                roots.push(first.into_owned());
            }
        }

        let full_path = dest.join(&path);
        ensure_no_symlink_components(dest, &full_path)?;

        // Hard link targets are archive paths, symlink targets are relative
        // to the link's own directory
        let mut hard_link_source = None;
        if entry_type == tar::EntryType::Symlink || entry_type == tar::EntryType::Link {
            let link_name = entry
                .link_name()
                .map_err(|e| format!("tar link_name error: {}", e))?
                .ok_or_else(|| format!("link without target: {}", path.display()))?
                .into_owned();
            let link_parent = if entry_type == tar::EntryType::Link {
                dest
            } else {
                full_path.parent().unwrap_or(dest)
            };
            if let Err(reason) = ensure_link_target_within_dest(dest, link_parent, &link_name) {
                output::warning(&format!("skipping {}: {}", path.display(), reason));
                continue;
            }
            if entry_type == tar::EntryType::Link {
                let source = dest.join(&link_name);
                ensure_no_symlink_components(dest, &source)?;
                hard_link_source = Some(source);
            }
        }

        if let Some(parent) = full_path.parent() {
            if parent.starts_with(dest) {
                ensure_no_symlink_components(dest, parent)?;
            }
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("cannot create directory {}: {}", parent.display(), e))?;
        }

        // `Entry::unpack` would resolve a hard link source against the cwd
        if let Some(source) = hard_link_source {
            if std::fs::symlink_metadata(&full_path).is_ok() {
                std::fs::remove_file(&full_path)
                    .map_err(|e| format!("cannot replace {}: {}", full_path.display(), e))?;
            }
            std::fs::hard_link(&source, &full_path).map_err(|e| {
                format!(
                    "hard link error for {} -> {}: {}",
                    path.display(),
                    source.display(),
                    e
                )
            })?;
            continue;
        }

        entry
            .unpack(&full_path)
            .map_err(|e| format!("unpack error for {}: {}", path.display(), e))?;
    }

    Ok(roots)
}

/// Extract a `.tar.gz` archive into `dest`.
///
/// Returns the names of the archive's top-level entries. A GitHub source
/// archive has exactly one: `<repo>-<tag>`.
pub fn extract_tar_gz(archive_path: &Path, dest: &Path) -> Result<Vec<String>> {
    let file = File::open(archive_path).map_err(|e| RecipeError::io(archive_path, e))?;
    std::fs::create_dir_all(dest).map_err(|e| RecipeError::io(dest, e))?;

    let filename = archive_path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "archive".to_string());

    let pb = output::create_spinner(&format!("extracting {}", filename));
    let decoder = flate2::read::GzDecoder::new(BufReader::new(file));
    let result = extract_tar(decoder, dest);
    pb.finish_and_clear();

    let roots = result.map_err(|reason| RecipeError::archive(archive_path, reason))?;
    output::detail(&format!("extracted {} to {}", filename, dest.display()));
    Ok(roots)
}
