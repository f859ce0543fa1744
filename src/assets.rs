//! Static assets shipped with every site, and the offline cache manifest.

use anyhow::{Context, Result};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

pub const MANIFEST: &str = "appcache.manifest";

/// `(output-relative path, contents)` for every bundled asset.
const ASSETS: &[(&str, &str)] = &[
    ("styles.css", include_str!("../assets/styles.css")),
    ("client-static.js", include_str!("../assets/client-static.js")),
    ("client-live-nav.js", include_str!("../assets/client-live-nav.js")),
];

/// Write the bundled assets into `out_dir`, one task per file.
pub fn write_assets(out_dir: &Path) -> Result<()> {
    ASSETS.par_iter().try_for_each(|(name, contents)| {
        let path = out_dir.join(name);
        fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))
    })
}

/// Write `appcache.manifest` listing every file under `out_dir`.
///
/// Without a `version` the manifest is versioned by a digest of the listed
/// files, so identical output yields an identical manifest.
pub fn write_app_cache(out_dir: &Path, version: Option<&str>) -> Result<()> {
    let files = list_files(out_dir)?;
    let version = match version {
        Some(v) => v.to_string(),
        None => digest(out_dir, &files)?,
    };

    let mut manifest = String::from("CACHE MANIFEST\n\n");
    manifest.push_str(&format!("# VERSION: {}\n\n", version));
    manifest.push_str("NETWORK:\n*\n\nCACHE:\n");
    for file in &files {
        manifest.push_str(file);
        manifest.push('\n');
    }

    let path = out_dir.join(MANIFEST);
    fs::write(&path, manifest).with_context(|| format!("failed to write {}", path.display()))
}

/// Output-relative, `/`-separated paths of all files, sorted, manifest excluded.
fn list_files(out_dir: &Path) -> Result<Vec<String>> {
    let pattern = format!(
        "{}/**/*",
        glob::Pattern::escape(&out_dir.to_string_lossy())
    );
    let mut files = Vec::new();
    for entry in glob::glob(&pattern).with_context(|| format!("invalid glob pattern: {}", pattern))? {
        let path = entry.context("failed to list output files")?;
        if !path.is_file() {
            continue;
        }
        let rel = path
            .strip_prefix(out_dir)
            .with_context(|| format!("{} is outside {}", path.display(), out_dir.display()))?;
        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if rel != MANIFEST {
            files.push(rel);
        }
    }
    files.sort();
    Ok(files)
}

fn digest(out_dir: &Path, files: &[String]) -> Result<String> {
    let mut hasher = Sha256::new();
    for file in files {
        let path = out_dir.join(file);
        let contents = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
        hasher.update(file.as_bytes());
        hasher.update(&contents);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
