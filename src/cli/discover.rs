//! Discovery of instrument export files.
//!
//! The scan walks the whole directory tree (operators commonly sort
//! runs into per-sample subdirectories) and collects `*.csv` files.
//! Files this tool wrote itself carry the reserved `dj_` name prefix
//! and are never re-ingested.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// File-name prefix reserved for this tool's own outputs.
const OUTPUT_PREFIX: &str = "dj_";

/// Collect eligible export files under `root` in deterministic
/// (ascending path) order.
pub fn collect_files(root: &Path) -> Result<Vec<PathBuf>, AppError> {
    if !root.is_dir() {
        return Err(AppError::new(
            2,
            format!("Not a directory: {}", root.display()),
        ));
    }

    let mut out = Vec::new();
    walk(root, &mut out);
    out.sort();
    Ok(out)
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => continue,
        };

        if file_type.is_dir() {
            if should_skip_dir(&path) {
                continue;
            }
            walk(&path, out);
            continue;
        }

        if file_type.is_file() && is_eligible(&path) {
            out.push(path);
        }
    }
}

/// `*.csv` (extension matched case-insensitively), except the tool's
/// own `dj_*` outputs.
fn is_eligible(path: &Path) -> bool {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        == Some(true);
    if !is_csv {
        return false;
    }

    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    !name.starts_with(OUTPUT_PREFIX)
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target")
}
