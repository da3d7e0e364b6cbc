//! `listApplications`: installed application enumeration.
//!
//! Primary strategy is a Spotlight query for application bundles; secondary
//! is a scan of the standard application directories. When both fail the
//! result is an empty list, not an error.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tokio::process::Command;

use super::errors::CapabilityError;

const SPOTLIGHT_APP_QUERY: &str = "kMDItemContentType == 'com.apple.application-bundle'";

/// Enumerate installed applications by display name, sorted and de-duplicated.
pub async fn list_applications() -> Vec<String> {
    match list_via_spotlight().await {
        Ok(apps) => return apps,
        Err(e) => tracing::debug!(error = %e, "spotlight enumeration failed, scanning directories"),
    }

    match app_names_in(&app_directories()) {
        Ok(apps) => apps,
        Err(e) => {
            tracing::warn!(error = %e, "application enumeration failed, returning empty list");
            Vec::new()
        }
    }
}

async fn list_via_spotlight() -> Result<Vec<String>, CapabilityError> {
    let output = Command::new("mdfind")
        .arg(SPOTLIGHT_APP_QUERY)
        .output()
        .await
        .map_err(|e| CapabilityError::SpawnFailed {
            program: "mdfind".to_string(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(CapabilityError::SpawnFailed {
            program: "mdfind".to_string(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let names: BTreeSet<String> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(|line| app_name(Path::new(line.trim())))
        .collect();

    // An empty index usually means Spotlight is disabled, not that nothing is installed.
    if names.is_empty() {
        return Err(CapabilityError::SpawnFailed {
            program: "mdfind".to_string(),
            reason: "no application bundles in index".to_string(),
        });
    }
    Ok(names.into_iter().collect())
}

/// Collect application names from `roots`. Fails only if no directory was readable.
pub fn app_names_in(roots: &[PathBuf]) -> Result<Vec<String>, CapabilityError> {
    let mut names = BTreeSet::new();
    let mut readable = 0usize;

    for dir in roots {
        let Ok(entries) = std::fs::read_dir(dir) else {
            continue;
        };
        readable += 1;
        for entry in entries.flatten() {
            if let Some(name) = app_name(&entry.path()) {
                names.insert(name);
            }
        }
    }

    if readable == 0 {
        return Err(CapabilityError::ReadFailed {
            path: roots
                .iter()
                .map(|d| d.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            reason: "no application directory is readable".to_string(),
        });
    }
    Ok(names.into_iter().collect())
}

/// `Safari.app` or `firefox.desktop` -> display name.
fn app_name(path: &Path) -> Option<String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("app") | Some("desktop") => path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

fn app_directories() -> Vec<PathBuf> {
    let mut candidates = if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/Applications"),
            PathBuf::from("/System/Applications"),
            PathBuf::from("/System/Applications/Utilities"),
        ]
    } else {
        vec![
            PathBuf::from("/usr/share/applications"),
            PathBuf::from("/usr/local/share/applications"),
        ]
    };
    if let Some(home) = dirs::home_dir() {
        if cfg!(target_os = "macos") {
            candidates.push(home.join("Applications"));
        } else {
            candidates.push(home.join(".local/share/applications"));
        }
    }
    candidates
}
