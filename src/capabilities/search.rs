//! `searchFiles`: query the system file index.
//!
//! Uses Spotlight (`mdfind`) on macOS and `locate` elsewhere. Any failure of
//! the index tool yields an empty result list.

use tokio::process::Command;

/// Result cap returned to the model.
pub const MAX_SEARCH_RESULTS: usize = 20;

fn search_command(query: &str) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("mdfind");
        cmd.arg(query);
        cmd
    } else {
        // `--` keeps a query from being read as an option.
        let mut cmd = Command::new("locate");
        cmd.arg("-i")
            .arg("-l")
            .arg(MAX_SEARCH_RESULTS.to_string())
            .arg("--")
            .arg(query);
        cmd
    }
}

/// Search for `query`, returning at most [`MAX_SEARCH_RESULTS`] paths.
pub async fn search_files(query: &str) -> Vec<String> {
    match search_command(query).output().await {
        Ok(output) if output.status.success() => {
            collect_results(&String::from_utf8_lossy(&output.stdout))
        }
        Ok(output) => {
            tracing::debug!(status = %output.status, "file index returned no results");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "file index unavailable");
            Vec::new()
        }
    }
}

/// One path per non-blank line, capped.
fn collect_results(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_SEARCH_RESULTS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_results_caps_and_skips_blanks() {
        let stdout: String = (0..50).map(|i| format!("/tmp/file{i}\n\n")).collect();
        let results = collect_results(&stdout);
        assert_eq!(results.len(), MAX_SEARCH_RESULTS);
        assert_eq!(results[0], "/tmp/file0");
        assert_eq!(results[19], "/tmp/file19");
    }

    #[test]
    fn test_collect_results_empty() {
        assert!(collect_results("\n  \n").is_empty());
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn test_locate_query_follows_separator() {
        let cmd = search_command("--regex");
        let args: Vec<&str> = cmd.as_std().get_args().filter_map(|a| a.to_str()).collect();
        assert_eq!(args, vec!["-i", "-l", "20", "--", "--regex"]);
    }

    #[tokio::test]
    async fn test_search_never_exceeds_cap() {
        let results = search_files("deskmate-unlikely-query-term").await;
        assert!(results.len() <= MAX_SEARCH_RESULTS);
    }
}
