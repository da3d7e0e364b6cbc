//! System prompt construction.

/// Identity and intro, the static portion of the system prompt.
const SYSTEM_PROMPT_INTRO: &str = "\
You are Deskmate, a desktop assistant that helps the user with their computer. \
You can list installed applications, open files, folders and URLs, search the file \
index, read text files, and propose AppleScript automations.";

/// The user's home directory as a display string, with a platform placeholder.
fn home_display() -> String {
    dirs::home_dir()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| {
            if cfg!(target_os = "windows") {
                r"C:\Users\user".to_string()
            } else if cfg!(target_os = "macos") {
                "/Users/user".to_string()
            } else {
                "/home/user".to_string()
            }
        })
}

/// Behavioral rules. Injects the real home directory into path examples so
/// the model produces absolute paths that exist on this machine.
fn system_prompt_rules(home: &str) -> String {
    format!("\
Rules:\n\
1. Use absolute paths (e.g. {home}/Documents/report.txt).\n\
2. For lookups (applications, search, reading files) call the tool immediately; do not ask first.\n\
3. For automation, call runAutomationScript with a complete script. The user reviews and \
approves it before it runs, so do NOT ask for confirmation in text.\n\
4. Only report results you actually received from tool calls. If a tool returned an error, \
say so plainly.\n\
5. Be concise, direct, and action-oriented.")
}

/// Full system prompt for a new conversation.
pub fn build_system_prompt() -> String {
    let home = home_display();
    format!("{SYSTEM_PROMPT_INTRO}\n\n{}", system_prompt_rules(&home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mentions_home_and_gated_tool() {
        let prompt = build_system_prompt();
        assert!(prompt.starts_with("You are Deskmate"));
        assert!(prompt.contains(&home_display()));
        assert!(prompt.contains("runAutomationScript"));
        assert!(!prompt.contains("{home}"));
    }
}
