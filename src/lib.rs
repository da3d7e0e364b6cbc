pub mod agent_core;
pub mod capabilities;
pub mod config;
pub mod inference;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use capabilities::{CapabilityProviders, CommandScriptRunner, ScriptRunner, SystemProviders};
use config::{AgentSettings, AssistantConfig};
use inference::{InferenceClient, InferenceError, ModelOracle};

pub use agent_core::{ConfirmationRequest, ExecutionReport, TerminalOutcome};
pub use session::AssistantSession;

/// Everything the agent core needs, passed explicitly at construction.
#[derive(Clone)]
pub struct AssistantContext {
    pub oracle: Arc<dyn ModelOracle>,
    pub providers: Arc<dyn CapabilityProviders>,
    /// Held by the session's confirmation gate only.
    pub script_runner: Arc<dyn ScriptRunner>,
    pub agent: AgentSettings,
}

impl AssistantContext {
    /// Production wiring: HTTP oracle, OS providers, configured interpreter.
    pub fn from_config(config: &AssistantConfig) -> Result<Self, InferenceError> {
        let client = InferenceClient::from_config(config)?;
        Ok(Self {
            oracle: Arc::new(client),
            providers: Arc::new(SystemProviders),
            script_runner: Arc::new(CommandScriptRunner::new(&config.automation)),
            agent: config.agent.clone(),
        })
    }
}

/// Return the platform-standard data directory for Deskmate.
///
/// - macOS: `~/Library/Application Support/deskmate/`
/// - Windows: `{FOLDERID_RoamingAppData}\deskmate\`
/// - Linux: `$XDG_DATA_HOME/deskmate/` (fallback `~/.local/share/deskmate/`)
///
/// Falls back to `~/.deskmate/` only if none of the above can be resolved.
pub fn data_dir() -> std::path::PathBuf {
    if let Some(dir) = dirs::data_dir() {
        return dir.join("deskmate");
    }
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".deskmate")
}

/// Initialize the tracing subscriber.
///
/// By default logs go to `<data_dir>/deskmate.log`:
/// 1. Rotates existing logs (deskmate.log → .1 → .2 → .3, keeps last 3).
/// 2. Opens a fresh deskmate.log with a line-flushing writer.
/// 3. Logs a startup banner with the log path.
///
/// With `to_stderr` the file is skipped and logs go to stderr.
pub fn init_tracing(to_stderr: bool) -> std::io::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("deskmate=info,warn"));

    if to_stderr {
        fmt::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
        tracing::info!(version = env!("CARGO_PKG_VERSION"), "=== Deskmate starting ===");
        return Ok(());
    }

    let log_dir = data_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("deskmate.log");

    rotate_log_file(&log_path, 3);

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    fmt::fmt()
        .with_env_filter(filter)
        .with_writer(FlushingWriter::new(log_file))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_file = %log_path.display(),
        pid = std::process::id(),
        "=== Deskmate starting ==="
    );
    Ok(())
}

/// Rotate log files: `deskmate.log` → `deskmate.log.1` → … → `.{keep}`.
///
/// Oldest file beyond `keep` is deleted. Missing files in the chain are skipped.
fn rotate_log_file(base_path: &std::path::Path, keep: u32) {
    let oldest = format!("{}.{keep}", base_path.display());
    let _ = std::fs::remove_file(&oldest);

    for i in (1..keep).rev() {
        let from = format!("{}.{i}", base_path.display());
        let to = format!("{}.{}", base_path.display(), i + 1);
        let _ = std::fs::rename(&from, &to);
    }

    if base_path.exists() {
        let to = format!("{}.1", base_path.display());
        let _ = std::fs::rename(base_path, &to);
    }
}

/// A writer that wraps `std::fs::File` and flushes after every write, so
/// each log line is on disk even if the process dies mid-session.
#[derive(Clone)]
struct FlushingWriter {
    file: Arc<std::sync::Mutex<std::fs::File>>,
}

impl FlushingWriter {
    fn new(file: std::fs::File) -> Self {
        Self {
            file: Arc::new(std::sync::Mutex::new(file)),
        }
    }
}

impl std::io::Write for FlushingWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut f = self
            .file
            .lock()
            .map_err(|e| std::io::Error::other(format!("lock poisoned: {e}")))?;
        let n = std::io::Write::write(&mut *f, buf)?;
        std::io::Write::flush(&mut *f)?;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut f = self
            .file
            .lock()
            .map_err(|e| std::io::Error::other(format!("lock poisoned: {e}")))?;
        std::io::Write::flush(&mut *f)
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for FlushingWriter {
    type Writer = FlushingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
