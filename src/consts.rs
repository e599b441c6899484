/// Subdirectory of the Claude home holding one directory per project
pub(crate) const PROJECTS_DIR: &str = "projects";

/// Subdirectory of the Claude home holding per-session todo lists
pub(crate) const TODOS_DIR: &str = "todos";

pub(crate) const CREDENTIALS_FILE: &str = ".credentials.json";

/// Agent logs are named `agent-<id>.jsonl`
pub(crate) const AGENT_LOG_PREFIX: &str = "agent-";
pub(crate) const AGENT_LOG_EXTENSION: &str = "jsonl";

/// Subscription tier reported when the credentials file is missing or unreadable
pub(crate) const DEFAULT_SUBSCRIPTION: &str = "pro";

/// Length of abbreviated agent ids (also the slug fallback)
pub(crate) const SHORT_ID_LEN: usize = 7;

/// Application directory name under the user cache dir (pricing cache, log file)
pub(crate) const APP_DIR: &str = "cctop";
