//! Auxiliary files next to the log corpus: todo lists and credentials

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::consts::{CREDENTIALS_FILE, DEFAULT_SUBSCRIPTION, TODOS_DIR};

fn todo_paths(claude_home: &Path, session_id: &str, agent_id: &str) -> [PathBuf; 2] {
    let todos = claude_home.join(TODOS_DIR);
    [
        todos.join(format!("{session_id}.json")),
        todos.join(format!("{session_id}-agent-{agent_id}.json")),
    ]
}

fn read_json(path: &Path) -> Option<Value> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(path = %path.display(), %err, "ignoring unparseable side file");
            None
        }
    }
}

/// True if either todo file for this session/agent holds an empty JSON array.
///
/// An empty session id, a missing file or an unreadable one all count as "no".
pub(crate) fn has_empty_todo_list(claude_home: &Path, session_id: &str, agent_id: &str) -> bool {
    if session_id.is_empty() {
        return false;
    }
    todo_paths(claude_home, session_id, agent_id)
        .iter()
        .filter(|path| path.exists())
        .filter_map(|path| read_json(path))
        .any(|todos| todos.as_array().is_some_and(Vec::is_empty))
}

/// Subscription tier from `{root}/.credentials.json`, defaulting to `pro`.
pub(crate) fn load_subscription_type(claude_home: &Path) -> String {
    read_json(&claude_home.join(CREDENTIALS_FILE))
        .and_then(|creds| {
            creds
                .get("claudeAiOauth")?
                .get("subscriptionType")?
                .as_str()
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_SUBSCRIPTION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home_with_todo(name: &str, content: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(TODOS_DIR)).unwrap();
        fs::write(dir.path().join(TODOS_DIR).join(name), content).unwrap();
        dir
    }

    #[test]
    fn session_todo_empty_list() {
        let home = home_with_todo("s1.json", "[]");
        assert!(has_empty_todo_list(home.path(), "s1", "a1"));
    }

    #[test]
    fn agent_todo_empty_list() {
        let home = home_with_todo("s1-agent-a1.json", " [ ] ");
        assert!(has_empty_todo_list(home.path(), "s1", "a1"));
        assert!(!has_empty_todo_list(home.path(), "s1", "other"));
    }

    #[test]
    fn non_empty_or_wrong_shape_is_false() {
        let home = home_with_todo("s1.json", r#"[{"content":"x"}]"#);
        assert!(!has_empty_todo_list(home.path(), "s1", "a1"));
        let home = home_with_todo("s1.json", "{}");
        assert!(!has_empty_todo_list(home.path(), "s1", "a1"));
        let home = home_with_todo("s1.json", "[");
        assert!(!has_empty_todo_list(home.path(), "s1", "a1"));
    }

    #[test]
    fn empty_session_id_is_false() {
        let home = home_with_todo(".json", "[]");
        assert!(!has_empty_todo_list(home.path(), "", "a1"));
    }

    #[test]
    fn subscription_from_credentials() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_subscription_type(dir.path()), "pro");

        let creds = dir.path().join(CREDENTIALS_FILE);
        fs::write(&creds, r#"{"claudeAiOauth":{"subscriptionType":"max"}}"#).unwrap();
        assert_eq!(load_subscription_type(dir.path()), "max");

        fs::write(&creds, r#"{"claudeAiOauth":{}}"#).unwrap();
        assert_eq!(load_subscription_type(dir.path()), "pro");

        fs::write(&creds, "not json").unwrap();
        assert_eq!(load_subscription_type(dir.path()), "pro");
    }
}
