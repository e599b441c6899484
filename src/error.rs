use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("Invalid sort key \"{input}\" (expected last_activity, cost, tokens or agent_id)")]
    InvalidSort { input: String },

    #[error("Invalid refresh interval: {input} (expected a positive number of seconds)")]
    InvalidRefresh { input: f64 },

    #[error("Could not determine home directory; pass --log-dir explicitly")]
    NoHomeDir,

    #[error("Failed to start file watcher: {0}")]
    Watch(#[from] notify::Error),

    #[error("Failed to initialise logging: {0}")]
    Logging(String),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_error_display_sort() {
        let e = AppError::InvalidSort {
            input: "size".to_string(),
        };
        assert_eq!(
            e.to_string(),
            r#"Invalid sort key "size" (expected last_activity, cost, tokens or agent_id)"#
        );
    }

    #[test]
    fn app_error_display_refresh() {
        let e = AppError::InvalidRefresh { input: -1.5 };
        assert_eq!(
            e.to_string(),
            "Invalid refresh interval: -1.5 (expected a positive number of seconds)"
        );
    }

    #[test]
    fn app_error_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let app: AppError = io.into();
        assert_eq!(app.to_string(), "denied");
    }

    #[test]
    fn app_error_from_json_error() {
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let app: AppError = json.into();
        assert!(app.to_string().starts_with("Failed to encode JSON"));
    }
}
