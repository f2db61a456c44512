use thiserror::Error;

#[derive(Debug, Error)]
pub enum JuneError {
    #[error("not a june data directory (run `june init` first)")]
    NotInitialized,

    #[error("june already initialized in {0}")]
    AlreadyInitialized(String),

    #[error("{0}")]
    Validation(String),

    #[error("agent {0} not found")]
    AgentNotFound(String),

    #[error("task {0} not found")]
    TaskNotFound(String),

    #[error("invalid status transition: {0} -> {1}")]
    InvalidTransition(String, String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no admin session (run `june admin login` first)")]
    NotSignedIn,

    #[error("locked by another process: {0}")]
    Locked(String),

    #[error("random source unavailable: {0}")]
    Random(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
}

impl JuneError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotInitialized => "not_initialized",
            Self::AlreadyInitialized(_) => "already_initialized",
            Self::Validation(_) => "validation_failed",
            Self::AgentNotFound(_) => "agent_not_found",
            Self::TaskNotFound(_) => "task_not_found",
            Self::InvalidTransition(_, _) => "invalid_transition",
            Self::InvalidCredentials => "invalid_credentials",
            Self::NotSignedIn => "not_signed_in",
            Self::Locked(_) => "locked",
            Self::Random(_) => "random_unavailable",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
            Self::Db(_) => "db_error",
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, JuneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable_snake_case() {
        assert_eq!(JuneError::NotSignedIn.code(), "not_signed_in");
        assert_eq!(
            JuneError::validation("Codename required").code(),
            "validation_failed"
        );
        assert_eq!(
            JuneError::InvalidTransition("complete".into(), "complete".into()).code(),
            "invalid_transition"
        );
    }

    #[test]
    fn validation_message_is_shown_verbatim() {
        let err = JuneError::validation("Select agent and title");
        assert_eq!(err.to_string(), "Select agent and title");
    }
}
