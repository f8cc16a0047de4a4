/// Errors that can occur across the Vigil platform.
///
/// Each variant wraps a specific failure domain. Library crates use this type
/// directly; the binary crate converts to `miette` diagnostics at the boundary.
///
/// # Examples
///
/// ```
/// use vigil_core::VigilError;
///
/// let err = VigilError::Config("missing GitHub token".into());
/// assert!(err.to_string().contains("missing GitHub token"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum VigilError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// GitHub API or network failure.
    #[error("GitHub error: {0}")]
    GitHub(String),

    /// Jira API or network failure.
    #[error("Jira error: {0}")]
    Jira(String),

    /// LLM API or response error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// The PR diff could not be obtained; nothing to review.
    #[error("diff unavailable for {repo}#{pr_number}: {reason}")]
    DiffUnavailable {
        /// `owner/repo` the run was started for.
        repo: String,
        /// Pull request number.
        pr_number: u64,
        /// Underlying cause.
        reason: String,
    },

    /// Report publishing failed after the retry budget was exhausted.
    #[error("publish failed after {attempts} attempts: {reason}")]
    PublishExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Last error seen.
        reason: String,
    },

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: VigilError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = VigilError::Config("bad value".into());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn diff_unavailable_names_the_pr() {
        let err = VigilError::DiffUnavailable {
            repo: "octocat/hello".into(),
            pr_number: 7,
            reason: "HTTP 502".into(),
        };
        assert!(err.to_string().contains("octocat/hello#7"));
    }

    #[test]
    fn publish_exhausted_reports_attempts() {
        let err = VigilError::PublishExhausted {
            attempts: 3,
            reason: "HTTP 503".into(),
        };
        assert!(err.to_string().contains("3 attempts"));
    }
}
