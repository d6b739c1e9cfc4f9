use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MotionError {
    #[error("MOTION_API_KEY environment variable must be set")]
    MissingApiKey,

    #[error("Motion request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the Motion API.
    #[error("Motion API returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("template file not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("invalid template file {}: {reason}", .path.display())]
    InvalidTemplate { path: PathBuf, reason: String },

    #[error("template file already exists: {}", .0.display())]
    TemplateExists(PathBuf),

    #[error("invalid template name '{0}'")]
    InvalidTemplateName(String),
}
