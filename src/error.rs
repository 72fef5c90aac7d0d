use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, InsightsError>;

#[derive(Error, Debug)]
pub enum InsightsError {
    /// Caller-supplied settings that cannot be honoured (inverted range, bad period, ...).
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Repository not found: {}", path.display())]
    RepositoryNotFound { path: PathBuf },
    #[error("Repository access error: {0}")]
    RepositoryAccess(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),
}

impl InsightsError {
    pub fn config(msg: impl Into<String>) -> Self {
        InsightsError::Configuration(msg.into())
    }

    pub(crate) fn access(err: impl std::fmt::Display) -> Self {
        InsightsError::RepositoryAccess(err.to_string())
    }
}

// gix failures all surface as access errors; the caller only needs the message.
impl From<gix::object::find::existing::Error> for InsightsError {
    fn from(err: gix::object::find::existing::Error) -> Self {
        InsightsError::access(err)
    }
}

impl From<gix::object::commit::Error> for InsightsError {
    fn from(err: gix::object::commit::Error) -> Self {
        InsightsError::access(err)
    }
}

impl From<gix::reference::find::existing::Error> for InsightsError {
    fn from(err: gix::reference::find::existing::Error) -> Self {
        InsightsError::access(err)
    }
}

impl From<gix::head::peel::to_commit::Error> for InsightsError {
    fn from(err: gix::head::peel::to_commit::Error) -> Self {
        InsightsError::access(err)
    }
}

impl From<gix::object::find::existing::with_conversion::Error> for InsightsError {
    fn from(err: gix::object::find::existing::with_conversion::Error) -> Self {
        InsightsError::access(err)
    }
}

impl From<gix::objs::decode::Error> for InsightsError {
    fn from(err: gix::objs::decode::Error) -> Self {
        InsightsError::access(err)
    }
}

impl From<gix::repository::diff_tree_to_tree::Error> for InsightsError {
    fn from(err: gix::repository::diff_tree_to_tree::Error) -> Self {
        InsightsError::access(err)
    }
}
