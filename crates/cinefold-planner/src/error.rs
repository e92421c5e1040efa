use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlanError>;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<PlanError> for cinefold_core::error::Error {
    fn from(e: PlanError) -> Self {
        cinefold_core::error::Error::Config(e.to_string())
    }
}
