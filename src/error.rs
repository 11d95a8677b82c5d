use thiserror::Error;

/// Failures surfaced by link creation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("could not find a free short code after {attempts} attempts")]
    CodeGenerationExhausted { attempts: u32 },
}

impl LinkError {
    pub fn invalid_argument<T: Into<String>>(msg: T) -> Self {
        LinkError::InvalidArgument(msg.into())
    }
}

/// Failures raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("short code length must be within 1..=32, got {0}")]
    InvalidCodeLength(usize),
    #[error("default ttl must be a positive number of hours, got {0}")]
    InvalidDefaultTtl(i64),
    #[error("base url prefix must not be empty")]
    EmptyBaseUrl,
    #[error("sweep schedule must not be empty")]
    EmptySweepSchedule,
    #[error("error reading configuration from environment")]
    Env(#[from] envconfig::Error),
}

/// Failures of the text command parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}`, type `help` for the list of commands")]
    Unknown(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("{name} must be a positive integer, got `{value}`")]
    NotPositive { name: &'static str, value: String },
}
