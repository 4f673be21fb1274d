use thiserror::Error;

/// Errors surfaced by the carousel library.
///
/// Normal operation has no failure modes; these cover caller contract
/// violations and runtime wiring problems.
#[derive(Debug, Error)]
pub enum CarouselError {
    /// A numeric argument was outside its valid range (e.g. a card pitch of 0).
    #[error("invalid argument `{name}`: {value}")]
    InvalidArgument { name: &'static str, value: String },

    /// A tokio-backed component was created outside of a tokio runtime.
    #[error("no tokio runtime available for timer scheduling")]
    NoRuntime,

    /// The carousel service task has stopped and no longer accepts commands.
    #[error("carousel service has stopped")]
    ServiceStopped,

    /// No built-in template has the requested id.
    #[error("unknown template: {0}")]
    UnknownTemplate(String),
}

impl CarouselError {
    pub fn invalid(name: &'static str, value: impl ToString) -> Self {
        Self::InvalidArgument {
            name,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CarouselError>;
