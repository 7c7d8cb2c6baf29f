//! Error types for session setup and input handling.

/// All errors a session can produce.
///
/// `InvalidConfiguration` is fatal at setup and prevents a session from being
/// built. `InputRejected` is a normal boundary condition: the command surface
/// swallows it instead of surfacing it to the participant.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SessionError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Input rejected: {0}")]
    InputRejected(&'static str),
}

impl SessionError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        SessionError::InvalidConfiguration(reason.into())
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, SessionError::InputRejected(_))
    }
}

pub type Result<T, E = SessionError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = SessionError::invalid("zero words");
        assert_eq!(err.to_string(), "Invalid configuration: zero words");

        let err = SessionError::InputRejected("session over");
        assert_eq!(err.to_string(), "Input rejected: session over");
    }

    #[test]
    fn only_rejection_is_rejection() {
        assert!(SessionError::InputRejected("idle").is_rejection());
        assert!(!SessionError::invalid("x").is_rejection());
    }
}
