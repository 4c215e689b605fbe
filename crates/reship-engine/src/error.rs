use thiserror::Error;

/// Login or verification-code flow could not complete within its bound
///
/// Always fatal: the run aborts and the session is torn down.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Login step failed: {0}")]
    Login(String),

    #[error("No verification code arrived after {attempts} attempts")]
    CodeTimeout { attempts: u32 },

    #[error("Verification code source failed: {0}")]
    Code(#[from] CodeError),
}

/// Failure fetching or validating a one-time code
#[derive(Error, Debug)]
pub enum CodeError {
    #[error("Mailbox unavailable: {0}")]
    Mailbox(String),

    #[error("Malformed verification code: {0}")]
    Malformed(String),
}

/// Failure surfaced by a port operation on a single order
#[derive(Error, Debug)]
pub enum PortError {
    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Missing affordance: {0}")]
    MissingAffordance(String),

    #[error("Remote rejected the action: {0}")]
    Rejected(String),

    #[error("Session lost: {0}")]
    SessionLost(String),
}

impl PortError {
    /// Session loss cannot be recovered by moving on to the next order;
    /// everything else degrades to a per-order failed outcome.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PortError::SessionLost(_))
    }
}

/// Errors that abort a run
///
/// Per-order failures never appear here; they fold into the run report and
/// the loop continues.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Run aborted: {0}")]
    Fatal(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_session_loss_is_fatal() {
        assert!(PortError::SessionLost("socket closed".to_string()).is_fatal());
        assert!(!PortError::Timeout("status cell".to_string()).is_fatal());
        assert!(!PortError::MissingAffordance("confirm button".to_string()).is_fatal());
        assert!(!PortError::Rejected("already shipped".to_string()).is_fatal());
    }
}
