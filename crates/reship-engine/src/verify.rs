use crate::error::{AuthError, CodeError};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;

/// Expected length of a portal login code
pub const CODE_LENGTH: usize = 6;

lazy_static! {
    static ref CODE_PATTERN: Regex = Regex::new(r"\b\d{6}\b").unwrap();
}

/// A short-lived numeric login code delivered out of band
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCode(String);

impl VerificationCode {
    pub fn parse(raw: &str) -> std::result::Result<Self, CodeError> {
        let raw = raw.trim();
        if raw.len() == CODE_LENGTH && raw.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(CodeError::Malformed(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Extract the first fixed-length numeric code from message text
pub fn extract_code(body: &str) -> Option<VerificationCode> {
    CODE_PATTERN
        .find(body)
        .and_then(|m| VerificationCode::parse(m.as_str()).ok())
}

/// Supplies a one-time code when the remote admin challenges for one
///
/// Implementations monitor an inbox; the engine only sees "most recent code
/// within the window, or nothing yet".
#[async_trait]
pub trait VerificationCodeSource {
    /// The most recently received code within the window
    ///
    /// `Ok(None)` means no code has arrived yet. It is a valid result, not
    /// an error; callers poll again via [`await_code`].
    async fn fetch_latest_code(
        &mut self,
        within_last: Duration,
    ) -> std::result::Result<Option<VerificationCode>, CodeError>;
}

/// Poll a code source a bounded number of times
///
/// Returns the first code seen, or `AuthError::CodeTimeout` once the
/// attempt budget is spent. This is the only retry loop in a run.
pub async fn await_code<S>(
    source: &mut S,
    within_last: Duration,
    attempts: u32,
    interval: Duration,
) -> std::result::Result<VerificationCode, AuthError>
where
    S: VerificationCodeSource + ?Sized,
{
    for attempt in 1..=attempts {
        match source.fetch_latest_code(within_last).await? {
            Some(code) => {
                tracing::info!("Verification code received on attempt {}", attempt);
                return Ok(code);
            }
            None => {
                tracing::debug!("No verification code yet ({}/{})", attempt, attempts);
                if attempt < attempts {
                    tokio::time::sleep(interval).await;
                }
            }
        }
    }

    Err(AuthError::CodeTimeout { attempts })
}
