//! Error type for backend calls.

use thiserror::Error;

/// Message shown whenever the backend cannot be reached at all.
pub const UNREACHABLE_MESSAGE: &str = "cannot reach server";

/// Failure of a single backend request.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never got a response (connection refused, DNS, timeout).
    #[error("backend unreachable: {0}")]
    Unreachable(String),
    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },
    /// Well-formed response with `success: false`.
    #[error("backend reported failure: {0}")]
    Application(String),
    /// Response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unreachable(_) => UNREACHABLE_MESSAGE.to_string(),
            Self::Http { detail, .. } => detail.clone(),
            Self::Application(message) => message.clone(),
            Self::Decode(_) => "the server sent an unexpected response".to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            Self::Http {
                status: status.as_u16(),
                detail: e.to_string(),
            }
        } else {
            Self::Unreachable(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            ClientError::Unreachable("connection refused".into()).user_message(),
            UNREACHABLE_MESSAGE
        );
        assert_eq!(
            ClientError::Http {
                status: 404,
                detail: "draw not found".into()
            }
            .user_message(),
            "draw not found"
        );
        assert_eq!(
            ClientError::Application("OCR unavailable".into()).user_message(),
            "OCR unavailable"
        );
    }
}
